//! Typed event payloads.
//!
//! The ledger stores payloads as opaque JSON; consumers decode them through
//! this tagged union keyed by [`EventType`]. A payload that fails to decode is
//! a typed, local error — it never aborts the event-write path.

use crate::entities::EventType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

/// A payload did not match the schema its `event_type` selects.
#[derive(Debug, Error)]
#[error("malformed {event_type:?} payload: {source}")]
pub struct PayloadError {
    pub event_type: EventType,
    #[source]
    pub source: serde_json::Error,
}

/// One participant's share of an expense, on either the paying or owing side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseShare {
    pub user_id: String,
    pub amount: Decimal,
}

/// Payload of `EXPENSE_CREATED` and `EXPENSE_UPDATED` events. Deleted
/// expenses carry the same shape, linked to the superseded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensePayload {
    pub description: String,
    pub date_time: String,
    pub split_type: String,
    pub currency: String,
    pub total: Decimal,
    pub paid_by: Vec<ExpenseShare>,
    pub paid_for: Vec<ExpenseShare>,
}

impl ExpensePayload {
    /// Every involved user id: payers first, then payees, deduplicated by
    /// value in first-seen order.
    pub fn recipients(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for share in self.paid_by.iter().chain(self.paid_for.iter()) {
            if !ids.contains(&share.user_id) {
                ids.push(share.user_id.clone());
            }
        }
        ids
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCreatedPayload {
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_time: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCurrencyAddedPayload {
    pub currency: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_time: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupUserJoinedPayload {
    pub name: String,
    pub user_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_time: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserNameChangedPayload {
    pub user_id: String,
    pub name: String,
}

/// A decoded event payload, tagged by the event type that selected its schema.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    GroupCreated(GroupCreatedPayload),
    GroupCurrencyAdded(GroupCurrencyAddedPayload),
    GroupUserJoined(GroupUserJoinedPayload),
    UserNameChanged(UserNameChangedPayload),
    ExpenseCreated(ExpensePayload),
    ExpenseUpdated(ExpensePayload),
    ExpenseDeleted(ExpensePayload),
}

impl EventPayload {
    /// Decode a stored payload into the schema its event type selects.
    pub fn decode(
        event_type: EventType,
        payload: &serde_json::Value,
    ) -> Result<Self, PayloadError> {
        fn parse<T: serde::de::DeserializeOwned>(
            event_type: EventType,
            payload: &serde_json::Value,
        ) -> Result<T, PayloadError> {
            serde_json::from_value(payload.clone())
                .map_err(|source| PayloadError { event_type, source })
        }

        Ok(match event_type {
            EventType::GroupCreated => EventPayload::GroupCreated(parse(event_type, payload)?),
            EventType::GroupAddCurrency => {
                EventPayload::GroupCurrencyAdded(parse(event_type, payload)?)
            }
            EventType::GroupUserJoined => {
                EventPayload::GroupUserJoined(parse(event_type, payload)?)
            }
            EventType::UserNameChanged => {
                EventPayload::UserNameChanged(parse(event_type, payload)?)
            }
            EventType::ExpenseCreated => EventPayload::ExpenseCreated(parse(event_type, payload)?),
            EventType::ExpenseUpdated => EventPayload::ExpenseUpdated(parse(event_type, payload)?),
            EventType::ExpenseDeleted => EventPayload::ExpenseDeleted(parse(event_type, payload)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expense_json() -> serde_json::Value {
        json!({
            "description": "Groceries",
            "date_time": "2026-03-01T12:00:00Z",
            "split_type": "equal",
            "currency": "EUR",
            "total": "42.50",
            "paid_by": [{"user_id": "u1", "amount": "42.50"}],
            "paid_for": [
                {"user_id": "u1", "amount": "21.25"},
                {"user_id": "u2", "amount": "21.25"}
            ]
        })
    }

    #[test]
    fn decodes_expense_payload() {
        let decoded = EventPayload::decode(EventType::ExpenseCreated, &expense_json()).unwrap();
        let EventPayload::ExpenseCreated(expense) = decoded else {
            panic!("wrong variant");
        };
        assert_eq!(expense.description, "Groceries");
        assert_eq!(expense.paid_by.len(), 1);
        assert_eq!(expense.paid_for.len(), 2);
    }

    #[test]
    fn recipients_dedup_first_seen_order() {
        let decoded = EventPayload::decode(EventType::ExpenseCreated, &expense_json()).unwrap();
        let EventPayload::ExpenseCreated(expense) = decoded else {
            panic!("wrong variant");
        };
        assert_eq!(expense.recipients(), vec!["u1", "u2"]);
    }

    #[test]
    fn recipients_keep_payer_before_payees() {
        let expense = ExpensePayload {
            description: "Taxi".into(),
            date_time: "2026-03-01T12:00:00Z".into(),
            split_type: "exact".into(),
            currency: "USD".into(),
            total: Decimal::new(30, 0),
            paid_by: vec![ExpenseShare {
                user_id: "payer".into(),
                amount: Decimal::new(30, 0),
            }],
            paid_for: vec![
                ExpenseShare {
                    user_id: "rider".into(),
                    amount: Decimal::new(15, 0),
                },
                ExpenseShare {
                    user_id: "payer".into(),
                    amount: Decimal::new(15, 0),
                },
            ],
        };
        assert_eq!(expense.recipients(), vec!["payer", "rider"]);
    }

    #[test]
    fn malformed_payload_is_typed_error() {
        let err = EventPayload::decode(EventType::ExpenseCreated, &json!({"nope": true}))
            .unwrap_err();
        assert_eq!(err.event_type, EventType::ExpenseCreated);
    }

    #[test]
    fn decodes_group_user_joined() {
        let payload = json!({
            "name": "Dana",
            "user_id": "u9",
            "date_time": "2026-03-02T08:30:00Z"
        });
        let decoded = EventPayload::decode(EventType::GroupUserJoined, &payload).unwrap();
        let EventPayload::GroupUserJoined(joined) = decoded else {
            panic!("wrong variant");
        };
        assert_eq!(joined.user_id, "u9");
        assert_eq!(joined.name, "Dana");
    }
}
