pub mod event_records;
pub mod group_records;
pub mod user_records;

use serde::{Deserialize, Serialize};

/// Domain event type for database operations and API payloads.
///
/// Stored as the `event_type` Postgres enum. The ledger never interprets the
/// payload attached to an event; consumers select a payload schema by this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "event_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    GroupCreated,
    GroupAddCurrency,
    GroupUserJoined,
    UserNameChanged,
    ExpenseCreated,
    ExpenseUpdated,
    ExpenseDeleted,
}

impl EventType {
    /// Whether appending an event of this type should enqueue a push dispatch.
    pub fn is_notifiable(self) -> bool {
        matches!(
            self,
            EventType::ExpenseCreated | EventType::ExpenseUpdated | EventType::GroupUserJoined
        )
    }

    /// The stored/wire name of this event type.
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::GroupCreated => "GROUP_CREATED",
            EventType::GroupAddCurrency => "GROUP_ADD_CURRENCY",
            EventType::GroupUserJoined => "GROUP_USER_JOINED",
            EventType::UserNameChanged => "USER_NAME_CHANGED",
            EventType::ExpenseCreated => "EXPENSE_CREATED",
            EventType::ExpenseUpdated => "EXPENSE_UPDATED",
            EventType::ExpenseDeleted => "EXPENSE_DELETED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_wire_names() {
        let json = serde_json::to_string(&EventType::GroupAddCurrency).unwrap();
        assert_eq!(json, "\"GROUP_ADD_CURRENCY\"");

        let parsed: EventType = serde_json::from_str("\"EXPENSE_CREATED\"").unwrap();
        assert_eq!(parsed, EventType::ExpenseCreated);
        assert_eq!(EventType::GroupAddCurrency.as_str(), "GROUP_ADD_CURRENCY");
    }

    #[test]
    fn only_expense_and_join_events_notify() {
        assert!(EventType::ExpenseCreated.is_notifiable());
        assert!(EventType::ExpenseUpdated.is_notifiable());
        assert!(EventType::GroupUserJoined.is_notifiable());
        assert!(!EventType::GroupCreated.is_notifiable());
        assert!(!EventType::GroupAddCurrency.is_notifiable());
        assert!(!EventType::UserNameChanged.is_notifiable());
        assert!(!EventType::ExpenseDeleted.is_notifiable());
    }
}
