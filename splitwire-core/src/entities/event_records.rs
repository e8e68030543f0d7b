//! The append-only event ledger.
//!
//! Events are keyed by a caller-supplied `event_id`. Insertion is idempotent:
//! the unique constraint plus `ON CONFLICT DO NOTHING` makes the first writer
//! win and degrades concurrent duplicates to a no-op. Replay is keyset-based:
//! a cursor event id is joined to find its `created_at`, and rows strictly
//! after it are returned in ascending order.

use crate::entities::EventType;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use thiserror::Error;

/// A stored ledger event.
///
/// `payload` is opaque at this layer; only consumers that know the
/// `event_type` decode it. `created_at` is assigned by the database.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct EventRecord {
    pub event_id: String,
    pub linked_event_id: Option<String>,
    pub group_id: String,
    pub user_id: String,
    pub event_type: EventType,
    pub payload: serde_json::Value,
    pub created_at: time::PrimitiveDateTime,
}

/// Errors surfaced by ledger operations.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// No event exists with the given id.
    #[error("event not found: {0}")]
    NotFound(String),

    /// Storage-layer failure, surfaced verbatim. Retry policy belongs to the caller.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of an idempotent append.
#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    /// A new row was inserted.
    Created(EventRecord),
    /// The event id was already present; the stored row is returned unchanged.
    AlreadyExists(EventRecord),
}

impl AppendOutcome {
    /// The stored record, whether or not this append created it.
    pub fn record(&self) -> &EventRecord {
        match self {
            AppendOutcome::Created(record) | AppendOutcome::AlreadyExists(record) => record,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, AppendOutcome::Created(_))
    }
}

#[derive(Debug, Clone)]
/// Append an event, treating a duplicate `event_id` as a successful no-op.
///
/// The insert uses `ON CONFLICT (event_id) DO NOTHING RETURNING ...`; when the
/// returning set is empty the row already existed and is re-read so the caller
/// always receives the stored record. Duplicate appends are never an error.
pub struct AppendEventRecord {
    pub event_id: String,
    pub linked_event_id: Option<String>,
    pub group_id: String,
    pub user_id: String,
    pub event_type: EventType,
    pub payload: serde_json::Value,
}

impl Processor<AppendEventRecord> for DatabaseProcessor {
    type Output = AppendOutcome;
    type Error = EventStoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:AppendEventRecord")]
    async fn process(&self, insert: AppendEventRecord) -> Result<AppendOutcome, EventStoreError> {
        let inserted = sqlx::query_as::<_, EventRecord>(
            "INSERT INTO events (event_id, linked_event_id, group_id, user_id, event_type, payload) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (event_id) DO NOTHING \
             RETURNING event_id, linked_event_id, group_id, user_id, event_type, payload, created_at",
        )
        .bind(&insert.event_id)
        .bind(&insert.linked_event_id)
        .bind(&insert.group_id)
        .bind(&insert.user_id)
        .bind(insert.event_type)
        .bind(&insert.payload)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(record) = inserted {
            return Ok(AppendOutcome::Created(record));
        }

        let existing = self
            .process(GetEventRecordById {
                event_id: insert.event_id.clone(),
            })
            .await?
            // The row can only vanish if an admin delete raced the conflict.
            .ok_or(EventStoreError::NotFound(insert.event_id))?;
        Ok(AppendOutcome::AlreadyExists(existing))
    }
}

#[derive(Debug, Clone)]
/// Point lookup by event id.
pub struct GetEventRecordById {
    pub event_id: String,
}

impl Processor<GetEventRecordById> for DatabaseProcessor {
    type Output = Option<EventRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetEventRecordById")]
    async fn process(&self, query: GetEventRecordById) -> Result<Option<EventRecord>, sqlx::Error> {
        sqlx::query_as::<_, EventRecord>(
            "SELECT event_id, linked_event_id, group_id, user_id, event_type, payload, created_at \
             FROM events WHERE event_id = $1",
        )
        .bind(&query.event_id)
        .fetch_optional(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Incremental replay for a group, ascending by `created_at`.
///
/// `after_event_id = None` means the beginning. A non-sentinel cursor is
/// joined by id to anchor on its `created_at`; rows strictly after it are
/// returned. An unknown cursor id therefore yields an empty result, not an
/// error — callers treat that as "no new events yet".
pub struct ListGroupEventsAfter {
    pub group_id: String,
    pub after_event_id: Option<String>,
    pub limit: i64,
}

impl Processor<ListGroupEventsAfter> for DatabaseProcessor {
    type Output = Vec<EventRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListGroupEventsAfter")]
    async fn process(&self, query: ListGroupEventsAfter) -> Result<Vec<EventRecord>, sqlx::Error> {
        match query.after_event_id {
            None => {
                sqlx::query_as::<_, EventRecord>(
                    "SELECT event_id, linked_event_id, group_id, user_id, event_type, payload, created_at \
                     FROM events \
                     WHERE group_id = $1 \
                     ORDER BY created_at ASC \
                     LIMIT $2",
                )
                .bind(&query.group_id)
                .bind(query.limit)
                .fetch_all(&self.pool)
                .await
            }
            Some(after_event_id) => {
                sqlx::query_as::<_, EventRecord>(
                    "SELECT e.event_id, e.linked_event_id, e.group_id, e.user_id, e.event_type, e.payload, e.created_at \
                     FROM events e \
                     JOIN events anchor ON anchor.event_id = $2 \
                     WHERE e.group_id = $1 \
                       AND e.created_at > anchor.created_at \
                     ORDER BY e.created_at ASC \
                     LIMIT $3",
                )
                .bind(&query.group_id)
                .bind(&after_event_id)
                .bind(query.limit)
                .fetch_all(&self.pool)
                .await
            }
        }
    }
}

#[derive(Debug, Clone)]
/// All events for a group, newest first. Administrative/debug use.
pub struct ListGroupEventsDesc {
    pub group_id: String,
}

impl Processor<ListGroupEventsDesc> for DatabaseProcessor {
    type Output = Vec<EventRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListGroupEventsDesc")]
    async fn process(&self, query: ListGroupEventsDesc) -> Result<Vec<EventRecord>, sqlx::Error> {
        sqlx::query_as::<_, EventRecord>(
            "SELECT event_id, linked_event_id, group_id, user_id, event_type, payload, created_at \
             FROM events \
             WHERE group_id = $1 \
             ORDER BY created_at DESC",
        )
        .bind(&query.group_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Every event in the ledger, newest first. Administrative/debug use.
pub struct ListAllEventRecords;

impl Processor<ListAllEventRecords> for DatabaseProcessor {
    type Output = Vec<EventRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListAllEventRecords")]
    async fn process(&self, _query: ListAllEventRecords) -> Result<Vec<EventRecord>, sqlx::Error> {
        sqlx::query_as::<_, EventRecord>(
            "SELECT event_id, linked_event_id, group_id, user_id, event_type, payload, created_at \
             FROM events \
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Debug, Clone)]
/// Corrective rewrite of an event's mutable fields. Not part of normal flow.
pub struct UpdateEventRecord {
    pub event_id: String,
    pub group_id: String,
    pub user_id: String,
    pub event_type: EventType,
    pub payload: serde_json::Value,
}

impl Processor<UpdateEventRecord> for DatabaseProcessor {
    type Output = ();
    type Error = EventStoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:UpdateEventRecord")]
    async fn process(&self, update: UpdateEventRecord) -> Result<(), EventStoreError> {
        let result = sqlx::query(
            "UPDATE events \
             SET group_id = $1, user_id = $2, event_type = $3, payload = $4 \
             WHERE event_id = $5",
        )
        .bind(&update.group_id)
        .bind(&update.user_id)
        .bind(update.event_type)
        .bind(&update.payload)
        .bind(&update.event_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EventStoreError::NotFound(update.event_id));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Administrative removal of an event.
pub struct DeleteEventRecord {
    pub event_id: String,
}

impl Processor<DeleteEventRecord> for DatabaseProcessor {
    type Output = ();
    type Error = EventStoreError;
    #[tracing::instrument(skip_all, err, name = "SQL:DeleteEventRecord")]
    async fn process(&self, delete: DeleteEventRecord) -> Result<(), EventStoreError> {
        let result = sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(&delete.event_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(EventStoreError::NotFound(delete.event_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn record() -> EventRecord {
        EventRecord {
            event_id: "evt-1".into(),
            linked_event_id: None,
            group_id: "g1".into(),
            user_id: "u1".into(),
            event_type: EventType::GroupCreated,
            payload: json!({"name": "Trip"}),
            created_at: datetime!(2026-03-01 12:00),
        }
    }

    #[test]
    fn append_outcome_exposes_the_stored_record_either_way() {
        let created = AppendOutcome::Created(record());
        let existing = AppendOutcome::AlreadyExists(record());

        assert!(created.is_created());
        assert!(!existing.is_created());
        assert_eq!(created.record(), existing.record());
    }
}
