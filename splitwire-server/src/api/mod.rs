//! HTTP API modules and shared response models.

pub mod admin;
pub mod app;
pub mod extractors;

use serde::Serialize;
use splitwire_core::entities::EventType;
use splitwire_core::entities::event_records::EventRecord;

/// Event representation returned by the API.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_event_id: Option<String>,
    pub group_id: String,
    pub user_id: String,
    pub event_type: EventType,
    pub payload: serde_json::Value,
    pub created_at: i64,
}

/// Convert an `EventRecord` (DB model) into an `EventResponse` (API model).
pub(crate) fn event_to_response(record: &EventRecord) -> EventResponse {
    EventResponse {
        event_id: record.event_id.clone(),
        linked_event_id: record.linked_event_id.clone(),
        group_id: record.group_id.clone(),
        user_id: record.user_id.clone(),
        event_type: record.event_type,
        payload: record.payload.clone(),
        created_at: record.created_at.assume_utc().unix_timestamp(),
    }
}
