use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use kanau::processor::Processor;
use serde::Deserialize;
use splitwire_core::entities::EventType;
use splitwire_core::entities::event_records::AppendEventRecord;
use splitwire_core::entities::group_records::GetGroupRecordById;
use splitwire_core::entities::user_records::GetUserRecordById;
use splitwire_core::events::NotifyEvent;
use splitwire_core::framework::DatabaseProcessor;

use super::AppApiError;
use crate::api::event_to_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct CreateEventRequest {
    event_id: String,
    #[serde(default)]
    linked_event_id: Option<String>,
    group_id: String,
    user_id: String,
    event_type: EventType,
    payload: serde_json::Value,
}

/// `POST /events` — append an event to the ledger.
///
/// Appending an `event_id` that already exists returns the stored record
/// unchanged; it is never an error. Only a first-time append of a notifiable
/// type enqueues a push dispatch — the response does not wait for delivery.
pub(super) async fn create_event(
    state: State<AppState>,
    Json(body): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppApiError> {
    if body.event_id.trim().is_empty() {
        return Err(AppApiError::Validation("event_id is required".to_string()));
    }
    if body.group_id.trim().is_empty() {
        return Err(AppApiError::Validation("group_id is required".to_string()));
    }
    if body.user_id.trim().is_empty() {
        return Err(AppApiError::Validation("user_id is required".to_string()));
    }
    if body.payload.is_null() {
        return Err(AppApiError::Validation("payload is required".to_string()));
    }

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    processor
        .process(GetUserRecordById {
            user_id: body.user_id.clone(),
        })
        .await
        .map_err(AppApiError::Database)?
        .ok_or_else(|| AppApiError::Validation(format!("user not found: {}", body.user_id)))?;

    processor
        .process(GetGroupRecordById {
            group_id: body.group_id.clone(),
        })
        .await
        .map_err(AppApiError::Database)?
        .ok_or_else(|| AppApiError::Validation(format!("group not found: {}", body.group_id)))?;

    let outcome = processor
        .process(AppendEventRecord {
            event_id: body.event_id,
            linked_event_id: body.linked_event_id.filter(|id| !id.is_empty()),
            group_id: body.group_id,
            user_id: body.user_id,
            event_type: body.event_type,
            payload: body.payload,
        })
        .await
        .map_err(AppApiError::Store)?;

    // The row is durably committed before this send; a full queue
    // back-pressures here rather than dropping the dispatch.
    if outcome.is_created() && outcome.record().event_type.is_notifiable() {
        let notify = NotifyEvent {
            event_id: outcome.record().event_id.clone(),
        };
        if let Err(e) = state.notify_tx.send(notify).await {
            tracing::error!(error = %e, "Failed to enqueue NotifyEvent");
        }
    }

    Ok((StatusCode::OK, Json(event_to_response(outcome.record()))))
}
