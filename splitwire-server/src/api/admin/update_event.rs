use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use kanau::processor::Processor;
use serde::Deserialize;
use splitwire_core::entities::EventType;
use splitwire_core::entities::event_records::{
    EventStoreError, GetEventRecordById, UpdateEventRecord,
};
use splitwire_core::framework::DatabaseProcessor;

use super::AdminApiError;
use crate::api::event_to_response;
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateEventRequest {
    group_id: String,
    user_id: String,
    event_type: EventType,
    payload: serde_json::Value,
}

/// `PUT /events/{event_id}` — corrective rewrite of an event's mutable fields.
///
/// `event_id` and `created_at` never change; replay positions stay intact.
pub(super) async fn update_event(
    state: State<AppState>,
    _auth: AdminAuth,
    Path(event_id): Path<String>,
    Json(body): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    processor
        .process(UpdateEventRecord {
            event_id: event_id.clone(),
            group_id: body.group_id,
            user_id: body.user_id,
            event_type: body.event_type,
            payload: body.payload,
        })
        .await
        .map_err(AdminApiError::Store)?;

    let record = processor
        .process(GetEventRecordById {
            event_id: event_id.clone(),
        })
        .await
        .map_err(AdminApiError::Database)?
        .ok_or(AdminApiError::Store(EventStoreError::NotFound(event_id)))?;

    Ok(Json(event_to_response(&record)))
}
