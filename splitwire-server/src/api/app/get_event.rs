use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use kanau::processor::Processor;
use splitwire_core::entities::event_records::GetEventRecordById;
use splitwire_core::framework::DatabaseProcessor;

use super::AppApiError;
use crate::api::event_to_response;
use crate::state::AppState;

/// `GET /events/{event_id}` — fetch one event.
pub(super) async fn get_event(
    state: State<AppState>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let record = processor
        .process(GetEventRecordById { event_id })
        .await
        .map_err(AppApiError::Database)?
        .ok_or(AppApiError::NotFound("event not found"))?;

    Ok(Json(event_to_response(&record)))
}
