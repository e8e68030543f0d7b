use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use kanau::processor::Processor;
use splitwire_core::entities::event_records::ListGroupEventsDesc;
use splitwire_core::framework::DatabaseProcessor;

use super::AdminApiError;
use crate::api::event_to_response;
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

/// `GET /groups/{group_id}/events` — a group's events, newest first.
pub(super) async fn list_group_events(
    state: State<AppState>,
    _auth: AdminAuth,
    Path(group_id): Path<String>,
) -> Result<impl IntoResponse, AdminApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let records = processor
        .process(ListGroupEventsDesc { group_id })
        .await
        .map_err(AdminApiError::Database)?;

    let response: Vec<_> = records.iter().map(event_to_response).collect();
    Ok(Json(response))
}
