use axum::{Json, extract::State, response::IntoResponse};
use kanau::processor::Processor;
use splitwire_core::entities::event_records::ListAllEventRecords;
use splitwire_core::framework::DatabaseProcessor;

use super::AdminApiError;
use crate::api::event_to_response;
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

/// `GET /events` — every event in the ledger, newest first.
pub(super) async fn list_events(
    state: State<AppState>,
    _auth: AdminAuth,
) -> Result<impl IntoResponse, AdminApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let records = processor
        .process(ListAllEventRecords)
        .await
        .map_err(AdminApiError::Database)?;

    let response: Vec<_> = records.iter().map(event_to_response).collect();
    Ok(Json(response))
}
