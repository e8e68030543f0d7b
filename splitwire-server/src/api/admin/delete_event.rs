use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use kanau::processor::Processor;
use splitwire_core::entities::event_records::DeleteEventRecord;
use splitwire_core::framework::DatabaseProcessor;

use super::AdminApiError;
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

/// `DELETE /events/{event_id}` — remove an event from the ledger.
pub(super) async fn delete_event(
    state: State<AppState>,
    _auth: AdminAuth,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AdminApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    processor
        .process(DeleteEventRecord { event_id })
        .await
        .map_err(AdminApiError::Store)?;

    Ok(StatusCode::NO_CONTENT)
}
