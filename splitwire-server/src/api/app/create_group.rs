use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use kanau::processor::Processor;
use serde::Deserialize;
use splitwire_core::entities::group_records::InsertGroupRecord;
use splitwire_core::framework::DatabaseProcessor;

use super::{AppApiError, group_to_response};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct CreateGroupRequest {
    name: String,
}

/// `POST /groups` — create a group.
pub(super) async fn create_group(
    state: State<AppState>,
    Json(body): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse, AppApiError> {
    if body.name.trim().is_empty() {
        return Err(AppApiError::Validation("name is required".to_string()));
    }

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let record = processor
        .process(InsertGroupRecord { name: body.name })
        .await
        .map_err(AppApiError::Database)?;

    Ok((StatusCode::CREATED, Json(group_to_response(&record))))
}
