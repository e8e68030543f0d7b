use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use kanau::processor::Processor;
use splitwire_core::entities::group_records::ListGroupsByUser;
use splitwire_core::entities::user_records::GetUserRecordById;
use splitwire_core::framework::DatabaseProcessor;

use super::{AppApiError, group_to_response};
use crate::state::AppState;

/// `GET /users/{user_id}/groups` — all groups the user belongs to.
pub(super) async fn list_user_groups(
    state: State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    processor
        .process(GetUserRecordById {
            user_id: user_id.clone(),
        })
        .await
        .map_err(AppApiError::Database)?
        .ok_or(AppApiError::NotFound("user not found"))?;

    let records = processor
        .process(ListGroupsByUser { user_id })
        .await
        .map_err(AppApiError::Database)?;

    let response: Vec<_> = records.iter().map(group_to_response).collect();
    Ok(Json(response))
}
