use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use kanau::processor::Processor;
use serde::Deserialize;
use splitwire_core::entities::group_records::{AddGroupMember, GetGroupRecordById};
use splitwire_core::entities::user_records::GetUserRecordById;
use splitwire_core::framework::DatabaseProcessor;

use super::AppApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct JoinGroupRequest {
    user_id: String,
}

/// `POST /groups/{group_id}/members` — add a user to a group.
///
/// Adding an existing member is a no-op.
pub(super) async fn join_group(
    state: State<AppState>,
    Path(group_id): Path<String>,
    Json(body): Json<JoinGroupRequest>,
) -> Result<impl IntoResponse, AppApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    processor
        .process(GetGroupRecordById {
            group_id: group_id.clone(),
        })
        .await
        .map_err(AppApiError::Database)?
        .ok_or(AppApiError::NotFound("group not found"))?;

    processor
        .process(GetUserRecordById {
            user_id: body.user_id.clone(),
        })
        .await
        .map_err(AppApiError::Database)?
        .ok_or_else(|| AppApiError::Validation(format!("user not found: {}", body.user_id)))?;

    processor
        .process(AddGroupMember {
            group_id,
            user_id: body.user_id,
        })
        .await
        .map_err(AppApiError::Database)?;

    Ok(StatusCode::NO_CONTENT)
}
