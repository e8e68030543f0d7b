use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use kanau::processor::Processor;
use serde::Serialize;
use splitwire_core::entities::group_records::{GetGroupRecordById, ListGroupMemberIds};
use splitwire_core::framework::DatabaseProcessor;

use super::AppApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub(crate) struct GroupDetailResponse {
    pub group_id: String,
    pub name: String,
    pub created_at: i64,
    pub member_ids: Vec<String>,
}

/// `GET /groups/{group_id}` — fetch a group and its member ids.
pub(super) async fn get_group(
    state: State<AppState>,
    Path(group_id): Path<String>,
) -> Result<impl IntoResponse, AppApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let record = processor
        .process(GetGroupRecordById {
            group_id: group_id.clone(),
        })
        .await
        .map_err(AppApiError::Database)?
        .ok_or(AppApiError::NotFound("group not found"))?;

    let member_ids = processor
        .process(ListGroupMemberIds { group_id })
        .await
        .map_err(AppApiError::Database)?;

    Ok(Json(GroupDetailResponse {
        group_id: record.group_id,
        name: record.name,
        created_at: record.created_at.assume_utc().unix_timestamp(),
        member_ids,
    }))
}
