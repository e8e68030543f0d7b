use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use kanau::processor::Processor;
use splitwire_core::entities::user_records::{GetUserRecordByDeviceToken, GetUserRecordById};
use splitwire_core::framework::DatabaseProcessor;

use super::{AppApiError, user_to_response};
use crate::state::AppState;

/// `GET /users/{user_id}` — fetch one user.
pub(super) async fn get_user(
    state: State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let record = processor
        .process(GetUserRecordById { user_id })
        .await
        .map_err(AppApiError::Database)?
        .ok_or(AppApiError::NotFound("user not found"))?;

    Ok(Json(user_to_response(&record)))
}

/// `GET /users/by-device-token/{device_token}` — reverse device association.
pub(super) async fn get_user_by_device_token(
    state: State<AppState>,
    Path(device_token): Path<String>,
) -> Result<impl IntoResponse, AppApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let record = processor
        .process(GetUserRecordByDeviceToken { device_token })
        .await
        .map_err(AppApiError::Database)?
        .ok_or(AppApiError::NotFound("user not found"))?;

    Ok(Json(user_to_response(&record)))
}
