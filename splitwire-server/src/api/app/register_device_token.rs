use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use kanau::processor::Processor;
use serde::Deserialize;
use splitwire_core::entities::user_records::UpdateUserDeviceToken;
use splitwire_core::framework::DatabaseProcessor;

use super::AppApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterDeviceTokenRequest {
    /// The destination token to register; `null` unregisters the device.
    device_token: Option<String>,
}

/// `PUT /users/{user_id}/device-token` — register or clear a device token.
pub(super) async fn register_device_token(
    state: State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<RegisterDeviceTokenRequest>,
) -> Result<impl IntoResponse, AppApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let updated = processor
        .process(UpdateUserDeviceToken {
            user_id,
            device_token: body.device_token.filter(|t| !t.is_empty()),
        })
        .await
        .map_err(AppApiError::Database)?;

    if updated == 0 {
        return Err(AppApiError::NotFound("user not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
