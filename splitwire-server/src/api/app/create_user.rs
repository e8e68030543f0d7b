use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use kanau::processor::Processor;
use serde::Deserialize;
use splitwire_core::entities::user_records::InsertUserRecord;
use splitwire_core::framework::DatabaseProcessor;

use super::{AppApiError, user_to_response};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct CreateUserRequest {
    name: String,
    #[serde(default)]
    device_token: Option<String>,
}

/// `POST /users` — create a user, optionally with a device token.
pub(super) async fn create_user(
    state: State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppApiError> {
    if body.name.trim().is_empty() {
        return Err(AppApiError::Validation("name is required".to_string()));
    }

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let record = processor
        .process(InsertUserRecord {
            name: body.name,
            device_token: body.device_token.filter(|t| !t.is_empty()),
        })
        .await
        .map_err(AppApiError::Database)?;

    Ok((StatusCode::CREATED, Json(user_to_response(&record))))
}
