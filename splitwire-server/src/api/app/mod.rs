//! Application API handlers.
//!
//! These endpoints are called by the mobile/web clients.
//!
//! # Endpoints
//!
//! - `POST /events`                          – append an event (idempotent)
//! - `GET  /events/{event_id}`               – fetch one event
//! - `GET  /groups/{group_id}/events`        – incremental replay (keyset cursor)
//! - `POST /users`                           – create a user
//! - `GET  /users/{user_id}`                 – fetch a user
//! - `GET  /users/by-device-token/{token}`   – reverse device-token lookup
//! - `PUT  /users/{user_id}/device-token`    – register/clear a device token
//! - `GET  /users/{user_id}/groups`          – groups the user belongs to
//! - `POST /groups`                          – create a group
//! - `GET  /groups/{group_id}`               – fetch a group with member ids
//! - `POST /groups/{group_id}/members`       – add a member

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Serialize;
use splitwire_core::entities::event_records::EventStoreError;
use splitwire_core::entities::group_records::GroupRecord;
use splitwire_core::entities::user_records::UserRecord;

use crate::state::AppState;

mod create_event;
mod create_group;
mod create_user;
mod get_event;
mod get_group;
mod get_user;
mod join_group;
mod list_group_events;
mod list_user_groups;
mod register_device_token;

/// Build the App API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event::create_event))
        .route("/events/{event_id}", get(get_event::get_event))
        .route(
            "/groups/{group_id}/events",
            get(list_group_events::list_group_events),
        )
        .route("/users", post(create_user::create_user))
        .route("/users/{user_id}", get(get_user::get_user))
        .route(
            "/users/by-device-token/{device_token}",
            get(get_user::get_user_by_device_token),
        )
        .route(
            "/users/{user_id}/device-token",
            put(register_device_token::register_device_token),
        )
        .route(
            "/users/{user_id}/groups",
            get(list_user_groups::list_user_groups),
        )
        .route("/groups", post(create_group::create_group))
        .route("/groups/{group_id}", get(get_group::get_group))
        .route("/groups/{group_id}/members", post(join_group::join_group))
}

/// User representation returned by the API.
#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_token: Option<String>,
    pub created_at: i64,
}

/// Convert a `UserRecord` (DB model) into a `UserResponse` (API model).
pub(crate) fn user_to_response(record: &UserRecord) -> UserResponse {
    UserResponse {
        user_id: record.user_id.clone(),
        name: record.name.clone(),
        device_token: record.device_token.clone(),
        created_at: record.created_at.assume_utc().unix_timestamp(),
    }
}

/// Group representation returned by the API.
#[derive(Debug, Serialize)]
pub(crate) struct GroupResponse {
    pub group_id: String,
    pub name: String,
    pub created_at: i64,
}

/// Convert a `GroupRecord` (DB model) into a `GroupResponse` (API model).
pub(crate) fn group_to_response(record: &GroupRecord) -> GroupResponse {
    GroupResponse {
        group_id: record.group_id.clone(),
        name: record.name.clone(),
        created_at: record.created_at.assume_utc().unix_timestamp(),
    }
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in App API handlers.
#[derive(Debug)]
pub(crate) enum AppApiError {
    /// A database query failed.
    Database(sqlx::Error),
    /// A ledger operation failed.
    Store(EventStoreError),
    /// The requested entity was not found.
    NotFound(&'static str),
    /// The request body or parameters were invalid.
    Validation(String),
}

impl IntoResponse for AppApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppApiError::Database(e) => {
                tracing::error!(error = %e, "App API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AppApiError::Store(EventStoreError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "event not found").into_response()
            }
            AppApiError::Store(EventStoreError::Database(e)) => {
                tracing::error!(error = %e, "App API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AppApiError::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            AppApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, message).into_response()
            }
        }
    }
}
