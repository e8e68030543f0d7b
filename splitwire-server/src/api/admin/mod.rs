//! Admin API handlers.
//!
//! These endpoints back corrective tooling and require the
//! `Splitwire-Admin-Authorization` header with the plaintext admin secret.
//!
//! # Endpoints
//!
//! - `GET    /events`                    – list all events (newest first)
//! - `GET    /groups/{group_id}/events`  – list a group's events (newest first)
//! - `PUT    /events/{event_id}`         – corrective rewrite of an event
//! - `DELETE /events/{event_id}`         – remove an event

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use splitwire_core::entities::event_records::EventStoreError;

use crate::state::AppState;

mod delete_event;
mod list_events;
mod list_group_events;
mod update_event;

/// Build the Admin API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events::list_events))
        .route(
            "/events/{event_id}",
            put(update_event::update_event).delete(delete_event::delete_event),
        )
        .route(
            "/groups/{group_id}/events",
            get(list_group_events::list_group_events),
        )
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

/// Errors that can occur in Admin API handlers.
#[derive(Debug)]
pub(crate) enum AdminApiError {
    Database(sqlx::Error),
    Store(EventStoreError),
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AdminApiError::Database(e) => {
                tracing::error!(error = %e, "Admin API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AdminApiError::Store(EventStoreError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "event not found").into_response()
            }
            AdminApiError::Store(EventStoreError::Database(e)) => {
                tracing::error!(error = %e, "Admin API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}
