//! Custom Axum extractors for request authentication.
//!
//! Provides `AdminAuth`, which verifies the `Splitwire-Admin-Authorization`
//! header (plaintext admin secret) against the argon2 hash loaded at startup.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};

use crate::state::AppState;

/// Header carrying the plaintext admin secret.
pub const ADMIN_AUTH_HEADER: &str = "Splitwire-Admin-Authorization";

/// An Axum extractor that authenticates Admin API requests.
pub struct AdminAuth;

/// Errors returned by the [`AdminAuth`] extractor.
#[derive(Debug, thiserror::Error)]
pub enum AdminAuthError {
    #[error("missing Splitwire-Admin-Authorization header")]
    MissingHeader,

    #[error("invalid Splitwire-Admin-Authorization header")]
    InvalidHeader,

    #[error("admin secret verification failed")]
    VerificationFailed,
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AdminAuthError::MissingHeader => {
                (StatusCode::UNAUTHORIZED, "missing admin authorization header")
            }
            AdminAuthError::InvalidHeader => {
                (StatusCode::BAD_REQUEST, "invalid admin authorization header")
            }
            AdminAuthError::VerificationFailed => {
                (StatusCode::UNAUTHORIZED, "admin secret verification failed")
            }
        };
        (status, message).into_response()
    }
}

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AdminAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(ADMIN_AUTH_HEADER)
            .ok_or(AdminAuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AdminAuthError::InvalidHeader)?;

        if state.config.admin.verify(presented) {
            Ok(AdminAuth)
        } else {
            Err(AdminAuthError::VerificationFailed)
        }
    }
}
