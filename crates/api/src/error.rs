use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use turnstile_core::error::CoreError;

use crate::auth::session::SessionError;

/// Message returned for every rejected session, whatever the cause.
pub const AUTHENTICATION_REQUIRED: &str = "Authentication required";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`SessionError`] for session
/// engine outcomes. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `turnstile_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A session could not be created, validated, rotated or revoked.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            },

            // --- Session engine ---
            AppError::Session(err) => classify_session_error(err),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Map a session outcome to an HTTP status, error code, and message.
///
/// The four rejection reasons collapse into one indistinguishable 401; the
/// reason is only logged. Store and entropy failures are 500s, never 401s.
fn classify_session_error(err: &SessionError) -> (StatusCode, &'static str, String) {
    match err {
        SessionError::NotFound
        | SessionError::Revoked
        | SessionError::Expired
        | SessionError::InvalidToken => {
            tracing::debug!(reason = %err, "Session rejected");
            (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                AUTHENTICATION_REQUIRED.to_string(),
            )
        }
        SessionError::StoreUnavailable(db_err) => {
            tracing::error!(error = %db_err, "Session store unavailable");
            internal()
        }
        SessionError::TokenGeneration(token_err) => {
            tracing::error!(error = %token_err, "Session token generation failed");
            internal()
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
