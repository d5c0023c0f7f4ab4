//! Handlers for the `/sessions` resource: the caller's own sessions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use turnstile_core::error::CoreError;
use turnstile_core::types::SessionId;
use turnstile_db::models::session::{AuthContext, SessionSummary};

use crate::auth::cookies::clear_session_cookies;
use crate::auth::session::SessionError;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of a bulk revocation.
#[derive(Debug, Serialize)]
pub struct RevokedCount {
    pub revoked: u64,
}

/// GET /api/v1/sessions
pub async fn list(
    State(state): State<AppState>,
    auth: AuthContext,
) -> AppResult<Json<DataResponse<Vec<SessionSummary>>>> {
    let sessions = state
        .sessions
        .list_sessions(auth.account_id, Some(auth.session_id))
        .await?;
    Ok(Json(DataResponse { data: sessions }))
}

/// DELETE /api/v1/sessions/{id}
///
/// Revokes one of the caller's sessions. Revoking the current session also
/// clears the caller's cookies.
pub async fn revoke(
    State(state): State<AppState>,
    auth: AuthContext,
    jar: CookieJar,
    Path(id): Path<SessionId>,
) -> AppResult<(CookieJar, StatusCode)> {
    state
        .sessions
        .revoke(auth.account_id, id)
        .await
        .map_err(|e| match e {
            SessionError::NotFound => AppError::Core(CoreError::NotFound {
                entity: "Session",
                id: id.to_string(),
            }),
            other => other.into(),
        })?;

    let jar = if id == auth.session_id {
        clear_session_cookies(jar, state.sessions.config())
    } else {
        jar
    };
    Ok((jar, StatusCode::NO_CONTENT))
}

/// POST /api/v1/sessions/revoke-others
///
/// Signs out every other device, keeping the calling session.
pub async fn revoke_others(
    State(state): State<AppState>,
    auth: AuthContext,
) -> AppResult<Json<DataResponse<RevokedCount>>> {
    let revoked = state
        .sessions
        .revoke_all_except(auth.account_id, auth.session_id)
        .await?;
    Ok(Json(DataResponse {
        data: RevokedCount { revoked },
    }))
}
