//! Handlers for the `/auth` resource (login, logout, rotate, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use turnstile_core::error::CoreError;
use turnstile_core::types::{SessionId, Timestamp};
use turnstile_db::models::account::AccountResponse;
use turnstile_db::models::session::AuthContext;
use turnstile_db::repositories::AccountRepo;

use crate::auth::cookies::{clear_session_cookies, session_token, set_session_cookies};
use crate::auth::password::verify_credentials;
use crate::auth::session::{RotateRequest, SessionError};
use crate::error::{AppError, AppResult};
use crate::middleware::client_info::ClientInfo;
use crate::response::DataResponse;
use crate::state::AppState;

/// The only message a failed login ever returns.
const INVALID_CREDENTIALS: &str = "Invalid login or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address; matched case-insensitively.
    pub login: String,
    pub password: String,
}

/// Successful login response. The token itself travels only in the cookie.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub account: AccountResponse,
    pub session_id: SessionId,
    pub next_rotation: Timestamp,
}

/// Successful rotation response.
#[derive(Debug, Serialize)]
pub struct RotateResponse {
    pub session_id: SessionId,
    pub next_rotation: Timestamp,
}

/// Response for `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub auth: AuthContext,
    pub next_rotation: Timestamp,
    /// `true` once the client is due to call `POST /auth/rotate`.
    pub rotation_due: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Verifies credentials and starts a session. Unknown login, wrong password
/// and non-active account all produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    jar: CookieJar,
    Json(input): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<DataResponse<LoginResponse>>)> {
    let account = AccountRepo::find_by_login(&state.pool, &input.login).await?;

    let password_ok = verify_credentials(
        &input.password,
        account.as_ref().map(|a| a.password_hash.as_str()),
    );

    let account = match account {
        Some(account) if password_ok && account.status.can_authenticate() => account,
        Some(account) if password_ok => {
            tracing::info!(
                account_id = account.id,
                status = %account.status,
                "Login refused for non-active account"
            );
            return Err(invalid_credentials());
        }
        _ => return Err(invalid_credentials()),
    };

    let issued = state
        .sessions
        .create_session(account.id, &client.ip, &client.user_agent)
        .await?;
    let next_rotation = state.sessions.next_rotation(issued.session.rotated_at);

    tracing::info!(account_id = account.id, session_id = %issued.session.id, "Login succeeded");

    let jar = set_session_cookies(jar, state.sessions.config(), &issued.token, next_rotation);
    Ok((
        jar,
        Json(DataResponse {
            data: LoginResponse {
                account: AccountResponse::from(&account),
                session_id: issued.session.id,
                next_rotation,
            },
        }),
    ))
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()))
}

/// POST /api/v1/auth/logout
///
/// Revokes the presented session if it can, then clears both cookies no
/// matter what happened.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    if let Some(token) = session_token(&jar, state.sessions.config()) {
        match state.sessions.revoke_by_token(&token).await {
            Ok(()) => {}
            Err(e) if e.is_authentication_failure() => {
                tracing::debug!(reason = %e, "Logout with an already-dead session");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Logout could not revoke session; clearing cookies anyway");
            }
        }
    }

    (
        clear_session_cookies(jar, state.sessions.config()),
        StatusCode::NO_CONTENT,
    )
}

/// POST /api/v1/auth/rotate
///
/// Exchanges the presented token (current or previous) for a fresh one.
/// Any failure clears both cookies.
pub async fn rotate(
    State(state): State<AppState>,
    client: ClientInfo,
    jar: CookieJar,
) -> Result<(CookieJar, Json<DataResponse<RotateResponse>>), (CookieJar, AppError)> {
    let config = state.sessions.config();

    let Some(token) = session_token(&jar, config) else {
        return Err((
            clear_session_cookies(jar, config),
            SessionError::InvalidToken.into(),
        ));
    };

    let request = RotateRequest {
        token,
        client_ip: client.ip,
        user_agent: client.user_agent,
    };

    match state.sessions.rotate(&request).await {
        Ok(issued) => {
            let next_rotation = state.sessions.next_rotation(issued.session.rotated_at);
            let jar = set_session_cookies(jar, config, &issued.token, next_rotation);
            Ok((
                jar,
                Json(DataResponse {
                    data: RotateResponse {
                        session_id: issued.session.id,
                        next_rotation,
                    },
                }),
            ))
        }
        Err(e) => Err((clear_session_cookies(jar, config), e.into())),
    }
}

/// GET /api/v1/auth/me
///
/// The authenticated identity and its rotation schedule.
pub async fn me(State(state): State<AppState>, auth: AuthContext) -> Json<DataResponse<MeResponse>> {
    let next_rotation = state.sessions.next_rotation(auth.session_rotated_at);
    let rotation_due = state
        .sessions
        .policy()
        .needs_rotation(auth.session_rotated_at, Utc::now());

    Json(DataResponse {
        data: MeResponse {
            auth,
            next_rotation,
            rotation_due,
        },
    })
}
