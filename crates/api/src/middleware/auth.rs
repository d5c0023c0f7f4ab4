//! Session-cookie authentication extractor for Axum handlers.
//!
//! Any handler that takes an [`AuthContext`] argument requires a live session:
//!
//! ```ignore
//! async fn my_handler(auth: AuthContext) -> AppResult<Json<()>> {
//!     tracing::info!(account_id = auth.account_id, "handling request");
//!     Ok(Json(()))
//! }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use turnstile_db::models::session::AuthContext;

use crate::auth::cookies::{clear_session_cookies, session_token};
use crate::auth::session::SessionError;
use crate::error::AppError;
use crate::state::AppState;

/// Rejection from the [`AuthContext`] extractor.
///
/// Authentication failures also carry removal cookies so the client drops
/// its dead token. Store failures leave the cookies alone.
#[derive(Debug)]
pub struct AuthRejection {
    jar: Option<CookieJar>,
    error: AppError,
}

impl AuthRejection {
    fn new(state: &AppState, error: SessionError) -> Self {
        let jar = error
            .is_authentication_failure()
            .then(|| clear_session_cookies(CookieJar::new(), state.sessions.config()));
        Self {
            jar,
            error: error.into(),
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self.jar {
            Some(jar) => (jar, self.error).into_response(),
            None => self.error.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = session_token(&jar, state.sessions.config())
            .ok_or_else(|| AuthRejection::new(state, SessionError::InvalidToken))?;

        state
            .sessions
            .resolve_auth_context(&token)
            .await
            .map_err(|e| AuthRejection::new(state, e))
    }
}
