//! Role-based access control extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use turnstile_core::error::CoreError;
use turnstile_db::models::session::AuthContext;

use super::auth::AuthRejection;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a session whose account is an administrator. Rejects with
/// 403 Forbidden otherwise, or with the usual 401 if there is no live session.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(auth): RequireAdmin) -> AppResult<Json<()>> {
///     // auth.account_is_admin is guaranteed here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthContext);

/// Rejection from [`RequireAdmin`].
#[derive(Debug)]
pub enum AdminRejection {
    Unauthenticated(AuthRejection),
    Forbidden(AppError),
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated(rejection) => rejection.into_response(),
            Self::Forbidden(err) => err.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state)
            .await
            .map_err(AdminRejection::Unauthenticated)?;
        if !auth.account_is_admin {
            return Err(AdminRejection::Forbidden(AppError::Core(
                CoreError::Forbidden("Admin role required".into()),
            )));
        }
        Ok(RequireAdmin(auth))
    }
}
