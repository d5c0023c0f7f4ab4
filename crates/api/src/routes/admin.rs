//! Route definitions for the `/admin` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. All require an administrator session.
///
/// ```text
/// GET    /accounts/{account_id}/sessions   -> list_account_sessions
/// DELETE /accounts/{account_id}/sessions   -> revoke_account_sessions
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/accounts/{account_id}/sessions",
        get(admin::list_account_sessions).delete(admin::revoke_account_sessions),
    )
}
