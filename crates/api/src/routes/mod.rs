pub mod admin;
pub mod auth;
pub mod health;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/logout                                     logout (public, clears cookies)
/// /auth/rotate                                     rotate token (session cookie)
/// /auth/me                                         current identity (auth required)
///
/// /sessions                                        list own sessions (auth required)
/// /sessions/{id}                                   revoke own session (DELETE)
/// /sessions/revoke-others                          revoke all but current (POST)
///
/// /admin/accounts/{account_id}/sessions            list, revoke all (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/sessions", sessions::router())
        .nest("/admin", admin::router())
}
