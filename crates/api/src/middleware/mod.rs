//! Request extractors.
//!
//! - [`auth`] -- Resolves the session cookie to an [`AuthContext`](turnstile_db::models::session::AuthContext).
//! - [`rbac::RequireAdmin`] -- Requires an administrator account.
//! - [`client_info::ClientInfo`] -- Client address and user agent recorded on new sessions.

pub mod auth;
pub mod client_info;
pub mod rbac;
