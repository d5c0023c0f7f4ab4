//! Session model, the validator's joined projection, and response DTOs.

use serde::Serialize;
use sqlx::FromRow;
use turnstile_core::account::AccountStatus;
use turnstile_core::types::{DbId, SessionId, Timestamp};

/// A row from the `sessions` table.
///
/// Holds token digests -- never serialize; use [`SessionSummary`].
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: SessionId,
    pub current_token_hash: String,
    /// Digest of the token superseded by the latest rotation. Equal to
    /// `current_token_hash` until the first rotation.
    pub prev_token_hash: Option<String>,
    pub account_id: DbId,
    pub user_agent: String,
    pub client_ip: String,
    pub created_at: Timestamp,
    pub rotated_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
}

/// DTO for inserting a session.
pub struct CreateSession {
    pub account_id: DbId,
    pub token_hash: String,
    pub user_agent: String,
    pub client_ip: String,
}

/// Session joined with its (active) account, as read in one round trip.
///
/// Not yet checked for revocation or expiry.
#[derive(Debug, Clone, FromRow)]
pub struct AuthContextRow {
    pub session_id: SessionId,
    pub account_id: DbId,
    pub account_email: String,
    pub account_is_admin: bool,
    #[sqlx(try_from = "String")]
    pub account_status: AccountStatus,
    pub session_created_at: Timestamp,
    pub session_rotated_at: Timestamp,
    pub session_revoked_at: Option<Timestamp>,
}

/// The authenticated identity for one request. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    pub session_id: SessionId,
    pub account_id: DbId,
    pub account_email: String,
    pub account_is_admin: bool,
    pub account_status: AccountStatus,
    pub session_created_at: Timestamp,
    pub session_rotated_at: Timestamp,
}

impl From<AuthContextRow> for AuthContext {
    fn from(row: AuthContextRow) -> Self {
        Self {
            session_id: row.session_id,
            account_id: row.account_id,
            account_email: row.account_email,
            account_is_admin: row.account_is_admin,
            account_status: row.account_status,
            session_created_at: row.session_created_at,
            session_rotated_at: row.session_rotated_at,
        }
    }
}

/// One entry in an account's session list.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub user_agent: String,
    pub client_ip: String,
    pub created_at: Timestamp,
    pub rotated_at: Timestamp,
    /// `true` for the session making the request.
    pub is_current: bool,
}

impl SessionSummary {
    pub fn new(session: Session, current_session_id: Option<SessionId>) -> Self {
        Self {
            is_current: current_session_id == Some(session.id),
            id: session.id,
            user_agent: session.user_agent,
            client_ip: session.client_ip,
            created_at: session.created_at,
            rotated_at: session.rotated_at,
        }
    }
}
