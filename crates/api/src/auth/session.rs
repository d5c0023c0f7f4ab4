//! Opaque, rotating, server-side sessions.
//!
//! A client holds one random token. The server stores only its keyed digest,
//! alongside the digest of the token it replaced, so a request already in
//! flight with the old token keeps working across one rotation. Every lookup
//! is a single indexed read joined with the owning account; revocation is a
//! single update. There is no in-process cache: state lives in the database.

use std::future::Future;

use chrono::{Duration, Utc};
use turnstile_core::session::{
    SessionPolicy, SessionState, DEFAULT_MAX_INACTIVE_HOURS, DEFAULT_MAX_LIFETIME_HOURS,
    DEFAULT_REVOKED_RETENTION_DAYS, DEFAULT_ROTATION_INTERVAL_MINS,
};
use turnstile_core::token::{SessionToken, TokenError};
use turnstile_core::types::{DbId, SessionId, Timestamp};
use turnstile_db::models::session::{AuthContext, CreateSession, Session, SessionSummary};
use turnstile_db::repositories::SessionRepo;
use turnstile_db::DbPool;

/// Default name of the cookie carrying the raw session token.
pub const DEFAULT_COOKIE_NAME: &str = "session_token";

/// Default bound on a single session store call, in milliseconds.
pub const DEFAULT_STORE_TIMEOUT_MS: i64 = 5_000;

// Upper bounds for the duration settings. Past these, deadline arithmetic on
// timestamps overflows.
const MAX_LIFETIME_HOURS: i64 = 24 * 365 * 100;
const MAX_ROTATION_INTERVAL_MINS: i64 = 60 * 24 * 365;
const MAX_RETENTION_DAYS: i64 = 365 * 100;
const MAX_STORE_TIMEOUT_MS: i64 = 60_000;

/// Configuration for the session engine and its cookies.
#[derive(Clone)]
pub struct SessionConfig {
    /// Server secret appended to every token before hashing.
    pub secret: String,
    /// Lifetime and rotation parameters.
    pub policy: SessionPolicy,
    /// Name of the token cookie (default: `session_token`).
    pub cookie_name: String,
    /// Whether cookies carry the `Secure` attribute (default: `false`).
    pub cookie_secure: bool,
    /// Bound on each validate, rotate or revoke call against the store.
    /// Must stay below the HTTP request timeout.
    pub store_timeout: std::time::Duration,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("policy", &self.policy)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

impl SessionConfig {
    /// Load session configuration from environment variables.
    ///
    /// | Env Var                          | Required | Default         |
    /// |----------------------------------|----------|-----------------|
    /// | `SESSION_SECRET`                 | **yes**  | --              |
    /// | `SESSION_MAX_LIFETIME_HOURS`     | no       | `720`           |
    /// | `SESSION_MAX_INACTIVE_HOURS`     | no       | `168`           |
    /// | `SESSION_ROTATION_INTERVAL_MINS` | no       | `10`            |
    /// | `SESSION_REVOKED_RETENTION_DAYS` | no       | `30`            |
    /// | `SESSION_COOKIE_NAME`            | no       | `session_token` |
    /// | `SESSION_COOKIE_SECURE`          | no       | `false`         |
    /// | `SESSION_STORE_TIMEOUT_MS`       | no       | `5000`          |
    ///
    /// # Panics
    ///
    /// Panics if `SESSION_SECRET` is not set or is empty, or if a numeric
    /// variable does not parse, is not positive, or is out of range.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("SESSION_SECRET").expect("SESSION_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "SESSION_SECRET must not be empty");

        let max_lifetime_hours = env_duration(
            "SESSION_MAX_LIFETIME_HOURS",
            DEFAULT_MAX_LIFETIME_HOURS,
            MAX_LIFETIME_HOURS,
        );
        let max_inactive_hours = env_duration(
            "SESSION_MAX_INACTIVE_HOURS",
            DEFAULT_MAX_INACTIVE_HOURS,
            MAX_LIFETIME_HOURS,
        );
        let rotation_interval_mins = env_duration(
            "SESSION_ROTATION_INTERVAL_MINS",
            DEFAULT_ROTATION_INTERVAL_MINS,
            MAX_ROTATION_INTERVAL_MINS,
        );
        let revoked_retention_days = env_duration(
            "SESSION_REVOKED_RETENTION_DAYS",
            DEFAULT_REVOKED_RETENTION_DAYS,
            MAX_RETENTION_DAYS,
        );
        let store_timeout_ms = env_duration(
            "SESSION_STORE_TIMEOUT_MS",
            DEFAULT_STORE_TIMEOUT_MS,
            MAX_STORE_TIMEOUT_MS,
        );

        let cookie_name =
            std::env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| DEFAULT_COOKIE_NAME.into());

        let cookie_secure: bool = std::env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("SESSION_COOKIE_SECURE must be `true` or `false`");

        Self {
            secret,
            policy: SessionPolicy {
                max_lifetime: Duration::hours(max_lifetime_hours),
                max_inactive_lifetime: Duration::hours(max_inactive_hours),
                rotation_interval: Duration::minutes(rotation_interval_mins),
                revoked_retention: Duration::days(revoked_retention_days),
            },
            cookie_name,
            cookie_secure,
            store_timeout: std::time::Duration::from_millis(store_timeout_ms.unsigned_abs()),
        }
    }
}

fn env_duration(name: &str, default: i64, max: i64) -> i64 {
    parse_duration_setting(name, std::env::var(name).ok(), default, max)
        .unwrap_or_else(|e| panic!("{e}"))
}

/// Parse a duration setting that must lie in `1..=max`. Unset means `default`.
fn parse_duration_setting(
    name: &str,
    raw: Option<String>,
    default: i64,
    max: i64,
) -> Result<i64, String> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("{name} must be a valid integer: {e}"))?;
    if !(1..=max).contains(&value) {
        return Err(format!("{name} must be between 1 and {max}, got {value}"));
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a session operation did not produce an authenticated result.
///
/// The first four variants are authentication failures and must all look the
/// same to the client. `StoreUnavailable` is an infrastructure failure and is
/// never reported as "not authenticated".
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session matches the token, or its account is not active.
    #[error("session not found")]
    NotFound,

    #[error("session revoked")]
    Revoked,

    /// Absolute lifetime or inactivity window exceeded.
    #[error("session expired")]
    Expired,

    /// The presented value is not a well-formed token.
    #[error("invalid session token")]
    InvalidToken,

    #[error("session store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    #[error("token generation failed: {0}")]
    TokenGeneration(TokenError),
}

impl SessionError {
    /// `true` for every outcome that means "this request is not authenticated".
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Self::NotFound | Self::Revoked | Self::Expired | Self::InvalidToken
        )
    }
}

impl From<TokenError> for SessionError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed => Self::InvalidToken,
            TokenError::EntropyUnavailable(_) => Self::TokenGeneration(err),
        }
    }
}

// ---------------------------------------------------------------------------
// Requests and results
// ---------------------------------------------------------------------------

/// A session together with the raw token the client must now hold.
///
/// The raw token is never persisted; this is the only place it exists after
/// minting.
#[derive(Debug)]
pub struct IssuedSession {
    pub token: SessionToken,
    pub session: Session,
}

/// Input for [`SessionManager::rotate`].
#[derive(Debug)]
pub struct RotateRequest {
    /// The raw token presented by the client (current or previous).
    pub token: String,
    pub client_ip: String,
    pub user_agent: String,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Creates, validates, rotates and revokes sessions.
pub struct SessionManager {
    pool: DbPool,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(pool: DbPool, config: SessionConfig) -> Self {
        Self { pool, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.config.policy
    }

    /// When the client should next rotate a session last rotated at `rotated_at`.
    pub fn next_rotation(&self, rotated_at: Timestamp) -> Timestamp {
        self.config.policy.next_rotation(rotated_at)
    }

    fn digest(&self, token: &SessionToken) -> String {
        token.digest(&self.config.secret)
    }

    /// Run a store operation under `store_timeout`. An elapsed timer is a
    /// store failure, so callers still answer before the request times out.
    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, SessionError>>,
    ) -> Result<T, SessionError> {
        match tokio::time::timeout(self.config.store_timeout, op).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.config.store_timeout.as_millis() as u64,
                    "Session store call timed out"
                );
                Err(SessionError::StoreUnavailable(sqlx::Error::PoolTimedOut))
            }
        }
    }

    /// Start a new session for an account that has just proven its identity.
    pub async fn create_session(
        &self,
        account_id: DbId,
        client_ip: &str,
        user_agent: &str,
    ) -> Result<IssuedSession, SessionError> {
        let token = SessionToken::generate()?;
        let input = CreateSession {
            account_id,
            token_hash: self.digest(&token),
            user_agent: user_agent.to_string(),
            client_ip: client_ip.to_string(),
        };
        let session = SessionRepo::create(&self.pool, &input).await?;

        tracing::info!(session_id = %session.id, account_id, "Session created");
        Ok(IssuedSession { token, session })
    }

    /// Resolve a raw token to the identity it authenticates.
    ///
    /// Matches the current or the immediately previous token. Reads only;
    /// nothing is written on the hot path.
    pub async fn resolve_auth_context(&self, raw_token: &str) -> Result<AuthContext, SessionError> {
        self.bounded(self.lookup(raw_token)).await
    }

    async fn lookup(&self, raw_token: &str) -> Result<AuthContext, SessionError> {
        let token = SessionToken::parse(raw_token)?;
        let row = SessionRepo::find_auth_context(&self.pool, &self.digest(&token))
            .await?
            .ok_or(SessionError::NotFound)?;

        match self.config.policy.evaluate(
            row.session_revoked_at,
            row.session_created_at,
            row.session_rotated_at,
            Utc::now(),
        ) {
            SessionState::Live => Ok(row.into()),
            SessionState::Revoked => Err(SessionError::Revoked),
            SessionState::Expired => Err(SessionError::Expired),
        }
    }

    /// Replace the session's token with a fresh one.
    ///
    /// The presented token must validate exactly as it would for an ordinary
    /// request. The token being replaced stays accepted until the next
    /// rotation. Concurrent rotations of one session serialize on its row and
    /// the last writer wins.
    pub async fn rotate(&self, request: &RotateRequest) -> Result<IssuedSession, SessionError> {
        self.bounded(self.rotate_token(request)).await
    }

    async fn rotate_token(&self, request: &RotateRequest) -> Result<IssuedSession, SessionError> {
        let context = self.lookup(&request.token).await?;

        let token = SessionToken::generate()?;
        // A revoke landing between the read above and this update wins.
        let session = SessionRepo::rotate(&self.pool, context.session_id, &self.digest(&token))
            .await?
            .ok_or(SessionError::Revoked)?;

        tracing::info!(
            session_id = %session.id,
            account_id = session.account_id,
            client_ip = %request.client_ip,
            "Session token rotated",
        );
        Ok(IssuedSession { token, session })
    }

    /// Revoke one session owned by `account_id`.
    ///
    /// Fails with [`SessionError::NotFound`] if the session does not exist,
    /// belongs to another account, or is already revoked.
    pub async fn revoke(&self, account_id: DbId, session_id: SessionId) -> Result<(), SessionError> {
        if !SessionRepo::revoke(&self.pool, account_id, session_id).await? {
            return Err(SessionError::NotFound);
        }
        tracing::info!(%session_id, account_id, "Session revoked");
        Ok(())
    }

    /// Revoke whichever session the raw token (current or previous) belongs to.
    pub async fn revoke_by_token(&self, raw_token: &str) -> Result<(), SessionError> {
        let token = SessionToken::parse(raw_token)?;
        self.bounded(self.revoke_token(&token)).await
    }

    async fn revoke_token(&self, token: &SessionToken) -> Result<(), SessionError> {
        let session = SessionRepo::find_by_token_hash(&self.pool, &self.digest(token))
            .await?
            .ok_or(SessionError::NotFound)?;
        if session.revoked_at.is_some() {
            return Err(SessionError::Revoked);
        }
        self.revoke(session.account_id, session.id).await
    }

    /// Revoke every live session of the account except `keep`.
    pub async fn revoke_all_except(
        &self,
        account_id: DbId,
        keep: SessionId,
    ) -> Result<u64, SessionError> {
        let revoked = SessionRepo::revoke_all_except(&self.pool, account_id, keep).await?;
        tracing::info!(account_id, kept_session_id = %keep, revoked, "Other sessions revoked");
        Ok(revoked)
    }

    /// Revoke every live session of the account.
    pub async fn revoke_all(&self, account_id: DbId) -> Result<u64, SessionError> {
        let revoked = SessionRepo::revoke_all_for_account(&self.pool, account_id).await?;
        tracing::info!(account_id, revoked, "All sessions revoked");
        Ok(revoked)
    }

    /// Non-revoked sessions of the account, most recently rotated first.
    ///
    /// `current` marks the session making the request, if any.
    pub async fn list_sessions(
        &self,
        account_id: DbId,
        current: Option<SessionId>,
    ) -> Result<Vec<SessionSummary>, SessionError> {
        let sessions = SessionRepo::list_live_for_account(&self.pool, account_id).await?;
        Ok(sessions
            .into_iter()
            .map(|s| SessionSummary::new(s, current))
            .collect())
    }

    /// Delete rows that have been dead for longer than the retention window.
    pub async fn cleanup(&self) -> Result<u64, SessionError> {
        let cutoffs = self.config.policy.cleanup_cutoffs(Utc::now());
        Ok(SessionRepo::cleanup(&self.pool, &cutoffs).await?)
    }
}
