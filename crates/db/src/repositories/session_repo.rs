//! Repository for the `sessions` table.
//!
//! This is a plain persistence boundary: lookups match a digest against the
//! current OR previous token column and return whatever row they find.
//! Revocation and expiry are judged by the caller.

use sqlx::PgPool;
use turnstile_core::account::AccountStatus;
use turnstile_core::session::CleanupCutoffs;
use turnstile_core::types::{DbId, SessionId};

use crate::models::session::{AuthContextRow, CreateSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, current_token_hash, prev_token_hash, account_id, user_agent, \
                        client_ip, created_at, rotated_at, revoked_at";

/// Provides create, lookup, rotation, revocation and cleanup for sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    ///
    /// The previous-token column starts out equal to the current one so the
    /// first lookup succeeds under the current-or-previous rule.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (current_token_hash, prev_token_hash, account_id, user_agent, client_ip)
             VALUES ($1, $1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(&input.token_hash)
            .bind(input.account_id)
            .bind(&input.user_agent)
            .bind(&input.client_ip)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: SessionId) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the session whose current or previous token digest equals `hash`.
    pub async fn find_by_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE current_token_hash = $1 OR prev_token_hash = $1
             LIMIT 1"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Resolve a digest to its session and owning account in one query.
    ///
    /// The account-status filter sits in the join condition, so a session
    /// belonging to a non-active account reads exactly like a missing one.
    pub async fn find_auth_context(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<AuthContextRow>, sqlx::Error> {
        sqlx::query_as::<_, AuthContextRow>(
            "SELECT s.id         AS session_id,
                    s.account_id AS account_id,
                    a.email      AS account_email,
                    a.is_admin   AS account_is_admin,
                    a.status     AS account_status,
                    s.created_at AS session_created_at,
                    s.rotated_at AS session_rotated_at,
                    s.revoked_at AS session_revoked_at
             FROM sessions s
             INNER JOIN accounts a ON a.id = s.account_id AND a.status = $2
             WHERE s.current_token_hash = $1 OR s.prev_token_hash = $1
             LIMIT 1",
        )
        .bind(hash)
        .bind(AccountStatus::Active.as_str())
        .fetch_optional(pool)
        .await
    }

    /// Install `new_hash` as the current token, demoting the old current one.
    ///
    /// Single statement keyed by session id: concurrent rotations serialize on
    /// the row and the last writer wins. `rotated_at` never moves backwards.
    /// Returns `None` if the session does not exist or has been revoked.
    pub async fn rotate(
        pool: &PgPool,
        id: SessionId,
        new_hash: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "UPDATE sessions
             SET prev_token_hash = current_token_hash,
                 current_token_hash = $2,
                 rotated_at = GREATEST(NOW(), rotated_at)
             WHERE id = $1 AND revoked_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .bind(new_hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke one session, scoped to its owning account.
    ///
    /// Returns `true` if a live session was revoked. An already-revoked
    /// session keeps its original `revoked_at`.
    pub async fn revoke(
        pool: &PgPool,
        account_id: DbId,
        id: SessionId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = NOW()
             WHERE id = $1 AND account_id = $2 AND revoked_at IS NULL",
        )
        .bind(id)
        .bind(account_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke every live session of an account except `keep_id`.
    /// Returns the count of revoked sessions.
    pub async fn revoke_all_except(
        pool: &PgPool,
        account_id: DbId,
        keep_id: SessionId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = NOW()
             WHERE account_id = $1 AND id <> $2 AND revoked_at IS NULL",
        )
        .bind(account_id)
        .bind(keep_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Revoke every live session of an account. Returns the count of revoked sessions.
    pub async fn revoke_all_for_account(pool: &PgPool, account_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = NOW()
             WHERE account_id = $1 AND revoked_at IS NULL",
        )
        .bind(account_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Non-revoked sessions of an account, most recently rotated first.
    pub async fn list_live_for_account(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Vec<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE account_id = $1 AND revoked_at IS NULL
             ORDER BY rotated_at DESC"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }

    /// Delete sessions that have been dead for longer than the retention window.
    /// Returns the count of deleted rows.
    pub async fn cleanup(pool: &PgPool, cutoffs: &CleanupCutoffs) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM sessions
             WHERE (revoked_at IS NOT NULL AND revoked_at < $1)
                OR (revoked_at IS NULL AND (created_at < $2 OR rotated_at < $3))",
        )
        .bind(cutoffs.revoked_before)
        .bind(cutoffs.created_before)
        .bind(cutoffs.rotated_before)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
