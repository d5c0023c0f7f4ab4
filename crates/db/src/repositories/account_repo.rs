//! Repository for the `accounts` table.

use sqlx::PgPool;
use turnstile_core::account::AccountStatus;
use turnstile_core::types::DbId;

use crate::models::account::{Account, CreateAccount};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, is_admin, status, created_at, updated_at";

/// Account lookups used by login and by the session validator's callers.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a new account, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateAccount) -> Result<Account, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts (email, password_hash, is_admin, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.is_admin)
            .bind(input.status.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find an account by internal ID, regardless of status.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by its login identifier (email, case-insensitive).
    ///
    /// Status is not filtered here; callers decide how to treat non-active accounts.
    pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, Account>(&query)
            .bind(login.trim())
            .fetch_optional(pool)
            .await
    }

    /// Change an account's status. Returns `true` if the row exists.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: AccountStatus,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE accounts SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status.as_str())
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
