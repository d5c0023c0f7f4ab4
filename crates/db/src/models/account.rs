//! Account entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use turnstile_core::account::AccountStatus;
use turnstile_core::types::{DbId, Timestamp};

/// Full account row from the `accounts` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`AccountResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    #[sqlx(try_from = "String")]
    pub status: AccountStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe account representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub id: DbId,
    pub email: String,
    pub is_admin: bool,
    pub status: AccountStatus,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            is_admin: account.is_admin,
            status: account.status,
        }
    }
}

/// DTO for creating a new account.
#[derive(Debug)]
pub struct CreateAccount {
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub status: AccountStatus,
}
