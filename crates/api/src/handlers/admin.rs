//! Admin-only handlers for inspecting and revoking any account's sessions.

use axum::extract::{Path, State};
use axum::Json;
use turnstile_core::error::CoreError;
use turnstile_core::types::DbId;
use turnstile_db::models::session::SessionSummary;
use turnstile_db::repositories::AccountRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::sessions::RevokedCount;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_account_exists(state: &AppState, account_id: DbId) -> AppResult<()> {
    AccountRepo::find_by_id(&state.pool, account_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Account",
                id: account_id.to_string(),
            })
        })?;
    Ok(())
}

/// GET /api/v1/admin/accounts/{account_id}/sessions
pub async fn list_account_sessions(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(account_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<SessionSummary>>>> {
    ensure_account_exists(&state, account_id).await?;
    let sessions = state.sessions.list_sessions(account_id, None).await?;
    Ok(Json(DataResponse { data: sessions }))
}

/// DELETE /api/v1/admin/accounts/{account_id}/sessions
///
/// Signs the account out everywhere.
pub async fn revoke_account_sessions(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(account_id): Path<DbId>,
) -> AppResult<Json<DataResponse<RevokedCount>>> {
    ensure_account_exists(&state, account_id).await?;
    let revoked = state.sessions.revoke_all(account_id).await?;
    tracing::info!(
        admin_account_id = admin.account_id,
        account_id,
        revoked,
        "Admin revoked all sessions for account"
    );
    Ok(Json(DataResponse {
        data: RevokedCount { revoked },
    }))
}
