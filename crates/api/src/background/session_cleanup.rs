//! Periodic deletion of dead session rows.
//!
//! Revoked and expired sessions are kept for the configured retention window
//! so they can still be inspected, then deleted by this job.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::auth::session::SessionManager;

/// Run the session cleanup loop until `cancel` is triggered.
///
/// The first sweep happens immediately on start.
pub async fn run(sessions: Arc<SessionManager>, every: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = every.as_secs(),
        retention_days = sessions.policy().revoked_retention.num_days(),
        "Session cleanup job started"
    );

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                match sessions.cleanup().await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            tracing::info!(deleted, "Session cleanup: purged dead sessions");
                        } else {
                            tracing::debug!("Session cleanup: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Session cleanup failed");
                    }
                }
            }
        }
    }
}
