use std::sync::Arc;

use crate::auth::session::{SessionConfig, SessionManager};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: turnstile_db::DbPool,
    /// Session engine shared by the auth extractor, handlers and cleanup job.
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(pool: turnstile_db::DbPool, session: SessionConfig) -> Self {
        let sessions = Arc::new(SessionManager::new(pool.clone(), session));
        Self { pool, sessions }
    }
}
