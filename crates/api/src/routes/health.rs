use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the session store answered. Without it no request can authenticate.
    pub session_store_healthy: bool,
    /// Round trip of the store probe, in milliseconds.
    pub session_store_latency_ms: u64,
}

/// GET /health -- service and session store health.
///
/// Responds 503 when the store is unreachable so load balancers stop routing here.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();
    let healthy = turnstile_db::health_check(&state.pool).await.is_ok();
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if !healthy {
        tracing::warn!(latency_ms, "Health check: session store unreachable");
    }

    let (code, status) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            session_store_healthy: healthy,
            session_store_latency_ms: latency_ms,
        }),
    )
}

/// Mount health check routes (root-level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
