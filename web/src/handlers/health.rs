//! Health check endpoints.
//!
//! Used by load balancers and monitoring systems to verify service health.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"`
    pub status: &'static str,
    /// Service version
    pub version: &'static str,
}

/// Simple health check endpoint (for basic liveness).
///
/// Does NOT check dependencies.
///
/// ```text
/// GET /health
/// {"status":"ok","version":"0.1.0"}
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Readiness response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// Overall readiness
    pub ready: bool,
    /// Event/transaction/user store reachable
    pub database: bool,
    /// Session store reachable
    pub sessions: bool,
}

/// Readiness check endpoint.
///
/// Pings the domain store and the session store.
///
/// # Status Codes
///
/// - 200 OK: both reachable
/// - 503 Service Unavailable: otherwise
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let database = state
        .catalog
        .ping()
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Database not ready"))
        .is_ok();
    let sessions = state
        .identity
        .ping()
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Session store not ready"))
        .is_ok();

    let ready = database && sessions;
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready,
            database,
            sessions,
        }),
    )
}
