//! Health check handlers
//!
//! Endpoints for liveness and readiness probes.

use std::fmt::Display;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, Json};
use messenger_service::dto::{HealthResponse, ReadinessResponse};
use tracing::{debug, warn};

use crate::state::AppState;

/// Basic health check (liveness probe)
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Readiness check with dependency health
///
/// GET /health/ready
///
/// Backends that are not configured report "disabled" and do not fail the probe.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let ctx = state.service_context();

    let db_healthy = match ctx.pool() {
        Some(pool) => Some(probe("postgres", messenger_db::ping(pool).await)),
        None => None,
    };

    let redis_healthy = match ctx.redis_pool() {
        Some(redis) => Some(probe("redis", redis.health_check().await)),
        None => None,
    };

    let response = ReadinessResponse::ready(db_healthy, redis_healthy);
    let status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

fn probe<E: Display>(backend: &str, outcome: Result<Duration, E>) -> bool {
    match outcome {
        Ok(latency) => {
            debug!(backend, latency_ms = latency.as_millis(), "Readiness probe ok");
            true
        }
        Err(e) => {
            warn!(backend, error = %e, "Readiness probe failed");
            false
        }
    }
}
