//! Liveness and readiness routes
//!
//! `/health/ready` answers 503 while the weight store cannot be reached.

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

impl HealthResponse {
    fn bare(status: &'static str) -> Json<Self> {
        Json(Self {
            status,
            version: VERSION,
            checks: None,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: StorageCheck,
}

/// Reachability of the backing store for users, weights and goals
#[derive(Debug, Serialize)]
pub struct StorageCheck {
    pub status: &'static str,
    /// `postgres` or `memory`
    pub backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StorageCheck {
    fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

async fn check_storage(state: &AppState) -> StorageCheck {
    let Some(pool) = &state.db else {
        return StorageCheck {
            status: "healthy",
            backend: "memory",
            latency_ms: None,
            error: None,
        };
    };

    let started = Instant::now();
    let outcome = db::health_check(pool).await;
    let latency_ms = Some(started.elapsed().as_millis());
    debug!(?latency_ms, ok = outcome.is_ok(), "Storage check");

    match outcome {
        Ok(()) => StorageCheck {
            status: "healthy",
            backend: "postgres",
            latency_ms,
            error: None,
        },
        Err(e) => StorageCheck {
            status: "unhealthy",
            backend: "postgres",
            latency_ms,
            error: Some(e.to_string()),
        },
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    HealthResponse::bare("healthy")
}

pub async fn liveness_check() -> Json<HealthResponse> {
    HealthResponse::bare("alive")
}

pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = check_storage(&state).await;
    let (code, status) = if database.is_healthy() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    let body = HealthResponse {
        status,
        version: VERSION,
        checks: Some(HealthChecks { database }),
    };
    (code, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn test_bare_routes_carry_version() {
        let healthy = health_check().await;
        assert_eq!(healthy.status, "healthy");
        assert_eq!(healthy.version, VERSION);
        assert!(healthy.checks.is_none());

        assert_eq!(liveness_check().await.status, "alive");
    }

    #[tokio::test]
    async fn test_in_memory_store_is_ready() {
        let state = AppState::in_memory(AppConfig::default());

        let (code, Json(body)) = readiness_check(State(state)).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body.status, "ready");

        let database = body.checks.map(|c| c.database).unwrap();
        assert_eq!(database.backend, "memory");
        assert!(database.latency_ms.is_none());
        assert!(database.is_healthy());
    }

    #[test]
    fn test_failed_check_is_unhealthy() {
        let check = StorageCheck {
            status: "unhealthy",
            backend: "postgres",
            latency_ms: Some(3),
            error: Some("connection refused".to_string()),
        };
        assert!(!check.is_healthy());

        let json = serde_json::to_value(&check).unwrap();
        assert_eq!(json["error"], "connection refused");
        assert_eq!(json["latency_ms"], 3);
    }
}
