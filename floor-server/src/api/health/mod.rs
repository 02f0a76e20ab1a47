//! Health check routes
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /health | GET | liveness |
//! | /health/detailed | GET | storage and lock actor status |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(detailed_health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
pub struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    storage: CheckResult,
    table_locks: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl CheckResult {
    fn ok(count: u64) -> Self {
        Self {
            status: "ok",
            count: Some(count),
            message: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            count: None,
            message: Some(message.into()),
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn detailed_health(State(state): State<ServerState>) -> Json<DetailedHealthResponse> {
    let storage = match state.orders.storage().order_count() {
        Ok(count) => CheckResult::ok(count),
        Err(e) => CheckResult::error(e.to_string()),
    };
    let table_locks = match state.locks.list_locked().await {
        Ok(locks) => CheckResult::ok(locks.len() as u64),
        Err(e) => CheckResult::error(e.to_string()),
    };

    let all_ok = storage.is_ok() && table_locks.is_ok();
    Json(DetailedHealthResponse {
        status: if all_ok { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        checks: HealthChecks {
            storage,
            table_locks,
        },
    })
}
