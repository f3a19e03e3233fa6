//! Health check endpoints
//!
//! Every probe runs a trivial query against storage and answers 503 when it
//! fails. Failure details are logged, not returned.

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::data::traits::SqlExecutor;
use crate::domain::BookService;

const SERVICE_NAME: &str = "Book API";

#[derive(Clone)]
pub struct HealthApiState {
    pub executor: Arc<dyn SqlExecutor>,
    pub books: Arc<BookService>,
}

/// Build health routes (mounted at the root)
pub fn routes(executor: Arc<dyn SqlExecutor>, books: Arc<BookService>) -> Router<()> {
    Router::new()
        .route("/", get(index))
        .route("/favicon.ico", get(favicon))
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .route("/health/live", get(live))
        .with_state(HealthApiState { executor, books })
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckResult {
    pub status: &'static str,
    pub response_time_ms: f64,
    pub message: &'static str,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct HealthChecks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<CheckResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_service: Option<CheckResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CheckResult>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[serde(flatten)]
    pub service: ServiceStatus,
    pub checks: HealthChecks,
    pub response_time_ms: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProbeResponse {
    pub status: &'static str,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

/// Milliseconds since `start`, rounded to two decimals
fn elapsed_ms(start: Instant) -> f64 {
    (start.elapsed().as_secs_f64() * 100_000.0).round() / 100.0
}

fn service_status(status: &'static str) -> ServiceStatus {
    ServiceStatus {
        status,
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: timestamp(),
    }
}

fn status_code(healthy: bool) -> StatusCode {
    if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = ServiceStatus),
        (status = 503, description = "Storage unreachable", body = ServiceStatus)
    )
)]
pub async fn index(State(state): State<HealthApiState>) -> impl IntoResponse {
    let healthy = probe(&state, "index").await;
    let status = if healthy { "healthy" } else { "unhealthy" };
    (status_code(healthy), Json(service_status(status)))
}

/// Empty favicon so browsers stop asking
pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Detailed health check with per-component timings
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "All checks passed", body = HealthResponse),
        (status = 503, description = "A check failed", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<HealthApiState>) -> impl IntoResponse {
    let start = Instant::now();
    let mut checks = HealthChecks::default();

    let db_start = Instant::now();
    if let Err(e) = state.executor.ping().await {
        tracing::error!(error = %e, "Health check failed: database");
        checks.error = Some(CheckResult {
            status: "unhealthy",
            response_time_ms: elapsed_ms(start),
            message: "Database connection failed",
        });
        return unhealthy(checks, start);
    }
    checks.database = Some(CheckResult {
        status: "healthy",
        response_time_ms: elapsed_ms(db_start),
        message: "Database connection successful",
    });

    let service_start = Instant::now();
    if let Err(e) = state.books.get_filter_options().await {
        tracing::error!(error = %e, "Health check failed: book service");
        checks.error = Some(CheckResult {
            status: "unhealthy",
            response_time_ms: elapsed_ms(start),
            message: "Book service unavailable",
        });
        return unhealthy(checks, start);
    }
    checks.book_service = Some(CheckResult {
        status: "healthy",
        response_time_ms: elapsed_ms(service_start),
        message: "Book service operational",
    });

    tracing::debug!("Health check completed successfully");
    (
        StatusCode::OK,
        Json(HealthResponse {
            service: service_status("healthy"),
            checks,
            response_time_ms: elapsed_ms(start),
        }),
    )
}

fn unhealthy(checks: HealthChecks, start: Instant) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(HealthResponse {
            service: service_status("unhealthy"),
            checks,
            response_time_ms: elapsed_ms(start),
        }),
    )
}

/// Readiness probe
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Ready to serve", body = ProbeResponse),
        (status = 503, description = "Storage unreachable", body = ProbeResponse)
    )
)]
pub async fn ready(State(state): State<HealthApiState>) -> impl IntoResponse {
    probe_response(probe(&state, "readiness").await, "ready", "not_ready")
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses(
        (status = 200, description = "Alive", body = ProbeResponse),
        (status = 503, description = "Storage unreachable", body = ProbeResponse)
    )
)]
pub async fn live(State(state): State<HealthApiState>) -> impl IntoResponse {
    probe_response(probe(&state, "liveness").await, "alive", "unavailable")
}

async fn probe(state: &HealthApiState, check: &'static str) -> bool {
    match state.executor.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(check, error = %e, "Storage probe failed");
            false
        }
    }
}

fn probe_response(
    healthy: bool,
    ok_status: &'static str,
    failed_status: &'static str,
) -> (StatusCode, Json<ProbeResponse>) {
    let body = if healthy {
        ProbeResponse {
            status: ok_status,
            timestamp: timestamp(),
            error: None,
        }
    } else {
        ProbeResponse {
            status: failed_status,
            timestamp: timestamp(),
            error: Some("Database unavailable"),
        }
    };
    (status_code(healthy), Json(body))
}
