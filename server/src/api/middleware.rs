//! HTTP middleware (CORS, request logging, 404/405 handlers)

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request};
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::Instrument;

use super::types::ApiError;
use crate::core::constants::{REQUEST_ID_HEADER, REQUEST_ID_LEN, SLOW_REQUEST_THRESHOLD_MS};

/// Allowed origins configuration
#[derive(Debug, Clone)]
pub struct AllowedOrigins {
    origins: Vec<String>,
}

impl AllowedOrigins {
    /// Create allowed origins from the configured list
    ///
    /// Entries are trimmed and a trailing slash is dropped; blanks are skipped.
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let origins = origins
            .into_iter()
            .map(|o| o.as_ref().trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();
        Self { origins }
    }

    /// Check if an origin is allowed
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == origin)
    }

    /// Get origins as HeaderValues for CORS
    fn as_header_values(&self) -> Vec<HeaderValue> {
        self.origins.iter().filter_map(|o| o.parse().ok()).collect()
    }
}

/// Create CORS layer
pub fn cors(allowed: &AllowedOrigins) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed.as_header_values()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

/// Short random id used to correlate a request's log lines
pub fn new_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..REQUEST_ID_LEN].to_string()
}

/// Log each request on entry and exit and tag the response with its id
///
/// The exit line is logged at error for 5xx, warn for 4xx or slow requests,
/// info otherwise.
pub async fn request_logging(req: Request, next: Next) -> Response {
    let request_id = new_request_id();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("Unknown")
        .to_string();

    let span = tracing::info_span!("request", id = %request_id);
    tracing::info!(
        parent: &span,
        %method,
        path = %path,
        remote = %remote,
        user_agent = %user_agent,
        "Request started"
    );

    let start = Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;
    let elapsed = start.elapsed();
    let duration_ms = elapsed.as_secs_f64() * 1000.0;
    let status = response.status().as_u16();

    let _guard = span.enter();
    if status >= 500 {
        tracing::error!(%method, path = %path, status, duration_ms, "Request finished");
    } else if status >= 400 || elapsed.as_millis() > SLOW_REQUEST_THRESHOLD_MS {
        tracing::warn!(%method, path = %path, status, duration_ms, "Request finished");
    } else {
        tracing::info!(%method, path = %path, status, duration_ms, "Request finished");
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

/// Handle 404 Not Found with the standard error body
pub async fn handle_404(req: Request) -> impl IntoResponse {
    tracing::debug!(method = %req.method(), uri = %req.uri(), "No route");
    ApiError::not_found(
        "NOT_FOUND",
        "The requested URL was not found on the server",
    )
}

/// Handle 405 Method Not Allowed with the standard error body
pub async fn handle_405(req: Request) -> impl IntoResponse {
    tracing::debug!(method = %req.method(), uri = %req.uri(), "Method not allowed");
    ApiError::method_not_allowed(format!(
        "The method {} is not allowed for the requested URL",
        req.method()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_origins_normalized() {
        let origins = AllowedOrigins::new([" http://localhost:3000/ ", "", "http://frontend:3000"]);
        assert!(origins.is_allowed("http://localhost:3000"));
        assert!(origins.is_allowed("http://frontend:3000"));
        assert!(!origins.is_allowed("http://evil.example"));
        assert_eq!(origins.as_header_values().len(), 2);
    }

    #[test]
    fn test_request_id_length() {
        let id = new_request_id();
        assert_eq!(id.len(), REQUEST_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(new_request_id(), id);
    }
}
