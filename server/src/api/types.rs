//! Shared API types
//!
//! Error responses and the validators shared by list endpoints.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationError;

use crate::data::error::StorageError;
use crate::domain::CatalogError;

/// Validator function for the page parameter
pub fn validate_page(page: i64) -> Result<(), ValidationError> {
    if page < 1 {
        return Err(ValidationError::new("page_min").with_message("Page must be >= 1".into()));
    }
    Ok(())
}

/// Validator function for the page_size parameter
///
/// Only the lower bound is enforced; oversized pages are clamped by the handler.
pub fn validate_page_size(page_size: i64) -> Result<(), ValidationError> {
    if page_size < 1 {
        return Err(ValidationError::new("page_size_min")
            .with_message("Page size must be >= 1".into()));
    }
    Ok(())
}

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    MethodNotAllowed { message: String },
    ServiceUnavailable { message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    pub fn book_not_found(id: impl std::fmt::Display) -> Self {
        Self::not_found("BOOK_NOT_FOUND", format!("Book with ID {} not found", id))
    }

    pub fn from_storage(e: StorageError) -> Self {
        tracing::error!(error = %e, "Storage error");
        if e.is_transient() {
            Self::service_unavailable("Database temporarily unavailable")
        } else {
            Self::internal("Database operation failed")
        }
    }

    pub fn from_catalog(e: CatalogError) -> Self {
        match e {
            CatalogError::Validation(message) => Self::bad_request("INVALID_DATA", message),
            CatalogError::Storage(e) => Self::from_storage(e),
            other => {
                tracing::error!(error = %other, "Catalog error");
                Self::internal("Database operation failed")
            }
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        Self::from_catalog(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::MethodNotAllowed { message } => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                "METHOD_NOT_ALLOWED".to_string(),
                message,
            ),
            Self::ServiceUnavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                "SERVICE_UNAVAILABLE".to_string(),
                message,
            ),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

/// Acknowledgement body for write endpoints
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: &'static str,
}
