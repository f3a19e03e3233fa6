//! Path, query and body extractors for API routes
//!
//! Every rejection becomes the standard `{error, code, message}` JSON body.

use std::ops::Deref;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use validator::Validate;

use super::types::ApiError;

/// Book id path extractor.
///
/// A segment that is not an integer names no book, so it is answered with
/// 404 like an unknown id.
#[derive(Debug)]
pub struct BookPath(pub i64);

impl<S> FromRequestParts<S> for BookPath
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Path)?;

        raw.parse::<i64>()
            .map(Self)
            .map_err(|_| ValidationRejection::UnknownBookId(raw))
    }
}

/// Validation rejection with structured error response
#[derive(Debug)]
pub enum ValidationRejection {
    /// Failed to parse path parameters
    Path(PathRejection),
    /// Book id segment is not an integer
    UnknownBookId(String),
    /// Failed to parse query string
    Query(QueryRejection),
    /// Missing content type or unparseable JSON body
    Json(JsonRejection),
    /// JSON body is not an object
    NotAnObject,
    /// JSON body is an empty object
    EmptyBody,
    /// Validation constraints not satisfied
    Validation(validator::ValidationErrors),
}

impl From<ValidationRejection> for ApiError {
    fn from(rejection: ValidationRejection) -> Self {
        match rejection {
            ValidationRejection::Path(r) => Self::bad_request("PATH_PARSE_ERROR", r.body_text()),
            ValidationRejection::UnknownBookId(raw) => Self::book_not_found(raw),
            ValidationRejection::Query(r) => Self::bad_request("QUERY_PARSE_ERROR", r.body_text()),
            ValidationRejection::Json(r) => Self::bad_request("JSON_PARSE_ERROR", r.body_text()),
            ValidationRejection::NotAnObject => {
                Self::bad_request("JSON_PARSE_ERROR", "Request body must be a JSON object")
            }
            ValidationRejection::EmptyBody => {
                Self::bad_request("EMPTY_BODY", "Request body is required")
            }
            ValidationRejection::Validation(errors) => {
                Self::bad_request("VALIDATION_ERROR", format_validation_errors(&errors))
            }
        }
    }
}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Query extractor with automatic validation.
///
/// Deserializes query parameters and validates them using the `validator` crate.
/// Returns a `ValidationRejection` on parse or validation failure.
#[derive(Debug)]
pub struct ValidatedQuery<T>(pub T);

impl<T> Deref for ValidatedQuery<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ValidationRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(ValidationRejection::Query)?;
        value.validate().map_err(ValidationRejection::Validation)?;
        Ok(Self(value))
    }
}

/// Untyped JSON object body.
///
/// Requires a JSON content type and a non-empty object; field-level checks
/// are left to the record service.
#[derive(Debug)]
pub struct JsonObject(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = ValidationRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(ValidationRejection::Json)?;
        match value {
            Value::Object(map) if map.is_empty() => Err(ValidationRejection::EmptyBody),
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ValidationRejection::NotAnObject),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_rejection_status_codes() {
        let cases = [
            (ValidationRejection::UnknownBookId("abc".into()), StatusCode::NOT_FOUND),
            (ValidationRejection::EmptyBody, StatusCode::BAD_REQUEST),
            (ValidationRejection::NotAnObject, StatusCode::BAD_REQUEST),
        ];
        for (rejection, expected) in cases {
            assert_eq!(rejection.into_response().status(), expected);
        }
    }
}
