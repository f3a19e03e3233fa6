//! Record service types

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use utoipa::ToSchema;

use crate::data::error::StorageError;
use crate::data::types::{Book, RowError};

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum CatalogError {
    /// Caller-supplied input was rejected before touching storage
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A single-record read returned a row that does not decode
    #[error(transparent)]
    Row(#[from] RowError),

    /// A write succeeded but the record could not be read back
    #[error("Book {0} could not be read back after write")]
    Unreadable(i64),
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Pagination metadata for a page of books
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Pagination {
    pub current_page: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// `page` and `page_size` must already be validated as >= 1
    pub fn new(page: i64, page_size: i64, total_count: i64) -> Self {
        let total_pages = if total_count > 0 {
            (total_count + page_size - 1) / page_size
        } else {
            0
        };
        Self {
            current_page: page,
            page_size,
            total_count,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// One page of a filtered book listing
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PageResult {
    pub books: Vec<Book>,
    pub pagination: Pagination,
    /// Non-null entries of the filter mapping the page was built from
    #[schema(value_type = Object)]
    pub filters_applied: Map<String, Value>,
}

// ============================================================================
// Filter options
// ============================================================================

/// Filters and values a client can offer for the book listing
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FilterOptions {
    pub text_filters: Vec<String>,
    pub exact_filters: Vec<String>,
    pub numeric_filters: Vec<String>,
    pub multi_value_filters: Vec<String>,
    pub available_subjects: Vec<String>,
    pub available_publishers: Vec<String>,
    pub sort_options: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_empty() {
        let p = Pagination::new(1, 10, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next);
        assert!(!p.has_prev);
    }

    #[test]
    fn test_pagination_partial_last_page() {
        let p = Pagination::new(1, 10, 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(!p.has_prev);

        let p = Pagination::new(3, 10, 25);
        assert!(!p.has_next);
        assert!(p.has_prev);
    }

    #[test]
    fn test_pagination_exact_fit() {
        let p = Pagination::new(2, 10, 20);
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_next);
    }

    #[test]
    fn test_pagination_page_past_end() {
        let p = Pagination::new(9, 10, 25);
        assert_eq!(p.current_page, 9);
        assert!(!p.has_next);
        assert!(p.has_prev);
    }

    #[test]
    fn test_validation_error_message() {
        let err = CatalogError::validation("Missing required field: title");
        assert_eq!(err.to_string(), "Missing required field: title");
    }
}
