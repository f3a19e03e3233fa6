//! Request and response types for the book endpoints

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{validate_page, validate_page_size};
use crate::core::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::data::filters::{FilterKind, FilterPrimitive};
use crate::data::types::Book;

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn default_order_direction() -> String {
    "ASC".to_string()
}

/// Paging and sorting parameters of the book listing
///
/// Filter parameters travel in the same query string and are read separately
/// by [`filters_from_params`].
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListBooksQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: i64,

    #[serde(default = "default_page_size")]
    #[validate(custom(function = "validate_page_size"))]
    pub page_size: i64,

    pub order_by: Option<String>,

    #[serde(default = "default_order_direction")]
    pub order_direction: String,
}

impl ListBooksQuery {
    /// Requested page size capped at the maximum
    pub fn page_size(&self) -> i64 {
        self.page_size.min(MAX_PAGE_SIZE)
    }
}

/// Build the filter mapping from raw query pairs
///
/// Each registered filter reads its own parameters:
/// - substring and exact filters read `field` (first non-empty value)
/// - numeric ranges read `field_min` and `field_max`; a bound that is not a
///   number is dropped
/// - multi-value filters read every non-empty `field` value
///
/// Empty values are ignored everywhere.
pub fn filters_from_params(
    filters: &[FilterPrimitive],
    params: &[(String, String)],
) -> Map<String, Value> {
    let mut mapping = Map::new();
    for filter in filters {
        let field = filter.field;
        match filter.kind {
            FilterKind::Substring { .. } | FilterKind::Exact => {
                if let Some(value) = first_value(params, field) {
                    mapping.insert(field.to_string(), Value::String(value.to_string()));
                }
            }
            FilterKind::NumericRange => {
                let mut bounds = Map::new();
                for bound in ["min", "max"] {
                    let key = format!("{}_{}", field, bound);
                    if let Some(number) = first_value(params, &key).and_then(parse_number) {
                        bounds.insert(bound.to_string(), number);
                    }
                }
                if !bounds.is_empty() {
                    mapping.insert(field.to_string(), Value::Object(bounds));
                }
            }
            FilterKind::MultiValue => {
                let values: Vec<Value> = params
                    .iter()
                    .filter(|(k, v)| k == field && !v.is_empty())
                    .map(|(_, v)| Value::String(v.clone()))
                    .collect();
                if !values.is_empty() {
                    mapping.insert(field.to_string(), Value::Array(values));
                }
            }
        }
    }
    mapping
}

fn first_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v.as_str())
}

fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(n) = raw.parse::<i64>() {
        return Some(Value::from(n));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

/// Write acknowledgement carrying the stored record
#[derive(Debug, Serialize, ToSchema)]
pub struct BookEnvelope {
    pub message: &'static str,
    pub book: Book,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::books::BOOK_FILTERS;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_text_and_exact_params() {
        let mapping = filters_from_params(
            BOOK_FILTERS,
            &pairs(&[
                ("title", "dune"),
                ("title", "ignored"),
                ("edition", "First"),
                ("publisher", ""),
                ("page", "2"),
            ]),
        );
        assert_eq!(Value::Object(mapping), json!({ "title": "dune", "edition": "First" }));
    }

    #[test]
    fn test_range_params() {
        let mapping = filters_from_params(
            BOOK_FILTERS,
            &pairs(&[("pages_min", "100"), ("pages_max", "2.5"), ("isbn13_min", "abc")]),
        );
        assert_eq!(mapping["pages"], json!({ "min": 100, "max": 2.5 }));
        assert!(!mapping.contains_key("isbn13"));
        assert!(!mapping.contains_key("pages_min"));
    }

    #[test]
    fn test_unparseable_bound_dropped_other_kept() {
        let mapping = filters_from_params(
            BOOK_FILTERS,
            &pairs(&[("pages_min", "abc"), ("pages_max", "300"), ("isbn13_max", "NaN")]),
        );
        assert_eq!(Value::Object(mapping), json!({ "pages": { "max": 300 } }));
    }

    #[test]
    fn test_repeated_multi_value_params() {
        let mapping = filters_from_params(
            BOOK_FILTERS,
            &pairs(&[("format", "Paperback"), ("format", ""), ("format", "Hardcover")]),
        );
        assert_eq!(mapping["format"], json!(["Paperback", "Hardcover"]));
    }

    #[test]
    fn test_no_params() {
        assert!(filters_from_params(BOOK_FILTERS, &[]).is_empty());
    }

    #[test]
    fn test_page_size_clamped() {
        let query = ListBooksQuery {
            page: 1,
            page_size: 1000,
            order_by: None,
            order_direction: default_order_direction(),
        };
        assert_eq!(query.page_size(), MAX_PAGE_SIZE);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_query_validation() {
        let query = ListBooksQuery {
            page: 0,
            page_size: 10,
            order_by: None,
            order_direction: default_order_direction(),
        };
        assert!(query.validate().is_err());
    }
}
