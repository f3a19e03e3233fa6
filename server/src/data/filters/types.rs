//! Filter primitive definitions
//!
//! A primitive targets one column and turns an untyped JSON value into a SQL
//! fragment with `?` placeholders plus the matching parameters. Values that do
//! not validate produce an empty fragment; they are skipped, never rejected.

use serde_json::Value;

use crate::data::types::SqlValue;

/// Operator family of a filter primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// `LIKE %value%`, optionally case-insensitive
    Substring { case_sensitive: bool },
    /// `= value`
    Exact,
    /// `>= min` and/or `<= max`
    NumericRange,
    /// `IN (v1, v2, ...)`
    MultiValue,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Substring { .. } => "substring",
            Self::Exact => "exact",
            Self::NumericRange => "numeric_range",
            Self::MultiValue => "multi_value",
        }
    }
}

/// A single typed predicate over one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterPrimitive {
    pub field: &'static str,
    pub kind: FilterKind,
}

impl FilterPrimitive {
    pub const fn substring(field: &'static str, case_sensitive: bool) -> Self {
        Self {
            field,
            kind: FilterKind::Substring { case_sensitive },
        }
    }

    pub const fn exact(field: &'static str) -> Self {
        Self {
            field,
            kind: FilterKind::Exact,
        }
    }

    pub const fn numeric_range(field: &'static str) -> Self {
        Self {
            field,
            kind: FilterKind::NumericRange,
        }
    }

    pub const fn multi_value(field: &'static str) -> Self {
        Self {
            field,
            kind: FilterKind::MultiValue,
        }
    }

    /// Whether `value` is usable by this primitive
    pub fn validate(&self, value: &Value) -> bool {
        match self.kind {
            FilterKind::Substring { .. } => value.as_str().is_some_and(|s| !s.trim().is_empty()),
            FilterKind::Exact => match value {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                _ => true,
            },
            FilterKind::NumericRange => match value {
                Value::Number(_) => true,
                Value::Object(bounds) => {
                    let min = bound(bounds, "min");
                    let max = bound(bounds, "max");
                    if min.is_none() && max.is_none() {
                        return false;
                    }
                    min.is_none_or(Value::is_number) && max.is_none_or(Value::is_number)
                }
                _ => false,
            },
            FilterKind::MultiValue => match value {
                Value::Null => false,
                Value::Array(items) => items.iter().any(|v| !v.is_null()),
                _ => true,
            },
        }
    }

    /// Render the SQL fragment and its parameters.
    ///
    /// Returns `("", [])` when `value` does not validate.
    pub fn render(&self, value: &Value) -> (String, Vec<SqlValue>) {
        if !self.validate(value) {
            return (String::new(), Vec::new());
        }

        let field = self.field;
        match self.kind {
            FilterKind::Substring { case_sensitive } => {
                let pattern = format!("%{}%", value.as_str().unwrap_or_default());
                let fragment = if case_sensitive {
                    format!("{} LIKE ?", field)
                } else {
                    format!("LOWER({}) LIKE LOWER(?)", field)
                };
                (fragment, vec![SqlValue::Text(pattern)])
            }
            FilterKind::Exact => (format!("{} = ?", field), vec![SqlValue::from(value)]),
            FilterKind::NumericRange => {
                let (min, max) = match value {
                    Value::Object(bounds) => (bound(bounds, "min"), bound(bounds, "max")),
                    scalar => (Some(scalar), Some(scalar)),
                };

                let mut fragments = Vec::with_capacity(2);
                let mut params = Vec::with_capacity(2);
                if let Some(min) = min {
                    fragments.push(format!("{} >= ?", field));
                    params.push(SqlValue::from(min));
                }
                if let Some(max) = max {
                    fragments.push(format!("{} <= ?", field));
                    params.push(SqlValue::from(max));
                }
                (fragments.join(" AND "), params)
            }
            FilterKind::MultiValue => {
                let params: Vec<SqlValue> = match value {
                    Value::Array(items) => items
                        .iter()
                        .filter(|v| !v.is_null())
                        .map(SqlValue::from)
                        .collect(),
                    scalar => vec![SqlValue::from(scalar)],
                };
                let placeholders = vec!["?"; params.len()].join(", ");
                (format!("{} IN ({})", field, placeholders), params)
            }
        }
    }
}

/// A present, non-null range bound
fn bound<'a>(bounds: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a Value> {
    bounds.get(key).filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(s.to_string())
    }

    #[test]
    fn substring_case_insensitive() {
        let filter = FilterPrimitive::substring("title", false);
        let (sql, params) = filter.render(&json!("Foo"));

        assert_eq!(sql, "LOWER(title) LIKE LOWER(?)");
        assert_eq!(params, vec![text("%Foo%")]);
    }

    #[test]
    fn substring_case_sensitive() {
        let filter = FilterPrimitive::substring("title", true);
        let (sql, params) = filter.render(&json!("Foo"));

        assert_eq!(sql, "title LIKE ?");
        assert_eq!(params, vec![text("%Foo%")]);
    }

    #[test]
    fn substring_rejects_blank_and_non_strings() {
        let filter = FilterPrimitive::substring("title", false);
        assert!(!filter.validate(&json!("   ")));
        assert!(!filter.validate(&json!("")));
        assert!(!filter.validate(&json!(12)));
        assert!(!filter.validate(&json!(null)));
        assert_eq!(filter.render(&json!("  ")), (String::new(), vec![]));
    }

    #[test]
    fn exact_passes_value_through() {
        let filter = FilterPrimitive::exact("edition");
        let (sql, params) = filter.render(&json!("First"));
        assert_eq!(sql, "edition = ?");
        assert_eq!(params, vec![text("First")]);

        let (_, params) = filter.render(&json!(2));
        assert_eq!(params, vec![SqlValue::Integer(2)]);
    }

    #[test]
    fn exact_validation() {
        let filter = FilterPrimitive::exact("edition");
        assert!(!filter.validate(&json!(null)));
        assert!(!filter.validate(&json!(" ")));
        assert!(filter.validate(&json!(0)));
        assert!(filter.validate(&json!(false)));
    }

    #[test]
    fn numeric_range_min_only() {
        let filter = FilterPrimitive::numeric_range("pages");
        let (sql, params) = filter.render(&json!({ "min": 100 }));

        assert_eq!(sql, "pages >= ?");
        assert_eq!(params, vec![SqlValue::Integer(100)]);
    }

    #[test]
    fn numeric_range_both_bounds_min_first() {
        let filter = FilterPrimitive::numeric_range("pages");
        let (sql, params) = filter.render(&json!({ "max": 500, "min": 100 }));

        assert_eq!(sql, "pages >= ? AND pages <= ?");
        assert_eq!(params, vec![SqlValue::Integer(100), SqlValue::Integer(500)]);
    }

    #[test]
    fn numeric_range_scalar_is_both_bounds() {
        let filter = FilterPrimitive::numeric_range("pages");
        let (sql, params) = filter.render(&json!(250.5));

        assert_eq!(sql, "pages >= ? AND pages <= ?");
        assert_eq!(params, vec![SqlValue::Real(250.5), SqlValue::Real(250.5)]);
    }

    #[test]
    fn numeric_range_validation() {
        let filter = FilterPrimitive::numeric_range("pages");
        assert!(!filter.validate(&json!({})));
        assert!(!filter.validate(&json!({ "min": null, "max": null })));
        assert!(!filter.validate(&json!({ "min": "100" })));
        assert!(!filter.validate(&json!({ "min": 1, "max": "x" })));
        assert!(!filter.validate(&json!("100")));
        assert!(filter.validate(&json!({ "max": 10, "min": null })));
    }

    #[test]
    fn multi_value_drops_nulls_keeps_order() {
        let filter = FilterPrimitive::multi_value("format");
        let (sql, params) = filter.render(&json!(["A", null, "B"]));

        assert_eq!(sql, "format IN (?, ?)");
        assert_eq!(params, vec![text("A"), text("B")]);
    }

    #[test]
    fn multi_value_preserves_duplicates() {
        let filter = FilterPrimitive::multi_value("format");
        let (sql, params) = filter.render(&json!(["A", "A"]));

        assert_eq!(sql, "format IN (?, ?)");
        assert_eq!(params, vec![text("A"), text("A")]);
    }

    #[test]
    fn multi_value_scalar_is_singleton() {
        let filter = FilterPrimitive::multi_value("format");
        let (sql, params) = filter.render(&json!("Hardcover"));

        assert_eq!(sql, "format IN (?)");
        assert_eq!(params, vec![text("Hardcover")]);
    }

    #[test]
    fn multi_value_validation() {
        let filter = FilterPrimitive::multi_value("format");
        assert!(!filter.validate(&json!(null)));
        assert!(!filter.validate(&json!([])));
        assert!(!filter.validate(&json!([null, null])));
        assert_eq!(filter.render(&json!([null])), (String::new(), vec![]));
    }
}
