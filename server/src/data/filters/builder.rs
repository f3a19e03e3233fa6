//! SQL WHERE clause builder
//!
//! Combines the output of several filter primitives into one WHERE clause.
//! Parameters are bound positionally, so their order must follow the
//! placeholder order of the final SQL string exactly.

use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;

use super::types::FilterPrimitive;
use crate::data::types::SqlValue;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Combinator must be 'AND' or 'OR', got '{0}'")]
    InvalidCombinator(String),
}

/// Boolean operator joining satisfied filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl FromStr for Combinator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            _ => Err(FilterError::InvalidCombinator(s.to_string())),
        }
    }
}

/// Ordered filter primitives joined by one combinator
#[derive(Debug, Clone)]
pub struct FilterSet {
    filters: Vec<FilterPrimitive>,
    combinator: Combinator,
}

impl FilterSet {
    pub fn new(filters: Vec<FilterPrimitive>, combinator: Combinator) -> Self {
        Self {
            filters,
            combinator,
        }
    }

    /// Build from a user-facing combinator name (`and`/`OR`, any case)
    pub fn with_combinator(
        filters: Vec<FilterPrimitive>,
        combinator: &str,
    ) -> Result<Self, FilterError> {
        Ok(Self::new(filters, combinator.parse()?))
    }

    pub fn filters(&self) -> &[FilterPrimitive] {
        &self.filters
    }

    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    /// Build ` WHERE ...` and its parameters from a field → value mapping.
    ///
    /// Absent, null, and invalid values are skipped. Returns `("", [])` when
    /// nothing applies.
    pub fn build_query(&self, values: &Map<String, Value>) -> (String, Vec<SqlValue>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        for filter in &self.filters {
            let Some(value) = values.get(filter.field).filter(|v| !v.is_null()) else {
                continue;
            };
            if !filter.validate(value) {
                tracing::trace!(field = filter.field, kind = filter.kind.as_str(), "Filter skipped");
                continue;
            }

            let (condition, filter_params) = filter.render(value);
            conditions.push(condition);
            params.extend(filter_params);
        }

        if conditions.is_empty() {
            return (String::new(), Vec::new());
        }

        let joiner = format!(" {} ", self.combinator.as_sql());
        (format!(" WHERE {}", conditions.join(&joiner)), params)
    }
}
