//! Query filter system
//!
//! Composable filter primitives (substring, exact, numeric range, multi-value)
//! and the builder that joins them into a parameterized WHERE clause.
//!
//! ## Usage
//!
//! ```
//! use catalog_server::data::filters::{Combinator, FilterPrimitive, FilterSet};
//!
//! let set = FilterSet::new(
//!     vec![FilterPrimitive::substring("title", false)],
//!     Combinator::And,
//! );
//! let values = serde_json::json!({ "title": "dune" });
//! let (where_clause, params) = set.build_query(values.as_object().unwrap());
//! assert_eq!(where_clause, " WHERE LOWER(title) LIKE LOWER(?)");
//! assert_eq!(params.len(), 1);
//! ```

mod builder;
mod types;

pub use builder::{Combinator, FilterError, FilterSet};
pub use types::{FilterKind, FilterPrimitive};
