//! Book catalog records
//!
//! `BookService` owns the registered filter set and is the only code that
//! writes SQL against the `book` and `author` tables.

mod service;
mod types;

pub use service::BookService;
pub use types::{CatalogError, FilterOptions, PageResult, Pagination};

use crate::data::filters::FilterPrimitive;

/// Filters available on the book listing, in clause order
pub const BOOK_FILTERS: &[FilterPrimitive] = &[
    FilterPrimitive::substring("title", false),
    FilterPrimitive::substring("author", false),
    FilterPrimitive::substring("author_bio", false),
    FilterPrimitive::substring("authors", false),
    FilterPrimitive::substring("publisher", false),
    FilterPrimitive::substring("synopsis", false),
    FilterPrimitive::substring("subjects", false),
    FilterPrimitive::substring("overview", false),
    FilterPrimitive::substring("excerpt", false),
    FilterPrimitive::exact("author_slug"),
    FilterPrimitive::exact("edition"),
    FilterPrimitive::numeric_range("pages"),
    FilterPrimitive::numeric_range("isbn13"),
    FilterPrimitive::multi_value("format"),
];
