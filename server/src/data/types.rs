//! Shared data types
//!
//! `SqlValue` is the only value type bound to `?` placeholders and the only
//! value type read back from storage. Records are decoded from positional
//! rows through a column list, so a short or mistyped row fails with a named
//! `RowError` instead of panicking on an index.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

// ============================================================================
// SQL values
// ============================================================================

/// A single bound parameter or decoded column value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text view of any scalar; numbers are rendered in their decimal form
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Integer(i) => Some(i.to_string()),
            Self::Real(f) => Some(f.to_string()),
            Self::Text(s) => Some(s.clone()),
        }
    }

    /// Integer view; reals must be integral and text must parse
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Real(f) if f.fract() == 0.0 => Some(*f as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Real(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Null => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Real(r) => write!(f, "{}", r),
            Self::Text(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<&serde_json::Value> for SqlValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Integer(i64::from(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Real(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => Self::Text(s.clone()),
            // Composite values are stored as their JSON text
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A positional result row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DbRow(pub Vec<SqlValue>);

impl DbRow {
    fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&SqlValue> {
        self.0.get(index)
    }
}

// ============================================================================
// Row decoding
// ============================================================================

#[derive(Error, Debug, PartialEq)]
pub enum RowError {
    #[error("Malformed {entity} row: expected {expected} columns, got {actual}")]
    Malformed {
        entity: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Malformed {entity} row: column {column} holds {value}, expected {expected}")]
    InvalidValue {
        entity: &'static str,
        column: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Walks a row against a column list, yielding typed values by name
struct RowReader<'a> {
    entity: &'static str,
    columns: &'static [&'static str],
    row: &'a DbRow,
}

impl<'a> RowReader<'a> {
    fn new(
        entity: &'static str,
        columns: &'static [&'static str],
        row: &'a DbRow,
    ) -> Result<Self, RowError> {
        if row.len() < columns.len() {
            return Err(RowError::Malformed {
                entity,
                expected: columns.len(),
                actual: row.len(),
            });
        }
        Ok(Self {
            entity,
            columns,
            row,
        })
    }

    fn value(&self, index: usize) -> &SqlValue {
        &self.row.0[index]
    }

    fn invalid(&self, index: usize, expected: &'static str) -> RowError {
        RowError::InvalidValue {
            entity: self.entity,
            column: self.columns[index],
            value: self.value(index).to_string(),
            expected,
        }
    }

    fn text(&self, index: usize) -> Option<String> {
        self.value(index).as_text()
    }

    fn int(&self, index: usize) -> Result<Option<i64>, RowError> {
        let value = self.value(index);
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_i64()
            .map(Some)
            .ok_or_else(|| self.invalid(index, "integer"))
    }

    fn real(&self, index: usize) -> Result<Option<f64>, RowError> {
        let value = self.value(index);
        if value.is_null() {
            return Ok(None);
        }
        value
            .as_f64()
            .map(Some)
            .ok_or_else(|| self.invalid(index, "number"))
    }

    fn id(&self, index: usize) -> Result<i64, RowError> {
        self.int(index)?.ok_or_else(|| self.invalid(index, "id"))
    }
}

// ============================================================================
// Book
// ============================================================================

/// Book table columns in storage order
pub const BOOK_COLUMNS: &[&str] = &[
    "id",
    "title",
    "author",
    "author_id",
    "author_bio",
    "authors",
    "title_slug",
    "author_slug",
    "isbn13",
    "isbn10",
    "price",
    "format",
    "publisher",
    "pubdate",
    "edition",
    "subjects",
    "lexile",
    "pages",
    "dimensions",
    "overview",
    "excerpt",
    "synopsis",
    "toc",
    "editorial_reviews",
];

/// Catalog book record
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: Option<String>,
    pub author: Option<String>,
    pub author_id: Option<i64>,
    #[serde(rename = "biography")]
    pub author_bio: Option<String>,
    pub authors: Option<String>,
    pub title_slug: Option<String>,
    pub author_slug: Option<String>,
    pub isbn13: Option<i64>,
    pub isbn10: Option<String>,
    pub price: Option<String>,
    pub format: Option<String>,
    pub publisher: Option<String>,
    pub pubdate: Option<String>,
    pub edition: Option<String>,
    pub subjects: Option<String>,
    pub lexile: Option<String>,
    pub pages: Option<f64>,
    pub dimensions: Option<String>,
    pub overview: Option<String>,
    pub excerpt: Option<String>,
    pub synopsis: Option<String>,
    pub toc: Option<String>,
    pub editorial_reviews: Option<String>,
}

impl Book {
    pub fn from_row(row: &DbRow) -> Result<Self, RowError> {
        let r = RowReader::new("book", BOOK_COLUMNS, row)?;
        Ok(Self {
            id: r.id(0)?,
            title: r.text(1),
            author: r.text(2),
            author_id: r.int(3)?,
            author_bio: r.text(4),
            authors: r.text(5),
            title_slug: r.text(6),
            author_slug: r.text(7),
            isbn13: r.int(8)?,
            isbn10: r.text(9),
            price: r.text(10),
            format: r.text(11),
            publisher: r.text(12),
            pubdate: r.text(13),
            edition: r.text(14),
            subjects: r.text(15),
            lexile: r.text(16),
            pages: r.real(17)?,
            dimensions: r.text(18),
            overview: r.text(19),
            excerpt: r.text(20),
            synopsis: r.text(21),
            toc: r.text(22),
            editorial_reviews: r.text(23),
        })
    }
}

// ============================================================================
// Author
// ============================================================================

pub const AUTHOR_COLUMNS: &[&str] = &["id", "title", "slug", "biography"];

/// Catalog author record
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Author {
    pub id: i64,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub biography: Option<String>,
}

impl Author {
    pub fn from_row(row: &DbRow) -> Result<Self, RowError> {
        let r = RowReader::new("author", AUTHOR_COLUMNS, row)?;
        Ok(Self {
            id: r.id(0)?,
            title: r.text(1),
            slug: r.text(2),
            biography: r.text(3),
        })
    }
}
