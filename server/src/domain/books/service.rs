//! Book record service

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::BOOK_FILTERS;
use super::types::{CatalogError, FilterOptions, PageResult, Pagination};
use crate::core::constants::BROWSE_PAGE_SIZE;
use crate::data::filters::{Combinator, FilterKind, FilterSet};
use crate::data::traits::SqlExecutor;
use crate::data::types::{AUTHOR_COLUMNS, Author, BOOK_COLUMNS, Book, DbRow, SqlValue};

/// Fields a create or update request may write
const WRITABLE_FIELDS: &[&str] = &[
    "title",
    "author",
    "author_bio",
    "authors",
    "author_slug",
    "publisher",
    "synopsis",
    "subjects",
    "isbn13",
    "isbn10",
    "price",
    "format",
    "pages",
    "overview",
    "excerpt",
];

/// Fields a create request must carry with a truthy value
const REQUIRED_FIELDS: &[&str] = &["title", "author"];

/// Writable fields stored in INTEGER columns
const INTEGER_FIELDS: &[&str] = &["isbn13"];

/// Writable fields read back as numbers
const NUMBER_FIELDS: &[&str] = &["pages"];

/// Columns advertised as sort choices
const SORT_OPTIONS: &[&str] = &["title", "author", "publisher", "pubdate", "pages"];

/// Catalog reads and writes over a `SqlExecutor`
#[derive(Clone)]
pub struct BookService {
    executor: Arc<dyn SqlExecutor>,
    filters: FilterSet,
}

impl BookService {
    pub fn new(executor: Arc<dyn SqlExecutor>) -> Self {
        Self {
            executor,
            filters: FilterSet::new(BOOK_FILTERS.to_vec(), Combinator::And),
        }
    }

    pub fn filter_set(&self) -> &FilterSet {
        &self.filters
    }

    /// Filtered, sorted, paginated listing
    ///
    /// An `order_by` outside the book columns is ignored. `order_direction`
    /// is `DESC` when it upper-cases to `DESC`, `ASC` otherwise.
    pub async fn get_books_with_filters(
        &self,
        filters: &Map<String, Value>,
        page: i64,
        page_size: i64,
        order_by: Option<&str>,
        order_direction: &str,
    ) -> Result<PageResult, CatalogError> {
        if page < 1 {
            return Err(CatalogError::validation("Page must be >= 1"));
        }
        if page_size < 1 {
            return Err(CatalogError::validation("Page size must be >= 1"));
        }
        let offset = (page - 1)
            .checked_mul(page_size)
            .ok_or_else(|| CatalogError::validation("Page is out of range"))?;

        let (where_clause, params) = self.filters.build_query(filters);

        let count_sql = format!("SELECT COUNT(*) FROM book{}", where_clause);
        let total_count = self
            .executor
            .query(&count_sql, &params)
            .await?
            .first()
            .and_then(|row| row.get(0))
            .and_then(SqlValue::as_i64)
            .unwrap_or(0);

        let mut sql = format!("SELECT {} FROM book{}", book_select(), where_clause);
        if let Some(order) = order_clause(order_by, order_direction) {
            sql.push_str(&order);
        }
        sql.push_str(&format!(" LIMIT {} OFFSET {}", page_size, offset));

        let rows = self.executor.query(&sql, &params).await?;
        let books = decode_books(&rows);

        tracing::debug!(
            page,
            page_size,
            total_count,
            returned = books.len(),
            "Books listed"
        );

        let filters_applied = filters
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(PageResult {
            books,
            pagination: Pagination::new(page, page_size, total_count),
            filters_applied,
        })
    }

    pub async fn get_book_by_id(&self, id: i64) -> Result<Option<Book>, CatalogError> {
        let sql = format!("SELECT {} FROM book WHERE id = ?", book_select());
        let rows = self.executor.query(&sql, &[SqlValue::Integer(id)]).await?;
        match rows.first() {
            Some(row) => Ok(Some(Book::from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Insert a book and return it as stored
    ///
    /// `title` and `author` must be truthy. Only non-null writable fields are
    /// stored; anything else in `data` is ignored.
    pub async fn create_book(&self, data: &Map<String, Value>) -> Result<Book, CatalogError> {
        for field in REQUIRED_FIELDS {
            if !data.get(*field).is_some_and(is_truthy) {
                return Err(CatalogError::validation(format!(
                    "Missing required field: {}",
                    field
                )));
            }
        }
        check_numeric_fields(data)?;

        let (columns, params): (Vec<&str>, Vec<SqlValue>) = WRITABLE_FIELDS
            .iter()
            .filter_map(|field| {
                data.get(*field)
                    .filter(|v| !v.is_null())
                    .map(|v| (*field, SqlValue::from(v)))
            })
            .unzip();
        if columns.is_empty() {
            return Err(CatalogError::validation(
                "No valid fields provided for book creation",
            ));
        }

        let sql = format!(
            "INSERT INTO book ({}) VALUES ({})",
            columns.join(", "),
            vec!["?"; columns.len()].join(", ")
        );
        let id = self.executor.insert(&sql, &params).await?;
        tracing::info!(book_id = id, "Book created");

        self.get_book_by_id(id)
            .await?
            .ok_or(CatalogError::Unreadable(id))
    }

    /// Update a book, returning `None` when it does not exist
    ///
    /// Every writable field present in `data` is written, nulls included.
    pub async fn update_book(
        &self,
        id: i64,
        data: &Map<String, Value>,
    ) -> Result<Option<Book>, CatalogError> {
        if self.get_book_by_id(id).await?.is_none() {
            return Ok(None);
        }
        check_numeric_fields(data)?;

        let (assignments, mut params): (Vec<String>, Vec<SqlValue>) = WRITABLE_FIELDS
            .iter()
            .filter_map(|field| {
                data.get(*field)
                    .map(|v| (format!("{} = ?", field), SqlValue::from(v)))
            })
            .unzip();
        if assignments.is_empty() {
            return Err(CatalogError::validation(
                "No valid fields provided for book update",
            ));
        }
        params.push(SqlValue::Integer(id));

        let sql = format!("UPDATE book SET {} WHERE id = ?", assignments.join(", "));
        if self.executor.update(&sql, &params).await? == 0 {
            return Ok(None);
        }
        tracing::info!(book_id = id, "Book updated");

        self.get_book_by_id(id)
            .await?
            .map(Some)
            .ok_or(CatalogError::Unreadable(id))
    }

    /// Delete a book, returning whether a row was removed
    pub async fn delete_book(&self, id: i64) -> Result<bool, CatalogError> {
        if self.get_book_by_id(id).await?.is_none() {
            return Ok(false);
        }

        let affected = self
            .executor
            .delete("DELETE FROM book WHERE id = ?", &[SqlValue::Integer(id)])
            .await?;
        if affected > 0 {
            tracing::info!(book_id = id, "Book deleted");
            Ok(true)
        } else {
            tracing::warn!(book_id = id, "No book deleted");
            Ok(false)
        }
    }

    /// First page of books written by the author with `slug`
    pub async fn get_books_by_author(&self, slug: &str) -> Result<Vec<Book>, CatalogError> {
        self.browse("author_slug", slug).await
    }

    /// First page of books whose subjects contain `subject`
    pub async fn get_books_by_subject(&self, subject: &str) -> Result<Vec<Book>, CatalogError> {
        self.browse("subjects", subject).await
    }

    async fn browse(&self, field: &str, value: &str) -> Result<Vec<Book>, CatalogError> {
        let mut filters = Map::new();
        filters.insert(field.to_string(), Value::String(value.to_string()));
        let page = self
            .get_books_with_filters(&filters, 1, BROWSE_PAGE_SIZE, None, "ASC")
            .await?;
        Ok(page.books)
    }

    /// All authors ordered by name
    pub async fn get_authors(&self) -> Result<Vec<Author>, CatalogError> {
        let sql = format!(
            "SELECT {} FROM author ORDER BY title",
            AUTHOR_COLUMNS.join(", ")
        );
        let rows = self.executor.query(&sql, &[]).await?;
        let authors = rows
            .iter()
            .filter_map(|row| match Author::from_row(row) {
                Ok(author) => Some(author),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping invalid author row");
                    None
                }
            })
            .collect();
        Ok(authors)
    }

    /// Distinct subjects across all books, sorted
    ///
    /// The `subjects` column holds a comma-separated list.
    pub async fn get_available_subjects(&self) -> Result<Vec<String>, CatalogError> {
        let rows = self
            .executor
            .query(
                "SELECT DISTINCT subjects FROM book WHERE subjects IS NOT NULL AND subjects != ''",
                &[],
            )
            .await?;

        let subjects: BTreeSet<String> = rows
            .iter()
            .filter_map(|row| row.get(0).and_then(SqlValue::as_text))
            .flat_map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        Ok(subjects.into_iter().collect())
    }

    /// Distinct non-empty publishers, ordered
    pub async fn get_available_publishers(&self) -> Result<Vec<String>, CatalogError> {
        let rows = self
            .executor
            .query(
                "SELECT DISTINCT publisher FROM book WHERE publisher IS NOT NULL AND publisher != '' ORDER BY publisher",
                &[],
            )
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get(0).and_then(SqlValue::as_text))
            .collect())
    }

    pub async fn get_filter_options(&self) -> Result<FilterOptions, CatalogError> {
        let fields_of = |wanted: fn(&FilterKind) -> bool| -> Vec<String> {
            self.filters
                .filters()
                .iter()
                .filter(|f| wanted(&f.kind))
                .map(|f| f.field.to_string())
                .collect()
        };

        Ok(FilterOptions {
            text_filters: fields_of(|k| matches!(k, FilterKind::Substring { .. })),
            exact_filters: fields_of(|k| matches!(k, FilterKind::Exact)),
            numeric_filters: fields_of(|k| matches!(k, FilterKind::NumericRange)),
            multi_value_filters: fields_of(|k| matches!(k, FilterKind::MultiValue)),
            available_subjects: self.get_available_subjects().await?,
            available_publishers: self.get_available_publishers().await?,
            sort_options: SORT_OPTIONS.iter().map(|s| s.to_string()).collect(),
        })
    }
}

fn book_select() -> String {
    BOOK_COLUMNS.join(", ")
}

/// ` ORDER BY col DIR` for a known book column, `None` otherwise
fn order_clause(order_by: Option<&str>, direction: &str) -> Option<String> {
    let column = order_by.filter(|c| !c.is_empty())?;
    if !BOOK_COLUMNS.contains(&column) {
        tracing::debug!(column, "Ignoring unknown sort column");
        return None;
    }
    let direction = if direction.to_uppercase() == "DESC" {
        "DESC"
    } else {
        "ASC"
    };
    Some(format!(" ORDER BY {} {}", column, direction))
}

/// Decode listing rows, skipping the ones that do not decode
fn decode_books(rows: &[DbRow]) -> Vec<Book> {
    rows.iter()
        .filter_map(|row| match Book::from_row(row) {
            Ok(book) => Some(book),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping invalid book row");
                None
            }
        })
        .collect()
}

/// Reject numeric fields whose values could not be decoded back
///
/// Numbers and numeric strings pass; nulls are left to the caller.
fn check_numeric_fields(data: &Map<String, Value>) -> Result<(), CatalogError> {
    for field in INTEGER_FIELDS {
        if let Some(value) = data.get(*field).filter(|v| !v.is_null())
            && SqlValue::from(value).as_i64().is_none()
        {
            return Err(CatalogError::validation(format!(
                "Field {} must be an integer",
                field
            )));
        }
    }
    for field in NUMBER_FIELDS {
        if let Some(value) = data.get(*field).filter(|v| !v.is_null())
            && SqlValue::from(value).as_f64().is_none()
        {
            return Err(CatalogError::validation(format!(
                "Field {} must be a number",
                field
            )));
        }
    }
    Ok(())
}

/// Truthiness of a JSON value for required-field checks
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
