//! Book API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::extractors::{BookPath, JsonObject, ValidatedQuery};
use crate::api::types::{ApiError, MessageResponse};
use crate::data::types::Book;
use crate::domain::BookService;
use crate::domain::books::PageResult;

use types::{BookEnvelope, ListBooksQuery, filters_from_params};

/// Shared state for Books API endpoints
#[derive(Clone)]
pub struct BooksApiState {
    pub books: Arc<BookService>,
}

/// Build Books API routes
pub fn routes(books: Arc<BookService>) -> Router<()> {
    let state = BooksApiState { books };

    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .route("/author/{author_slug}", get(books_by_author))
        .route("/subjects/{subject}", get(books_by_subject))
        .with_state(state)
}

/// List books with filters, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/v1/books",
    tag = "books",
    params(
        ("page" = Option<i64>, Query, description = "Page number (>= 1)"),
        ("page_size" = Option<i64>, Query, description = "Items per page (>= 1, capped at 100)"),
        ("order_by" = Option<String>, Query, description = "Sort column; unknown columns are ignored"),
        ("order_direction" = Option<String>, Query, description = "ASC or DESC"),
        ("title" = Option<String>, Query, description = "Case-insensitive substring"),
        ("author" = Option<String>, Query, description = "Case-insensitive substring"),
        ("publisher" = Option<String>, Query, description = "Case-insensitive substring"),
        ("subjects" = Option<String>, Query, description = "Case-insensitive substring"),
        ("author_slug" = Option<String>, Query, description = "Exact match"),
        ("edition" = Option<String>, Query, description = "Exact match"),
        ("format" = Option<Vec<String>>, Query, description = "Any of the given formats (repeatable)"),
        ("pages_min" = Option<f64>, Query, description = "Minimum page count"),
        ("pages_max" = Option<f64>, Query, description = "Maximum page count"),
        ("isbn13_min" = Option<i64>, Query, description = "Minimum ISBN-13"),
        ("isbn13_max" = Option<i64>, Query, description = "Maximum ISBN-13")
    ),
    responses(
        (status = 200, description = "Page of books", body = PageResult),
        (status = 400, description = "Invalid paging parameters")
    )
)]
pub async fn list_books(
    State(state): State<BooksApiState>,
    ValidatedQuery(query): ValidatedQuery<ListBooksQuery>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<PageResult>, ApiError> {
    let filters = filters_from_params(state.books.filter_set().filters(), &params);

    let result = state
        .books
        .get_books_with_filters(
            &filters,
            query.page,
            query.page_size(),
            query.order_by.as_deref(),
            &query.order_direction,
        )
        .await?;

    tracing::info!(
        count = result.books.len(),
        page = query.page,
        "Books retrieved"
    );
    Ok(Json(result))
}

/// Get a single book
#[utoipa::path(
    get,
    path = "/api/v1/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<BooksApiState>,
    BookPath(id): BookPath,
) -> Result<Json<Book>, ApiError> {
    let book = state
        .books
        .get_book_by_id(id)
        .await?
        .ok_or_else(|| ApiError::book_not_found(id))?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/api/v1/books",
    tag = "books",
    request_body(content = Object, description = "Book fields; title and author are required"),
    responses(
        (status = 201, description = "Book created", body = BookEnvelope),
        (status = 400, description = "Invalid body or missing required fields")
    )
)]
pub async fn create_book(
    State(state): State<BooksApiState>,
    JsonObject(body): JsonObject,
) -> Result<(StatusCode, Json<BookEnvelope>), ApiError> {
    let book = state.books.create_book(&body).await?;
    Ok((
        StatusCode::CREATED,
        Json(BookEnvelope {
            message: "Book created successfully",
            book,
        }),
    ))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/api/v1/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    request_body(content = Object, description = "Fields to overwrite; null clears a field"),
    responses(
        (status = 200, description = "Book updated", body = BookEnvelope),
        (status = 400, description = "Invalid body"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<BooksApiState>,
    BookPath(id): BookPath,
    JsonObject(body): JsonObject,
) -> Result<Json<BookEnvelope>, ApiError> {
    let book = state
        .books
        .update_book(id, &body)
        .await?
        .ok_or_else(|| ApiError::book_not_found(id))?;
    Ok(Json(BookEnvelope {
        message: "Book updated successfully",
        book,
    }))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/api/v1/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<BooksApiState>,
    BookPath(id): BookPath,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.books.delete_book(id).await? {
        return Err(ApiError::book_not_found(id));
    }
    Ok(Json(MessageResponse {
        message: "Book deleted successfully",
    }))
}

/// Books by author slug (first 100)
#[utoipa::path(
    get,
    path = "/api/v1/books/author/{author_slug}",
    tag = "books",
    params(("author_slug" = String, Path, description = "Author slug (exact match)")),
    responses((status = 200, description = "Books by the author", body = Vec<Book>))
)]
pub async fn books_by_author(
    State(state): State<BooksApiState>,
    Path(author_slug): Path<String>,
) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(state.books.get_books_by_author(&author_slug).await?))
}

/// Books by subject (first 100)
#[utoipa::path(
    get,
    path = "/api/v1/books/subjects/{subject}",
    tag = "books",
    params(("subject" = String, Path, description = "Subject (case-insensitive substring)")),
    responses((status = 200, description = "Books with the subject", body = Vec<Book>))
)]
pub async fn books_by_subject(
    State(state): State<BooksApiState>,
    Path(subject): Path<String>,
) -> Result<Json<Vec<Book>>, ApiError> {
    Ok(Json(state.books.get_books_by_subject(&subject).await?))
}
