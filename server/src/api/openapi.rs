//! OpenAPI specification

use axum::http::header;
use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{authors, books, catalog, health};
use crate::api::types::MessageResponse;
use crate::data::types::{Author, Book};
use crate::domain::books::{FilterOptions, PageResult, Pagination};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Book catalog with filterable, paginated listings"
    ),
    tags(
        (name = "health", description = "Health and readiness probes"),
        (name = "books", description = "Book records"),
        (name = "authors", description = "Author records"),
        (name = "catalog", description = "Catalog lookups")
    ),
    paths(
        // Health
        health::index,
        health::health,
        health::ready,
        health::live,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::books_by_author,
        books::books_by_subject,
        // Authors
        authors::list_authors,
        // Catalog
        catalog::list_subjects,
        catalog::list_publishers,
        catalog::filter_options,
    ),
    components(schemas(
        // API types
        MessageResponse,
        // Health
        health::ServiceStatus,
        health::CheckResult,
        health::HealthChecks,
        health::HealthResponse,
        health::ProbeResponse,
        // Books
        Book,
        Author,
        Pagination,
        PageResult,
        FilterOptions,
        books::types::BookEnvelope,
        books::types::ListBooksQuery,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}
