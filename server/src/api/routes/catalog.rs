//! Catalog lookup endpoints (subjects, publishers, filter options)

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::types::ApiError;
use crate::domain::BookService;
use crate::domain::books::FilterOptions;

#[derive(Clone)]
pub struct CatalogApiState {
    pub books: Arc<BookService>,
}

pub fn routes(books: Arc<BookService>) -> Router<()> {
    Router::new()
        .route("/subjects", get(list_subjects))
        .route("/publishers", get(list_publishers))
        .route("/filter-options", get(filter_options))
        .with_state(CatalogApiState { books })
}

/// Distinct subjects across all books
#[utoipa::path(
    get,
    path = "/api/v1/subjects",
    tag = "catalog",
    responses((status = 200, description = "Sorted subjects", body = Vec<String>))
)]
pub async fn list_subjects(
    State(state): State<CatalogApiState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let subjects = state.books.get_available_subjects().await?;
    tracing::info!(count = subjects.len(), "Subjects retrieved");
    Ok(Json(subjects))
}

/// Distinct publishers across all books
#[utoipa::path(
    get,
    path = "/api/v1/publishers",
    tag = "catalog",
    responses((status = 200, description = "Sorted publishers", body = Vec<String>))
)]
pub async fn list_publishers(
    State(state): State<CatalogApiState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let publishers = state.books.get_available_publishers().await?;
    tracing::info!(count = publishers.len(), "Publishers retrieved");
    Ok(Json(publishers))
}

/// Filters, sort columns and known values for the book listing
#[utoipa::path(
    get,
    path = "/api/v1/filter-options",
    tag = "catalog",
    responses((status = 200, description = "Filter options", body = FilterOptions))
)]
pub async fn filter_options(
    State(state): State<CatalogApiState>,
) -> Result<Json<FilterOptions>, ApiError> {
    Ok(Json(state.books.get_filter_options().await?))
}
