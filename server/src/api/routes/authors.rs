//! Author API endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::types::ApiError;
use crate::data::types::Author;
use crate::domain::BookService;

#[derive(Clone)]
pub struct AuthorsApiState {
    pub books: Arc<BookService>,
}

pub fn routes(books: Arc<BookService>) -> Router<()> {
    Router::new()
        .route("/", get(list_authors))
        .with_state(AuthorsApiState { books })
}

/// All authors ordered by name
#[utoipa::path(
    get,
    path = "/api/v1/authors",
    tag = "authors",
    responses((status = 200, description = "Authors", body = Vec<Author>))
)]
pub async fn list_authors(
    State(state): State<AuthorsApiState>,
) -> Result<Json<Vec<Author>>, ApiError> {
    let authors = state.books.get_authors().await?;
    tracing::info!(count = authors.len(), "Authors retrieved");
    Ok(Json(authors))
}
