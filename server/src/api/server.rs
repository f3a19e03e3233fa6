//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;

use tower_http::compression::CompressionLayer;

use super::middleware::{self, AllowedOrigins};
use super::openapi::openapi_json;
use super::routes::{authors, books, catalog, health};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::data::SqlExecutor;
use crate::domain::BookService;

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.cors_origins);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Serve until shutdown is triggered, then hand the app back
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(
            host.parse()
                .with_context(|| format!("Invalid server host: {}", host))?,
            port,
        );

        let router = router(app.executor.clone(), app.books.clone(), &allowed_origins);

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}

/// Build the full application router
pub fn router(
    executor: Arc<dyn SqlExecutor>,
    books: Arc<BookService>,
    allowed_origins: &AllowedOrigins,
) -> Router {
    Router::new()
        .merge(health::routes(executor, books.clone()))
        .route("/api/openapi.json", get(openapi_json))
        .nest("/api/v1/books", books::routes(books.clone()))
        .nest("/api/v1/authors", authors::routes(books.clone()))
        .nest("/api/v1", catalog::routes(books))
        .method_not_allowed_fallback(middleware::handle_405)
        .fallback(middleware::handle_404)
        .layer(axum::middleware::from_fn(middleware::request_logging))
        .layer(CompressionLayer::new())
        .layer(middleware::cors(allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::core::constants::{REQUEST_ID_HEADER, REQUEST_ID_LEN};
    use crate::data::SqliteExecutor;

    async fn setup() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let executor = Arc::new(SqliteExecutor::init(dir.path().join("db.sqlite")).await.unwrap());
        let books = Arc::new(BookService::new(executor.clone()));
        let origins = AllowedOrigins::new(["http://localhost:3000"]);
        (router(executor, books, &origins), dir)
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, axum::http::HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    async fn create(router: &Router, book: Value) -> Value {
        let (status, _, body) =
            send(router, Method::POST, "/api/v1/books", Some(&book.to_string())).await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn test_list_empty_catalog() {
        let (router, _dir) = setup().await;
        let (status, _, body) = send(&router, Method::GET, "/api/v1/books", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["books"], json!([]));
        assert_eq!(body["pagination"]["total_count"], 0);
        assert_eq!(body["pagination"]["total_pages"], 0);
        assert_eq!(body["pagination"]["has_next"], false);
        assert_eq!(body["pagination"]["has_prev"], false);
        assert_eq!(body["filters_applied"], json!({}));
    }

    #[tokio::test]
    async fn test_list_rejects_bad_paging() {
        let (router, _dir) = setup().await;

        let (status, _, body) = send(&router, Method::GET, "/api/v1/books?page=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");

        let (status, _, _) = send(&router, Method::GET, "/api/v1/books?page_size=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) = send(&router, Method::GET, "/api/v1/books?page=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let (router, _dir) = setup().await;

        let created = create(
            &router,
            json!({ "title": "Dune", "author": "Frank Herbert", "pages": 412 }),
        )
        .await;
        assert_eq!(created["message"], "Book created successfully");
        assert_eq!(created["book"]["title"], "Dune");
        let id = created["book"]["id"].as_i64().unwrap();

        let (status, _, book) =
            send(&router, Method::GET, &format!("/api/v1/books/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(book["author"], "Frank Herbert");

        let (status, _, updated) = send(
            &router,
            Method::PUT,
            &format!("/api/v1/books/{}", id),
            Some(r#"{"title": "Dune Messiah"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["message"], "Book updated successfully");
        assert_eq!(updated["book"]["title"], "Dune Messiah");
        assert_eq!(updated["book"]["author"], "Frank Herbert");

        let (status, _, deleted) =
            send(&router, Method::DELETE, &format!("/api/v1/books/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["message"], "Book deleted successfully");

        let (status, _, body) =
            send(&router, Method::GET, &format!("/api/v1/books/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "BOOK_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_list_with_filters_and_pagination() {
        let (router, _dir) = setup().await;
        for (title, pages, format) in [
            ("Alpha", 100, "Paperback"),
            ("Beta", 200, "Hardcover"),
            ("Gamma", 300, "Paperback"),
        ] {
            create(
                &router,
                json!({ "title": title, "author": "A", "pages": pages, "format": format }),
            )
            .await;
        }

        let (status, _, body) = send(
            &router,
            Method::GET,
            "/api/v1/books?pages_min=150&format=Paperback&format=Hardcover&order_by=pages&order_direction=DESC",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<&str> = body["books"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Gamma", "Beta"]);
        assert_eq!(body["filters_applied"]["pages"], json!({ "min": 150 }));

        let (_, _, body) = send(&router, Method::GET, "/api/v1/books?page_size=2&page=2", None).await;
        assert_eq!(body["pagination"]["total_pages"], 2);
        assert_eq!(body["pagination"]["has_prev"], true);
        assert_eq!(body["pagination"]["has_next"], false);
        assert_eq!(body["books"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_bodies() {
        let (router, _dir) = setup().await;

        let (status, _, body) = send(&router, Method::POST, "/api/v1/books", Some("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "EMPTY_BODY");

        let (status, _, _) = send(&router, Method::POST, "/api/v1/books", Some("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, body) =
            send(&router, Method::POST, "/api/v1/books", Some(r#"{"title": "x"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_DATA");

        let (status, _, body) = send(
            &router,
            Method::POST,
            "/api/v1/books",
            Some(r#"{"title": "Dune", "author": "Frank Herbert", "isbn13": "978-0441013593"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Field isbn13 must be an integer");

        let (_, _, body) = send(&router, Method::GET, "/api/v1/books", None).await;
        assert_eq!(body["pagination"]["total_count"], 0);
    }

    #[tokio::test]
    async fn test_unparseable_range_bound_not_applied() {
        let (router, _dir) = setup().await;
        create(&router, json!({ "title": "Dune", "author": "A", "pages": 412 })).await;

        let (status, _, body) =
            send(&router, Method::GET, "/api/v1/books?pages_min=abc", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["filters_applied"], json!({}));
        assert_eq!(body["books"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_and_non_integer_ids() {
        let (router, _dir) = setup().await;

        let (status, _, _) = send(&router, Method::GET, "/api/v1/books/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, body) = send(&router, Method::GET, "/api/v1/books/abc", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");

        let (status, _, _) = send(
            &router,
            Method::PUT,
            "/api/v1/books/999",
            Some(r#"{"title": "x"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, _) = send(&router, Method::DELETE, "/api/v1/books/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_browse_and_lookup_endpoints() {
        let (router, _dir) = setup().await;
        create(
            &router,
            json!({
                "title": "Dune",
                "author": "Frank Herbert",
                "author_slug": "frank-herbert",
                "subjects": "Science Fiction, Ecology",
                "publisher": "Chilton"
            }),
        )
        .await;

        let (_, _, body) = send(&router, Method::GET, "/api/v1/books/author/frank-herbert", None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (_, _, body) = send(&router, Method::GET, "/api/v1/books/subjects/ecology", None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (_, _, body) = send(&router, Method::GET, "/api/v1/subjects", None).await;
        assert_eq!(body, json!(["Ecology", "Science Fiction"]));

        let (_, _, body) = send(&router, Method::GET, "/api/v1/publishers", None).await;
        assert_eq!(body, json!(["Chilton"]));

        let (status, _, body) = send(&router, Method::GET, "/api/v1/filter-options", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["multi_value_filters"], json!(["format"]));

        let (status, _, body) = send(&router, Method::GET, "/api/v1/authors", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_fallbacks_return_json() {
        let (router, _dir) = setup().await;

        let (status, _, body) = send(&router, Method::GET, "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, _, body) = send(&router, Method::POST, "/health", Some("{}")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "method_not_allowed");
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let (router, _dir) = setup().await;
        let (_, headers, _) = send(&router, Method::GET, "/api/v1/books", None).await;
        let id = headers.get(REQUEST_ID_HEADER).unwrap().to_str().unwrap();
        assert_eq!(id.len(), REQUEST_ID_LEN);
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (router, _dir) = setup().await;

        let (status, _, body) = send(&router, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "Book API");

        let (status, _, body) = send(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["database"]["status"], "healthy");
        assert_eq!(body["checks"]["book_service"]["status"], "healthy");

        let (status, _, body) = send(&router, Method::GET, "/health/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");

        let (status, _, body) = send(&router, Method::GET, "/health/live", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "alive");

        let (status, _, body) = send(&router, Method::GET, "/favicon.ico", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let (router, _dir) = setup().await;
        let (status, _, body) = send(&router, Method::GET, "/api/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/v1/books"].is_object());
        assert!(body["paths"]["/api/v1/books/{id}"].is_object());
    }
}
