//! Domain logic for the book catalog
//!
//! - `books` - Book record service, filter registry and listing types

pub mod books;

pub use books::{BookService, CatalogError};
