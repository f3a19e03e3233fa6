//! API route handlers

pub mod authors;
pub mod books;
pub mod catalog;
pub mod health;
