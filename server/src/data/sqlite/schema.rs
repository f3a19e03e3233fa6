//! SQLite schema definitions
//!
//! Bootstrap only: tables are created when missing, existing tables are left
//! untouched. There is no version tracking.

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Authors
-- =============================================================================
CREATE TABLE IF NOT EXISTS author (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    slug TEXT,
    biography TEXT
);

CREATE INDEX IF NOT EXISTS idx_author_slug ON author(slug);

-- =============================================================================
-- Books (column order is the decode order)
-- =============================================================================
CREATE TABLE IF NOT EXISTS book (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    author TEXT,
    author_id INTEGER REFERENCES author(id),
    author_bio TEXT,
    authors TEXT,
    title_slug TEXT,
    author_slug TEXT,
    isbn13 INTEGER,
    isbn10 TEXT,
    price TEXT,
    format TEXT,
    publisher TEXT,
    pubdate TEXT,
    edition TEXT,
    subjects TEXT,
    lexile TEXT,
    pages INTEGER,
    dimensions TEXT,
    overview TEXT,
    excerpt TEXT,
    synopsis TEXT,
    toc TEXT,
    editorial_reviews TEXT
);

CREATE INDEX IF NOT EXISTS idx_book_author_slug ON book(author_slug);
CREATE INDEX IF NOT EXISTS idx_book_publisher ON book(publisher);
"#;
