// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Catalog";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "catalog";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".catalog";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "catalog.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "CATALOG_CONFIG";

// =============================================================================
// Environment Variables - Debug
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "CATALOG_DEBUG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "CATALOG_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "CATALOG_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "CATALOG_LOG";

/// Environment variable for allowed CORS origins (comma-separated)
pub const ENV_CORS_ORIGINS: &str = "CATALOG_CORS_ORIGINS";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5000;

/// Default allowed CORS origins
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:3000", "http://frontend:3000"];

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable for the SQLite database file
pub const ENV_DATABASE_PATH: &str = "CATALOG_DATABASE_PATH";

/// Default SQLite database file (relative to the working directory)
pub const DEFAULT_DATABASE_PATH: &str = "db.sqlite";

// =============================================================================
// SQLite Database
// =============================================================================

/// Busy timeout in seconds (wait for locks before failing)
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Pagination
// =============================================================================

/// Page size when the request does not set one
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page size a list request may ask for
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page size for the author and subject browse endpoints
pub const BROWSE_PAGE_SIZE: i64 = 100;

// =============================================================================
// Request Handling
// =============================================================================

/// Default max request body size (1 MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Response header carrying the request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Length of generated request ids
pub const REQUEST_ID_LEN: usize = 8;

/// Requests slower than this are logged at warn level
pub const SLOW_REQUEST_THRESHOLD_MS: u128 = 1000;
