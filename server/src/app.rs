//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::cli::{self, CliConfig};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME, APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::SqliteExecutor;
use crate::domain::BookService;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub executor: Arc<SqliteExecutor>,
    pub books: Arc<BookService>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();

        let cli_config = cli::parse();
        Self::init_logging(cli_config.debug);

        tracing::debug!("Application starting");
        tracing::trace!(cli = ?cli_config, "Parsed CLI");

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let executor = Arc::new(
            SqliteExecutor::init(&config.database.path)
                .await
                .with_context(|| {
                    format!(
                        "Failed to open database: {}",
                        config.database.path.display()
                    )
                })?,
        );
        let books = Arc::new(BookService::new(executor.clone()));

        Ok(Self {
            shutdown: ShutdownService::new(),
            config,
            executor,
            books,
        })
    }

    fn init_logging(debug: bool) {
        let level = if debug { "debug" } else { "info" };
        let default_filter = format!("{},{}_server={}", level, APP_NAME_LOWER, level);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        tracing::info!(
            host = %app.config.server.host,
            port = app.config.server.port,
            database = %app.executor.path().display(),
            "{} listening",
            APP_NAME
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;

        tracing::info!(database = %app.executor.path().display(), "Shutdown complete");
        Ok(())
    }
}
