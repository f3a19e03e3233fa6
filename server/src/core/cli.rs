use clap::Parser;

use std::path::PathBuf;

use super::constants::{
    ENV_CONFIG, ENV_CORS_ORIGINS, ENV_DATABASE_PATH, ENV_DEBUG, ENV_HOST, ENV_PORT,
};

#[derive(Parser)]
#[command(name = "catalog")]
#[command(version, about = "Book catalog HTTP service", long_about = None)]
pub struct Cli {
    /// Server host address
    #[arg(long, short = 'H', env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', env = ENV_PORT)]
    pub port: Option<u16>,

    /// Enable debug mode (verbose logging)
    #[arg(long, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, env = ENV_DATABASE_PATH)]
    pub database_path: Option<PathBuf>,

    /// Allowed CORS origins (comma-separated)
    #[arg(long, env = ENV_CORS_ORIGINS)]
    pub cors_origins: Option<String>,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub cors_origins: Option<String>,
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            debug: cli.debug,
            config: cli.config,
            database_path: cli.database_path,
            cors_origins: cli.cors_origins,
        }
    }
}

/// Parse CLI arguments
pub fn parse() -> CliConfig {
    Cli::parse().into()
}
