//! CLI commands and argument parsing

use crate::config::{
    AppConfig, DatabaseConfig, DEFAULT_DATABASE, DEFAULT_POOL_SIZE, DEFAULT_PORT,
    DEFAULT_QUERY_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS,
};
use crate::pagination::{NextPagePolicy, DEFAULT_LIMIT};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Book catalog HTTP service
#[derive(Parser, Debug)]
#[command(name = "catalog-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// DuckDB database file (`:memory:` for a throwaway database)
    #[arg(long, global = true, env = "DB_NAME", default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Maximum concurrently open database connections
    #[arg(long, global = true, env = "DB_POOL_SIZE", default_value_t = DEFAULT_POOL_SIZE)]
    pub pool_size: usize,

    /// Deadline for a single storage operation, in milliseconds
    #[arg(long, global = true, env = "QUERY_TIMEOUT_MS", default_value_t = DEFAULT_QUERY_TIMEOUT_MS)]
    pub query_timeout_ms: u64,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the schema and start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Page size when a request omits `limit`
        #[arg(long, env = "DEFAULT_LIMIT", default_value_t = DEFAULT_LIMIT)]
        default_limit: u32,

        /// Deadline for a whole request, in milliseconds
        #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
        request_timeout_ms: u64,

        /// When to advertise a next page
        #[arg(long, env = "NEXT_PAGE_POLICY", value_enum, default_value_t = NextPagePolicy::AnyNonEmpty)]
        next_page: NextPagePolicy,
    },

    /// Create the schema and exit
    Setup,

    /// Import authors from a CSV file whose first column is the name
    ImportAuthors {
        /// CSV file to import
        #[arg(long)]
        csv: PathBuf,
    },
}

impl Cli {
    /// Database settings shared by every command
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            path: self.database.clone(),
            pool_size: self.pool_size,
            query_timeout: Duration::from_millis(self.query_timeout_ms),
        }
    }

    /// Service settings for `serve`; `None` for other commands
    pub fn app_config(&self) -> Option<AppConfig> {
        match &self.command {
            Commands::Serve {
                port,
                default_limit,
                request_timeout_ms,
                next_page,
            } => Some(AppConfig {
                database: self.database_config(),
                port: *port,
                default_limit: *default_limit,
                request_timeout: Duration::from_millis(*request_timeout_ms),
                next_page: *next_page,
            }),
            _ => None,
        }
    }
}
