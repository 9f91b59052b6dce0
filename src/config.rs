//! Service configuration
//!
//! Settings come from command-line flags with environment fallbacks (see
//! [`crate::cli`]); this module holds the resolved values and checks them
//! before anything is opened or bound.

use crate::error::{Error, Result};
use crate::pagination::{CursorDecoder, NextPagePolicy, DEFAULT_LIMIT};
use std::time::Duration;

/// Database path that selects an in-memory DuckDB instance
pub const IN_MEMORY_DATABASE: &str = ":memory:";

/// Default database file
pub const DEFAULT_DATABASE: &str = "catalog.duckdb";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Default connection pool ceiling
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Default per-query deadline
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5_000;

/// Default per-request deadline
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

// ============================================================================
// Database Config
// ============================================================================

/// Relational storage settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    pub path: String,
    /// Maximum concurrently open connections
    pub pool_size: usize,
    /// Deadline for one storage operation
    pub query_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DATABASE.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            query_timeout: Duration::from_millis(DEFAULT_QUERY_TIMEOUT_MS),
        }
    }
}

impl DatabaseConfig {
    /// In-memory database with default pool settings
    pub fn in_memory() -> Self {
        Self {
            path: IN_MEMORY_DATABASE.to_string(),
            ..Self::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY_DATABASE
    }

    /// Check values before opening the database
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(Error::invalid_config("database", "DB name couldn't be empty"));
        }
        if self.pool_size == 0 {
            return Err(Error::invalid_config(
                "pool_size",
                "must be greater than zero",
            ));
        }
        if self.query_timeout.is_zero() {
            return Err(Error::invalid_config(
                "query_timeout_ms",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// App Config
// ============================================================================

/// Everything `serve` needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub port: u16,
    /// Page size used when a request omits `limit`
    pub default_limit: u32,
    /// Deadline for a whole HTTP request
    pub request_timeout: Duration,
    pub next_page: NextPagePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            port: DEFAULT_PORT,
            default_limit: DEFAULT_LIMIT,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            next_page: NextPagePolicy::default(),
        }
    }
}

impl AppConfig {
    /// Check every value
    pub fn validate(&self) -> Result<()> {
        self.database.validate()?;
        if self.default_limit == 0 {
            return Err(Error::invalid_config(
                "default_limit",
                "must be a positive integer",
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::invalid_config(
                "request_timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.request_timeout < self.database.query_timeout {
            return Err(Error::invalid_config(
                "request_timeout_ms",
                "must not be shorter than query_timeout_ms",
            ));
        }
        Ok(())
    }

    /// Cursor decoder honouring the configured default limit
    pub fn cursor_decoder(&self) -> Result<CursorDecoder> {
        CursorDecoder::new(self.default_limit)
    }
}
