// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Catalog API
//!
//! An HTTP service over a small book catalog: paginated, filterable
//! listings of authors and books, and book creation with author links.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use catalog_api::{config::AppConfig, server};
//!
//! #[tokio::main]
//! async fn main() -> catalog_api::Result<()> {
//!     server::serve(AppConfig::default()).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  server: router, handlers, envelope                         │
//! │  GET /authors   GET /books   POST /books   GET /health      │
//! └────────────────────────────────────────────────────────────┘
//!                │                    │
//! ┌──────────────┴──────┐  ┌──────────┴───────────────────────┐
//! │ pagination: cursor  │  │ filter: per-entity filter tables │
//! └──────────────┬──────┘  └──────────┬───────────────────────┘
//!                └────────┬───────────┘
//! ┌───────────────────────┴────────────────────────────────────┐
//! │  storage: Storage trait                                    │
//! │  MemoryStorage (tests)      DatabaseEngine (DuckDB pool)   │
//! └────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the catalog
pub mod error;

/// Catalog entities and request types
pub mod types;

/// Cursor decoding and next-page computation
pub mod pagination;

/// Declarative list filters
pub mod filter;

/// Storage trait and in-memory realization
pub mod storage;

/// DuckDB-backed storage
pub mod database;

/// HTTP server
pub mod server;

/// Service configuration
pub mod config;

/// CSV author import
pub mod import;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
