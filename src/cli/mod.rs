//! CLI module
//!
//! Command-line interface for the catalog service.
//!
//! # Commands
//!
//! - `serve` - Create the schema and start the HTTP server
//! - `setup` - Create the schema and exit
//! - `import-authors` - Bulk-load authors from a CSV file

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
