//! Relational storage via DuckDB
//!
//! This module provides the production [`Storage`](crate::storage::Storage)
//! realization: an embedded DuckDB database (file-backed or `:memory:`)
//! reached through a bounded connection pool.

mod engine;
mod pool;
mod query;
mod schema;

pub use engine::DatabaseEngine;
pub use pool::{ConnectionPool, PooledConnection};
pub use query::PageQuery;
pub use schema::SCHEMA_SQL;
