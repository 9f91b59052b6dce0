//! Storage module
//!
//! The capability interface every catalog backend implements, and the
//! in-memory realization used by tests.
//!
//! # Overview
//!
//! Request handlers only see `Arc<dyn Storage>`. Production wiring hands
//! them a [`DatabaseEngine`](crate::database::DatabaseEngine); tests hand
//! them a [`MemoryStorage`]. Both apply filters first, then the cursor
//! position, then truncate to the cursor limit, and both return rows in
//! ascending id order.

mod memory;

pub use memory::MemoryStorage;

use crate::error::Result;
use crate::filter::FilterSet;
use crate::pagination::Cursor;
use crate::types::{Author, Book, NewBook};
use async_trait::async_trait;

/// A catalog backend
///
/// Failures are never retried and never accompanied by partial results.
#[async_trait]
pub trait Storage: Send + Sync {
    /// One page of authors matching `filters`
    async fn fetch_authors(&self, cursor: Cursor, filters: &FilterSet<Author>)
        -> Result<Vec<Author>>;

    /// One page of books matching `filters`, each with its author ids
    ///
    /// Author ids are looked up in one batch for the whole page.
    async fn fetch_books(&self, cursor: Cursor, filters: &FilterSet<Book>) -> Result<Vec<Book>>;

    /// Insert one author
    async fn insert_author(&self, name: &str) -> Result<Author>;

    /// Insert a book and one relation row per author, all or nothing
    async fn insert_book(&self, book: &NewBook) -> Result<Book>;
}
