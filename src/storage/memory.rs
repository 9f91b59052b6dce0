//! In-memory storage
//!
//! Mirrors the relational backend's filter and pagination semantics over
//! plain vectors. Intended for tests only: there is no transaction
//! isolation, inserts assign `len + 1` as the new id, and concurrent
//! writers see each other's partial work at call granularity only.

use super::Storage;
use crate::error::{Error, Result};
use crate::filter::FilterSet;
use crate::pagination::Cursor;
use crate::types::{Author, Book, NewBook};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    authors: Vec<Author>,
    books: Vec<Book>,
    /// Author ids per book id, in insertion order
    author_books: HashMap<u64, Vec<u64>>,
}

/// Vector-backed [`Storage`] for tests
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: Mutex<Tables>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed authors; they must already be in ascending id order
    pub fn with_authors(mut self, authors: Vec<Author>) -> Self {
        if let Ok(tables) = self.tables.get_mut() {
            tables.authors = authors;
        }
        self
    }

    /// Seed books; each book's `author_ids` become its relation rows
    pub fn with_books(mut self, books: Vec<Book>) -> Self {
        if let Ok(tables) = self.tables.get_mut() {
            tables.author_books = books
                .iter()
                .map(|book| (book.id, book.author_ids.clone()))
                .collect();
            tables.books = books;
        }
        self
    }

    /// Number of stored books
    pub fn book_count(&self) -> Result<usize> {
        Ok(self.lock()?.books.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| Error::storage("in-memory tables poisoned"))
    }
}

/// Filter, skip `page_id` positions, truncate to `limit`
fn page<'a, T: 'static>(rows: &'a [T], cursor: Cursor, filters: &'a FilterSet<T>) -> Vec<&'a T> {
    filters
        .apply(rows)
        .skip(usize::try_from(cursor.page_id()).unwrap_or(usize::MAX))
        .take(cursor.limit_usize())
        .collect()
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn fetch_authors(
        &self,
        cursor: Cursor,
        filters: &FilterSet<Author>,
    ) -> Result<Vec<Author>> {
        let tables = self.lock()?;
        Ok(page(&tables.authors, cursor, filters)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn fetch_books(&self, cursor: Cursor, filters: &FilterSet<Book>) -> Result<Vec<Book>> {
        let tables = self.lock()?;
        let books = page(&tables.books, cursor, filters)
            .into_iter()
            .map(|book| Book {
                author_ids: tables
                    .author_books
                    .get(&book.id)
                    .cloned()
                    .unwrap_or_default(),
                ..book.clone()
            })
            .collect();
        Ok(books)
    }

    async fn insert_author(&self, name: &str) -> Result<Author> {
        let mut tables = self.lock()?;
        let author = Author::new(tables.authors.len() as u64 + 1, name);
        tables.authors.push(author.clone());
        Ok(author)
    }

    async fn insert_book(&self, book: &NewBook) -> Result<Book> {
        let mut tables = self.lock()?;

        // Reject before touching any table, matching the relational foreign key.
        if let Some(missing) = book
            .author_ids
            .iter()
            .find(|id| !tables.authors.iter().any(|author| author.id == **id))
        {
            return Err(Error::storage(format!(
                "author {missing} does not exist"
            )));
        }

        let created = Book::from_new(tables.books.len() as u64 + 1, book);
        tables
            .author_books
            .insert(created.id, created.author_ids.clone());
        tables.books.push(created.clone());
        Ok(created)
    }
}
