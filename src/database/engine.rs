//! DuckDB-backed catalog storage
//!
//! Every operation checks a connection out of the pool, runs on the
//! blocking thread pool and is bounded by the configured query deadline.

use super::pool::ConnectionPool;
use super::query::{placeholders, PageQuery};
use super::schema::SCHEMA_SQL;
use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::filter::FilterSet;
use crate::pagination::Cursor;
use crate::storage::Storage;
use crate::types::{Author, Book, NewBook};
use async_trait::async_trait;
use duckdb::{params, params_from_iter, Connection, Transaction};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Relational [`Storage`] on DuckDB
#[derive(Debug, Clone)]
pub struct DatabaseEngine {
    pool: ConnectionPool,
    query_timeout: Duration,
    /// Database path used (for logging)
    path: String,
}

impl DatabaseEngine {
    /// Open the configured database; does not create tables
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        config.validate()?;

        let pool = if config.is_in_memory() {
            ConnectionPool::open_in_memory(config.pool_size)?
        } else {
            ConnectionPool::open(&config.path, config.pool_size)?
        };

        tracing::info!(
            path = %config.path,
            pool_size = config.pool_size,
            "DB connection success"
        );

        Ok(Self {
            pool,
            query_timeout: config.query_timeout,
            path: config.path.clone(),
        })
    }

    /// Open and create the catalog tables
    pub async fn open_with_schema(config: &DatabaseConfig) -> Result<Self> {
        let engine = Self::open(config)?;
        engine.setup().await?;
        Ok(engine)
    }

    /// Create sequences and tables if they do not exist
    pub async fn setup(&self) -> Result<()> {
        tracing::info!("Creating author, book and author_book tables...");
        self.run_write("setup", |conn, _| {
            conn.execute_batch(SCHEMA_SQL)?;
            Ok(())
        })
        .await
    }

    /// Check the database answers
    pub async fn check_connection(&self) -> Result<()> {
        self.run("check", |conn, _| {
            conn.execute_batch("SELECT 1")?;
            Ok(())
        })
        .await
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Run a read on a pooled connection within the query deadline.
    ///
    /// When the deadline passes the caller gets `Timeout` at once; the
    /// blocking call finishes in the background and its connection then
    /// returns to the pool.
    async fn run<F, R>(&self, op: &'static str, f: F) -> Result<R>
    where
        F: FnOnce(&mut Connection, Deadline) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        self.execute(op, Completion::Abandon, f).await
    }

    /// Run a write within the query deadline.
    ///
    /// The write commits only if the [`Deadline`] still holds, and the
    /// caller waits for that verdict, so the result returned always agrees
    /// with what was persisted.
    async fn run_write<F, R>(&self, op: &'static str, f: F) -> Result<R>
    where
        F: FnOnce(&mut Connection, Deadline) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        self.execute(op, Completion::Settle, f).await
    }

    async fn execute<F, R>(&self, op: &'static str, completion: Completion, f: F) -> Result<R>
    where
        F: FnOnce(&mut Connection, Deadline) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let deadline = Deadline::after(self.query_timeout);
        let timeout_ms = deadline.timeout_ms;
        let expires = tokio::time::Instant::from_std(deadline.at);

        let mut conn = tokio::time::timeout_at(expires, self.pool.acquire())
            .await
            .map_err(|_| Error::Timeout { timeout_ms })??;

        let mut task = tokio::task::spawn_blocking(move || f(&mut *conn, deadline));

        let joined = match tokio::time::timeout_at(expires, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                tracing::warn!(op, timeout_ms, "storage operation exceeded its deadline");
                match completion {
                    Completion::Abandon => return Err(Error::Timeout { timeout_ms }),
                    Completion::Settle => task.await,
                }
            }
        };

        joined.map_err(|join_err| Error::storage(format!("{op} task failed: {join_err}")))?
    }
}

/// What the caller does once the query deadline passes
#[derive(Debug, Clone, Copy)]
enum Completion {
    /// Return `Timeout` without waiting for the blocking call
    Abandon,
    /// Wait for the blocking call, which rolls back past its deadline
    Settle,
}

// ============================================================================
// Blocking operations
// ============================================================================

/// Point in time after which a storage operation must not commit
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    timeout_ms: u64,
}

impl Deadline {
    fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    fn check(self) -> Result<()> {
        if Instant::now() >= self.at {
            Err(Error::Timeout {
                timeout_ms: self.timeout_ms,
            })
        } else {
            Ok(())
        }
    }

    /// Commit `tx` if the deadline still holds; otherwise drop it, which
    /// rolls it back.
    fn commit(self, tx: Transaction<'_>) -> Result<()> {
        if let Err(err) = self.check() {
            tracing::warn!(
                timeout_ms = self.timeout_ms,
                "deadline passed before commit, rolling back"
            );
            return Err(err);
        }
        tx.commit().map_err(|e| {
            tracing::error!("Failing commit changes in db: {e}");
            Error::from(e)
        })
    }
}

fn to_id(value: i64) -> u64 {
    value as u64
}

fn select_authors(conn: &Connection, query: &PageQuery) -> Result<Vec<Author>> {
    tracing::debug!("Executing query: {}", query.sql);
    let mut stmt = conn.prepare(&query.sql)?;
    let authors = stmt
        .query_map(params_from_iter(query.params.iter()), |row| {
            Ok(Author::new(to_id(row.get(0)?), row.get::<_, String>(1)?))
        })?
        .collect::<duckdb::Result<Vec<_>>>()?;
    Ok(authors)
}

fn select_books(conn: &Connection, query: &PageQuery) -> Result<Vec<Book>> {
    tracing::debug!("Executing query: {}", query.sql);
    let mut stmt = conn.prepare(&query.sql)?;
    let books = stmt
        .query_map(params_from_iter(query.params.iter()), |row| {
            Ok(Book {
                id: to_id(row.get(0)?),
                name: row.get(1)?,
                edition: row.get::<_, i64>(2)? as u32,
                publication_year: row.get::<_, i64>(3)? as u32,
                author_ids: Vec::new(),
            })
        })?
        .collect::<duckdb::Result<Vec<_>>>()?;
    Ok(books)
}

/// Fill `author_ids` for every book with a single relation lookup
fn join_author_ids(conn: &Connection, books: &mut [Book]) -> Result<()> {
    if books.is_empty() {
        return Ok(());
    }

    let sql = format!(
        "SELECT book_id, author_id FROM author_book WHERE book_id IN ({}) ORDER BY id",
        placeholders(books.len())
    );
    let book_ids: Vec<i64> = books.iter().map(|book| book.id as i64).collect();

    let mut stmt = conn.prepare(&sql)?;
    let pairs = stmt
        .query_map(params_from_iter(book_ids.iter()), |row| {
            Ok((to_id(row.get(0)?), to_id(row.get(1)?)))
        })?
        .collect::<duckdb::Result<Vec<(u64, u64)>>>()?;

    let mut by_book: HashMap<u64, Vec<u64>> = HashMap::new();
    for (book_id, author_id) in pairs {
        by_book.entry(book_id).or_default().push(author_id);
    }
    for book in books.iter_mut() {
        book.author_ids = by_book.remove(&book.id).unwrap_or_default();
    }
    Ok(())
}

/// Insert the book and its relation rows in one transaction.
///
/// The transaction rolls back when dropped, so every early return below
/// leaves no book row behind; only the final `commit` persists anything.
fn insert_book_tx(conn: &mut Connection, book: &NewBook, deadline: Deadline) -> Result<Book> {
    let tx = conn.transaction()?;

    let book_id: i64 = tx
        .query_row(
            "INSERT INTO book (name, edition, publication_year) VALUES (?, ?, ?) RETURNING id",
            params![
                book.name,
                i64::from(book.edition),
                i64::from(book.publication_year)
            ],
            |row| row.get(0),
        )
        .map_err(|e| {
            tracing::error!(name = %book.name, "Failing inserting new book: {e}");
            Error::from(e)
        })?;

    {
        let mut stmt = tx.prepare("INSERT INTO author_book (author_id, book_id) VALUES (?, ?)")?;
        for author_id in &book.author_ids {
            stmt.execute(params![*author_id as i64, book_id])
                .map_err(|e| {
                    tracing::error!(
                        author_id,
                        book_id,
                        "Failing inserting author_book relationship: {e}"
                    );
                    Error::from(e)
                })?;
        }
    }

    deadline.commit(tx)?;

    Ok(Book::from_new(to_id(book_id), book))
}

// ============================================================================
// Storage implementation
// ============================================================================

#[async_trait]
impl Storage for DatabaseEngine {
    async fn fetch_authors(
        &self,
        cursor: Cursor,
        filters: &FilterSet<Author>,
    ) -> Result<Vec<Author>> {
        let query = PageQuery::build("author", "id, name", cursor, filters);
        self.run("fetch_authors", move |conn, _| select_authors(conn, &query))
            .await
    }

    async fn fetch_books(&self, cursor: Cursor, filters: &FilterSet<Book>) -> Result<Vec<Book>> {
        let query = PageQuery::build(
            "book",
            "id, name, edition, publication_year",
            cursor,
            filters,
        );
        self.run("fetch_books", move |conn, _| {
            let mut books = select_books(conn, &query)?;
            join_author_ids(conn, &mut books)?;
            Ok(books)
        })
        .await
    }

    async fn insert_author(&self, name: &str) -> Result<Author> {
        let name = name.to_string();
        self.run_write("insert_author", move |conn, deadline| {
            let tx = conn.transaction()?;
            let id: i64 = tx.query_row(
                "INSERT INTO author (name) VALUES (?) RETURNING id",
                params![name],
                |row| row.get(0),
            )?;
            deadline.commit(tx)?;
            Ok(Author::new(to_id(id), name))
        })
        .await
    }

    async fn insert_book(&self, book: &NewBook) -> Result<Book> {
        let book = book.clone();
        self.run_write("insert_book", move |conn, deadline| {
            insert_book_tx(conn, &book, deadline)
        })
            .await
    }
}
