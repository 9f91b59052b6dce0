//! Bounded DuckDB connection pool
//!
//! A fixed number of connections share one database instance. Callers
//! beyond the ceiling wait on a semaphore; there is no queue limit and no
//! acquire timeout.

use crate::error::{Error, Result};
use duckdb::Connection;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

struct PoolInner {
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
    size: usize,
}

/// Fixed-size pool of connections to one DuckDB database
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("size", &self.inner.size)
            .field("available", &self.available())
            .finish()
    }
}

impl ConnectionPool {
    /// Build a pool of `size` connections cloned from `first`
    pub fn new(first: Connection, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::invalid_config(
                "pool_size",
                "must be greater than zero",
            ));
        }

        let mut connections = Vec::with_capacity(size);
        for _ in 1..size {
            connections.push(first.try_clone()?);
        }
        connections.push(first);

        Ok(Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(connections),
                permits: Arc::new(Semaphore::new(size)),
                size,
            }),
        })
    }

    /// Open an in-memory database
    pub fn open_in_memory(size: usize) -> Result<Self> {
        Self::new(Connection::open_in_memory()?, size)
    }

    /// Open (or create) a database file
    pub fn open(path: &str, size: usize) -> Result<Self> {
        Self::new(Connection::open(path)?, size)
    }

    /// Wait for a free connection
    pub async fn acquire(&self) -> Result<PooledConnection> {
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|_| Error::pool("connection pool closed"))?;

        let conn = self
            .inner
            .idle
            .lock()
            .map_err(|_| Error::pool("connection pool poisoned"))?
            .pop()
            .ok_or_else(|| Error::pool("no idle connection behind a free permit"))?;

        Ok(PooledConnection {
            conn: Some(conn),
            pool: Arc::clone(&self.inner),
            _permit: permit,
        })
    }

    /// Pool ceiling
    pub fn size(&self) -> usize {
        self.inner.size
    }

    /// Connections not currently checked out
    pub fn available(&self) -> usize {
        self.inner.permits.available_permits()
    }
}

/// A connection checked out of a [`ConnectionPool`]
///
/// Returned to the pool when dropped.
pub struct PooledConnection {
    conn: Option<Connection>,
    pool: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn
            .as_ref()
            .unwrap_or_else(|| unreachable!("connection is only taken on drop"))
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn
            .as_mut()
            .unwrap_or_else(|| unreachable!("connection is only taken on drop"))
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            match self.pool.idle.lock() {
                Ok(mut idle) => idle.push(conn),
                Err(_) => tracing::error!("connection pool poisoned; dropping connection"),
            }
        }
        // The permit is released after the connection is back in the idle set.
    }
}
