//! Small pool of Redis connections.
//!
//! Each call checks out its own connection, so a blocking `BLPOP`/`XREAD` or an
//! open `WATCH` never holds up other callers. Broken connections are dropped
//! instead of being returned.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;
use std::time::Duration;

use empathy_core::errors::{StoreError, StoreResult};

use super::to_store_err;

pub(crate) struct ConnectionPool {
    client: redis::Client,
    idle: Mutex<Vec<redis::Connection>>,
    max_idle: usize,
    connect_timeout: Duration,
}

impl ConnectionPool {
    pub fn new(client: redis::Client, max_idle: usize, connect_timeout: Duration) -> Self {
        Self {
            client,
            idle: Mutex::new(Vec::with_capacity(max_idle)),
            max_idle: max_idle.max(1),
            connect_timeout,
        }
    }

    pub fn checkout(&self) -> StoreResult<PooledConnection<'_>> {
        let reused = self
            .idle
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?
            .pop();
        let conn = match reused {
            Some(conn) => conn,
            None => self
                .client
                .get_connection_with_timeout(self.connect_timeout)
                .map_err(|e| to_store_err(e, None))?,
        };
        Ok(PooledConnection {
            pool: self,
            conn: Some(conn),
            broken: false,
        })
    }

    /// Run `f` on a pooled connection, discarding the connection if `f` hits
    /// a connection-level failure.
    pub fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut redis::Connection) -> redis::RedisResult<T>,
    {
        let mut conn = self.checkout()?;
        f(&mut *conn).map_err(|e| {
            if e.is_io_error() || e.is_connection_dropped() || e.is_timeout() {
                conn.mark_broken();
            }
            e
        })
        .map_err(|e| to_store_err(e, None))
    }

    fn give_back(&self, conn: redis::Connection) {
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < self.max_idle {
                idle.push(conn);
            }
        }
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }
}

pub(crate) struct PooledConnection<'a> {
    pool: &'a ConnectionPool,
    conn: Option<redis::Connection>,
    broken: bool,
}

impl PooledConnection<'_> {
    pub fn mark_broken(&mut self) {
        self.broken = true;
    }
}

impl Deref for PooledConnection<'_> {
    type Target = redis::Connection;

    fn deref(&self) -> &Self::Target {
        self.conn.as_ref().expect("connection present until drop")
    }
}

impl DerefMut for PooledConnection<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_mut().expect("connection present until drop")
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if !self.broken {
                self.pool.give_back(conn);
            }
        }
    }
}
