use empathy_core::errors::StoreResult;
use empathy_core::traits::{IWatchedTransaction, StoreOp, TxOutcome};

use super::pool::PooledConnection;
use super::{atomic_pipeline, op_results, to_store_err};

/// `WATCH`ed connection. `EXEC` returning nil means a watched key changed.
pub(crate) struct RedisTransaction<'a> {
    conn: PooledConnection<'a>,
    watching: bool,
}

impl<'a> RedisTransaction<'a> {
    pub fn new(conn: PooledConnection<'a>) -> Self {
        Self {
            conn,
            watching: true,
        }
    }
}

impl IWatchedTransaction for RedisTransaction<'_> {
    fn get(&mut self, key: &str) -> StoreResult<Option<String>> {
        redis::cmd("GET")
            .arg(key)
            .query(&mut *self.conn)
            .map_err(|e| to_store_err(e, Some(key)))
    }

    fn exec(&mut self, ops: &[StoreOp]) -> StoreResult<TxOutcome> {
        let pipe = atomic_pipeline(ops);
        let reply: Option<Vec<redis::Value>> = pipe.query(&mut *self.conn).map_err(|e| {
            self.conn.mark_broken();
            to_store_err(e, None)
        })?;
        // EXEC clears the watch whether or not it committed.
        self.watching = false;
        match reply {
            Some(replies) => Ok(TxOutcome::Committed(op_results(ops, &replies)?)),
            None => Ok(TxOutcome::Conflict),
        }
    }

    fn unwatch(&mut self) -> StoreResult<()> {
        if !self.watching {
            return Ok(());
        }
        self.watching = false;
        redis::cmd("UNWATCH")
            .query::<()>(&mut *self.conn)
            .map_err(|e| {
                self.conn.mark_broken();
                to_store_err(e, None)
            })
    }
}

impl Drop for RedisTransaction<'_> {
    fn drop(&mut self) {
        if self.watching {
            if let Err(e) = self.unwatch() {
                tracing::warn!(error = %e, "failed to release watch");
            }
        }
    }
}
