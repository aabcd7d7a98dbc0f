use empathy_core::errors::StoreResult;
use empathy_core::traits::{IKeyValueStore, IWatchedTransaction, StoreOp, TxOutcome};

use super::InMemoryStore;

/// Watch snapshot over the in-memory keyspace: the version of every watched
/// key at `watch` time, compared again under the lock at `exec`.
pub(crate) struct MemoryTransaction<'a> {
    store: &'a InMemoryStore,
    watched: Vec<(String, u64)>,
}

impl<'a> MemoryTransaction<'a> {
    pub fn new(store: &'a InMemoryStore, watched: Vec<(String, u64)>) -> Self {
        Self { store, watched }
    }
}

impl IWatchedTransaction for MemoryTransaction<'_> {
    fn get(&mut self, key: &str) -> StoreResult<Option<String>> {
        self.store.get(key)
    }

    fn exec(&mut self, ops: &[StoreOp]) -> StoreResult<TxOutcome> {
        let outcome = match self.store.apply_if_unchanged(&self.watched, ops)? {
            Some(results) => TxOutcome::Committed(results),
            None => TxOutcome::Conflict,
        };
        // EXEC always releases the watch.
        self.watched.clear();
        Ok(outcome)
    }

    fn unwatch(&mut self) -> StoreResult<()> {
        self.watched.clear();
        Ok(())
    }
}
