//! Optimistic compare-and-swap and the contention-safe pattern promotion.

use serde::{Deserialize, Serialize};

use empathy_core::errors::{MemoryError, MemoryResult};
use empathy_core::models::{AccessTier, AgentCredentials, StagedPattern};
use empathy_core::traits::{IKeyValueStore, StoreOp, TxOutcome};
use empathy_observability::transaction_span;

use super::staging::PatternCache;
use crate::context::{decode, StoreContext};
use crate::keys::{require_id, Namespace};

/// What to do with the value read inside a compare-and-swap.
pub enum CasDecision<W, A> {
    /// Apply `ops` atomically, provided the key is still unchanged.
    Write(Vec<StoreOp>, W),
    /// Leave the key alone.
    Abort(A),
}

/// Result of [`compare_and_swap`].
#[derive(Debug, Clone, PartialEq)]
pub enum CasOutcome<W, A> {
    Committed(W),
    Aborted(A),
    /// The key changed between the read and the write. Nothing was applied.
    Conflict,
}

/// Watch `key`, read it, let `decide` choose, then execute iff nothing
/// changed in between.
///
/// Conflicts are returned, not retried; retry policy belongs to the caller.
/// The watch is released on every exit path, including errors from `decide`.
pub fn compare_and_swap<W, A, F>(
    store: &dyn IKeyValueStore,
    key: &str,
    decide: F,
) -> MemoryResult<CasOutcome<W, A>>
where
    F: FnOnce(Option<String>) -> MemoryResult<CasDecision<W, A>>,
{
    let mut tx = store.watch(&[key])?;
    let result = tx.get(key).map_err(MemoryError::from).and_then(|current| {
        match decide(current)? {
            CasDecision::Abort(reason) => Ok(CasOutcome::Aborted(reason)),
            CasDecision::Write(ops, value) => match tx.exec(&ops)? {
                TxOutcome::Committed(_) => Ok(CasOutcome::Committed(value)),
                TxOutcome::Conflict => Ok(CasOutcome::Conflict),
            },
        }
    });
    if let Err(e) = tx.unwatch() {
        tracing::warn!(key = %key, error = %e, "failed to release watch");
    }
    result
}

/// Outcome of [`TransactionManager::atomic_promote_pattern`]. Failures are
/// data: callers branch on `success` and decide whether to retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionOutcome {
    pub success: bool,
    pub pattern: Option<StagedPattern>,
    pub message: String,
}

impl PromotionOutcome {
    pub const PROMOTED: &'static str = "Pattern promoted successfully";
    pub const NOT_FOUND: &'static str = "Pattern not found";
    pub const CONFLICT: &'static str = "Pattern was modified by another process";
    pub const INSUFFICIENT_TIER: &'static str = "Requires VALIDATOR tier or higher";

    fn promoted(pattern: StagedPattern) -> Self {
        Self {
            success: true,
            pattern: Some(pattern),
            message: Self::PROMOTED.to_string(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            pattern: None,
            message: message.into(),
        }
    }
}

enum Abort {
    NotFound,
    BelowThreshold { confidence: f64, min: f64 },
}

pub struct TransactionManager {
    ctx: StoreContext,
    staged: Namespace,
    cache: PatternCache,
}

impl TransactionManager {
    pub fn new(ctx: StoreContext, staged_prefix: impl Into<String>, cache: PatternCache) -> Self {
        Self {
            ctx,
            staged: Namespace::new(staged_prefix),
            cache,
        }
    }

    /// [`compare_and_swap`] against this manager's store.
    pub fn compare_and_swap<W, A, F>(
        &self,
        key: &str,
        decide: F,
    ) -> MemoryResult<CasOutcome<W, A>>
    where
        F: FnOnce(Option<String>) -> MemoryResult<CasDecision<W, A>>,
    {
        compare_and_swap(self.ctx.store(), key, decide)
    }

    /// Promote a staged pattern exactly once under contention.
    ///
    /// Errors only on invalid input or a corrupted record. Everything else,
    /// including an insufficient tier, a missing pattern, a confidence below
    /// `min_confidence`, a concurrent modification, or an unavailable store,
    /// is a `success: false` outcome.
    pub fn atomic_promote_pattern(
        &self,
        pattern_id: &str,
        creds: &AgentCredentials,
        min_confidence: f64,
    ) -> MemoryResult<PromotionOutcome> {
        let _timer = self.ctx.timer("atomic_promote_pattern");
        require_id("pattern_id", pattern_id)?;
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(MemoryError::validation(format!(
                "min_confidence must be between 0.0 and 1.0, got {min_confidence}"
            )));
        }
        if !creds.can_validate() {
            tracing::warn!(agent_id = %creds.agent_id, tier = %creds.tier, "promotion refused");
            return Ok(PromotionOutcome::failed(PromotionOutcome::INSUFFICIENT_TIER));
        }

        let key = self.staged.key(pattern_id);
        let _span = transaction_span!("promote", key).entered();
        let outcome = self.compare_and_swap(&key, |current| {
            let Some(raw) = current else {
                return Ok(CasDecision::Abort(Abort::NotFound));
            };
            let pattern: StagedPattern = decode(&key, &raw)?;
            if pattern.confidence < min_confidence {
                return Ok(CasDecision::Abort(Abort::BelowThreshold {
                    confidence: pattern.confidence,
                    min: min_confidence,
                }));
            }
            Ok(CasDecision::Write(vec![StoreOp::delete(key.clone())], pattern))
        });

        let result = match outcome {
            Ok(CasOutcome::Committed(pattern)) => {
                self.cache.invalidate(pattern_id);
                tracing::info!(agent_id = %creds.agent_id, pattern_id = %pattern_id, "pattern promoted atomically");
                PromotionOutcome::promoted(pattern)
            }
            Ok(CasOutcome::Aborted(Abort::NotFound)) => {
                PromotionOutcome::failed(PromotionOutcome::NOT_FOUND)
            }
            Ok(CasOutcome::Aborted(Abort::BelowThreshold { confidence, min })) => {
                PromotionOutcome::failed(format!(
                    "Pattern confidence {confidence} is below the required threshold {min}"
                ))
            }
            Ok(CasOutcome::Conflict) => {
                tracing::info!(pattern_id = %pattern_id, "promotion lost a race");
                PromotionOutcome::failed(PromotionOutcome::CONFLICT)
            }
            Err(MemoryError::StoreError(e)) if e.is_unavailable() => {
                tracing::warn!(pattern_id = %pattern_id, error = %e, "promotion failed, store unavailable");
                PromotionOutcome::failed(format!("Store unavailable: {e}"))
            }
            Err(e) => return Err(e),
        };
        Ok(result)
    }
}
