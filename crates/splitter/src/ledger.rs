//! Idempotency ledger keyed by order ID.
//!
//! The sentinel tag on an order only reflects a finished split once the tag
//! update has landed, and a redelivered notification carries the payload as
//! it was first sent. The ledger closes both gaps: an entry is claimed before
//! any child is created and finalized after marking, so concurrent or
//! repeated deliveries of the same order observe the claim.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use domain::OrderId;
use tokio::sync::RwLock;

use crate::error::SplitError;

/// Outcome of trying to claim an order for processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerClaim {
    /// No previous record; the caller now owns the order.
    Acquired,
    /// Children were created earlier but tagging failed; the caller owns the
    /// order and should only retry tagging.
    Repair,
    /// Another delivery currently owns the order.
    InProgress,
    /// The order was fully split and tagged.
    Completed,
}

/// Durable or in-process record of which orders have been split.
#[async_trait]
pub trait IdempotencyLedger: Send + Sync + 'static {
    /// Atomically claims `order_id` if nobody else holds it.
    async fn try_acquire(&self, order_id: &OrderId) -> Result<LedgerClaim, SplitError>;

    /// Records that item processing finished. `tagged` says whether the
    /// completion tag was written.
    async fn finalize(&self, order_id: &OrderId, tagged: bool) -> Result<(), SplitError>;

    /// Drops a claim after an aborted run so the next delivery starts over.
    async fn release(&self, order_id: &OrderId) -> Result<(), SplitError>;
}

/// What a dropped [`ClaimGuard`] does with its claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Abandon {
    /// Nothing was created yet: free the order for the next delivery.
    Release,
    /// Children exist: leave the order for a tag-only repair.
    KeepUntagged,
}

/// Owns a ledger claim for the lifetime of one run.
///
/// A run that ends through [`ClaimGuard::finalize`] or
/// [`ClaimGuard::release`] settles the claim itself. A guard dropped any
/// other way (the run future was cancelled, or a ledger write failed) hands
/// the cleanup to the runtime, so the order never stays claimed.
pub struct ClaimGuard<L: IdempotencyLedger> {
    ledger: Arc<L>,
    order_id: OrderId,
    on_drop: Option<Abandon>,
}

impl<L: IdempotencyLedger> ClaimGuard<L> {
    /// Wraps a claim returned by [`IdempotencyLedger::try_acquire`].
    ///
    /// Returns `None` for claims the caller does not own.
    pub fn new(ledger: Arc<L>, order_id: OrderId, claim: LedgerClaim) -> Option<Self> {
        let on_drop = match claim {
            LedgerClaim::Acquired => Abandon::Release,
            LedgerClaim::Repair => Abandon::KeepUntagged,
            LedgerClaim::InProgress | LedgerClaim::Completed => return None,
        };
        Some(Self {
            ledger,
            order_id,
            on_drop: Some(on_drop),
        })
    }

    /// Marks item processing as finished. From here on an abandoned run
    /// leaves the order for a tag-only repair instead of a fresh start.
    pub fn items_processed(&mut self) {
        if self.on_drop.is_some() {
            self.on_drop = Some(Abandon::KeepUntagged);
        }
    }

    /// Records the run's result and gives up the claim.
    pub async fn finalize(mut self, tagged: bool) -> Result<(), SplitError> {
        self.ledger.finalize(&self.order_id, tagged).await?;
        self.on_drop = None;
        Ok(())
    }

    /// Drops the claim after an aborted run.
    pub async fn release(mut self) -> Result<(), SplitError> {
        self.ledger.release(&self.order_id).await?;
        self.on_drop = None;
        Ok(())
    }
}

impl<L: IdempotencyLedger> Drop for ClaimGuard<L> {
    fn drop(&mut self) {
        let Some(action) = self.on_drop.take() else {
            return;
        };
        let order_id = self.order_id.clone();
        tracing::warn!(%order_id, ?action, "split run ended without settling its ledger claim");

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::error!(%order_id, "no runtime available to settle abandoned ledger claim");
            return;
        };
        let ledger = Arc::clone(&self.ledger);
        handle.spawn(async move {
            let result = match action {
                Abandon::Release => ledger.release(&order_id).await,
                Abandon::KeepUntagged => ledger.finalize(&order_id, false).await,
            };
            if let Err(e) = result {
                tracing::error!(%order_id, error = %e, "failed to settle abandoned ledger claim");
            }
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    InProgress,
    Untagged,
    Tagged,
}

#[derive(Debug, Default)]
struct LedgerState {
    entries: HashMap<OrderId, Entry>,
    tagged_order: VecDeque<OrderId>,
}

/// Default number of fully tagged orders remembered before the oldest are
/// evicted.
pub const DEFAULT_LEDGER_RETENTION: usize = 10_000;

/// In-process ledger.
///
/// Provides per-order mutual exclusion within one process. Entries for
/// orders that still need work (in progress or untagged) are never evicted;
/// tagged entries are kept up to a retention bound, oldest first out.
#[derive(Debug, Clone)]
pub struct InMemoryIdempotencyLedger {
    state: Arc<RwLock<LedgerState>>,
    retention: usize,
}

impl Default for InMemoryIdempotencyLedger {
    fn default() -> Self {
        Self::with_retention(DEFAULT_LEDGER_RETENTION)
    }
}

impl InMemoryIdempotencyLedger {
    /// Creates a ledger with the default retention.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger remembering at most `retention` tagged orders.
    pub fn with_retention(retention: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState::default())),
            retention,
        }
    }

    /// Returns the number of orders currently recorded.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Returns true if no order is recorded.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    /// Returns true if `order_id` is claimed by a running delivery.
    pub async fn is_in_progress(&self, order_id: &OrderId) -> bool {
        self.state.read().await.entries.get(order_id) == Some(&Entry::InProgress)
    }
}

#[async_trait]
impl IdempotencyLedger for InMemoryIdempotencyLedger {
    async fn try_acquire(&self, order_id: &OrderId) -> Result<LedgerClaim, SplitError> {
        let mut state = self.state.write().await;
        let claim = match state.entries.get(order_id).copied() {
            None => LedgerClaim::Acquired,
            Some(Entry::Untagged) => LedgerClaim::Repair,
            Some(Entry::InProgress) => return Ok(LedgerClaim::InProgress),
            Some(Entry::Tagged) => return Ok(LedgerClaim::Completed),
        };
        state.entries.insert(order_id.clone(), Entry::InProgress);
        Ok(claim)
    }

    async fn finalize(&self, order_id: &OrderId, tagged: bool) -> Result<(), SplitError> {
        let mut state = self.state.write().await;
        if !tagged {
            state.entries.insert(order_id.clone(), Entry::Untagged);
            return Ok(());
        }

        state.entries.insert(order_id.clone(), Entry::Tagged);
        state.tagged_order.push_back(order_id.clone());
        while state.tagged_order.len() > self.retention {
            if let Some(oldest) = state.tagged_order.pop_front()
                && state.entries.get(&oldest) == Some(&Entry::Tagged)
            {
                state.entries.remove(&oldest);
            }
        }
        Ok(())
    }

    async fn release(&self, order_id: &OrderId) -> Result<(), SplitError> {
        let mut state = self.state.write().await;
        if state.entries.get(order_id) == Some(&Entry::InProgress) {
            state.entries.remove(order_id);
        }
        Ok(())
    }
}
