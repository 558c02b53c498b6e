//! Split-and-mark orchestration for capacity-bounded order splitting.
//!
//! When an order line's quantity exceeds the product's shipping capacity, the
//! order is split into child orders of at most that capacity each:
//! 1. Check the split-processed tag and claim the order in the idempotency ledger
//! 2. For each line item, resolve capacity and partition the quantity
//! 3. Create one child order per shipment, tolerating individual failures
//! 4. Tag the original order as split-processed
//!
//! Redelivering the same notification converges: it never splits twice.

pub mod capacity;
pub mod completion;
pub mod coordinator;
pub mod creator;
pub mod error;
pub mod ledger;
pub mod policy;
pub mod report;
pub mod services;
pub mod state;

pub use capacity::CapacityResolver;
pub use coordinator::SplitCoordinator;
pub use error::SplitError;
pub use ledger::{ClaimGuard, IdempotencyLedger, InMemoryIdempotencyLedger, LedgerClaim};
pub use policy::{
    DEFAULT_MAX_SHIPMENTS_PER_ITEM, EmptyOrderPolicy, ItemScope, LookupFailurePolicy,
    PolicyParseError, SplitPolicy,
};
pub use report::{
    CreatedChild, FailedChild, ItemDisposition, LineItemReport, SkipReason, SplitReport,
};
pub use services::{
    CatalogService, InMemoryCatalogService, InMemoryOrderGateway, OrderGateway, OrderRef,
};
pub use state::SplitState;
