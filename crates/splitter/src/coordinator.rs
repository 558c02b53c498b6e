//! Split coordinator: the split-and-mark workflow for one inbound order.

use std::sync::Arc;

use chrono::Utc;
use common::RunId;
use domain::{DomainError, Eligibility, LineItem, Order, bounded_partition};

use crate::capacity::CapacityResolver;
use crate::completion::mark_split_processed;
use crate::creator::create_child_order;
use crate::error::SplitError;
use crate::ledger::{ClaimGuard, IdempotencyLedger, InMemoryIdempotencyLedger, LedgerClaim};
use crate::policy::{EmptyOrderPolicy, ItemScope, LookupFailurePolicy, SplitPolicy};
use crate::report::{
    CreatedChild, FailedChild, ItemDisposition, LineItemReport, SkipReason, SplitReport,
};
use crate::services::{CatalogService, OrderGateway};
use crate::state::SplitState;

/// Drives the split-and-mark workflow.
///
/// For each inbound order the coordinator checks the sentinel tag and the
/// idempotency ledger, walks the line items in order, resolves capacity,
/// partitions oversized quantities, creates one child order per shipment and
/// finally tags the original order. Every external call is awaited before the
/// next one starts.
pub struct SplitCoordinator<C, O, L = InMemoryIdempotencyLedger>
where
    C: CatalogService,
    O: OrderGateway,
    L: IdempotencyLedger,
{
    capacity: CapacityResolver<C>,
    orders: O,
    ledger: Arc<L>,
    policy: SplitPolicy,
}

struct Run {
    id: RunId,
    state: SplitState,
}

impl Run {
    fn new() -> Self {
        Self {
            id: RunId::new(),
            state: SplitState::Received,
        }
    }

    fn advance(&mut self, next: SplitState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid split transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(run_id = %self.id, from = %self.state, to = %next, "split state transition");
        self.state = next;
    }
}

impl<C, O> SplitCoordinator<C, O, InMemoryIdempotencyLedger>
where
    C: CatalogService,
    O: OrderGateway,
{
    /// Creates a coordinator with an in-process ledger and default policy.
    pub fn new(catalog: C, orders: O) -> Self {
        Self::with_ledger(
            catalog,
            orders,
            InMemoryIdempotencyLedger::new(),
            SplitPolicy::default(),
        )
    }
}

impl<C, O, L> SplitCoordinator<C, O, L>
where
    C: CatalogService,
    O: OrderGateway,
    L: IdempotencyLedger,
{
    /// Creates a coordinator with an explicit ledger and policy.
    pub fn with_ledger(catalog: C, orders: O, ledger: L, policy: SplitPolicy) -> Self {
        Self {
            capacity: CapacityResolver::new(catalog),
            orders,
            ledger: Arc::new(ledger),
            policy,
        }
    }

    /// Returns the policy in effect.
    pub fn policy(&self) -> SplitPolicy {
        self.policy
    }

    /// Runs the split-and-mark workflow for one order.
    ///
    /// Returns a report for every outcome the inbound caller should treat as
    /// delivered, including partial child creation and a failed tag update.
    /// Returns an error only for malformed input, a fatal catalog failure
    /// under [`LookupFailurePolicy::Abort`], or a ledger failure; the sender
    /// is expected to retry those.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id, order_name = %order.name))]
    pub async fn split_order(&self, order: &Order) -> Result<SplitReport, SplitError> {
        metrics::counter!("split_requests_total").increment(1);
        let started = std::time::Instant::now();
        let started_at = Utc::now();
        let mut run = Run::new();

        run.advance(SplitState::CheckingIdempotency);

        // 1. Sentinel tag: cheapest check, no outbound calls at all.
        if order.is_split_processed() {
            return Ok(self.short_circuit(&mut run, order, SplitState::AlreadyProcessed, started_at));
        }

        // 2. Empty orders, per policy.
        if !order.has_line_items() {
            return match self.policy.empty_orders {
                EmptyOrderPolicy::Accept => {
                    Ok(self.short_circuit(&mut run, order, SplitState::NoLineItems, started_at))
                }
                EmptyOrderPolicy::Reject => {
                    run.advance(SplitState::Aborted);
                    metrics::counter!("split_aborted_total").increment(1);
                    Err(SplitError::MalformedInput(format!(
                        "order {} has no line items",
                        order.id
                    )))
                }
            };
        }

        // 3. Ledger claim.
        let claim = match self.ledger.try_acquire(&order.id).await {
            Ok(claim) => claim,
            Err(e) => {
                run.advance(SplitState::Aborted);
                metrics::counter!("split_aborted_total").increment(1);
                return Err(e);
            }
        };

        let tag_repair = match claim {
            LedgerClaim::Completed => {
                return Ok(self.short_circuit(
                    &mut run,
                    order,
                    SplitState::AlreadyProcessed,
                    started_at,
                ));
            }
            LedgerClaim::InProgress => {
                return Ok(self.short_circuit(
                    &mut run,
                    order,
                    SplitState::InProgressElsewhere,
                    started_at,
                ));
            }
            LedgerClaim::Repair => true,
            LedgerClaim::Acquired => false,
        };
        let Some(mut guard) = ClaimGuard::new(Arc::clone(&self.ledger), order.id.clone(), claim)
        else {
            return Err(SplitError::Ledger(format!(
                "claim for order {} is not owned by this run",
                order.id
            )));
        };

        let items = if tag_repair {
            tracing::info!(run_id = %run.id, "children already created, retrying completion tag");
            Vec::new()
        } else {
            run.advance(SplitState::ProcessingItems);
            match self.process_items(order).await {
                Ok(items) => items,
                Err(e) => {
                    run.advance(SplitState::Aborted);
                    metrics::counter!("split_aborted_total").increment(1);
                    if let Err(release_err) = guard.release().await {
                        tracing::error!(error = %release_err, "failed to release ledger claim");
                    }
                    tracing::error!(run_id = %run.id, error = %e, "split aborted");
                    return Err(e);
                }
            }
        };
        guard.items_processed();

        // 4. Completion marker, regardless of individual creation failures.
        run.advance(SplitState::Marking);
        let tagging_error = match mark_split_processed(&self.orders, order).await {
            Ok(_) => None,
            Err(e) => {
                metrics::counter!("split_tagging_failures_total").increment(1);
                tracing::error!(
                    run_id = %run.id,
                    error = %e,
                    "failed to mark order as split-processed; a redelivery will retry tagging"
                );
                Some(e.to_string())
            }
        };

        let tagged = tagging_error.is_none();
        if let Err(e) = guard.finalize(tagged).await {
            tracing::error!(run_id = %run.id, error = %e, "failed to finalize ledger entry");
        }

        run.advance(if tagged {
            SplitState::Done
        } else {
            SplitState::PartiallyDone
        });

        let report = SplitReport {
            run_id: run.id,
            order_id: order.id.clone(),
            order_name: order.name.clone(),
            outcome: run.state,
            items,
            tag_repair,
            tagging_error,
            started_at,
            finished_at: Utc::now(),
        };

        let duration = started.elapsed().as_secs_f64();
        metrics::histogram!("split_duration_seconds").record(duration);
        tracing::info!(
            run_id = %run.id,
            outcome = %report.outcome,
            children_created = report.children_created(),
            children_failed = report.children_failed(),
            duration,
            "split run finished"
        );

        Ok(report)
    }

    fn short_circuit(
        &self,
        run: &mut Run,
        order: &Order,
        outcome: SplitState,
        started_at: chrono::DateTime<Utc>,
    ) -> SplitReport {
        run.advance(outcome);
        metrics::counter!("split_short_circuits_total", "outcome" => outcome.as_str())
            .increment(1);
        tracing::info!(run_id = %run.id, outcome = %outcome, "split short-circuited");

        SplitReport {
            run_id: run.id,
            order_id: order.id.clone(),
            order_name: order.name.clone(),
            outcome,
            items: Vec::new(),
            tag_repair: false,
            tagging_error: None,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Walks the line items sequentially in their original order.
    async fn process_items(&self, order: &Order) -> Result<Vec<LineItemReport>, SplitError> {
        let mut reports = Vec::with_capacity(order.line_items.len());

        for (index, item) in order.line_items.iter().enumerate() {
            let report = if self.policy.item_scope == ItemScope::FirstItemOnly && index > 0 {
                skipped(index, item, None, SkipReason::OutOfScope)
            } else {
                self.process_item(order, index, item).await?
            };
            reports.push(report);
        }

        Ok(reports)
    }

    #[tracing::instrument(skip(self, order, item))]
    async fn process_item(
        &self,
        order: &Order,
        index: usize,
        item: &LineItem,
    ) -> Result<LineItemReport, SplitError> {
        let (product_id, variant_id, quantity) = match item.eligibility() {
            Eligibility::Eligible {
                product_id,
                variant_id,
                quantity,
            } => (product_id, variant_id, quantity),
            Eligibility::MissingProductId => {
                return Ok(skipped(index, item, None, SkipReason::MissingProductId));
            }
            Eligibility::MissingVariantId => {
                return Ok(skipped(index, item, None, SkipReason::MissingVariantId));
            }
            Eligibility::ZeroQuantity => {
                return Ok(skipped(index, item, None, SkipReason::ZeroQuantity));
            }
        };

        let capacity = match self.capacity.resolve(product_id).await {
            Ok(Some(capacity)) => capacity,
            Ok(None) => {
                tracing::debug!(%product_id, "no capacity record, item left unsplit");
                return Ok(skipped(index, item, None, SkipReason::NoCapacity));
            }
            Err(e) => match self.policy.on_lookup_failure {
                LookupFailurePolicy::Abort => return Err(e),
                LookupFailurePolicy::SkipItem => {
                    tracing::warn!(%product_id, error = %e, "capacity lookup failed, skipping item");
                    return Ok(skipped(
                        index,
                        item,
                        None,
                        SkipReason::LookupFailed {
                            error: e.to_string(),
                        },
                    ));
                }
            },
        };

        if capacity.admits(quantity) {
            return Ok(skipped(
                index,
                item,
                Some(capacity),
                SkipReason::WithinCapacity,
            ));
        }

        let shipments =
            match bounded_partition(quantity, capacity, self.policy.max_shipments_per_item) {
                Ok(shipments) => shipments,
                Err(DomainError::TooManyShipments { shipments, limit }) => {
                    metrics::counter!("split_items_over_limit_total").increment(1);
                    tracing::error!(
                        %product_id,
                        quantity = quantity.get(),
                        capacity = capacity.get(),
                        shipments,
                        limit,
                        "line item needs too many shipments, left unsplit"
                    );
                    return Ok(skipped(
                        index,
                        item,
                        Some(capacity),
                        SkipReason::TooManyShipments { shipments, limit },
                    ));
                }
                Err(e) => return Err(SplitError::MalformedInput(e.to_string())),
            };
        let total = shipments.len();
        tracing::info!(
            %product_id,
            %variant_id,
            quantity = quantity.get(),
            capacity = capacity.get(),
            shipments = total,
            "splitting line item"
        );

        let mut created = Vec::new();
        let mut failed = Vec::new();
        for (shipment, shipment_quantity) in shipments.indexed() {
            match create_child_order(
                &self.orders,
                order,
                variant_id,
                shipment_quantity,
                shipment,
                total,
            )
            .await
            {
                Ok(order_ref) => {
                    metrics::counter!("split_children_created_total").increment(1);
                    created.push(CreatedChild {
                        shipment,
                        quantity: shipment_quantity,
                        order: order_ref,
                    });
                }
                Err(e) => {
                    metrics::counter!("split_child_failures_total").increment(1);
                    tracing::warn!(shipment, error = %e, "child order creation failed, continuing");
                    failed.push(FailedChild {
                        shipment,
                        quantity: shipment_quantity,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(LineItemReport {
            index,
            product_id: item.product_id.clone(),
            variant_id: item.variant_id.clone(),
            quantity: item.quantity,
            capacity: Some(capacity),
            disposition: ItemDisposition::Split {
                shipments: shipments.to_vec(),
                created,
                failed,
            },
        })
    }
}

fn skipped(
    index: usize,
    item: &LineItem,
    capacity: Option<domain::Capacity>,
    reason: SkipReason,
) -> LineItemReport {
    LineItemReport {
        index,
        product_id: item.product_id.clone(),
        variant_id: item.variant_id.clone(),
        quantity: item.quantity,
        capacity,
        disposition: ItemDisposition::Skipped(reason),
    }
}
