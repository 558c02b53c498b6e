//! Structured outcome of one split run.

use chrono::{DateTime, Utc};
use common::RunId;
use domain::{Capacity, OrderId, ProductId, VariantId};
use serde::Serialize;

use crate::services::OrderRef;
use crate::state::SplitState;

/// Why a line item produced no child orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    MissingProductId,
    MissingVariantId,
    ZeroQuantity,
    /// Excluded by [`ItemScope::FirstItemOnly`](crate::policy::ItemScope).
    OutOfScope,
    /// The product has no usable capacity record.
    NoCapacity,
    /// The quantity already fits in one shipment.
    WithinCapacity,
    /// The catalog could not be reached and the skip policy applied.
    LookupFailed { error: String },
    /// Splitting would create more child orders than the policy allows.
    TooManyShipments { shipments: u32, limit: u32 },
}

/// A child order that was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedChild {
    pub shipment: u32,
    pub quantity: u32,
    pub order: OrderRef,
}

/// A child order the platform did not create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedChild {
    pub shipment: u32,
    pub quantity: u32,
    pub error: String,
}

/// What happened to one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum ItemDisposition {
    Skipped(SkipReason),
    Split {
        shipments: Vec<u32>,
        created: Vec<CreatedChild>,
        failed: Vec<FailedChild>,
    },
}

/// Per-line-item entry of a [`SplitReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItemReport {
    /// 0-based position in the original order.
    pub index: usize,
    pub product_id: Option<ProductId>,
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
    pub capacity: Option<Capacity>,
    pub disposition: ItemDisposition,
}

impl LineItemReport {
    pub fn children_created(&self) -> usize {
        match &self.disposition {
            ItemDisposition::Split { created, .. } => created.len(),
            ItemDisposition::Skipped(_) => 0,
        }
    }

    pub fn children_failed(&self) -> usize {
        match &self.disposition {
            ItemDisposition::Split { failed, .. } => failed.len(),
            ItemDisposition::Skipped(_) => 0,
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match &self.disposition {
            ItemDisposition::Skipped(reason) => Some(reason),
            ItemDisposition::Split { .. } => None,
        }
    }
}

/// Outcome of processing one inbound order.
#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub run_id: RunId,
    pub order_id: OrderId,
    pub order_name: String,
    /// Always a terminal state other than `Aborted`.
    pub outcome: SplitState,
    pub items: Vec<LineItemReport>,
    /// True when this run only retried the completion tag.
    pub tag_repair: bool,
    pub tagging_error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SplitReport {
    pub fn children_created(&self) -> usize {
        self.items.iter().map(LineItemReport::children_created).sum()
    }

    pub fn children_failed(&self) -> usize {
        self.items.iter().map(LineItemReport::children_failed).sum()
    }

    pub fn creation_attempts(&self) -> usize {
        self.children_created() + self.children_failed()
    }

    /// One-line human-readable summary, used as the webhook response body.
    pub fn summary(&self) -> String {
        let name = &self.order_name;
        match self.outcome {
            SplitState::AlreadyProcessed => format!("Order {name} already processed"),
            SplitState::InProgressElsewhere => {
                format!("Order {name} is being processed by another delivery")
            }
            SplitState::NoLineItems => format!("Order {name} has no line items"),
            SplitState::Done if self.tag_repair => {
                format!("Order {name} marked as split-processed")
            }
            SplitState::Done => format!(
                "Order {name} processed: {} child orders created, {} failed",
                self.children_created(),
                self.children_failed()
            ),
            SplitState::PartiallyDone => format!(
                "Order {name} processed: {} child orders created, {} failed, tagging failed",
                self.children_created(),
                self.children_failed()
            ),
            other => format!("Order {name} finished in state {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcome: SplitState, items: Vec<LineItemReport>) -> SplitReport {
        let now = Utc::now();
        SplitReport {
            run_id: RunId::new(),
            order_id: OrderId::from(1u64),
            order_name: "#1001".to_string(),
            outcome,
            items,
            tag_repair: false,
            tagging_error: None,
            started_at: now,
            finished_at: now,
        }
    }

    fn split_item(created: usize, failed: usize) -> LineItemReport {
        LineItemReport {
            index: 0,
            product_id: Some(ProductId::from(1u64)),
            variant_id: Some(VariantId::from(2u64)),
            quantity: 10,
            capacity: Capacity::new(2),
            disposition: ItemDisposition::Split {
                shipments: vec![2; created + failed],
                created: (1..=created as u32)
                    .map(|shipment| CreatedChild {
                        shipment,
                        quantity: 2,
                        order: OrderRef {
                            id: Some(OrderId::from(u64::from(shipment))),
                            name: None,
                        },
                    })
                    .collect(),
                failed: (0..failed as u32)
                    .map(|i| FailedChild {
                        shipment: created as u32 + i + 1,
                        quantity: 2,
                        error: "boom".to_string(),
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn test_counters() {
        let r = report(SplitState::Done, vec![split_item(3, 2), split_item(1, 0)]);
        assert_eq!(r.children_created(), 4);
        assert_eq!(r.children_failed(), 2);
        assert_eq!(r.creation_attempts(), 6);
    }

    #[test]
    fn test_summaries() {
        assert_eq!(
            report(SplitState::AlreadyProcessed, vec![]).summary(),
            "Order #1001 already processed"
        );
        assert_eq!(
            report(SplitState::Done, vec![split_item(2, 1)]).summary(),
            "Order #1001 processed: 2 child orders created, 1 failed"
        );
        assert!(
            report(SplitState::PartiallyDone, vec![])
                .summary()
                .ends_with("tagging failed")
        );
    }

    #[test]
    fn test_serializes_dispositions() {
        let mut item = split_item(0, 0);
        item.disposition = ItemDisposition::Skipped(SkipReason::NoCapacity);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["disposition"]["disposition"], "skipped");
        assert_eq!(json["disposition"]["reason"], "no_capacity");
    }
}
