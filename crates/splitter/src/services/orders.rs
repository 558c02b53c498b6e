//! Order gateway trait and in-memory implementation.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use domain::{ChildOrder, OrderId, TagSet};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::SplitError;

/// Reference to an order created on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRef {
    /// The order ID assigned by the platform; `None` when the platform
    /// confirmed the creation but its response could not be read.
    pub id: Option<OrderId>,
    /// The reference name, when the platform returns one.
    pub name: Option<String>,
}

/// Write access to orders on the external platform.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Creates a new order for one shipment.
    async fn create_order(&self, order: &ChildOrder) -> Result<OrderRef, SplitError>;

    /// Replaces the tag string of an existing order.
    async fn update_tags(&self, order_id: &OrderId, tags: &TagSet) -> Result<(), SplitError>;
}

#[derive(Debug)]
struct InMemoryOrderState {
    created: Vec<(OrderRef, ChildOrder)>,
    creation_attempts: usize,
    failing_attempts: HashSet<usize>,
    fail_all_creations: bool,
    tag_updates: Vec<(OrderId, String)>,
    fail_on_tag_update: bool,
    next_id: u64,
}

impl Default for InMemoryOrderState {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            creation_attempts: 0,
            failing_attempts: HashSet::new(),
            fail_all_creations: false,
            tag_updates: Vec::new(),
            fail_on_tag_update: false,
            next_id: 1000,
        }
    }
}

/// In-memory order gateway for testing.
///
/// Records every creation attempt and tag update so tests can assert on the
/// exact sequence of outbound calls.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderGateway {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderGateway {
    /// Creates a new in-memory order gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `attempt`-th creation call (1-based, counted across the
    /// gateway's lifetime) fail with a 422 response.
    pub async fn fail_creation_attempt(&self, attempt: usize) {
        self.state.write().await.failing_attempts.insert(attempt);
    }

    /// Configures every creation call to fail.
    pub async fn set_fail_all_creations(&self, fail: bool) {
        self.state.write().await.fail_all_creations = fail;
    }

    /// Configures tag updates to fail.
    pub async fn set_fail_on_tag_update(&self, fail: bool) {
        self.state.write().await.fail_on_tag_update = fail;
    }

    /// Returns the child orders successfully created, in creation order.
    pub async fn created_orders(&self) -> Vec<ChildOrder> {
        self.state
            .read()
            .await
            .created
            .iter()
            .map(|(_, order)| order.clone())
            .collect()
    }

    /// Returns the number of creation calls, successful or not.
    pub async fn creation_attempts(&self) -> usize {
        self.state.read().await.creation_attempts
    }

    /// Returns every tag update attempted, successful or not.
    pub async fn tag_updates(&self) -> Vec<(OrderId, String)> {
        self.state.read().await.tag_updates.clone()
    }

    /// Returns the total number of outbound calls received.
    pub async fn call_count(&self) -> usize {
        let state = self.state.read().await;
        state.creation_attempts + state.tag_updates.len()
    }
}

#[async_trait]
impl OrderGateway for InMemoryOrderGateway {
    async fn create_order(&self, order: &ChildOrder) -> Result<OrderRef, SplitError> {
        let mut state = self.state.write().await;
        state.creation_attempts += 1;

        let attempt = state.creation_attempts;
        if state.fail_all_creations || state.failing_attempts.contains(&attempt) {
            return Err(SplitError::Creation {
                status: 422,
                body: r#"{"errors":{"line_items":["is invalid"]}}"#.to_string(),
            });
        }

        state.next_id += 1;
        let order_ref = OrderRef {
            id: Some(OrderId::from(state.next_id)),
            name: Some(format!("#{}", state.next_id)),
        };
        state.created.push((order_ref.clone(), order.clone()));
        Ok(order_ref)
    }

    async fn update_tags(&self, order_id: &OrderId, tags: &TagSet) -> Result<(), SplitError> {
        let mut state = self.state.write().await;
        state.tag_updates.push((order_id.clone(), tags.render()));

        if state.fail_on_tag_update {
            return Err(SplitError::Tagging {
                status: 503,
                body: "Service Unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{LineItem, Order, VariantId};

    fn child(shipment: u32) -> ChildOrder {
        let parent = Order::new(1u64, "#1001").with_line_item(LineItem::new(2u64, 3u64, 10));
        ChildOrder::for_shipment(&parent, &VariantId::from(3u64), 5, shipment, 2)
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let gateway = InMemoryOrderGateway::new();

        let r1 = gateway.create_order(&child(1)).await.unwrap();
        let r2 = gateway.create_order(&child(2)).await.unwrap();

        assert_eq!(r1.id.as_ref().map(|id| id.as_str()), Some("1001"));
        assert_eq!(r2.id.as_ref().map(|id| id.as_str()), Some("1002"));
        assert_eq!(gateway.created_orders().await.len(), 2);
    }

    #[tokio::test]
    async fn test_failing_attempt_is_counted_but_not_created() {
        let gateway = InMemoryOrderGateway::new();
        gateway.fail_creation_attempt(1).await;

        let first = gateway.create_order(&child(1)).await;
        let second = gateway.create_order(&child(2)).await;

        assert!(matches!(first, Err(SplitError::Creation { status: 422, .. })));
        assert!(second.is_ok());
        assert_eq!(gateway.creation_attempts().await, 2);
        assert_eq!(gateway.created_orders().await.len(), 1);
    }

    #[tokio::test]
    async fn test_tag_updates_are_recorded() {
        let gateway = InMemoryOrderGateway::new();
        let tags = TagSet::parse("VIP, Split-Processed");

        gateway
            .update_tags(&OrderId::new("42"), &tags)
            .await
            .unwrap();

        assert_eq!(
            gateway.tag_updates().await,
            vec![(OrderId::new("42"), "VIP, Split-Processed".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failing_tag_update() {
        let gateway = InMemoryOrderGateway::new();
        gateway.set_fail_on_tag_update(true).await;

        let result = gateway.update_tags(&OrderId::new("42"), &TagSet::new()).await;
        assert!(matches!(result, Err(SplitError::Tagging { status: 503, .. })));
        assert_eq!(gateway.call_count().await, 1);
    }
}
