//! Child order creation for one partition entry.

use domain::{ChildOrder, Order, VariantId};

use crate::error::SplitError;
use crate::services::{OrderGateway, OrderRef};

/// Builds and submits the child order for shipment `shipment` of
/// `total_shipments`.
#[tracing::instrument(
    skip(orders, parent, variant_id),
    fields(parent_id = %parent.id, variant_id = %variant_id)
)]
pub async fn create_child_order<O: OrderGateway>(
    orders: &O,
    parent: &Order,
    variant_id: &VariantId,
    quantity: u32,
    shipment: u32,
    total_shipments: u32,
) -> Result<OrderRef, SplitError> {
    let child = ChildOrder::for_shipment(parent, variant_id, quantity, shipment, total_shipments);
    let created = orders.create_order(&child).await?;
    tracing::info!(child_id = ?created.id, "child order created");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryOrderGateway;
    use domain::LineItem;

    #[tokio::test]
    async fn test_submits_one_child_with_single_line_item() {
        let gateway = InMemoryOrderGateway::new();
        let parent = Order::new(77u64, "#1077").with_line_item(LineItem::new(1u64, 9u64, 900));

        let created =
            create_child_order(&gateway, &parent, &VariantId::from(9u64), 400, 2, 3)
                .await
                .unwrap();

        let children = gateway.created_orders().await;
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].line_item.quantity, 400);
        assert_eq!(children[0].tags.render(), "Shipment-2, Parent-#1077");
        assert!(children[0].note.contains("(ID: 77)"));
        assert!(created.name.is_some());
    }

    #[tokio::test]
    async fn test_creation_error_is_returned() {
        let gateway = InMemoryOrderGateway::new();
        gateway.set_fail_all_creations(true).await;
        let parent = Order::new(77u64, "#1077");

        let result =
            create_child_order(&gateway, &parent, &VariantId::from(9u64), 1, 1, 1).await;
        assert!(matches!(result, Err(SplitError::Creation { .. })));
    }
}
