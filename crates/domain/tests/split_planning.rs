//! Integration tests for the pure split planning path:
//! metadata → capacity → partition → child orders.

use domain::{
    CAPACITY_KEY, ChildOrder, CustomerId, Eligibility, LineItem, Metafield, Order, SPLIT_PROCESSED_TAG,
    TagSet, partition, resolve_capacity,
};
use serde_json::json;

fn parent_order() -> Order {
    Order::new(820982911946154508u64, "#9999")
        .with_tags(TagSet::parse("wholesale, net-30"))
        .with_email("jon@example.com")
        .with_customer(CustomerId::from(115310627314723954u64))
        .with_shipping_address(json!({"address1": "123 Shipping Street", "city": "Shippington"}))
        .with_billing_address(json!({"address1": "123 Billing Street", "city": "Billtown"}))
        .with_line_item(LineItem::new(632910392u64, 808950810u64, 2300))
}

fn plan_children(order: &Order, records: &[Metafield]) -> Vec<ChildOrder> {
    let mut children = Vec::new();
    for item in &order.line_items {
        let Eligibility::Eligible {
            variant_id,
            quantity,
            ..
        } = item.eligibility()
        else {
            continue;
        };
        let Some(capacity) = resolve_capacity(records) else {
            continue;
        };
        if capacity.admits(quantity) {
            continue;
        }
        let shipments = partition(quantity, capacity);
        let total = shipments.len();
        children.extend(
            shipments
                .indexed()
                .map(|(index, qty)| ChildOrder::for_shipment(order, variant_id, qty, index, total)),
        );
    }
    children
}

#[test]
fn oversized_item_is_planned_into_capacity_bounded_children() {
    let order = parent_order();
    let records = vec![
        Metafield::new("custom", "material", "steel"),
        Metafield::new("custom", CAPACITY_KEY, "500"),
    ];

    let children = plan_children(&order, &records);

    let quantities: Vec<u32> = children.iter().map(|c| c.line_item.quantity).collect();
    assert_eq!(quantities, vec![500, 500, 500, 500, 300]);
    for (i, child) in children.iter().enumerate() {
        let index = i as u32 + 1;
        assert_eq!(child.shipment, index);
        assert!(child.tags.contains(&format!("Shipment-{index}")));
        assert!(child.tags.contains("Parent-#9999"));
        assert!(child.note.ends_with(&format!("Shipment {index} of 5")));
        assert_eq!(child.email.as_deref(), Some("jon@example.com"));
    }
}

#[test]
fn item_within_capacity_plans_nothing() {
    let order = Order::new(1u64, "#1").with_line_item(LineItem::new(1u64, 2u64, 300));
    let records = vec![Metafield::new("global", CAPACITY_KEY, "500")];
    assert!(plan_children(&order, &records).is_empty());
}

#[test]
fn missing_capacity_plans_nothing() {
    let order = parent_order();
    assert!(plan_children(&order, &[]).is_empty());
    let bad = vec![Metafield::new("custom", CAPACITY_KEY, "-1")];
    assert!(plan_children(&order, &bad).is_empty());
}

#[test]
fn marking_appends_sentinel_after_existing_tags() {
    let order = parent_order();
    let marked = order.tags.with(SPLIT_PROCESSED_TAG);
    assert_eq!(marked.render(), "wholesale, net-30, Split-Processed");
    assert_eq!(marked.with(SPLIT_PROCESSED_TAG), marked);
}
