//! Local checkout command: create a guest order in the local store.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use driftwood_core::{OrderId, OrderStatus};
use driftwood_tracking::config::TrackingConfig;
use driftwood_tracking::models::order::{Order, OrderItem, ShippingAddress};
use driftwood_tracking::store::{JsonFileStore, LocalOrderStore};

/// Create a demo guest order, as a completed local checkout would.
///
/// The order is confirmed immediately (`Order Received`); the status
/// simulator advances it from there on subsequent `track` runs.
pub async fn run(config: &TrackingConfig, items: u32) -> Result<(), Box<dyn std::error::Error>> {
    let kv = Arc::new(JsonFileStore::open(config.data_dir.clone()).await?);
    let store = LocalOrderStore::new(kv);
    store.load().await?;

    let now = Utc::now();
    let mut order = Order {
        id: OrderId::new(format!("ORD-{}", Uuid::new_v4().simple())),
        status: OrderStatus::Pending,
        status_details: HashMap::new(),
        items: demo_items(items),
        address: demo_address(),
        payment_method: Some("Cash on Delivery".to_string()),
        estimated_delivery: None,
        tracking_number: None,
        notes: None,
        delivered_at: None,
        created_at: now,
    };
    order.record_status(OrderStatus::OrderReceived, now);

    let id = order.id.clone();
    store.insert(order).await?;
    tracing::info!(order_id = %id, "guest order created");
    Ok(())
}

fn demo_items(count: u32) -> Vec<OrderItem> {
    (1..=count)
        .map(|n| OrderItem {
            name: format!("Driftwood Sample Item #{n}"),
            price: Decimal::new(2_499, 2),
            quantity: 1,
            image: None,
        })
        .collect()
}

fn demo_address() -> ShippingAddress {
    ShippingAddress {
        name: "Guest Shopper".to_string(),
        line1: "1 Boardwalk Ave".to_string(),
        line2: None,
        city: "Astoria".to_string(),
        state: "OR".to_string(),
        postal_code: "97103".to_string(),
        country: "US".to_string(),
        phone: None,
    }
}
