//! Integration tests for the Driftwood order tracking subsystem.
//!
//! The tests in `tests/` exercise the subsystem's observable
//! properties end-to-end without live services: the status simulator
//! runs against a manual clock, the push channel against a scripted
//! transport, and the migration service against a flaky account API.
//!
//! # Test Categories
//!
//! - `order_lifecycle` - Simulated anonymous order progression
//! - `push_channel` - Connection lifecycle, reconnection, patching
//! - `guest_migration` - Best-effort guest-to-account migration
//!
//! Shared fixtures live in this crate root.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use driftwood_core::{OrderId, OrderStatus, ProductId};
use driftwood_tracking::models::guest::GuestItem;
use driftwood_tracking::models::order::{Order, OrderItem, ShippingAddress};

/// A fixed reference instant for deterministic clocks.
#[must_use]
#[allow(clippy::unwrap_used)] // constant timestamp is always valid
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
}

/// A confirmed order created at `created_at`.
#[must_use]
pub fn sample_order(id: &str, created_at: DateTime<Utc>) -> Order {
    let mut order = Order {
        id: OrderId::new(id),
        status: OrderStatus::Pending,
        status_details: HashMap::new(),
        items: vec![OrderItem {
            name: "Driftwood Field Journal".to_string(),
            price: Decimal::new(1_850, 2),
            quantity: 1,
            image: Some("/images/field-journal.jpg".to_string()),
        }],
        address: ShippingAddress {
            name: "Casey Morgan".to_string(),
            line1: "23 Seastack Rd".to_string(),
            line2: None,
            city: "Astoria".to_string(),
            state: "OR".to_string(),
            postal_code: "97103".to_string(),
            country: "US".to_string(),
            phone: Some("+1 503 555 0117".to_string()),
        },
        payment_method: Some("Cash on Delivery".to_string()),
        estimated_delivery: None,
        tracking_number: None,
        notes: None,
        delivered_at: None,
        created_at,
    };
    order.record_status(OrderStatus::OrderReceived, created_at);
    order
}

/// A guest cart/wishlist entry for `product_id`.
#[must_use]
pub fn sample_guest_item(product_id: &str, quantity: Option<u32>) -> GuestItem {
    GuestItem {
        product_id: ProductId::new(product_id),
        quantity,
        price: Decimal::new(3_200, 2),
        title: format!("Product {product_id}"),
        image: format!("/images/{product_id}.jpg"),
    }
}
