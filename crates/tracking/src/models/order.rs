//! Order records and status-history bookkeeping.
//!
//! An order's `statusDetails` map is append-only with at most one entry
//! per status name; the current `status` is always the most-recently
//! reached entry. Transitions along the fulfillment path are forward-only.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use driftwood_core::{OrderId, OrderStatus};

/// One entry in an order's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDetail {
    /// When the status was reached.
    pub time: DateTime<Utc>,
    /// Fixed human-readable message for the status.
    pub message: String,
}

/// A purchased line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    /// Unit price; non-negative.
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Shipping address snapshot.
///
/// Denormalized at order creation and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub name: String,
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// An order as held by the local store and returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    /// Status history, one entry per status ever reached, keyed by wire
    /// status name.
    #[serde(default)]
    pub status_details: HashMap<OrderStatus, StatusDetail>,
    pub items: Vec<OrderItem>,
    pub address: ShippingAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    /// Creation timestamp, immutable.
    #[serde(rename = "date", alias = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Record that `status` has been reached.
    ///
    /// Idempotent per status name: the history entry is written at most
    /// once, so re-evaluating the same elapsed-time bucket never
    /// duplicates `statusDetails`.
    pub fn record_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        self.status_details.entry(status).or_insert_with(|| StatusDetail {
            time: now,
            message: status.detail_message().to_owned(),
        });
        self.status = status;
    }

    /// Advance to `target` if it lies ahead on the fulfillment path.
    ///
    /// Never moves status backward. A `Pending` order advances to any
    /// path status; an order already at `target` only backfills a
    /// missing history entry. Returns `true` when anything changed.
    pub fn advance_to(&mut self, target: OrderStatus, now: DateTime<Utc>) -> bool {
        if self.status == target {
            let missing = !self.status_details.contains_key(&target);
            if missing {
                self.record_status(target, now);
            }
            return missing;
        }

        let forward = match self.status.fulfillment_cmp(target) {
            Some(ordering) => ordering.is_lt(),
            // Off-path current status: only Pending may move onto the path.
            None => self.status == OrderStatus::Pending && target.step_index().is_some(),
        };

        if forward {
            self.record_status(target, now);
        }
        forward
    }

    /// Apply an out-of-band administrative transition.
    ///
    /// `Cancelled` and `Returned` are reachable from any non-terminal
    /// status; the time-driven simulator never produces them. Returns
    /// `true` when the order changed.
    pub fn apply_exception(&mut self, status: OrderStatus, now: DateTime<Utc>) -> bool {
        if !status.is_exception() || self.status.is_terminal() {
            return false;
        }
        self.record_status(status, now);
        true
    }

    /// Apply an authoritative patch from the push channel.
    ///
    /// Writes only `status`, `trackingNumber`, `notes`,
    /// `estimatedDelivery` and `deliveredAt` (last writer wins per
    /// field); every other field is left untouched.
    pub fn apply_update(&mut self, update: &OrderUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(tracking_number) = &update.tracking_number {
            self.tracking_number = Some(tracking_number.clone());
        }
        if let Some(notes) = &update.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(estimated_delivery) = &update.estimated_delivery {
            self.estimated_delivery = Some(estimated_delivery.clone());
        }
        if let Some(delivered_at) = update.delivered_at {
            self.delivered_at = Some(delivered_at);
        }
    }
}

/// Partial order patch delivered by an `order_update` push message.
///
/// Absent fields leave the targeted order untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample_order(created_at: DateTime<Utc>) -> Order {
        Order {
            id: OrderId::new("ORD-1001"),
            status: OrderStatus::Pending,
            status_details: HashMap::new(),
            items: vec![OrderItem {
                name: "Canvas Tote".to_string(),
                price: Decimal::new(2_499, 2),
                quantity: 2,
                image: None,
            }],
            address: ShippingAddress {
                name: "Jordan Reyes".to_string(),
                line1: "12 Harbor Lane".to_string(),
                line2: None,
                city: "Astoria".to_string(),
                state: "OR".to_string(),
                postal_code: "97103".to_string(),
                country: "US".to_string(),
                phone: None,
            },
            payment_method: Some("Cash on Delivery".to_string()),
            estimated_delivery: None,
            tracking_number: None,
            notes: None,
            delivered_at: None,
            created_at,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_record_status_is_idempotent_per_name() {
        let mut order = sample_order(t0());
        order.record_status(OrderStatus::OrderReceived, t0());
        let first = order.status_details[&OrderStatus::OrderReceived].clone();

        // Re-reaching the same status must not rewrite the entry.
        order.record_status(OrderStatus::OrderReceived, t0() + chrono::Duration::minutes(5));
        assert_eq!(order.status_details.len(), 1);
        assert_eq!(order.status_details[&OrderStatus::OrderReceived], first);
    }

    #[test]
    fn test_advance_is_forward_only() {
        let mut order = sample_order(t0());
        order.record_status(OrderStatus::Shipped, t0());

        assert!(!order.advance_to(OrderStatus::Processing, t0()));
        assert_eq!(order.status, OrderStatus::Shipped);

        assert!(order.advance_to(OrderStatus::Delivered, t0()));
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[test]
    fn test_pending_order_advances_onto_path() {
        let mut order = sample_order(t0());
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.advance_to(OrderStatus::OrderReceived, t0()));
        assert_eq!(order.status, OrderStatus::OrderReceived);
    }

    #[test]
    fn test_advance_skipping_buckets_records_only_target() {
        let mut order = sample_order(t0());
        order.record_status(OrderStatus::OrderReceived, t0());

        // A restored store re-evaluated late jumps straight to the
        // mapped status; intermediate entries are not backfilled.
        assert!(order.advance_to(OrderStatus::InTransit, t0()));
        assert_eq!(order.status, OrderStatus::InTransit);
        assert!(!order.status_details.contains_key(&OrderStatus::Processing));
        assert!(!order.status_details.contains_key(&OrderStatus::Shipped));
    }

    #[test]
    fn test_exception_from_any_non_terminal_status() {
        let mut order = sample_order(t0());
        order.record_status(OrderStatus::Packed, t0());
        assert!(order.apply_exception(OrderStatus::Cancelled, t0()));
        assert_eq!(order.status, OrderStatus::Cancelled);

        // Terminal orders cannot be cancelled again or returned.
        assert!(!order.apply_exception(OrderStatus::Returned, t0()));
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_exception_rejects_path_statuses() {
        let mut order = sample_order(t0());
        assert!(!order.apply_exception(OrderStatus::Shipped, t0()));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_apply_update_patches_only_the_five_fields() {
        let mut order = sample_order(t0());
        order.record_status(OrderStatus::Shipped, t0());
        let before = order.clone();

        let delivered_at = t0() + chrono::Duration::hours(30);
        order.apply_update(&OrderUpdate {
            id: order.id.clone(),
            status: Some(OrderStatus::Delivered),
            tracking_number: Some("1Z999AA10123456784".to_string()),
            notes: Some("Left at front desk".to_string()),
            estimated_delivery: Some("Aug 2".to_string()),
            delivered_at: Some(delivered_at),
        });

        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.tracking_number.as_deref(), Some("1Z999AA10123456784"));
        assert_eq!(order.notes.as_deref(), Some("Left at front desk"));
        assert_eq!(order.estimated_delivery.as_deref(), Some("Aug 2"));
        assert_eq!(order.delivered_at, Some(delivered_at));

        // Everything else is bit-for-bit unchanged.
        assert_eq!(order.id, before.id);
        assert_eq!(order.status_details, before.status_details);
        assert_eq!(order.items, before.items);
        assert_eq!(order.address, before.address);
        assert_eq!(order.payment_method, before.payment_method);
        assert_eq!(order.created_at, before.created_at);
    }

    #[test]
    fn test_apply_update_absent_fields_leave_order_untouched() {
        let mut order = sample_order(t0());
        order.record_status(OrderStatus::Packed, t0());
        let before = order.clone();

        order.apply_update(&OrderUpdate {
            id: order.id.clone(),
            status: None,
            tracking_number: None,
            notes: None,
            estimated_delivery: None,
            delivered_at: None,
        });

        assert_eq!(order, before);
    }

    #[test]
    fn test_serde_wire_shape() {
        let mut order = sample_order(t0());
        order.record_status(OrderStatus::OrderReceived, t0());

        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("date").is_some());
        assert!(json.get("statusDetails").unwrap().get("Order Received").is_some());
        assert!(json.get("paymentMethod").is_some());
        // Absent opaque fields are omitted, not null.
        assert!(json.get("trackingNumber").is_none());

        let round_tripped: Order = serde_json::from_value(json).unwrap();
        assert_eq!(round_tripped, order);
    }

    #[test]
    fn test_serde_accepts_created_at_alias() {
        let raw = r#"{
            "id": "ORD-7",
            "status": "Processing",
            "items": [],
            "address": {
                "name": "A", "line1": "B", "city": "C",
                "state": "D", "postalCode": "E", "country": "F"
            },
            "createdAt": "2026-08-01T12:00:00Z"
        }"#;
        let order: Order = serde_json::from_str(raw).unwrap();
        assert_eq!(order.created_at, t0());
        assert!(order.status_details.is_empty());
    }
}
