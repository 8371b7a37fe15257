//! Order fulfillment status model.
//!
//! The fulfillment path is a total order over seven statuses:
//!
//! `Order Received → Processing → Packed → Shipped → In Transit →
//! Out for Delivery → Delivered`
//!
//! `Cancelled` and `Returned` are out-of-band terminal statuses reachable
//! from any non-terminal status through explicit administrative action
//! only; the time-driven simulator never produces them. `Pending` is a
//! pre-initial status used only before an order is confirmed.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Order fulfillment status.
///
/// Wire names are the human-readable status strings because the
/// `statusDetails` map is keyed by status name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Pre-initial status used only before an order is confirmed.
    #[default]
    Pending,
    #[serde(rename = "Order Received")]
    OrderReceived,
    Processing,
    Packed,
    Shipped,
    #[serde(rename = "In Transit")]
    InTransit,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
    /// Out-of-band terminal status, administrative action only.
    Cancelled,
    /// Out-of-band terminal status, administrative action only.
    Returned,
}

impl OrderStatus {
    /// The seven-step forward fulfillment path, in order.
    pub const FULFILLMENT_PATH: [Self; 7] = [
        Self::OrderReceived,
        Self::Processing,
        Self::Packed,
        Self::Shipped,
        Self::InTransit,
        Self::OutForDelivery,
        Self::Delivered,
    ];

    /// Position of this status on the fulfillment path.
    ///
    /// `None` for `Pending`, `Cancelled` and `Returned`, which have no
    /// step position.
    #[must_use]
    pub fn step_index(self) -> Option<usize> {
        Self::FULFILLMENT_PATH.iter().position(|&s| s == self)
    }

    /// All statuses at or before this one on the fulfillment path.
    ///
    /// Used to render progress indicators. Returns the empty slice for
    /// `Pending`, `Cancelled` and `Returned`; callers render those as a
    /// distinct terminal badge instead of a step position.
    #[must_use]
    pub fn completed_steps(self) -> &'static [Self] {
        self.step_index()
            .and_then(|idx| Self::FULFILLMENT_PATH.get(..=idx))
            .unwrap_or(&[])
    }

    /// Whether this status ends the order lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Returned)
    }

    /// Whether this is one of the out-of-band terminal statuses.
    #[must_use]
    pub const fn is_exception(self) -> bool {
        matches!(self, Self::Cancelled | Self::Returned)
    }

    /// Compare two statuses along the fulfillment path.
    ///
    /// Defined only within the seven-step forward path: `None` whenever
    /// either side is `Pending`, `Cancelled` or `Returned`.
    #[must_use]
    pub fn fulfillment_cmp(self, other: Self) -> Option<Ordering> {
        Some(self.step_index()?.cmp(&other.step_index()?))
    }

    /// Fixed human-readable message recorded when this status is reached.
    #[must_use]
    pub const fn detail_message(self) -> &'static str {
        match self {
            Self::Pending => "Your order is awaiting confirmation",
            Self::OrderReceived => "Your order has been received",
            Self::Processing => "Your order is being processed",
            Self::Packed => "Your order has been packed",
            Self::Shipped => "Your order has been shipped",
            Self::InTransit => "Your order is in transit",
            Self::OutForDelivery => "Your order is out for delivery",
            Self::Delivered => "Your order has been delivered",
            Self::Cancelled => "Your order has been cancelled",
            Self::Returned => "Your order has been returned",
        }
    }

    /// Wire name of this status (also the `statusDetails` map key).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::OrderReceived => "Order Received",
            Self::Processing => "Processing",
            Self::Packed => "Packed",
            Self::Shipped => "Shipped",
            Self::InTransit => "In Transit",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Returned => "Returned",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Order Received" => Ok(Self::OrderReceived),
            "Processing" => Ok(Self::Processing),
            "Packed" => Ok(Self::Packed),
            "Shipped" => Ok(Self::Shipped),
            "In Transit" => Ok(Self::InTransit),
            "Out for Delivery" => Ok(Self::OutForDelivery),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            "Returned" => Ok(Self::Returned),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_steps_prefix() {
        assert_eq!(
            OrderStatus::Packed.completed_steps(),
            &[
                OrderStatus::OrderReceived,
                OrderStatus::Processing,
                OrderStatus::Packed
            ]
        );
        assert_eq!(
            OrderStatus::Delivered.completed_steps().len(),
            OrderStatus::FULFILLMENT_PATH.len()
        );
    }

    #[test]
    fn test_completed_steps_off_path() {
        assert!(OrderStatus::Pending.completed_steps().is_empty());
        assert!(OrderStatus::Cancelled.completed_steps().is_empty());
        assert!(OrderStatus::Returned.completed_steps().is_empty());
    }

    #[test]
    fn test_fulfillment_cmp_forward() {
        assert_eq!(
            OrderStatus::Shipped.fulfillment_cmp(OrderStatus::Delivered),
            Some(Ordering::Less)
        );
        assert_eq!(
            OrderStatus::Delivered.fulfillment_cmp(OrderStatus::Shipped),
            Some(Ordering::Greater)
        );
        assert_eq!(
            OrderStatus::Packed.fulfillment_cmp(OrderStatus::Packed),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_fulfillment_cmp_undefined_against_exceptions() {
        assert_eq!(
            OrderStatus::Shipped.fulfillment_cmp(OrderStatus::Cancelled),
            None
        );
        assert_eq!(
            OrderStatus::Returned.fulfillment_cmp(OrderStatus::Delivered),
            None
        );
        assert_eq!(
            OrderStatus::Pending.fulfillment_cmp(OrderStatus::OrderReceived),
            None
        );
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Returned.is_terminal());
        assert!(!OrderStatus::OutForDelivery.is_terminal());

        assert!(OrderStatus::Cancelled.is_exception());
        assert!(!OrderStatus::Delivered.is_exception());
    }

    #[test]
    fn test_serde_wire_names() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"Out for Delivery\"");

        let status: OrderStatus = serde_json::from_str("\"In Transit\"").unwrap();
        assert_eq!(status, OrderStatus::InTransit);
    }

    #[test]
    fn test_display_from_str_round_trip() {
        for status in OrderStatus::FULFILLMENT_PATH {
            let parsed: OrderStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("Lost in Warehouse".parse::<OrderStatus>().is_err());
    }
}
