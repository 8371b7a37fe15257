//! Push channel wire messages.
//!
//! The server emits newline-delimited JSON events of four kinds:
//! `connected`, `ping`, `initial_data` and `order_update`. A payload
//! carrying `success: false` is an application-level error delivered
//! over the channel.

use serde::Deserialize;

use crate::models::order::{Order, OrderUpdate};

/// One inbound event from the push stream.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushMessage {
    /// Handshake acknowledgement; logging only.
    Connected {
        #[serde(default)]
        message: Option<String>,
    },
    /// Keep-alive; no-op.
    Ping,
    /// Replace the entire order list.
    InitialData {
        #[serde(default = "default_true")]
        success: bool,
        #[serde(default)]
        orders: Vec<Order>,
        #[serde(default)]
        message: Option<String>,
    },
    /// Patch one order's tracking fields.
    OrderUpdate {
        #[serde(default = "default_true")]
        success: bool,
        #[serde(default)]
        order: Option<OrderUpdate>,
        #[serde(default)]
        message: Option<String>,
    },
}

const fn default_true() -> bool {
    true
}

impl PushMessage {
    /// The error text when the payload is marked unsuccessful.
    #[must_use]
    pub fn rejection(&self) -> Option<&str> {
        match self {
            Self::InitialData {
                success: false,
                message,
                ..
            }
            | Self::OrderUpdate {
                success: false,
                message,
                ..
            } => Some(message.as_deref().unwrap_or("server reported an error")),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use driftwood_core::OrderStatus;

    use super::*;

    #[test]
    fn test_parse_connected_and_ping() {
        let connected: PushMessage =
            serde_json::from_str(r#"{"type":"connected","message":"hello"}"#).unwrap();
        assert!(matches!(connected, PushMessage::Connected { .. }));
        assert!(connected.rejection().is_none());

        let ping: PushMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(ping, PushMessage::Ping));
    }

    #[test]
    fn test_parse_initial_data_defaults_to_success() {
        let message: PushMessage =
            serde_json::from_str(r#"{"type":"initial_data","orders":[]}"#).unwrap();
        match message {
            PushMessage::InitialData { success, orders, .. } => {
                assert!(success);
                assert!(orders.is_empty());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_parse_order_update_patch() {
        let raw = r#"{
            "type": "order_update",
            "order": {
                "id": "ORD-9",
                "status": "Shipped",
                "trackingNumber": "TRK-1"
            }
        }"#;
        let message: PushMessage = serde_json::from_str(raw).unwrap();
        match message {
            PushMessage::OrderUpdate { order: Some(update), .. } => {
                assert_eq!(update.status, Some(OrderStatus::Shipped));
                assert_eq!(update.tracking_number.as_deref(), Some("TRK-1"));
                assert_eq!(update.notes, None);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_unsuccessful_payload_is_a_rejection() {
        let message: PushMessage = serde_json::from_str(
            r#"{"type":"order_update","success":false,"message":"session expired"}"#,
        )
        .unwrap();
        assert_eq!(message.rejection(), Some("session expired"));

        let bare: PushMessage =
            serde_json::from_str(r#"{"type":"initial_data","success":false}"#).unwrap();
        assert_eq!(bare.rejection(), Some("server reported an error"));
    }

    #[test]
    fn test_unknown_kind_fails_to_parse() {
        assert!(serde_json::from_str::<PushMessage>(r#"{"type":"refund_issued"}"#).is_err());
    }
}
