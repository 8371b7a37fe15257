//! Guest-session cart and wishlist entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use driftwood_core::ProductId;

/// A guest cart or wishlist entry.
///
/// Unique by `productId` within its list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestItem {
    pub product_id: ProductId,
    /// Quantity is meaningful for cart entries; wishlist entries omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    pub price: Decimal,
    pub title: String,
    pub image: String,
}

/// Which guest list a store operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestList {
    Cart,
    Wishlist,
}

impl GuestList {
    /// Key of this list in the durable key-value store.
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Cart => "guest_cart",
            Self::Wishlist => "guest_wishlist",
        }
    }
}
