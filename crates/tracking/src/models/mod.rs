//! Domain models for order tracking.
//!
//! # Models
//!
//! - [`order`] - Order records, status history, and push-update patches
//! - [`guest`] - Guest-session cart and wishlist entries

pub mod guest;
pub mod order;

pub use guest::{GuestItem, GuestList};
pub use order::{Order, OrderItem, OrderUpdate, ShippingAddress, StatusDetail};
