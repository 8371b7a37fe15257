//! Durable client-side storage for guest sessions.
//!
//! Anonymous sessions keep their data in a local key-value store with
//! three keys — `guest_cart`, `guest_wishlist` and `guest_orders` — each
//! holding one JSON document. [`GuestSessionStore`] layers the cart and
//! wishlist lifecycle over the raw store; [`LocalOrderStore`] holds the
//! anonymous order list the status simulator advances.

mod guest;
mod json_file;
mod memory;
mod orders;

pub use guest::GuestSessionStore;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use orders::LocalOrderStore;

use async_trait::async_trait;
use thiserror::Error;

/// Storage key for the anonymous order list.
pub const ORDERS_KEY: &str = "guest_orders";

/// Errors from the local key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying storage I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document could not be (de)serialized.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A local durable key-value store.
///
/// Each key holds one JSON document. Implementations must be safe to
/// share across tasks.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the document stored at `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write the document at `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the document at `key`. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
