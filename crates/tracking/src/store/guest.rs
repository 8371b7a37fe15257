//! Guest cart and wishlist storage.

use std::sync::Arc;

use driftwood_core::ProductId;

use crate::models::guest::{GuestItem, GuestList};

use super::{KeyValueStore, StoreError};

/// Cart and wishlist storage for an anonymous session.
///
/// Entries are unique by product ID within each list. Records are
/// created on the first add, mutated by add/remove/quantity changes,
/// and destroyed by explicit clear or successful migration.
#[derive(Clone)]
pub struct GuestSessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl GuestSessionStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load the entries of `list`. A missing document is an empty list.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read or the stored
    /// document is corrupt.
    pub async fn items(&self, list: GuestList) -> Result<Vec<GuestItem>, StoreError> {
        match self.kv.get(list.storage_key()).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Add an entry to `list`, upserting by product ID.
    ///
    /// Cart adds accumulate quantity onto an existing entry; wishlist
    /// adds are presence-only, so a duplicate add is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read or written.
    pub async fn add(&self, list: GuestList, item: GuestItem) -> Result<(), StoreError> {
        let mut items = self.items(list).await?;
        match items.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => {
                if list == GuestList::Cart {
                    let added = item.quantity.unwrap_or(1);
                    existing.quantity = Some(existing.quantity.unwrap_or(1).saturating_add(added));
                }
            }
            None => items.push(item),
        }
        self.save(list, &items).await
    }

    /// Remove the entry for `product_id` from `list`, if present.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read or written.
    pub async fn remove(&self, list: GuestList, product_id: &ProductId) -> Result<(), StoreError> {
        let mut items = self.items(list).await?;
        items.retain(|i| &i.product_id != product_id);
        self.save(list, &items).await
    }

    /// Set the quantity of a cart entry. Quantity zero removes the entry.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read or written.
    pub async fn set_quantity(&self, product_id: &ProductId, quantity: u32) -> Result<(), StoreError> {
        if quantity == 0 {
            return self.remove(GuestList::Cart, product_id).await;
        }
        let mut items = self.items(GuestList::Cart).await?;
        if let Some(existing) = items.iter_mut().find(|i| &i.product_id == product_id) {
            existing.quantity = Some(quantity);
        }
        self.save(GuestList::Cart, &items).await
    }

    /// Drop every entry in `list`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be written.
    pub async fn clear(&self, list: GuestList) -> Result<(), StoreError> {
        self.kv.remove(list.storage_key()).await
    }

    async fn save(&self, list: GuestList, items: &[GuestItem]) -> Result<(), StoreError> {
        self.kv.put(list.storage_key(), &serde_json::to_string(items)?).await
    }
}
