//! Persisted order records for anonymous sessions.

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use driftwood_core::OrderId;

use crate::models::order::Order;

use super::{KeyValueStore, ORDERS_KEY, StoreError};

/// The anonymous session's order list.
///
/// Orders live in memory and are persisted wholesale to the key-value
/// store. A watch channel carries a revision counter so feeds can
/// observe changes without polling.
pub struct LocalOrderStore {
    kv: Arc<dyn KeyValueStore>,
    orders: RwLock<Vec<Order>>,
    revision: watch::Sender<u64>,
}

impl LocalOrderStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            kv,
            orders: RwLock::new(Vec::new()),
            revision,
        }
    }

    /// Hydrate the in-memory list from durable storage.
    ///
    /// A missing document leaves the list empty.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read or the stored
    /// document is corrupt.
    pub async fn load(&self) -> Result<(), StoreError> {
        let loaded: Vec<Order> = match self.kv.get(ORDERS_KEY).await? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        *self.orders.write().await = loaded;
        self.bump();
        Ok(())
    }

    /// Append a new order (local checkout completion) and persist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the persist fails; the order is still
    /// held in memory.
    pub async fn insert(&self, order: Order) -> Result<(), StoreError> {
        self.orders.write().await.push(order);
        self.bump();
        self.persist().await
    }

    /// Snapshot of the current order list.
    pub async fn orders(&self) -> Vec<Order> {
        self.orders.read().await.clone()
    }

    /// Look up one order by ID.
    pub async fn get(&self, id: &OrderId) -> Option<Order> {
        self.orders.read().await.iter().find(|o| &o.id == id).cloned()
    }

    /// Mutate the order list in place.
    ///
    /// Bumps the revision only when `mutate` reports a change, so
    /// observers do not wake on no-op ticks.
    pub async fn update_orders<F>(&self, mutate: F) -> bool
    where
        F: FnOnce(&mut Vec<Order>) -> bool,
    {
        let changed = mutate(&mut *self.orders.write().await);
        if changed {
            self.bump();
        }
        changed
    }

    /// Persist the full list to durable storage.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the write fails; in-memory state is
    /// untouched and the caller may retry later.
    pub async fn persist(&self) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&*self.orders.read().await)?;
        self.kv.put(ORDERS_KEY, &raw).await
    }

    /// Drop all orders from memory and durable storage.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be written.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.orders.write().await.clear();
        self.bump();
        self.kv.remove(ORDERS_KEY).await
    }

    /// Observe list revisions. The value only ever increases.
    #[must_use]
    pub fn watch_revision(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};
    use driftwood_core::OrderStatus;

    use crate::models::order::ShippingAddress;
    use crate::store::MemoryStore;

    use super::*;

    fn sample_order(id: &str) -> Order {
        Order {
            id: OrderId::new(id),
            status: OrderStatus::OrderReceived,
            status_details: HashMap::new(),
            items: Vec::new(),
            address: ShippingAddress {
                name: "Sam Okafor".to_string(),
                line1: "4 Pier St".to_string(),
                line2: None,
                city: "Astoria".to_string(),
                state: "OR".to_string(),
                postal_code: "97103".to_string(),
                country: "US".to_string(),
                phone: None,
            },
            payment_method: None,
            estimated_delivery: None,
            tracking_number: None,
            notes: None,
            delivered_at: None,
            created_at: Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_persists_and_reloads() {
        let kv = Arc::new(MemoryStore::new());

        let store = LocalOrderStore::new(Arc::clone(&kv) as Arc<dyn KeyValueStore>);
        store.insert(sample_order("ORD-1")).await.unwrap();
        store.insert(sample_order("ORD-2")).await.unwrap();

        // A fresh store over the same KV sees the persisted list.
        let restored = LocalOrderStore::new(kv);
        restored.load().await.unwrap();
        assert_eq!(restored.orders().await.len(), 2);
        assert!(restored.get(&OrderId::new("ORD-1")).await.is_some());
    }

    #[tokio::test]
    async fn test_revision_bumps_only_on_change() {
        let store = LocalOrderStore::new(Arc::new(MemoryStore::new()));
        let mut revisions = store.watch_revision();
        let before = *revisions.borrow_and_update();

        store.update_orders(|_| false).await;
        assert_eq!(*store.watch_revision().borrow(), before);

        store.update_orders(|_| true).await;
        assert!(revisions.has_changed().unwrap());
    }
}
