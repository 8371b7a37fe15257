//! Best-effort guest-to-account migration.
//!
//! Runs the migration service over a real guest store and a flaky
//! account API double: individual item failures are skipped without
//! failing the run, and the guest store is cleared once every entry has
//! been attempted.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use driftwood_core::ProductId;
use driftwood_integration_tests::sample_guest_item;
use driftwood_tracking::api::{AccountApi, ApiError};
use driftwood_tracking::migration::GuestMigrationService;
use driftwood_tracking::models::guest::{GuestItem, GuestList};
use driftwood_tracking::store::{GuestSessionStore, MemoryStore};

/// Account API double that fails adds for selected product IDs and
/// records every submission.
#[derive(Default)]
struct FlakyAccountApi {
    failing: Vec<ProductId>,
    cart_calls: Mutex<Vec<ProductId>>,
    wishlist_calls: Mutex<Vec<ProductId>>,
}

impl FlakyAccountApi {
    fn failing_on(product_ids: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            failing: product_ids.iter().map(|id| ProductId::new(*id)).collect(),
            ..Self::default()
        })
    }

    fn submit(&self, calls: &Mutex<Vec<ProductId>>, item: &GuestItem) -> Result<(), ApiError> {
        calls.lock().unwrap().push(item.product_id.clone());
        if self.failing.contains(&item.product_id) {
            return Err(ApiError::Api {
                status: 503,
                message: "upstream unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AccountApi for FlakyAccountApi {
    async fn add_cart_item(&self, item: &GuestItem) -> Result<(), ApiError> {
        self.submit(&self.cart_calls, item)
    }

    async fn add_wishlist_item(&self, item: &GuestItem) -> Result<(), ApiError> {
        self.submit(&self.wishlist_calls, item)
    }
}

async fn seeded_store() -> GuestSessionStore {
    let store = GuestSessionStore::new(Arc::new(MemoryStore::new()));
    store
        .add(GuestList::Cart, sample_guest_item("P-1", Some(1)))
        .await
        .unwrap();
    store
        .add(GuestList::Cart, sample_guest_item("P-2", Some(2)))
        .await
        .unwrap();
    store
        .add(GuestList::Cart, sample_guest_item("P-3", Some(1)))
        .await
        .unwrap();
    store
        .add(GuestList::Wishlist, sample_guest_item("P-9", None))
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn test_one_failing_item_is_skipped_and_store_still_clears() {
    let api = FlakyAccountApi::failing_on(&["P-2"]);
    let store = seeded_store().await;

    let report = GuestMigrationService::new(Arc::clone(&api) as Arc<dyn AccountApi>)
        .migrate(&store)
        .await;

    // All three cart items were submitted; only the flaky one failed.
    assert_eq!(api.cart_calls.lock().unwrap().len(), 3);
    assert_eq!(report.cart_migrated, 2);
    assert_eq!(report.wishlist_migrated, 1);
    assert_eq!(report.failed, vec![ProductId::new("P-2")]);
    assert!(!report.is_complete());

    // Clear-on-best-effort-completion: both lists are gone regardless.
    assert!(store.items(GuestList::Cart).await.unwrap().is_empty());
    assert!(store.items(GuestList::Wishlist).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clean_migration_reports_complete() {
    let api = FlakyAccountApi::failing_on(&[]);
    let store = seeded_store().await;

    let report = GuestMigrationService::new(Arc::clone(&api) as Arc<dyn AccountApi>)
        .migrate(&store)
        .await;

    assert!(report.is_complete());
    assert_eq!(report.cart_migrated, 3);
    assert_eq!(report.wishlist_migrated, 1);
    assert_eq!(api.wishlist_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_total_failure_never_raises_to_the_caller() {
    let api = FlakyAccountApi::failing_on(&["P-1", "P-2", "P-3", "P-9"]);
    let store = seeded_store().await;

    // Login must proceed regardless of migration outcome: migrate has
    // no error path at all, only a report.
    let report = GuestMigrationService::new(Arc::clone(&api) as Arc<dyn AccountApi>)
        .migrate(&store)
        .await;

    assert_eq!(report.cart_migrated, 0);
    assert_eq!(report.failed.len(), 4);
    assert!(store.items(GuestList::Cart).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_store_migrates_to_empty_report() {
    let api = FlakyAccountApi::failing_on(&[]);
    let store = GuestSessionStore::new(Arc::new(MemoryStore::new()));

    let report = GuestMigrationService::new(Arc::clone(&api) as Arc<dyn AccountApi>)
        .migrate(&store)
        .await;

    assert!(report.is_complete());
    assert_eq!(report.cart_migrated, 0);
    assert_eq!(api.cart_calls.lock().unwrap().len(), 0);
}
