//! Guest-to-account migration.
//!
//! Moves anonymous cart and wishlist entries into an authenticated
//! account exactly once after login. At-most-once per item, best-effort:
//! an entry that fails to submit is logged and skipped, and the guest
//! store is cleared once every entry has been attempted, so an
//! unrecoverable guest store can never block login.

use std::sync::Arc;

use tracing::{info, warn};

use driftwood_core::ProductId;

use crate::api::AccountApi;
use crate::models::guest::GuestList;
use crate::store::GuestSessionStore;

/// Outcome of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Cart entries submitted successfully.
    pub cart_migrated: usize,
    /// Wishlist entries submitted successfully.
    pub wishlist_migrated: usize,
    /// Product IDs whose add call failed (logged and skipped).
    pub failed: Vec<ProductId>,
}

impl MigrationReport {
    /// True when every entry was submitted successfully.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drains the guest store into an authenticated account.
pub struct GuestMigrationService {
    api: Arc<dyn AccountApi>,
}

impl GuestMigrationService {
    #[must_use]
    pub fn new(api: Arc<dyn AccountApi>) -> Self {
        Self { api }
    }

    /// Migrate both guest lists into the account.
    ///
    /// Never fails: item failures are recorded in the report, store
    /// failures are logged, and the caller's login flow proceeds
    /// regardless of the outcome. Each list is cleared only after every
    /// one of its entries has been submitted or skipped.
    pub async fn migrate(&self, store: &GuestSessionStore) -> MigrationReport {
        let mut report = MigrationReport::default();
        self.migrate_list(store, GuestList::Cart, &mut report).await;
        self.migrate_list(store, GuestList::Wishlist, &mut report).await;

        info!(
            cart = report.cart_migrated,
            wishlist = report.wishlist_migrated,
            failed = report.failed.len(),
            "guest migration finished"
        );
        report
    }

    async fn migrate_list(
        &self,
        store: &GuestSessionStore,
        list: GuestList,
        report: &mut MigrationReport,
    ) {
        let items = match store.items(list).await {
            Ok(items) => items,
            Err(e) => {
                warn!(?list, error = %e, "could not read guest store; skipping migration");
                return;
            }
        };

        for item in &items {
            let result = match list {
                GuestList::Cart => self.api.add_cart_item(item).await,
                GuestList::Wishlist => self.api.add_wishlist_item(item).await,
            };
            match result {
                Ok(()) => match list {
                    GuestList::Cart => report.cart_migrated += 1,
                    GuestList::Wishlist => report.wishlist_migrated += 1,
                },
                Err(e) => {
                    warn!(product_id = %item.product_id, ?list, error = %e, "guest item migration failed; skipping");
                    report.failed.push(item.product_id.clone());
                }
            }
        }

        // Clear-on-best-effort-completion: every entry has been
        // attempted, so the guest copy goes away even if some failed.
        if let Err(e) = store.clear(list).await {
            warn!(?list, error = %e, "failed to clear guest store after migration");
        }
    }
}
