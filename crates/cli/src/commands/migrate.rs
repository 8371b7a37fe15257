//! Guest migration command.

use std::sync::Arc;

use driftwood_tracking::api::BackendClient;
use driftwood_tracking::config::TrackingConfig;
use driftwood_tracking::migration::GuestMigrationService;
use driftwood_tracking::store::{GuestSessionStore, JsonFileStore};

/// Migrate the guest cart and wishlist into the authenticated account.
pub async fn run(config: &TrackingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let Some(token) = &config.api_token else {
        return Err("DRIFTWOOD_API_TOKEN is required to migrate into an account".into());
    };

    let kv = Arc::new(JsonFileStore::open(config.data_dir.clone()).await?);
    let store = GuestSessionStore::new(kv);
    let api = Arc::new(BackendClient::new(config.api_base_url.clone(), token)?);

    let report = GuestMigrationService::new(api).migrate(&store).await;

    if report.is_complete() {
        tracing::info!(
            cart = report.cart_migrated,
            wishlist = report.wishlist_migrated,
            "guest data migrated"
        );
    } else {
        tracing::warn!(
            cart = report.cart_migrated,
            wishlist = report.wishlist_migrated,
            failed = report.failed.len(),
            "guest data migrated with skipped items"
        );
    }
    Ok(())
}
