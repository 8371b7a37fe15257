//! Follow the session's order feed and render it on every change.

use std::sync::Arc;

use driftwood_core::OrderStatus;
use driftwood_tracking::config::TrackingConfig;
use driftwood_tracking::feed::{OrderViewAggregator, session_feed};
use driftwood_tracking::store::{JsonFileStore, LocalOrderStore};

/// Subscribe to the session's order feed (server push when a credential
/// is configured, local simulation otherwise) and render the order list
/// on every event until Ctrl+C or SIGTERM.
pub async fn run(config: &TrackingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let kv = Arc::new(JsonFileStore::open(config.data_dir.clone()).await?);
    let store = Arc::new(LocalOrderStore::new(kv));

    let feed = session_feed(config, store)?;
    let mut subscription = feed.subscribe().await?;
    let mut view = OrderViewAggregator::new();

    tracing::info!(
        authenticated = config.is_authenticated(),
        "order tracking started"
    );

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            event = subscription.events.recv() => match event {
                Some(event) => {
                    view.apply(event);
                    render(&mut view);
                }
                None => break,
            },
        }
    }

    tracing::info!("order tracking stopped");
    Ok(())
}

/// Render the aggregated view to the terminal.
#[allow(clippy::print_stdout)] // terminal rendering is this command's output
fn render(view: &mut OrderViewAggregator) {
    if let Some(message) = view.take_error() {
        println!("! {message}");
    }
    if !view.is_connected() {
        println!("(disconnected - retrying)");
    }

    if view.orders().is_empty() {
        println!("No orders yet.");
        return;
    }

    for order in view.orders() {
        // Exception statuses render as a badge, not a step position.
        let progress = if order.status.is_exception() {
            format!("[{}]", order.status)
        } else {
            format!(
                "step {}/{}",
                order.status.completed_steps().len(),
                OrderStatus::FULFILLMENT_PATH.len()
            )
        };
        let status = order.status.to_string();
        println!("{}  {status:<16}  {progress}", order.id);
    }
    println!("---");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
