//! Driftwood CLI - guest checkout, order tracking, and migration tools.
//!
//! # Usage
//!
//! ```bash
//! # Complete a local (guest) checkout with a demo order
//! dw-cli checkout
//!
//! # Follow the session's order feed (simulated or server-pushed)
//! dw-cli track
//!
//! # Migrate the guest cart and wishlist into the account
//! dw-cli migrate
//! ```
//!
//! # Commands
//!
//! - `checkout` - Create a guest order in the local store
//! - `track` - Render the order list on every feed event until Ctrl+C
//! - `migrate` - Drain the guest cart/wishlist into the account

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use driftwood_tracking::config::TrackingConfig;

mod commands;

#[derive(Parser)]
#[command(name = "dw-cli")]
#[command(author, version, about = "Driftwood storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Complete a local checkout, creating a guest order
    Checkout {
        /// Number of demo line items on the order
        #[arg(short, long, default_value_t = 1)]
        items: u32,
    },
    /// Follow the session's order feed until interrupted
    Track,
    /// Migrate the guest cart and wishlist into the account
    Migrate,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Initialize Sentry (must be done before the tracing subscriber)
    let _sentry_guard = init_sentry();

    // Initialize tracing with EnvFilter and Sentry integration
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dw_cli=info,driftwood_tracking=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = TrackingConfig::from_env()?;

    match cli.command {
        Commands::Checkout { items } => commands::checkout::run(&config, items).await?,
        Commands::Track => commands::track::run(&config).await?,
        Commands::Migrate => commands::migrate::run(&config).await?,
    }
    Ok(())
}
