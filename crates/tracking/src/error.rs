//! Crate-level error aggregation.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::feed::FeedError;
use crate::push::{ChannelError, TransportError};
use crate::store::StoreError;

/// Any error surfaced by the tracking subsystem.
///
/// Nothing here is fatal to the application: every failure mode
/// degrades to stale data or partial migration at the call site.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// Configuration loading failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Local key-value storage failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Backend API call failed.
    #[error("Backend API error: {0}")]
    Api(#[from] ApiError),

    /// Push channel refused to open.
    #[error("Push channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Push transport failed.
    #[error("Push transport error: {0}")]
    Transport(#[from] TransportError),

    /// Feed subscription failed.
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),
}
