//! Session order feeds and the view aggregator.
//!
//! A single polymorphic feed interface abstracts over which source is
//! authoritative for the session: the local store driven by the status
//! simulator (anonymous) or the backend fetch plus push channel
//! (authenticated). Exactly one source is active per subscription,
//! selected by authentication state at subscription time, and the
//! aggregator never branches on authentication.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{ApiError, BackendClient, OrdersApi};
use crate::clock::{Clock, SystemClock};
use crate::config::TrackingConfig;
use crate::models::order::{Order, OrderUpdate};
use crate::push::{ChannelError, ChannelEvent, ChannelState, HttpStreamTransport, PushChannel};
use crate::simulator::{SimulatorHandle, SimulatorSchedule, StatusSimulator};
use crate::store::{LocalOrderStore, StoreError};

/// Capacity of the feed event queue.
const EVENT_BUFFER: usize = 16;

/// Events emitted by an order feed.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// Replace the whole order list.
    Snapshot(Vec<Order>),
    /// Patch one order by ID.
    Update(OrderUpdate),
    /// Connectivity for the "disconnected" indicator. Local feeds never
    /// emit this; they are always connected.
    Connectivity(bool),
    /// Non-fatal error to surface as a toast.
    Error(String),
}

/// Errors starting a feed subscription.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The local order store could not be hydrated.
    #[error("order store error: {0}")]
    Store(#[from] StoreError),

    /// The push channel refused to open.
    #[error("push channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// A live feed subscription.
///
/// Dropping the subscription tears down whichever source was active:
/// the simulator timer stops and the push connection closes.
pub struct FeedSubscription {
    /// Feed events, in arrival order.
    pub events: mpsc::Receiver<FeedEvent>,
    _teardown: Teardown,
}

enum Teardown {
    Local {
        simulator: SimulatorHandle,
        forwarder: JoinHandle<()>,
    },
    Remote {
        channel: PushChannel,
        mapper: JoinHandle<()>,
    },
}

impl Drop for Teardown {
    fn drop(&mut self) {
        match self {
            Self::Local {
                simulator,
                forwarder,
            } => {
                simulator.stop();
                forwarder.abort();
            }
            Self::Remote { channel, mapper } => {
                channel.disconnect();
                mapper.abort();
            }
        }
    }
}

/// A source of view-ready order data for one session.
#[async_trait]
pub trait OrderFeed: Send + Sync {
    /// Start the feed and stream its events.
    async fn subscribe(&self) -> Result<FeedSubscription, FeedError>;
}

/// Build the session's feed from configuration.
///
/// Remote when the session holds a credential, local simulation
/// otherwise. Selection happens once, here; switching sources mid-
/// session means dropping the old subscription and building a new feed,
/// so updates from the two sources never interleave.
///
/// # Errors
///
/// Returns `ApiError` if the backend client cannot be constructed from
/// the configured credential.
pub fn session_feed(
    config: &TrackingConfig,
    store: Arc<LocalOrderStore>,
) -> Result<Arc<dyn OrderFeed>, ApiError> {
    match &config.api_token {
        Some(token) => {
            let api = Arc::new(BackendClient::new(config.api_base_url.clone(), token)?);
            let transport = Arc::new(HttpStreamTransport::new(config.stream_url.clone()));
            let channel = PushChannel::new(transport, Some(token.clone()), config.reconnect_delay);
            Ok(Arc::new(RemoteOrderFeed::new(api, channel)))
        }
        None => Ok(Arc::new(LocalOrderFeed::new(
            store,
            Arc::new(SystemClock),
            config.schedule.clone(),
            config.tick_interval,
        ))),
    }
}

// =============================================================================
// LocalOrderFeed
// =============================================================================

/// Anonymous-session feed: the local order store advanced by the status
/// simulator.
pub struct LocalOrderFeed {
    store: Arc<LocalOrderStore>,
    clock: Arc<dyn Clock>,
    schedule: SimulatorSchedule,
    tick_interval: Duration,
}

impl LocalOrderFeed {
    #[must_use]
    pub fn new(
        store: Arc<LocalOrderStore>,
        clock: Arc<dyn Clock>,
        schedule: SimulatorSchedule,
        tick_interval: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            schedule,
            tick_interval,
        }
    }
}

#[async_trait]
impl OrderFeed for LocalOrderFeed {
    async fn subscribe(&self) -> Result<FeedSubscription, FeedError> {
        self.store.load().await?;

        let (events, receiver) = mpsc::channel(EVENT_BUFFER);

        // Initial snapshot, then one per store revision.
        let _ = events
            .send(FeedEvent::Snapshot(self.store.orders().await))
            .await;

        let store = Arc::clone(&self.store);
        let mut revisions = store.watch_revision();
        let forwarder = tokio::spawn(async move {
            while revisions.changed().await.is_ok() {
                if events
                    .send(FeedEvent::Snapshot(store.orders().await))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });

        let simulator = StatusSimulator::new(
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            self.schedule.clone(),
            self.tick_interval,
        )
        .spawn();

        Ok(FeedSubscription {
            events: receiver,
            _teardown: Teardown::Local {
                simulator,
                forwarder,
            },
        })
    }
}

// =============================================================================
// RemoteOrderFeed
// =============================================================================

/// Authenticated-session feed: an initial backend fetch plus live push
/// channel patches.
pub struct RemoteOrderFeed {
    api: Arc<dyn OrdersApi>,
    channel: PushChannel,
}

impl RemoteOrderFeed {
    #[must_use]
    pub fn new(api: Arc<dyn OrdersApi>, channel: PushChannel) -> Self {
        Self { api, channel }
    }
}

#[async_trait]
impl OrderFeed for RemoteOrderFeed {
    async fn subscribe(&self) -> Result<FeedSubscription, FeedError> {
        let mut channel_events = self.channel.connect()?;

        let (events, receiver) = mpsc::channel(EVENT_BUFFER);

        // Initial fetch. On failure the channel's initial_data still
        // replaces the list once it arrives.
        match self.api.list_orders().await {
            Ok(orders) => {
                let _ = events.send(FeedEvent::Snapshot(orders)).await;
            }
            Err(e) => {
                warn!(error = %e, "initial order fetch failed");
                let _ = events
                    .send(FeedEvent::Error(format!("could not load orders: {e}")))
                    .await;
            }
        }

        let mapper = tokio::spawn(async move {
            while let Some(event) = channel_events.recv().await {
                let mapped = match event {
                    ChannelEvent::Connectivity(state) => {
                        FeedEvent::Connectivity(state == ChannelState::Connected)
                    }
                    ChannelEvent::InitialData(orders) => FeedEvent::Snapshot(orders),
                    ChannelEvent::OrderUpdate(update) => FeedEvent::Update(update),
                    ChannelEvent::ServerError(message) => FeedEvent::Error(message),
                };
                if events.send(mapped).await.is_err() {
                    break;
                }
            }
        });

        Ok(FeedSubscription {
            events: receiver,
            _teardown: Teardown::Remote {
                channel: self.channel.clone(),
                mapper,
            },
        })
    }
}

// =============================================================================
// OrderViewAggregator
// =============================================================================

/// The single read model consumed by the UI.
///
/// Applies feed events without knowing which source produced them:
/// snapshots replace the list (newest first), updates patch one order
/// in place, connectivity and errors drive the indicator and toast
/// state.
#[derive(Debug)]
pub struct OrderViewAggregator {
    orders: Vec<Order>,
    connected: bool,
    last_error: Option<String>,
}

impl Default for OrderViewAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderViewAggregator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            orders: Vec::new(),
            connected: true,
            last_error: None,
        }
    }

    /// Apply one feed event.
    pub fn apply(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Snapshot(mut orders) => {
                orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                self.orders = orders;
            }
            FeedEvent::Update(update) => {
                match self.orders.iter_mut().find(|o| o.id == update.id) {
                    Some(order) => order.apply_update(&update),
                    None => debug!(order_id = %update.id, "update for unknown order dropped"),
                }
            }
            FeedEvent::Connectivity(connected) => self.connected = connected,
            FeedEvent::Error(message) => self.last_error = Some(message),
        }
    }

    /// View-ready order list, newest first.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// False while the push channel is down (drives the indicator).
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    /// Take the pending toast message, if any.
    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use chrono::{DateTime, TimeZone, Utc};

    use driftwood_core::{OrderId, OrderStatus};

    use crate::models::order::ShippingAddress;

    use super::*;

    fn order(id: &str, created_at: DateTime<Utc>) -> Order {
        Order {
            id: OrderId::new(id),
            status: OrderStatus::OrderReceived,
            status_details: HashMap::new(),
            items: Vec::new(),
            address: ShippingAddress {
                name: "Rowan Ellis".to_string(),
                line1: "7 Driftwood Way".to_string(),
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
            created_at,
        }
    }

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_snapshot_sorts_newest_first() {
        let mut view = OrderViewAggregator::new();
        view.apply(FeedEvent::Snapshot(vec![
            order("ORD-old", t(8)),
            order("ORD-new", t(14)),
            order("ORD-mid", t(11)),
        ]));

        let ids: Vec<&str> = view.orders().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["ORD-new", "ORD-mid", "ORD-old"]);
    }

    #[test]
    fn test_update_patches_matching_order_only() {
        let mut view = OrderViewAggregator::new();
        view.apply(FeedEvent::Snapshot(vec![
            order("ORD-1", t(8)),
            order("ORD-2", t(9)),
        ]));

        view.apply(FeedEvent::Update(OrderUpdate {
            id: OrderId::new("ORD-1"),
            status: Some(OrderStatus::Shipped),
            tracking_number: Some("TRK-77".to_string()),
            notes: None,
            estimated_delivery: None,
            delivered_at: None,
        }));

        let patched = view.orders().iter().find(|o| o.id.as_str() == "ORD-1").unwrap();
        assert_eq!(patched.status, OrderStatus::Shipped);
        assert_eq!(patched.tracking_number.as_deref(), Some("TRK-77"));

        let untouched = view.orders().iter().find(|o| o.id.as_str() == "ORD-2").unwrap();
        assert_eq!(untouched.status, OrderStatus::OrderReceived);
        assert_eq!(untouched.tracking_number, None);
    }

    #[test]
    fn test_update_for_unknown_order_is_dropped() {
        let mut view = OrderViewAggregator::new();
        view.apply(FeedEvent::Snapshot(vec![order("ORD-1", t(8))]));
        view.apply(FeedEvent::Update(OrderUpdate {
            id: OrderId::new("ORD-ghost"),
            status: Some(OrderStatus::Delivered),
            tracking_number: None,
            notes: None,
            estimated_delivery: None,
            delivered_at: None,
        }));

        assert_eq!(view.orders().len(), 1);
        assert_eq!(view.orders().first().unwrap().status, OrderStatus::OrderReceived);
    }

    #[test]
    fn test_connectivity_and_error_state() {
        let mut view = OrderViewAggregator::new();
        assert!(view.is_connected());

        view.apply(FeedEvent::Connectivity(false));
        assert!(!view.is_connected());

        view.apply(FeedEvent::Error("session expired".to_string()));
        assert_eq!(view.take_error().as_deref(), Some("session expired"));
        assert_eq!(view.take_error(), None);

        view.apply(FeedEvent::Connectivity(true));
        assert!(view.is_connected());
    }
}
