//! Server-push synchronization channel.
//!
//! Delivers authoritative order-status changes for authenticated
//! sessions over a single long-lived streaming connection, with
//! automatic reconnection:
//!
//! `Disconnected → Connecting → Connected → (Disconnected on error)`
//!
//! Transport failures schedule exactly one reconnect attempt after a
//! fixed delay (never exponential). Application-level rejections
//! (`success: false`) and subscriber detachment tear the channel down
//! without reconnecting. Only one connection task exists at a time.

pub mod message;
pub mod transport;

pub use message::PushMessage;
pub use transport::{HttpStreamTransport, LineStream, StreamTransport, TransportError};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::models::order::{Order, OrderUpdate};

/// Capacity of the subscriber event queue.
const EVENT_BUFFER: usize = 64;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Events delivered to the channel's subscriber, in arrival order.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// Connectivity change, for the connection indicator.
    Connectivity(ChannelState),
    /// Replace the entire order list.
    InitialData(Vec<Order>),
    /// Patch exactly one order.
    OrderUpdate(OrderUpdate),
    /// Application-level error delivered over the channel. The
    /// connection is torn down after this event.
    ServerError(String),
}

/// Errors from [`PushChannel::connect`].
#[derive(Debug, Error)]
pub enum ChannelError {
    /// No credential is available. Hard precondition, not retryable.
    #[error("cannot open push channel without a credential")]
    MissingCredential,

    /// A connection task is already live.
    #[error("push channel is already connected")]
    AlreadyConnected,
}

/// The push synchronization channel.
///
/// Cheaply cloneable; all clones share one connection task.
#[derive(Clone)]
pub struct PushChannel {
    inner: Arc<ChannelInner>,
}

struct ChannelInner {
    transport: Arc<dyn StreamTransport>,
    credential: Option<SecretString>,
    reconnect_delay: Duration,
    state: Mutex<ChannelState>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ChannelInner {
    fn set_state(&self, state: ChannelState) {
        *lock(&self.state) = state;
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PushChannel {
    #[must_use]
    pub fn new(
        transport: Arc<dyn StreamTransport>,
        credential: Option<SecretString>,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                transport,
                credential,
                reconnect_delay,
                state: Mutex::new(ChannelState::Disconnected),
                task: Mutex::new(None),
            }),
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        *lock(&self.inner.state)
    }

    /// Open the channel and return the subscriber's event stream.
    ///
    /// Fails fast with [`ChannelError::MissingCredential`] when no
    /// credential is present; nothing is spawned. Refuses with
    /// [`ChannelError::AlreadyConnected`] while a connection task is
    /// live, so overlapping reconnect logic cannot create a duplicate
    /// channel. Dropping the receiver tears the connection down without
    /// scheduling a reconnect.
    ///
    /// # Errors
    ///
    /// See above; these are the only two failure modes.
    pub fn connect(&self) -> Result<mpsc::Receiver<ChannelEvent>, ChannelError> {
        let credential = self
            .inner
            .credential
            .clone()
            .ok_or(ChannelError::MissingCredential)?;

        let mut task = lock(&self.inner.task);
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return Err(ChannelError::AlreadyConnected);
        }

        let (events, receiver) = mpsc::channel(EVENT_BUFFER);
        let inner = Arc::clone(&self.inner);
        *task = Some(tokio::spawn(run(inner, credential, events)));
        Ok(receiver)
    }

    /// Tear the connection down and stop reconnecting.
    pub fn disconnect(&self) {
        if let Some(task) = lock(&self.inner.task).take() {
            task.abort();
        }
        self.inner.set_state(ChannelState::Disconnected);
    }
}

/// Why a live connection ended.
enum Teardown {
    /// Transport failed or the server closed the stream; reconnect.
    TransportLost,
    /// `success: false` payload; tear down without reconnecting.
    ServerRejected,
    /// The subscriber dropped its receiver; tear down silently.
    SubscriberGone,
}

async fn run(
    inner: Arc<ChannelInner>,
    credential: SecretString,
    events: mpsc::Sender<ChannelEvent>,
) {
    loop {
        inner.set_state(ChannelState::Connecting);
        let stream = match inner.transport.open(credential.expose_secret()).await {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!(error = %e, "push channel connection failed");
                None
            }
        };

        if let Some(stream) = stream {
            inner.set_state(ChannelState::Connected);
            info!("push channel connected");
            if events
                .send(ChannelEvent::Connectivity(ChannelState::Connected))
                .await
                .is_err()
            {
                break;
            }

            match pump(stream, &events).await {
                Teardown::SubscriberGone => {
                    debug!("push subscriber detached; closing channel");
                    break;
                }
                Teardown::ServerRejected => {
                    inner.set_state(ChannelState::Disconnected);
                    let _ = events
                        .send(ChannelEvent::Connectivity(ChannelState::Disconnected))
                        .await;
                    break;
                }
                Teardown::TransportLost => {}
            }
        }

        inner.set_state(ChannelState::Disconnected);
        if events
            .send(ChannelEvent::Connectivity(ChannelState::Disconnected))
            .await
            .is_err()
        {
            break;
        }

        // One reconnect attempt on a fixed delay; never exponential.
        tokio::time::sleep(inner.reconnect_delay).await;
        if events.is_closed() {
            break;
        }
        debug!("attempting push channel reconnect");
    }

    inner.set_state(ChannelState::Disconnected);
}

/// Read the live stream until it ends one way or another.
///
/// Messages are applied in arrival order; there is no client-side
/// reordering or deduplication. Unparseable lines are logged and
/// skipped.
async fn pump(mut stream: LineStream, events: &mpsc::Sender<ChannelEvent>) -> Teardown {
    while let Some(next) = stream.next().await {
        let line = match next {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "push stream transport error");
                return Teardown::TransportLost;
            }
        };
        if line.is_empty() {
            continue;
        }

        let message: PushMessage = match serde_json::from_str(&line) {
            Ok(message) => message,
            Err(e) => {
                debug!(error = %e, "ignoring unparseable push message");
                continue;
            }
        };

        if let Some(reason) = message.rejection() {
            warn!(reason, "push channel rejected by server");
            let _ = events
                .send(ChannelEvent::ServerError(reason.to_owned()))
                .await;
            return Teardown::ServerRejected;
        }

        let event = match message {
            PushMessage::Connected { message } => {
                debug!(?message, "push channel handshake acknowledged");
                continue;
            }
            PushMessage::Ping => continue,
            PushMessage::InitialData { orders, .. } => ChannelEvent::InitialData(orders),
            PushMessage::OrderUpdate {
                order: Some(update),
                ..
            } => ChannelEvent::OrderUpdate(update),
            PushMessage::OrderUpdate { order: None, .. } => {
                debug!("order_update without payload; ignoring");
                continue;
            }
        };

        if events.send(event).await.is_err() {
            return Teardown::SubscriberGone;
        }
    }

    // The server closed the stream; treat it as a transport-level loss.
    Teardown::TransportLost
}
