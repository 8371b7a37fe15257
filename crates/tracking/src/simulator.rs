//! Time-driven status progression for anonymous orders.
//!
//! Gives non-authenticated sessions the illusion of order progress
//! without a backend: a recurring tick maps each order's absolute
//! elapsed time through a threshold schedule to a fulfillment status.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use driftwood_core::OrderStatus;

use crate::clock::Clock;
use crate::store::LocalOrderStore;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Elapsed-hours thresholds mapping order age to fulfillment status.
///
/// `status_for` picks the first bucket whose upper bound is strictly
/// greater than the elapsed time; at or past the last bound the order
/// is `final_status`. The defaults are the demo-paced reference values
/// (minutes, not fulfillment SLAs); real deployments supply their own
/// timings through configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorSchedule {
    /// `(upper_bound_hours, status)` pairs, ascending, bounds exclusive.
    pub buckets: Vec<(f64, OrderStatus)>,
    /// Status once every bound has passed.
    pub final_status: OrderStatus,
}

impl Default for SimulatorSchedule {
    fn default() -> Self {
        Self {
            buckets: vec![
                (0.03, OrderStatus::OrderReceived),
                (0.06, OrderStatus::Processing),
                (0.15, OrderStatus::Packed),
                (0.18, OrderStatus::Shipped),
                (0.21, OrderStatus::InTransit),
                (0.24, OrderStatus::OutForDelivery),
            ],
            final_status: OrderStatus::Delivered,
        }
    }
}

impl SimulatorSchedule {
    /// Map an order's elapsed hours to its simulated status.
    #[must_use]
    pub fn status_for(&self, elapsed_hours: f64) -> OrderStatus {
        self.buckets
            .iter()
            .find(|(bound, _)| elapsed_hours < *bound)
            .map_or(self.final_status, |(_, status)| *status)
    }
}

/// Advances the local order store on a fixed interval.
pub struct StatusSimulator {
    store: Arc<LocalOrderStore>,
    clock: Arc<dyn Clock>,
    schedule: SimulatorSchedule,
    tick_interval: Duration,
}

impl StatusSimulator {
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

    /// Re-evaluate every non-terminal order against the schedule.
    ///
    /// The mapping is a pure function of absolute elapsed time, so a
    /// store cleared and restored near a bucket boundary may skip
    /// intermediate statuses; history entries are only written for
    /// statuses actually reached. Transitions are forward-only and
    /// idempotent per status name; `Delivered` orders are excluded from
    /// further evaluation, and `Cancelled`/`Returned` never originate
    /// here.
    ///
    /// The full list is persisted after each tick. A failed write keeps
    /// the in-memory state and is retried on the next tick.
    pub async fn tick(&self) {
        let now = self.clock.now();
        let schedule = &self.schedule;

        self.store
            .update_orders(|orders| {
                let mut changed = false;
                for order in orders.iter_mut().filter(|o| !o.status.is_terminal()) {
                    #[allow(clippy::cast_precision_loss)] // order ages stay well within f64 range
                    let elapsed_hours =
                        (now - order.created_at).num_milliseconds() as f64 / MS_PER_HOUR;
                    let target = schedule.status_for(elapsed_hours);
                    if order.advance_to(target, now) {
                        debug!(order_id = %order.id, status = %target, "simulated status transition");
                        changed = true;
                    }
                }
                changed
            })
            .await;

        if let Err(e) = self.store.persist().await {
            warn!(error = %e, "failed to persist simulated orders; retrying next tick");
        }
    }

    /// Run [`tick`](Self::tick) on the configured interval until the
    /// handle is stopped or dropped.
    #[must_use]
    pub fn spawn(self) -> SimulatorHandle {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.tick_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                self.tick().await;
            }
        });
        SimulatorHandle { task }
    }
}

/// Owns the simulator's recurring task.
///
/// The task is aborted on [`stop`](Self::stop) or drop; the timer must
/// not outlive the view that consumes it.
#[derive(Debug)]
pub struct SimulatorHandle {
    task: JoinHandle<()>,
}

impl SimulatorHandle {
    /// Cancel the recurring tick.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for SimulatorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
