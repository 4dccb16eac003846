//! # Shared event channel.
//!
//! All runtime reporting converges on one [`Bus`]: every worker and the
//! control loop hold a clone and publish into the same bounded broadcast
//! ring. Publishing never blocks and never fails; with no receiver attached
//! the event simply vanishes. Each receiver sees events published after it
//! subscribed, in publish order per producer, and observes
//! `RecvError::Lagged(n)` instead of stale data once it falls `n` events
//! behind the ring.

use tokio::sync::broadcast;

use super::event::Event;

/// Handle to the pool's event channel.
///
/// Clones share one underlying channel; the pool hands a clone to every
/// worker it launches.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus whose ring holds up to `capacity` events (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes one event; returns immediately whether or not anyone is
    /// listening.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Attaches a new receiver; it observes only events published from this
    /// point on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
