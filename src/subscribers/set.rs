//! # Fan-out from the event stream to registered subscribers.
//!
//! Each subscriber gets its own bounded queue and a dedicated delivery task,
//! so a slow or panicking subscriber can never stall the control loop or its
//! peers. Queue order gives per-subscriber FIFO; there is no ordering across
//! different subscribers, and a full queue drops the event for that
//! subscriber only.
//!
//! The controller drains the set on its terminal path:
//! [`SubscriberSet::shutdown`] closes every queue and waits for the delivery
//! tasks, so by the time the pool reports `Stopped` every subscriber has
//! processed the full stream.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::events::Event;

use super::Subscribe;

/// One subscriber's queue plus the task draining it.
struct Delivery {
    name: &'static str,
    queue: mpsc::Sender<Event>,
    task: JoinHandle<()>,
}

impl Delivery {
    fn spawn(sub: Arc<dyn Subscribe>) -> Self {
        let name = sub.name();
        let (queue, rx) = mpsc::channel(sub.queue_capacity().max(1));
        let task = tokio::spawn(deliver(sub, rx));
        Self { name, queue, task }
    }
}

/// Delivery loop for one subscriber; ends when its queue closes.
///
/// A panic inside `on_event` is caught and reported, and delivery continues
/// with the next event.
async fn deliver(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Event>) {
    while let Some(ev) = rx.recv().await {
        let handled = std::panic::AssertUnwindSafe(sub.on_event(&ev)).catch_unwind();
        if let Err(panic) = handled.await {
            eprintln!("[taskpool] subscriber '{}' panicked: {panic:?}", sub.name());
        }
    }
}

/// The set of registered subscribers, one delivery queue each.
pub struct SubscriberSet {
    deliveries: Vec<Delivery>,
}

impl SubscriberSet {
    /// Spawns a delivery task per subscriber. Requires a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self {
            deliveries: subs.into_iter().map(Delivery::spawn).collect(),
        }
    }

    /// Queues one event for every subscriber without waiting.
    ///
    /// A subscriber whose queue is full or whose delivery task is gone loses
    /// this event; the drop is reported with the subscriber's name.
    pub fn emit(&self, ev: &Event) {
        for d in &self.deliveries {
            match d.queue.try_send(ev.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    eprintln!(
                        "[taskpool] subscriber '{}' lost an event: queue full",
                        d.name
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    eprintln!(
                        "[taskpool] subscriber '{}' lost an event: delivery gone",
                        d.name
                    );
                }
            }
        }
    }

    /// Closes every queue and waits until all queued events are processed.
    pub async fn shutdown(self) {
        for d in self.deliveries {
            drop(d.queue);
            let _ = d.task.await;
        }
    }
}
