//! The in-process event bus.
//!
//! The bus is the **only** channel between GMs, detectors, and actuators;
//! no GM ever touches another GM's state. Each subscriber registers an
//! [`Interest`] and gets its own unbounded queue.
//!
//! # Ordering Guarantees
//!
//! - Publication order is preserved per subscriber: [`EventBus::publish`]
//!   holds the subscriber table while fanning out, so two events
//!   published in sequence arrive in that sequence at every subscriber.
//! - Delivery is non-blocking; queues are unbounded (the protocol has no
//!   backpressure; handlers are required to stay cheap).
//! - [`EventBus::notify_after`] is decoupled: the timer fires on the
//!   tokio runtime and publishes like any other event, taking its place
//!   in publication order at fire time.
//!
//! ```text
//!                 ┌──────────────────────────┐
//!  publish() ───► │         EventBus         │
//!                 │  ┌────────────────────┐  │
//!  notify_after() │  │ subscriber table   │  │──mpsc──► GmRunner
//!   (tokio timer) │  │ (Interest, sender) │  │──mpsc──► GmRunner
//!                 │  └────────────────────┘  │──mpsc──► actuator
//!                 └──────────────────────────┘
//! ```

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use umwelt_event::{BusEvent, Interest};

struct Subscriber {
    interest: Interest,
    sender: mpsc::UnboundedSender<BusEvent>,
}

/// Ordered fan-out broadcast of [`BusEvent`]s.
pub struct EventBus {
    // Shared with timer tasks so a delayed publish survives any handle.
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Registers a subscriber with the given interest.
    ///
    /// The returned receiver sees every matching event published after
    /// this call, in publication order. Dropping the receiver
    /// unsubscribes implicitly.
    #[must_use]
    pub fn subscribe(&self, interest: Interest) -> mpsc::UnboundedReceiver<BusEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.lock().push(Subscriber { interest, sender });
        receiver
    }

    /// Publishes an event to all interested subscribers.
    ///
    /// Returns the number of subscribers the event was delivered to.
    /// Subscribers whose receiver was dropped are pruned.
    pub fn publish(&self, event: BusEvent) -> usize {
        fan_out(&self.subscribers, event)
    }

    /// Publishes `event` after `delay`, from a tokio timer task.
    ///
    /// Used for self-addressed round timers. Must be called within a
    /// tokio runtime.
    pub fn notify_after(&self, event: BusEvent, delay: Duration) {
        let subscribers = Arc::clone(&self.subscribers);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fan_out(&subscribers, event);
        });
    }

    /// Broadcasts [`BusEvent::Shutdown`] to every subscriber.
    pub fn shutdown(&self) {
        self.publish(BusEvent::Shutdown);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

fn fan_out(subscribers: &Mutex<Vec<Subscriber>>, event: BusEvent) -> usize {
    let mut subscribers = subscribers.lock();
    subscribers.retain(|s| !s.sender.is_closed());

    let mut delivered = 0;
    for subscriber in subscribers.iter() {
        if subscriber.interest.matches(&event) && subscriber.sender.send(event.clone()).is_ok() {
            delivered += 1;
        }
    }
    delivered
}
