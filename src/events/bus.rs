//! # Event bus for broadcasting lifecycle events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from many groups at once.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                  Subscriber (one):
//!   Group "app"  ──┐
//!   Group "http" ──┼──────► Bus ──────► listener ────► SubscriberSet
//!   Group "jobs" ──┘  (broadcast chan)
//! ```
//!
//! Nested groups may share one bus by cloning it; events carry the group name.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active subscribers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for lifecycle events.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn delivers_to_receivers_subscribed_before_publish() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::GroupStarting));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::StopRequested).with_group("app"));

        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::StopRequested);
        assert_eq!(ev.group.as_deref(), Some("app"));
    }
}
