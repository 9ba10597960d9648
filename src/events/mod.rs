//! Lifecycle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by groups and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: [`Group`](crate::Group) start/stop phases,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the listener spawned by
//!   [`GroupBuilder::with_subscribers`](crate::GroupBuilder::with_subscribers),
//!   which fans out to a [`SubscriberSet`](crate::SubscriberSet).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
