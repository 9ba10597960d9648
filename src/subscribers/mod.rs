//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the fan-out set used to
//! deliver lifecycle events published on a [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! Group ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit(&Event)
//!                                                       │
//!                                          ┌────────────┼────────────┐
//!                                          ▼            ▼            ▼
//!                                      [queue 1]    [queue 2]    [queue N]
//!                                          │            │            │
//!                                       worker 1     worker 2     worker N
//!                                          ▼            ▼            ▼
//!                                      LogWriter     Metrics      Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use async_trait::async_trait;
//! use runvisor::{Event, EventKind, Subscribe};
//!
//! struct Readiness;
//!
//! #[async_trait]
//! impl Subscribe for Readiness {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::StopRequested {
//!             // flip the readiness probe
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "readiness" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
pub(crate) use subscriber_set::EventPipeline;
