//! # Lifecycle events emitted by groups.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Start phase**: group starting, runner start failures, how the start race ended
//! - **Stop phase**: stop requested, runner stop failures, timeout, group stopped
//! - **Subscriber events**: overflow and panics inside subscriber workers
//!
//! The [`Event`] struct carries metadata such as timestamps, group and runner
//! names, reasons, and the stop timeout.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use runvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RunnerStopFailed)
//!     .with_group("app")
//!     .with_runner("db")
//!     .with_reason("flush failed")
//!     .with_timeout(Duration::from_secs(5));
//!
//! assert_eq!(ev.kind, EventKind::RunnerStopFailed);
//! assert_eq!(ev.runner.as_deref(), Some("db"));
//! assert_eq!(ev.timeout_ms, Some(5_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `runner`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `runner`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Start phase ===
    /// Group start requested; runners are about to be launched.
    ///
    /// Sets:
    /// - `group`: group name
    GroupStarting,

    /// A runner's start returned an error (or panicked).
    ///
    /// Sets:
    /// - `group`: group name
    /// - `runner`: runner name
    /// - `reason`: error message
    RunnerStartFailed,

    /// Every present runner's start returned successfully.
    ///
    /// Sets:
    /// - `group`: group name
    StartCompleted,

    /// A watched OS signal arrived during start.
    ///
    /// Sets:
    /// - `group`: group name
    /// - `reason`: signal name (e.g. `SIGTERM`)
    SignalReceived,

    /// The governing context was done during start.
    ///
    /// Sets:
    /// - `group`: group name
    /// - `reason`: context cause
    ContextDone,

    // === Stop phase ===
    /// Group stop requested; the stopping notification has fired.
    ///
    /// Sets:
    /// - `group`: group name
    /// - `timeout_ms`: stop timeout, if bounded
    StopRequested,

    /// A runner's stop returned an error (or panicked).
    ///
    /// Sets:
    /// - `group`: group name
    /// - `runner`: runner name
    /// - `reason`: error message
    RunnerStopFailed,

    /// The stop timeout elapsed before all runners returned.
    ///
    /// Sets:
    /// - `group`: group name
    /// - `timeout_ms`: configured stop timeout
    StopTimedOut,

    /// Every present runner's stop has returned.
    ///
    /// Sets:
    /// - `group`: group name
    /// - `reason`: first stop error, if any
    GroupStopped,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the group that emitted the event.
    pub group: Option<Arc<str>>,
    /// Name of the runner (or subscriber) concerned.
    pub runner: Option<Arc<str>>,
    /// Human-readable reason (errors, signal names, overflow details).
    pub reason: Option<Arc<str>>,
    /// Stop timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            group: None,
            runner: None,
            reason: None,
            timeout_ms: None,
        }
    }

    /// Attaches a group name.
    #[inline]
    pub fn with_group(mut self, group: impl Into<Arc<str>>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Attaches a runner name.
    #[inline]
    pub fn with_runner(mut self, runner: impl Into<Arc<str>>) -> Self {
        self.runner = Some(runner.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_runner(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_runner(subscriber)
            .with_reason(info)
    }

    /// Returns `true` for [`EventKind::SubscriberOverflow`] events.
    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
