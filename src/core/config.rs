//! # Group configuration.
//!
//! Provides [`GroupConfig`] the shutdown policy of a [`Group`](crate::Group).
//!
//! ## Sentinel values
//! - `stop_timeout = 0s` → no additional bound on the stop phase (the parent
//!   context's deadline, if any, still applies)
//! - `stop_signals = []` → only start errors and context cancellation end the start phase
//! - `reverse_stop` only matters when `sequential_stop` is set

use std::time::Duration;

use crate::core::shutdown::Signal;

/// Shutdown policy for a group.
///
/// ## Field semantics
/// - `stop_timeout`: bound on the stop phase (`0s` = unbounded)
/// - `stop_signals`: OS signals that end the start phase cleanly
/// - `sequential_start`: start runners one at a time in list order
/// - `sequential_stop`: stop runners one at a time in list order
/// - `reverse_stop`: with `sequential_stop`, stop in exact reverse order
/// - `bus_capacity`: event bus ring buffer size when subscribers are attached (min 1)
///
/// ## Example
/// ```
/// use std::time::Duration;
/// use runvisor::{GroupConfig, Signal};
///
/// let mut cfg = GroupConfig::default();
/// cfg.stop_timeout = Duration::from_secs(5);
/// cfg.stop_signals = Signal::TERMINATION.to_vec();
/// cfg.sequential_stop = true;
/// cfg.reverse_stop = true;
///
/// assert_eq!(cfg.stop_deadline(), Some(Duration::from_secs(5)));
/// ```
#[derive(Clone, Debug)]
pub struct GroupConfig {
    /// Maximum time runners get to stop before their context is cancelled
    /// with [`ContextError::ShutdownTimeout`](crate::ContextError::ShutdownTimeout).
    pub stop_timeout: Duration,

    /// Signals that end the start phase without an error.
    pub stop_signals: Vec<Signal>,

    /// Start runners one at a time, in list order, instead of concurrently.
    pub sequential_start: bool,

    /// Stop runners one at a time, in list order, instead of concurrently.
    pub sequential_stop: bool,

    /// Reverse the sequential stop order.
    pub reverse_stop: bool,

    /// Capacity of the event bus created for subscribers.
    pub bus_capacity: usize,
}

impl GroupConfig {
    /// Returns the stop timeout as an `Option`.
    ///
    /// - `None` → no additional bound
    /// - `Some(d)` → the stop context is cancelled after `d`
    #[inline]
    pub fn stop_deadline(&self) -> Option<Duration> {
        if self.stop_timeout == Duration::ZERO {
            None
        } else {
            Some(self.stop_timeout)
        }
    }

    /// Returns `true` if a sequential stop pass should walk the list backwards.
    #[inline]
    pub fn stops_in_reverse(&self) -> bool {
        self.sequential_stop && self.reverse_stop
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for GroupConfig {
    /// Default configuration:
    ///
    /// - `stop_timeout = 0s` (unbounded)
    /// - `stop_signals = []`
    /// - concurrent start and stop
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            stop_timeout: Duration::ZERO,
            stop_signals: Vec::new(),
            sequential_start: false,
            sequential_stop: false,
            reverse_stop: false,
            bus_capacity: 1024,
        }
    }
}
