//! # LogWriter: event renderer backed by `tracing`
//!
//! A minimal subscriber that turns incoming [`Event`]s into `tracing` records.
//! Install any `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see them.
//!
//! ## Example output
//! ```text
//! INFO  runvisor: starting group="app"
//! WARN  runvisor: runner start failed group="app" runner="http" err="address in use"
//! INFO  runvisor: signal received group="app" signal="SIGTERM"
//! INFO  runvisor: stop requested group="app" timeout_ms=Some(5000)
//! ERROR runvisor: stop timed out group="app" timeout_ms=Some(5000)
//! INFO  runvisor: stopped group="app" err=None
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let group = e.group.as_deref().unwrap_or("-");
        let runner = e.runner.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref();

        match e.kind {
            EventKind::GroupStarting => {
                info!(target: "runvisor", group, "starting");
            }
            EventKind::RunnerStartFailed => {
                warn!(target: "runvisor", group, runner, err = ?reason, "runner start failed");
            }
            EventKind::StartCompleted => {
                debug!(target: "runvisor", group, "all runners started");
            }
            EventKind::SignalReceived => {
                info!(target: "runvisor", group, signal = ?reason, "signal received");
            }
            EventKind::ContextDone => {
                info!(target: "runvisor", group, cause = ?reason, "context done");
            }
            EventKind::StopRequested => {
                info!(target: "runvisor", group, timeout_ms = ?e.timeout_ms, "stop requested");
            }
            EventKind::RunnerStopFailed => {
                warn!(target: "runvisor", group, runner, err = ?reason, "runner stop failed");
            }
            EventKind::StopTimedOut => {
                error!(target: "runvisor", group, timeout_ms = ?e.timeout_ms, "stop timed out");
            }
            EventKind::GroupStopped => {
                info!(target: "runvisor", group, err = ?reason, "stopped");
            }
            EventKind::SubscriberOverflow => {
                warn!(target: "runvisor", subscriber = runner, reason = ?reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                error!(target: "runvisor", subscriber = runner, info = ?reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
