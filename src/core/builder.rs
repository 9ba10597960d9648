use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{
    core::{config::GroupConfig, group::Group, shutdown::Signal},
    events::Bus,
    runners::RunnerRef,
    subscribers::{EventPipeline, Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Group`].
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use runvisor::{Group, RunnerFn, Signal};
///
/// let api = Group::builder("api")
///     .runner(RunnerFn::new("http").arc())
///     .runner(RunnerFn::new("grpc").arc())
///     .build();
///
/// let app = Group::builder("app")
///     .runner(RunnerFn::new("db").arc())
///     .group(api)
///     .stop_signals(Signal::TERMINATION)
///     .stop_timeout(Duration::from_secs(10))
///     .sequential_stop(true)
///     .reverse_stop(true)
///     .build();
///
/// assert_eq!(app.len(), 2);
/// ```
pub struct GroupBuilder {
    name: Arc<str>,
    runners: Vec<Option<RunnerRef>>,
    cfg: GroupConfig,
    stopping: Option<CancellationToken>,
    bus: Option<Bus>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl GroupBuilder {
    /// Creates a new builder with default configuration.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            runners: Vec::new(),
            cfg: GroupConfig::default(),
            stopping: None,
            bus: None,
            subscribers: Vec::new(),
        }
    }

    /// Appends a runner.
    pub fn runner(mut self, runner: RunnerRef) -> Self {
        self.runners.push(Some(runner));
        self
    }

    /// Appends a slot that may be empty; empty slots are skipped at run time.
    pub fn slot(mut self, runner: Option<RunnerRef>) -> Self {
        self.runners.push(runner);
        self
    }

    /// Appends every runner from `runners`.
    pub fn runners(mut self, runners: impl IntoIterator<Item = RunnerRef>) -> Self {
        self.runners.extend(runners.into_iter().map(Some));
        self
    }

    /// Appends a nested group; it is owned by this one.
    pub fn group(self, group: Group) -> Self {
        self.runner(group.into_ref())
    }

    /// Replaces the whole shutdown policy.
    pub fn with_config(mut self, cfg: GroupConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Bounds the stop phase (`Duration::ZERO` = unbounded).
    pub fn stop_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.stop_timeout = timeout;
        self
    }

    /// Sets the signals that end the start phase cleanly.
    pub fn stop_signals(mut self, signals: impl IntoIterator<Item = Signal>) -> Self {
        self.cfg.stop_signals = signals.into_iter().collect();
        self
    }

    /// Starts runners one at a time in list order.
    pub fn sequential_start(mut self, yes: bool) -> Self {
        self.cfg.sequential_start = yes;
        self
    }

    /// Stops runners one at a time in list order.
    pub fn sequential_stop(mut self, yes: bool) -> Self {
        self.cfg.sequential_stop = yes;
        self
    }

    /// Reverses the sequential stop order.
    pub fn reverse_stop(mut self, yes: bool) -> Self {
        self.cfg.reverse_stop = yes;
        self
    }

    /// Token cancelled the instant the stop phase begins.
    ///
    /// A cancelled token stays cancelled: pass a fresh one per run when the
    /// group is reused.
    pub fn stopping_token(mut self, token: CancellationToken) -> Self {
        self.stopping = Some(token);
        self
    }

    /// Publishes lifecycle events on `bus` (shareable with nested groups).
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events through dedicated workers with
    /// bounded queues. A bus is created when none was given. Call
    /// [`Group::close`] to deliver the last events before exiting.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the group.
    ///
    /// With subscribers set, this spawns the subscriber workers and the bus
    /// listener, so it must then be called from within a Tokio runtime.
    pub fn build(self) -> Group {
        let bus = match self.bus {
            Some(bus) => Some(bus),
            None if !self.subscribers.is_empty() => {
                Some(Bus::new(self.cfg.bus_capacity_clamped()))
            }
            None => None,
        };

        let pipeline = match &bus {
            Some(bus) if !self.subscribers.is_empty() => Some(EventPipeline::spawn(
                SubscriberSet::new(self.subscribers, bus.clone()),
                bus,
            )),
            _ => None,
        };

        Group::from_parts(
            self.name,
            self.runners,
            self.cfg,
            self.stopping,
            bus,
            pipeline,
        )
    }
}
