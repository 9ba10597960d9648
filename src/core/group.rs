//! # Group: starts runners, races termination triggers, stops everyone.
//!
//! A [`Group`] owns an ordered list of runners (absent entries allowed) and a
//! [`GroupConfig`]. It is itself a [`Runner`], so groups nest into trees.
//!
//! ## Lifecycle of one `run`
//! ```text
//! Idle ──start()──► Running ──first trigger──► Stopping ──all stops returned──► Stopped
//!
//! start():
//!   SignalListener::listen(cfg.stop_signals)           (unregistered when start returns)
//!   concurrent: spawn runner.start(ctx) per runner    (detached, keep running after start returns)
//!   sequential: one detached pass, runner.start(ctx) in list order, no early
//!               exit on error; a trigger skips runners not yet started
//!   race (biased, first ready wins):
//!     ├─ ctx.done()            → Err(Context(cause))   publish ContextDone
//!     ├─ signal received       → Ok(())                publish SignalReceived
//!     ├─ first start error     → Err(error)            publish RunnerStartFailed
//!     └─ every start returned  → Ok(()) / first error  publish StartCompleted
//!
//! stop():
//!   stopping.cancel()                                  publish StopRequested
//!   stop_ctx = ctx + stop_timeout (cause = ShutdownTimeout)
//!   concurrent: spawn runner.stop(stop_ctx) per runner, join all
//!   sequential: runner.stop(stop_ctx) in list order (or reverse), no early exit
//!   → first stop error                                 publish StopTimedOut? / GroupStopped
//!
//! run():
//!   start → stop (always) → Start error > Stop error > ctx cause
//! ```
//!
//! ## Rules
//! - Every present runner's `stop` is called exactly once per `stop`, whatever
//!   happened during start (including runners whose start was never called).
//! - Every present runner's `start` is called at most once per `start`.
//! - Absent runners are skipped silently.
//! - Within a phase only the first error is returned; the others are published
//!   as events (when a bus is attached) and then dropped.
//! - The group keeps no state between calls and can be run again with a fresh context.
//! - Stop is only as bounded as its runners: one that ignores its context can
//!   block `stop` forever.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::context::Context;
use crate::core::builder::GroupBuilder;
use crate::core::config::GroupConfig;
use crate::core::errgroup::{ErrGroup, FirstError, guarded};
use crate::core::shutdown::{Signal, SignalListener};
use crate::error::{ContextError, Error, Phase};
use crate::events::{Bus, Event, EventKind};
use crate::runners::{Runner, RunnerRef};
use crate::subscribers::EventPipeline;

/// How the start race ended.
enum Outcome {
    Context(ContextError),
    Signal(Option<Signal>),
    Started(Result<(), Error>),
}

/// Ordered, policy-configured collection of runners.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use runvisor::{Context, Error, Group, RunnerFn};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Error> {
///     let group = Group::builder("app")
///         .runner(
///             RunnerFn::new("cache")
///                 .on_start(|_ctx| async { Ok(()) })
///                 .on_stop(|_ctx| async { Ok(()) })
///                 .arc(),
///         )
///         .stop_timeout(Duration::from_secs(5))
///         .build();
///
///     group.run(&Context::background()).await
/// }
/// ```
pub struct Group {
    name: Arc<str>,
    runners: Vec<Option<RunnerRef>>,
    cfg: GroupConfig,
    stopping: Option<CancellationToken>,
    bus: Option<Bus>,
    pipeline: Option<EventPipeline>,
}

impl Group {
    /// Returns a builder for a group called `name`.
    pub fn builder(name: impl Into<Arc<str>>) -> GroupBuilder {
        GroupBuilder::new(name)
    }

    /// Creates a group from an explicit runner list and configuration.
    ///
    /// `None` entries are kept in place and skipped at run time.
    pub fn new(
        name: impl Into<Arc<str>>,
        runners: Vec<Option<RunnerRef>>,
        cfg: GroupConfig,
    ) -> Self {
        Self {
            name: name.into(),
            runners,
            cfg,
            stopping: None,
            bus: None,
            pipeline: None,
        }
    }

    pub(crate) fn from_parts(
        name: Arc<str>,
        runners: Vec<Option<RunnerRef>>,
        cfg: GroupConfig,
        stopping: Option<CancellationToken>,
        bus: Option<Bus>,
        pipeline: Option<EventPipeline>,
    ) -> Self {
        Self {
            name,
            runners,
            cfg,
            stopping,
            bus,
            pipeline,
        }
    }

    /// Returns the group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the shutdown policy.
    pub fn config(&self) -> &GroupConfig {
        &self.cfg
    }

    /// Returns the number of slots, absent ones included.
    pub fn len(&self) -> usize {
        self.runners.len()
    }

    /// Returns `true` if the group has no slots.
    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    /// Wraps the group into a shared handle, ready to nest inside another group.
    pub fn into_ref(self) -> RunnerRef {
        Arc::new(self)
    }

    /// Delivers the events already published to this group's subscribers and
    /// waits for their workers to finish.
    ///
    /// Only groups built with [`GroupBuilder::with_subscribers`] own
    /// subscribers; for the others this returns immediately.
    pub async fn close(self) {
        if let Some(pipeline) = self.pipeline {
            pipeline.close().await;
        }
    }

    /// Starts, then always stops, and resolves the outcome.
    ///
    /// Precedence of the returned error:
    /// 1. the error from [`Group::start`],
    /// 2. the error from [`Group::stop`],
    /// 3. the cause of `ctx` if it is done.
    ///
    /// `ctx` is handed to [`Group::stop`] unchanged, so a context that ended
    /// the start phase is already done when runners are asked to stop.
    pub async fn run(&self, ctx: &Context) -> Result<(), Error> {
        let started = self.start(ctx).await;
        let stopped = self.stop(ctx).await;
        resolve(started, stopped, ctx.cause())
    }

    /// Starts every present runner and blocks until the first termination trigger.
    ///
    /// Returns:
    /// - `Ok(())` when a watched signal arrives or every start returned successfully,
    /// - the first runner error,
    /// - [`Error::Context`] with the cause when `ctx` is done first,
    /// - [`Error::Signal`] when signal listeners cannot be registered.
    ///
    /// An error does not mean runners have stopped: call [`Group::stop`].
    pub async fn start(&self, ctx: &Context) -> Result<(), Error> {
        let signals = SignalListener::listen(&self.cfg.stop_signals).map_err(Error::signal)?;
        self.publish(|| Event::new(EventKind::GroupStarting));

        let halt = CancellationToken::new();
        let _halt = halt.clone().drop_guard();
        let mut tasks = if self.cfg.sequential_start {
            self.spawn_sequential(ctx, signals.fired(), halt)
        } else {
            self.spawn_starts(ctx)
        };

        let failed = tasks.failed();
        let outcome = tokio::select! {
            biased;
            cause = ctx.done() => Outcome::Context(cause),
            sig = signals.recv() => Outcome::Signal(sig),
            _ = failed.cancelled() => Outcome::Started(tasks.first_error().map_or(Ok(()), Err)),
            res = tasks.wait() => Outcome::Started(res),
        };

        self.settle(outcome)
    }

    /// Stops every present runner under the stop-phase context.
    ///
    /// Fires the stopping notification first. Returns the first stop error
    /// after every runner's stop has returned.
    pub async fn stop(&self, ctx: &Context) -> Result<(), Error> {
        if let Some(stopping) = &self.stopping {
            stopping.cancel();
        }

        let limit = self.cfg.stop_deadline();
        self.publish(|| {
            let ev = Event::new(EventKind::StopRequested);
            match limit {
                Some(timeout) => ev.with_timeout(timeout),
                None => ev,
            }
        });

        let (stop_ctx, cancel) = match limit {
            Some(timeout) => {
                ctx.with_timeout_cause(timeout, ContextError::ShutdownTimeout { timeout })
            }
            None => ctx.with_cancel(),
        };
        let _guard = cancel.drop_guard();

        let res = if self.cfg.sequential_stop {
            self.stop_sequential(&stop_ctx).await
        } else {
            self.stop_concurrent(&stop_ctx).await
        };

        if let Some(cause @ ContextError::ShutdownTimeout { timeout }) = stop_ctx.cause() {
            self.publish(|| {
                Event::new(EventKind::StopTimedOut)
                    .with_timeout(timeout)
                    .with_reason(cause.to_string())
            });
        }
        self.publish(|| {
            let ev = Event::new(EventKind::GroupStopped);
            match &res {
                Err(err) => ev.with_reason(err.to_string()),
                Ok(()) => ev,
            }
        });

        res
    }

    fn present(&self) -> impl Iterator<Item = &RunnerRef> {
        self.runners.iter().flatten()
    }

    /// Runs the ordered start pass as one detached task.
    ///
    /// Before each runner the pass checks `halt`, the context and `fired`: a
    /// trigger skips the runners not yet started, while the one in flight
    /// finishes normally.
    fn spawn_sequential(
        &self,
        ctx: &Context,
        fired: CancellationToken,
        halt: CancellationToken,
    ) -> ErrGroup {
        let mut tasks = ErrGroup::new();
        let runners: Vec<RunnerRef> = self.present().cloned().collect();
        let report = self.reporter(EventKind::RunnerStartFailed);
        let ctx = ctx.clone();

        tasks.spawn(
            self.name.to_string(),
            Phase::Start,
            async move {
                let first = FirstError::default();
                for runner in runners {
                    if halt.is_cancelled() || fired.is_cancelled() || ctx.is_done() {
                        break;
                    }
                    if let Err(err) = guarded(runner.name(), Phase::Start, runner.start(&ctx)).await
                    {
                        report(runner.name(), &err);
                        first.record(err);
                    }
                }
                first.result()
            },
            // Runner errors are reported inside the pass.
            |_: &str, _: &Error| {},
        );
        tasks
    }

    fn spawn_starts(&self, ctx: &Context) -> ErrGroup {
        let mut tasks = ErrGroup::new();
        let report = self.reporter(EventKind::RunnerStartFailed);

        for runner in self.present() {
            let runner = Arc::clone(runner);
            let ctx = ctx.clone();
            let name = runner.name().to_string();
            tasks.spawn(
                name,
                Phase::Start,
                async move { runner.start(&ctx).await },
                report.clone(),
            );
        }
        tasks
    }

    async fn stop_concurrent(&self, ctx: &Context) -> Result<(), Error> {
        let mut tasks = ErrGroup::new();
        let report = self.reporter(EventKind::RunnerStopFailed);

        for runner in self.present() {
            let runner = Arc::clone(runner);
            let ctx = ctx.clone();
            let name = runner.name().to_string();
            tasks.spawn(
                name,
                Phase::Stop,
                async move { runner.stop(&ctx).await },
                report.clone(),
            );
        }
        tasks.wait().await
    }

    async fn stop_sequential(&self, ctx: &Context) -> Result<(), Error> {
        let mut order: Vec<&RunnerRef> = self.present().collect();
        if self.cfg.stops_in_reverse() {
            order.reverse();
        }

        let first = FirstError::default();
        let report = self.reporter(EventKind::RunnerStopFailed);

        for runner in order {
            if let Err(err) = guarded(runner.name(), Phase::Stop, runner.stop(ctx)).await {
                report(runner.name(), &err);
                first.record(err);
            }
        }
        first.result()
    }

    fn settle(&self, outcome: Outcome) -> Result<(), Error> {
        match outcome {
            Outcome::Context(cause) => {
                self.publish(|| Event::new(EventKind::ContextDone).with_reason(cause.to_string()));
                Err(cause.into())
            }
            Outcome::Signal(sig) => {
                self.publish(|| {
                    Event::new(EventKind::SignalReceived)
                        .with_reason(sig.map_or("unknown", |s| s.as_str()))
                });
                Ok(())
            }
            Outcome::Started(Ok(())) => {
                self.publish(|| Event::new(EventKind::StartCompleted));
                Ok(())
            }
            Outcome::Started(Err(err)) => Err(err),
        }
    }

    /// Publishes the event built by `make`, tagged with the group name.
    ///
    /// `make` only runs when a bus is attached.
    fn publish(&self, make: impl FnOnce() -> Event) {
        if let Some(bus) = &self.bus {
            bus.publish(make().with_group(Arc::clone(&self.name)));
        }
    }

    /// Returns a callback publishing `kind` for a failed runner.
    fn reporter(&self, kind: EventKind) -> impl Fn(&str, &Error) + Clone + Send + 'static {
        let bus = self.bus.clone();
        let group = Arc::clone(&self.name);
        move |runner: &str, err: &Error| {
            if let Some(bus) = &bus {
                bus.publish(
                    Event::new(kind)
                        .with_group(Arc::clone(&group))
                        .with_runner(runner)
                        .with_reason(err.to_string()),
                );
            }
        }
    }
}

/// Start error first, then stop error, then the context cause.
fn resolve(
    started: Result<(), Error>,
    stopped: Result<(), Error>,
    cause: Option<ContextError>,
) -> Result<(), Error> {
    started?;
    stopped?;
    match cause {
        Some(cause) => Err(cause.into()),
        None => Ok(()),
    }
}

#[async_trait]
impl Runner for Group {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, ctx: &Context) -> Result<(), Error> {
        Group::start(self, ctx).await
    }

    async fn stop(&self, ctx: &Context) -> Result<(), Error> {
        Group::stop(self, ctx).await
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let runners: Vec<Option<&str>> = self
            .runners
            .iter()
            .map(|r| r.as_ref().map(|r| r.name()))
            .collect();
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("runners", &runners)
            .field("cfg", &self.cfg)
            .field("bus", &self.bus.is_some())
            .field("subscribers", &self.pipeline)
            .finish()
    }
}
