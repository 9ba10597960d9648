//! # runvisor
//!
//! **Runvisor** starts a group of long-running components and stops them
//! gracefully.
//!
//! A [`Group`] launches every [`Runner`], waits for the first termination
//! trigger (a start failure, a watched OS signal, or its [`Context`] being
//! done) and then stops every runner exactly once under a deadline. Groups are
//! runners themselves, so they nest into trees.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────────────┐
//!     │   RunnerFn   │   │ custom impl  │   │ Group (nested)       │
//!     │  ("cache")   │   │   ("http")   │   │  ├─ RunnerFn ("a")   │
//!     └──────┬───────┘   └──────┬───────┘   │  └─ RunnerFn ("b")   │
//!            │                  │           └──────────┬───────────┘
//!            ▼                  ▼                      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Group "app" (GroupConfig: signals, stop timeout, order flags)    │
//! │  - start(): one task per runner, races ctx / signal / first error │
//! │  - stop():  stop ctx = ctx + timeout (cause: ShutdownTimeout)     │
//! │  - run():   start → stop → Start err > Stop err > ctx cause       │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                │ publish(Event) (optional)
//!                                ▼
//!                  Bus ──► listener ──► SubscriberSet ──► LogWriter / custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! Idle ──start()──► Running ──first trigger──► Stopping ──all stops returned──► Stopped
//!
//! triggers (first wins):
//!   - ctx done              ─► Err(Context(cause))
//!   - watched signal        ─► Ok(())
//!   - a runner start error  ─► Err(error)
//!   - every start returned  ─► Ok(())
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                        |
//! |-------------------|-------------------------------------------------------------|-------------------------------------------|
//! | **Runners**       | Components with async start/stop, closure adapter.          | [`Runner`], [`RunnerFn`], [`RunnerRef`]   |
//! | **Groups**        | Ordered runners, shutdown policy, nesting.                  | [`Group`], [`GroupBuilder`]               |
//! | **Context**       | Cancellation, deadlines, distinguishable causes.            | [`Context`], [`CancelHandle`]             |
//! | **Errors**        | Typed errors with timeout classification.                   | [`Error`], [`ContextError`]               |
//! | **Configuration** | Stop timeout, signals, sequential/reverse order.            | [`GroupConfig`], [`Signal`]               |
//! | **Events**        | Lifecycle events on a broadcast bus, pluggable subscribers. | [`Event`], [`Bus`], [`Subscribe`]         |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a subscriber rendering events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use runvisor::{Context, Error, Group, RunnerFn, Signal};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Error> {
//!     let worker = RunnerFn::new("worker")
//!         // Returns once the work is done; a server would block until stopped.
//!         .on_start(|_ctx: Context| async { Ok(()) })
//!         .on_stop(|_ctx: Context| async { Ok(()) })
//!         .arc();
//!
//!     let group = Group::builder("app")
//!         .runner(worker)
//!         .stop_signals(Signal::TERMINATION)
//!         .stop_timeout(Duration::from_secs(5))
//!         .build();
//!
//!     group.run(&Context::background()).await
//! }
//! ```

mod context;
mod core;
mod error;
mod events;
mod runners;
mod subscribers;

// ---- Public re-exports ----

pub use context::{CancelGuard, CancelHandle, Context};
pub use crate::core::{Group, GroupBuilder, GroupConfig, Signal};
pub use error::{ContextError, Error, Phase};
pub use events::{Bus, Event, EventKind};
pub use runners::{Runner, RunnerFn, RunnerRef};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a built-in tracing-backed logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
