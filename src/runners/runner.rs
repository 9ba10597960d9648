//! # Runner capability.
//!
//! A [`Runner`] is anything that can start and stop itself. Groups hold runners
//! as [`RunnerRef`] (`Arc<dyn Runner>`) so one start task and one stop task can
//! be spawned per runner without borrowing from the group.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{context::Context, error::Error};

/// # Component with an async start and stop.
///
/// ### Contract
/// - `start` must either complete within the lifetime of `ctx`, respecting its
///   deadline, or return once `stop` is called.
/// - `stop` must complete within the lifetime of `ctx`, respecting its deadline.
/// - `stop` must behave even if `start` was never called.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use runvisor::{Context, Error, Runner};
///
/// struct Ticker;
///
/// #[async_trait]
/// impl Runner for Ticker {
///     fn name(&self) -> &str { "ticker" }
///
///     async fn start(&self, ctx: &Context) -> Result<(), Error> {
///         ctx.done().await;
///         Ok(())
///     }
///
///     async fn stop(&self, _ctx: &Context) -> Result<(), Error> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Runner: Send + Sync + 'static {
    /// Returns a human-readable name used in events and panic reports.
    ///
    /// The default uses `type_name::<Self>()`; override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Starts the component.
    async fn start(&self, ctx: &Context) -> Result<(), Error>;

    /// Stops the component.
    async fn stop(&self, ctx: &Context) -> Result<(), Error>;
}

/// Shared handle to a runner.
pub type RunnerRef = Arc<dyn Runner>;
