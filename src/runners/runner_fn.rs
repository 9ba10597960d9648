//! # Function-backed runner (`RunnerFn`)
//!
//! [`RunnerFn`] adapts two plain closures into a [`Runner`]. Either closure may
//! be left out: a missing start or stop hook returns `Ok(())` immediately.
//!
//! Each hook receives an owned [`Context`] and produces a fresh future per call.
//! Share state between hooks explicitly through `Arc<...>` captured by both.
//!
//! ## Example
//! ```rust
//! use runvisor::{Context, Error, RunnerFn, RunnerRef};
//!
//! let server: RunnerRef = RunnerFn::new("server")
//!     .on_start(|ctx: Context| async move {
//!         ctx.done().await;
//!         Ok::<_, Error>(())
//!     })
//!     .on_stop(|_ctx: Context| async { Ok(()) })
//!     .arc();
//!
//! assert_eq!(server.name(), "server");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::{context::Context, error::Error, runners::Runner};

type Hook = Box<dyn Fn(Context) -> BoxFuture<'static, Result<(), Error>> + Send + Sync>;

/// Runner built from optional start/stop closures.
pub struct RunnerFn {
    name: Cow<'static, str>,
    start: Option<Hook>,
    stop: Option<Hook>,
}

impl RunnerFn {
    /// Creates a runner with no hooks; both phases succeed immediately.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            start: None,
            stop: None,
        }
    }

    /// Sets the start hook.
    pub fn on_start<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        self.start = Some(Box::new(move |ctx| Box::pin(f(ctx))));
        self
    }

    /// Sets the stop hook.
    pub fn on_stop<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        self.stop = Some(Box::new(move |ctx| Box::pin(f(ctx))));
        self
    }

    /// Wraps the runner into a shared handle.
    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl fmt::Debug for RunnerFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnerFn")
            .field("name", &self.name)
            .field("start", &self.start.is_some())
            .field("stop", &self.stop.is_some())
            .finish()
    }
}

#[async_trait]
impl Runner for RunnerFn {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self, ctx: &Context) -> Result<(), Error> {
        match &self.start {
            Some(hook) => hook(ctx.clone()).await,
            None => Ok(()),
        }
    }

    async fn stop(&self, ctx: &Context) -> Result<(), Error> {
        match &self.stop {
            Some(hook) => hook(ctx.clone()).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_hooks_succeed() {
        let r = RunnerFn::new("noop");
        let ctx = Context::background();
        assert_eq!(r.start(&ctx).await, Ok(()));
        assert_eq!(r.stop(&ctx).await, Ok(()));
    }

    #[tokio::test]
    async fn hooks_return_their_errors() {
        let r = RunnerFn::new("failing")
            .on_start(|_ctx| async { Err(Error::start("bind")) })
            .on_stop(|_ctx| async { Err(Error::stop("flush")) });
        let ctx = Context::background();

        assert_eq!(r.start(&ctx).await, Err(Error::start("bind")));
        assert_eq!(r.stop(&ctx).await, Err(Error::stop("flush")));
    }

    #[tokio::test]
    async fn stop_hook_only() {
        let r = RunnerFn::new("stop-only").on_stop(|_ctx| async { Err(Error::stop("x")) });
        let ctx = Context::background();
        assert_eq!(r.start(&ctx).await, Ok(()));
        assert!(r.stop(&ctx).await.is_err());
    }

    #[test]
    fn debug_shows_hooks() {
        let r = RunnerFn::new("dbg").on_start(|_ctx| async { Ok(()) });
        let s = format!("{r:?}");
        assert!(s.contains("dbg"));
        assert!(s.contains("start: true"));
        assert!(s.contains("stop: false"));
    }
}
