//! # Governing context for runners.
//!
//! A [`Context`] is a cancellation scope with an optional deadline and a
//! recorded cause. Groups pass one to every [`Runner`](crate::Runner) call;
//! runners observe it with [`Context::done`] and exit promptly.
//!
//! ```text
//! background ──► with_cancel ──► with_timeout_cause(25ms, ShutdownTimeout)
//!                    │                      │
//!             cancel() / drop guard    deadline elapses
//!                    ▼                      ▼
//!          err = Canceled          err = DeadlineExceeded
//!          cause = Canceled        cause = ShutdownTimeout
//! ```
//!
//! ## Rules
//! - The first termination (cancel or deadline) is latched; later ones are ignored.
//! - Cancelling a parent cancels all descendants with the parent's cause.
//! - Cancelling a child never affects its parent.
//! - A child deadline never exceeds its parent's; an earlier parent deadline
//!   is inherited together with its cause.
//! - A context with its own deadline arms one timer task that cancels the
//!   token when the deadline passes; the task is aborted when the context is
//!   dropped. Outside a Tokio runtime deadlines are only evaluated on access.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::ContextError;

#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    cause: ContextError,
}

#[derive(Debug, Clone, Copy)]
struct Done {
    err: ContextError,
    cause: ContextError,
}

#[derive(Debug)]
struct Inner {
    token: CancellationToken,
    deadline: Option<Deadline>,
    done: OnceLock<Done>,
    parent: Option<Context>,
    timer: OnceLock<AbortHandle>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.get() {
            timer.abort();
        }
    }
}

/// Cancellation scope passed to runners.
///
/// Cheap to clone; clones share the same state.
#[derive(Debug, Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

impl Context {
    /// Returns a root context that is never done on its own.
    pub fn background() -> Self {
        Self::from_token(CancellationToken::new())
    }

    /// Returns a root context that is done once `token` is cancelled.
    ///
    /// External cancellation is reported as [`ContextError::Canceled`].
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            inner: Arc::new(Inner {
                token,
                deadline: None,
                done: OnceLock::new(),
                parent: None,
                timer: OnceLock::new(),
            }),
        }
    }

    /// Derives a child that can be cancelled through the returned handle.
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        self.derive(self.inner.deadline)
    }

    /// Derives a child that is done after `timeout` with [`ContextError::DeadlineExceeded`].
    pub fn with_timeout(&self, timeout: Duration) -> (Context, CancelHandle) {
        self.with_timeout_cause(timeout, ContextError::DeadlineExceeded)
    }

    /// Derives a child that is done after `timeout`, reporting `cause` from [`Context::cause`].
    pub fn with_timeout_cause(
        &self,
        timeout: Duration,
        cause: ContextError,
    ) -> (Context, CancelHandle) {
        self.with_deadline_cause(Instant::now() + timeout, cause)
    }

    /// Derives a child that is done at `at`.
    pub fn with_deadline(&self, at: Instant) -> (Context, CancelHandle) {
        self.with_deadline_cause(at, ContextError::DeadlineExceeded)
    }

    fn with_deadline_cause(&self, at: Instant, cause: ContextError) -> (Context, CancelHandle) {
        match self.inner.deadline {
            Some(parent) if parent.at <= at => self.derive(Some(parent)),
            _ => {
                let (ctx, handle) = self.derive(Some(Deadline { at, cause }));
                ctx.arm_timer();
                (ctx, handle)
            }
        }
    }

    /// Spawns the task that latches the deadline and cancels the token at `at`.
    ///
    /// The task holds only a weak reference, so it never keeps the context alive.
    fn arm_timer(&self) {
        let Some(deadline) = self.inner.deadline else {
            return;
        };
        let Ok(runtime) = Handle::try_current() else {
            return;
        };

        let token = self.inner.token.clone();
        let weak = Arc::downgrade(&self.inner);
        let task = runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = time::sleep_until(deadline.at) => {
                    if let Some(inner) = weak.upgrade() {
                        Context { inner }.finish(Done {
                            err: ContextError::DeadlineExceeded,
                            cause: deadline.cause,
                        });
                    }
                }
            }
        });
        let _ = self.inner.timer.set(task.abort_handle());
    }

    fn derive(&self, deadline: Option<Deadline>) -> (Context, CancelHandle) {
        let ctx = Context {
            inner: Arc::new(Inner {
                token: self.inner.token.child_token(),
                deadline,
                done: OnceLock::new(),
                parent: Some(self.clone()),
                timer: OnceLock::new(),
            }),
        };
        let handle = CancelHandle { ctx: ctx.clone() };
        (ctx, handle)
    }

    /// Returns the deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline.map(|d| d.at)
    }

    /// Returns the underlying cancellation token.
    ///
    /// The token is cancelled on explicit cancellation and when the deadline
    /// passes, so `token().cancelled()` observes both.
    pub fn token(&self) -> &CancellationToken {
        &self.inner.token
    }

    /// Returns `true` once the context is cancelled or past its deadline.
    pub fn is_done(&self) -> bool {
        self.resolve().is_some()
    }

    /// Returns `None` while the context is live, otherwise
    /// [`ContextError::Canceled`] or [`ContextError::DeadlineExceeded`].
    pub fn err(&self) -> Option<ContextError> {
        self.resolve().map(|d| d.err)
    }

    /// Returns `None` while the context is live, otherwise the specific cause.
    pub fn cause(&self) -> Option<ContextError> {
        self.resolve().map(|d| d.cause)
    }

    /// Waits until the context is done and returns its cause.
    pub async fn done(&self) -> ContextError {
        if let Some(done) = self.resolve() {
            return done.cause;
        }

        match self.inner.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.inner.token.cancelled() => {}
                    _ = time::sleep_until(deadline.at) => {
                        return self.finish(Done {
                            err: ContextError::DeadlineExceeded,
                            cause: deadline.cause,
                        }).cause;
                    }
                }
            }
            None => self.inner.token.cancelled().await,
        }

        self.resolve()
            .map_or(ContextError::Canceled, |done| done.cause)
    }

    fn resolve(&self) -> Option<Done> {
        if let Some(done) = self.inner.done.get() {
            return Some(*done);
        }

        if self.inner.token.is_cancelled() {
            let inherited = self
                .inner
                .parent
                .as_ref()
                .and_then(Context::resolve)
                .unwrap_or(Done {
                    err: ContextError::Canceled,
                    cause: ContextError::Canceled,
                });
            return Some(*self.inner.done.get_or_init(|| inherited));
        }

        match self.inner.deadline {
            Some(deadline) if Instant::now() >= deadline.at => Some(self.finish(Done {
                err: ContextError::DeadlineExceeded,
                cause: deadline.cause,
            })),
            _ => None,
        }
    }

    /// Latches `done` (unless something else won) and cancels the token.
    ///
    /// The slot is written before the token is cancelled so observers of the
    /// token always find the latched cause.
    fn finish(&self, done: Done) -> Done {
        let done = *self.inner.done.get_or_init(|| done);
        self.inner.token.cancel();
        done
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

/// Cancels the context it was derived with.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    ctx: Context,
}

impl CancelHandle {
    /// Cancels with [`ContextError::Canceled`]. No-op if already done.
    pub fn cancel(&self) {
        self.cancel_with(ContextError::Canceled);
    }

    /// Cancels reporting `cause` from [`Context::cause`].
    ///
    /// No-op if already done, including a deadline that elapsed but was not
    /// yet observed.
    pub fn cancel_with(&self, cause: ContextError) {
        if self.ctx.resolve().is_some() {
            return;
        }
        self.ctx.finish(Done {
            err: ContextError::Canceled,
            cause,
        });
    }

    /// Returns a guard that cancels when dropped.
    pub fn drop_guard(self) -> CancelGuard {
        CancelGuard { handle: self }
    }
}

/// Cancels its context on drop.
#[derive(Debug)]
pub struct CancelGuard {
    handle: CancelHandle,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn background_is_never_done() {
        let ctx = Context::background();
        assert!(!ctx.is_done());
        assert_eq!(ctx.err(), None);
        assert_eq!(ctx.cause(), None);
        assert!(ctx.deadline().is_none());
    }

    #[tokio::test]
    async fn cancel_reports_canceled() {
        let (ctx, cancel) = Context::background().with_cancel();
        cancel.cancel();
        assert_eq!(ctx.err(), Some(ContextError::Canceled));
        assert_eq!(ctx.done().await, ContextError::Canceled);
        assert!(ctx.token().is_cancelled());
    }

    #[tokio::test]
    async fn parent_cancel_propagates_cause() {
        let (parent, cancel) = Context::background().with_cancel();
        let (child, _child_cancel) = parent.with_cancel();

        let shutdown = ContextError::ShutdownTimeout {
            timeout: Duration::from_millis(5),
        };
        cancel.cancel_with(shutdown);

        assert_eq!(child.err(), Some(ContextError::Canceled));
        assert_eq!(child.cause(), Some(shutdown));
    }

    #[tokio::test]
    async fn child_cancel_does_not_touch_parent() {
        let parent = Context::background();
        let (child, cancel) = parent.with_cancel();
        cancel.cancel();
        assert!(child.is_done());
        assert!(!parent.is_done());
    }

    #[tokio::test]
    async fn timeout_cause_is_reported_after_deadline() {
        let timeout = Duration::from_millis(10);
        let cause = ContextError::ShutdownTimeout { timeout };
        let (ctx, _cancel) = Context::background().with_timeout_cause(timeout, cause);

        assert_eq!(ctx.done().await, cause);
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
        assert_eq!(ctx.cause(), Some(cause));
        assert!(ctx.token().is_cancelled());
    }

    #[tokio::test]
    async fn earlier_parent_deadline_wins() {
        let (parent, _p) = Context::background().with_timeout(Duration::from_millis(10));
        let cause = ContextError::ShutdownTimeout {
            timeout: Duration::from_secs(60),
        };
        let (child, _c) = parent.with_timeout_cause(Duration::from_secs(60), cause);

        assert_eq!(child.deadline(), parent.deadline());
        assert_eq!(child.done().await, ContextError::DeadlineExceeded);
    }

    #[tokio::test]
    async fn cancel_after_deadline_keeps_first_cause() {
        let (ctx, cancel) = Context::background().with_timeout(Duration::from_millis(5));
        ctx.done().await;
        cancel.cancel();
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn elapsed_deadline_wins_over_late_cancel() {
        let (ctx, cancel) = Context::background().with_timeout(Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn unobserved_deadline_wins_over_late_cancel() {
        let cause = ContextError::ShutdownTimeout {
            timeout: Duration::from_millis(5),
        };
        let (ctx, cancel) =
            Context::background().with_timeout_cause(Duration::from_millis(5), cause);
        // Past the deadline before the timer task had a chance to run.
        tokio::time::advance(Duration::from_millis(10)).await;
        cancel.cancel();
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
        assert_eq!(ctx.cause(), Some(cause));
    }

    #[tokio::test]
    async fn token_is_cancelled_at_deadline() {
        let cause = ContextError::ShutdownTimeout {
            timeout: Duration::from_millis(10),
        };
        let (ctx, _cancel) =
            Context::background().with_timeout_cause(Duration::from_millis(10), cause);

        tokio::time::timeout(Duration::from_millis(500), ctx.token().cancelled())
            .await
            .expect("token cancelled by the deadline");
        assert_eq!(ctx.cause(), Some(cause));
    }

    #[test]
    fn deadline_without_runtime_is_evaluated_on_access() {
        let (ctx, _cancel) = Context::background().with_deadline(Instant::now());
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn drop_guard_cancels() {
        let (ctx, cancel) = Context::background().with_cancel();
        {
            let _guard = cancel.drop_guard();
        }
        assert_eq!(ctx.err(), Some(ContextError::Canceled));
    }

    #[tokio::test]
    async fn external_token_cancels_root() {
        let token = CancellationToken::new();
        let ctx = Context::from_token(token.clone());
        let (child, _c) = ctx.with_cancel();
        token.cancel();
        assert_eq!(child.done().await, ContextError::Canceled);
    }
}
