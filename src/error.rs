//! Error types used by runners and groups.
//!
//! This module defines two enums:
//!
//! - [`Error`]: errors returned from [`Runner::start`](crate::Runner::start),
//!   [`Runner::stop`](crate::Runner::stop) and the group operations.
//! - [`ContextError`]: why a [`Context`](crate::Context) is done.
//!
//! Both provide `as_label` for logs/metrics and a timeout classification
//! ([`Error::is_timeout`], [`ContextError::is_timeout`]) so callers can tell an
//! enforced deadline apart from ordinary cancellation without matching exact values.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Lifecycle phase a runner was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Inside [`Runner::start`](crate::Runner::start).
    Start,
    /// Inside [`Runner::stop`](crate::Runner::stop).
    Stop,
}

impl Phase {
    /// Returns a short lowercase name (`"start"` / `"stop"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::Stop => "stop",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// # Reason a context is done.
///
/// [`Context::err`](crate::Context::err) only ever reports `Canceled` or
/// `DeadlineExceeded`; [`Context::cause`](crate::Context::cause) may report the
/// more specific `ShutdownTimeout` attached by a group's stop phase.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// The context (or one of its ancestors) was cancelled.
    #[error("context canceled")]
    Canceled,

    /// The context deadline elapsed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// The stop phase of a group ran past its configured timeout.
    #[error("graceful shutdown timed out after {timeout:?}")]
    ShutdownTimeout {
        /// The configured stop timeout.
        timeout: Duration,
    },
}

impl ContextError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ContextError::Canceled => "context_canceled",
            ContextError::DeadlineExceeded => "context_deadline_exceeded",
            ContextError::ShutdownTimeout { .. } => "shutdown_timeout",
        }
    }

    /// Returns `true` if the context ended because a deadline passed.
    ///
    /// Covers both a plain deadline and the stop-phase shutdown timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ContextError::DeadlineExceeded | ContextError::ShutdownTimeout { .. }
        )
    }
}

/// # Errors produced by runners and groups.
///
/// Runners build `Start`/`Stop` errors with [`Error::start`] / [`Error::stop`]
/// and forward context causes with `?` or `.into()`:
///
/// ```
/// use runvisor::{Context, Error};
///
/// # async fn demo(ctx: Context) -> Result<(), Error> {
/// let cause = ctx.done().await;
/// Err(cause.into())
/// # }
/// ```
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A runner failed to start.
    #[error("start failed: {error}")]
    Start {
        /// The underlying error message.
        error: String,
    },

    /// A runner failed to stop cleanly.
    #[error("stop failed: {error}")]
    Stop {
        /// The underlying error message.
        error: String,
    },

    /// A runner panicked inside start or stop.
    #[error("runner {runner} panicked during {phase}: {info}")]
    Panicked {
        /// Name of the runner that panicked.
        runner: String,
        /// Phase the panic happened in.
        phase: Phase,
        /// Panic payload rendered as text.
        info: String,
    },

    /// Listening for shutdown signals could not be set up.
    #[error("failed to listen for shutdown signals: {error}")]
    Signal {
        /// The underlying I/O error message.
        error: String,
    },

    /// The governing context is done.
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl Error {
    /// Builds a [`Error::Start`] from any displayable error.
    pub fn start(error: impl fmt::Display) -> Self {
        Error::Start {
            error: error.to_string(),
        }
    }

    /// Builds a [`Error::Stop`] from any displayable error.
    pub fn stop(error: impl fmt::Display) -> Self {
        Error::Stop {
            error: error.to_string(),
        }
    }

    pub(crate) fn signal(error: std::io::Error) -> Self {
        Error::Signal {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use runvisor::Error;
    ///
    /// let err = Error::start("address in use");
    /// assert_eq!(err.as_label(), "runner_start_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::Start { .. } => "runner_start_failed",
            Error::Stop { .. } => "runner_stop_failed",
            Error::Panicked { .. } => "runner_panicked",
            Error::Signal { .. } => "signal_listen_failed",
            Error::Context(e) => e.as_label(),
        }
    }

    /// Returns the context cause, if this error came from a done context.
    pub fn as_context(&self) -> Option<ContextError> {
        match self {
            Error::Context(e) => Some(*e),
            _ => None,
        }
    }

    /// Returns `true` if the error is a timeout of any kind.
    pub fn is_timeout(&self) -> bool {
        self.as_context().is_some_and(|e| e.is_timeout())
    }

    /// Returns `true` if the error is the stop-phase shutdown timeout.
    pub fn is_shutdown_timeout(&self) -> bool {
        matches!(
            self.as_context(),
            Some(ContextError::ShutdownTimeout { .. })
        )
    }
}
