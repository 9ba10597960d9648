//! # First-error aggregation over runner calls.
//!
//! [`FirstError`] is a single-assignment slot: the first recorded error wins,
//! later ones are dropped. [`ErrGroup`] spawns one detached task per runner
//! call and funnels their errors into such a slot.
//!
//! ```text
//! spawn(start A) ──► Err(a) ──► record ──► slot = a, failed.cancel()
//! spawn(start B) ──► Err(b) ──► record ──► slot taken, dropped
//! spawn(start C) ──► Ok     ──► -
//! ```
//!
//! ## Rules
//! - Tasks are detached: dropping the group does **not** abort them.
//! - A panic inside a runner call is caught and recorded as [`Error::Panicked`].
//! - `failed` fires exactly once, on the first recorded error.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Phase};

/// Single-assignment error slot.
#[derive(Debug, Default)]
pub(crate) struct FirstError {
    slot: OnceLock<Error>,
}

impl FirstError {
    /// Records `err` if the slot is empty. Returns `true` if this call won.
    pub(crate) fn record(&self, err: Error) -> bool {
        self.slot.set(err).is_ok()
    }

    /// Returns the recorded error, if any.
    pub(crate) fn get(&self) -> Option<Error> {
        self.slot.get().cloned()
    }

    /// Converts the slot into a result.
    pub(crate) fn result(&self) -> Result<(), Error> {
        match self.get() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Detached tasks sharing one [`FirstError`] slot.
#[derive(Debug)]
pub(crate) struct ErrGroup {
    first: Arc<FirstError>,
    failed: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl ErrGroup {
    pub(crate) fn new() -> Self {
        Self {
            first: Arc::new(FirstError::default()),
            failed: CancellationToken::new(),
            handles: Vec::new(),
        }
    }

    /// Spawns `fut` as a detached task.
    ///
    /// `on_error` is invoked with every error (not only the first) before it
    /// is offered to the slot.
    pub(crate) fn spawn<F, E>(&mut self, runner: String, phase: Phase, fut: F, on_error: E)
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
        E: Fn(&str, &Error) + Send + 'static,
    {
        let first = Arc::clone(&self.first);
        let failed = self.failed.clone();
        self.handles.push(tokio::spawn(async move {
            if let Err(err) = guarded(&runner, phase, fut).await {
                on_error(&runner, &err);
                if first.record(err) {
                    failed.cancel();
                }
            }
        }));
    }

    /// Token cancelled on the first recorded error.
    pub(crate) fn failed(&self) -> CancellationToken {
        self.failed.clone()
    }

    /// Returns the first recorded error, if any.
    pub(crate) fn first_error(&self) -> Option<Error> {
        self.first.get()
    }

    /// Waits for every spawned task, then returns the first error.
    pub(crate) async fn wait(&mut self) -> Result<(), Error> {
        for handle in self.handles.drain(..) {
            // Tasks never panic (runner panics are caught inside), so the only
            // join error left is an aborted runtime, which has nothing to report.
            let _ = handle.await;
        }
        self.first.result()
    }
}

/// Awaits `fut`, converting a panic into [`Error::Panicked`].
pub(crate) async fn guarded<F>(runner: &str, phase: Phase, fut: F) -> Result<(), Error>
where
    F: Future<Output = Result<(), Error>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => Err(Error::Panicked {
            runner: runner.to_string(),
            phase,
            info: panic_info(&*payload),
        }),
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_info(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
