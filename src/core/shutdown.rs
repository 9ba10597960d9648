//! # Cross-platform OS signal handling.
//!
//! Provides [`Signal`] and [`SignalListener`], the cancellation source a group
//! races against during start.
//!
//! ## Signals
//! **Unix platforms:** every [`Signal`] variant maps to its POSIX counterpart
//! through [`tokio::signal::unix`].
//!
//! **Other platforms:** only [`Signal::Interrupt`] is supported (via
//! [`tokio::signal::ctrl_c`]); other kinds fail registration with
//! [`std::io::ErrorKind::Unsupported`].
//!
//! ## Rules
//! - Listeners are registered **synchronously** by [`SignalListener::listen`],
//!   so a signal raised right after the call is never missed.
//! - The listener fires at most once, for the first matching signal.
//! - Dropping the listener unregisters it (the watcher task is aborted).
//! - An empty signal set never fires.
//!
//! Note: once Tokio has registered a handler for a signal, the default
//! disposition of that signal is not restored for the rest of the process.

use std::fmt;
use std::io;
use std::sync::{Arc, OnceLock};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// OS signal that can trigger a group shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// `SIGINT` (Ctrl-C in terminal).
    Interrupt,
    /// `SIGTERM` (default kill signal, used by systemd/Kubernetes).
    Terminate,
    /// `SIGQUIT`.
    Quit,
    /// `SIGHUP`.
    Hangup,
    /// `SIGUSR1`.
    User1,
    /// `SIGUSR2`.
    User2,
}

impl Signal {
    /// The usual termination set: `SIGINT`, `SIGTERM` and `SIGQUIT`.
    pub const TERMINATION: [Signal; 3] = [Signal::Interrupt, Signal::Terminate, Signal::Quit];

    /// Returns the conventional POSIX name (e.g. `"SIGTERM"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::Quit => "SIGQUIT",
            Signal::Hangup => "SIGHUP",
            Signal::User1 => "SIGUSR1",
            Signal::User2 => "SIGUSR2",
        }
    }

    #[cfg(unix)]
    fn kind(self) -> tokio::signal::unix::SignalKind {
        use tokio::signal::unix::SignalKind;

        match self {
            Signal::Interrupt => SignalKind::interrupt(),
            Signal::Terminate => SignalKind::terminate(),
            Signal::Quit => SignalKind::quit(),
            Signal::Hangup => SignalKind::hangup(),
            Signal::User1 => SignalKind::user_defined1(),
            Signal::User2 => SignalKind::user_defined2(),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scoped listener that fires once when any watched signal arrives.
#[derive(Debug)]
pub(crate) struct SignalListener {
    fired: CancellationToken,
    received: Arc<OnceLock<Signal>>,
    watcher: Option<JoinHandle<()>>,
}

impl SignalListener {
    /// Registers listeners for `signals` and spawns the watcher task.
    ///
    /// Must be called from within a Tokio runtime when `signals` is not empty.
    pub(crate) fn listen(signals: &[Signal]) -> io::Result<Self> {
        let fired = CancellationToken::new();
        let received = Arc::new(OnceLock::new());

        let mut unique: Vec<Signal> = Vec::with_capacity(signals.len());
        for sig in signals {
            if !unique.contains(sig) {
                unique.push(*sig);
            }
        }
        if unique.is_empty() {
            return Ok(Self {
                fired,
                received,
                watcher: None,
            });
        }

        let wait = watch(&unique)?;
        let watcher = tokio::spawn({
            let fired = fired.clone();
            let received = Arc::clone(&received);
            async move {
                let sig = wait.await;
                let _ = received.set(sig);
                fired.cancel();
            }
        });

        Ok(Self {
            fired,
            received,
            watcher: Some(watcher),
        })
    }

    /// Token cancelled once a watched signal arrives.
    pub(crate) fn fired(&self) -> CancellationToken {
        self.fired.clone()
    }

    /// Waits for the first watched signal. Never resolves for an empty set.
    pub(crate) async fn recv(&self) -> Option<Signal> {
        self.fired.cancelled().await;
        self.received.get().copied()
    }
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

#[cfg(unix)]
fn watch(signals: &[Signal]) -> io::Result<futures::future::BoxFuture<'static, Signal>> {
    use futures::FutureExt;
    use tokio::signal::unix::signal;

    let mut streams = Vec::with_capacity(signals.len());
    for sig in signals {
        streams.push((*sig, signal(sig.kind())?));
    }

    Ok(async move {
        let waits = streams.iter_mut().map(|(sig, stream)| {
            let sig = *sig;
            Box::pin(async move {
                // `None` means the driver is gone; such a stream never fires.
                if stream.recv().await.is_none() {
                    std::future::pending::<()>().await;
                }
                sig
            })
        });
        let (sig, _, _) = futures::future::select_all(waits).await;
        sig
    }
    .boxed())
}

#[cfg(not(unix))]
fn watch(signals: &[Signal]) -> io::Result<futures::future::BoxFuture<'static, Signal>> {
    use futures::FutureExt;

    if let Some(sig) = signals.iter().find(|s| **s != Signal::Interrupt) {
        return Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("{sig} is not supported on this platform"),
        ));
    }

    Ok(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        Signal::Interrupt
    }
    .boxed())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn names_are_posix() {
        assert_eq!(Signal::Terminate.to_string(), "SIGTERM");
        assert_eq!(Signal::TERMINATION.len(), 3);
    }

    #[tokio::test]
    async fn empty_set_never_fires() {
        let listener = SignalListener::listen(&[]).expect("listen");
        let res = tokio::time::timeout(Duration::from_millis(20), listener.recv()).await;
        assert!(res.is_err());
    }
}
