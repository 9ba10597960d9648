#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use runvisor::{Context, Error, RunnerFn, RunnerRef};

/// Shared, ordered record of what runners did.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Start/stop call counters for one runner.
#[derive(Clone, Default)]
pub struct Calls {
    pub starts: Arc<AtomicUsize>,
    pub stops: Arc<AtomicUsize>,
}

impl Calls {
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

/// Runner that counts calls and returns immediately.
pub fn counting(name: &'static str, calls: &Calls) -> RunnerRef {
    let starts = Arc::clone(&calls.starts);
    let stops = Arc::clone(&calls.stops);
    RunnerFn::new(name)
        .on_start(move |_ctx| {
            starts.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .on_stop(move |_ctx| {
            stops.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .arc()
}

/// Runner whose start blocks until its context is done; counts calls.
pub fn blocking(name: &'static str, calls: &Calls) -> RunnerRef {
    let starts = Arc::clone(&calls.starts);
    let stops = Arc::clone(&calls.stops);
    RunnerFn::new(name)
        .on_start(move |ctx: Context| {
            starts.fetch_add(1, Ordering::SeqCst);
            async move {
                ctx.done().await;
                Ok(())
            }
        })
        .on_stop(move |_ctx| {
            stops.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .arc()
}

/// Runner that writes `"<name>:start"` / `"<name>:stop"` into `journal`.
pub fn journaled(name: &'static str, journal: &Journal) -> RunnerRef {
    let on_start = journal.clone();
    let on_stop = journal.clone();
    RunnerFn::new(name)
        .on_start(move |_ctx| {
            on_start.push(format!("{name}:start"));
            async { Ok(()) }
        })
        .on_stop(move |_ctx| {
            on_stop.push(format!("{name}:stop"));
            async { Ok(()) }
        })
        .arc()
}

/// Runner whose start fails with `error`.
pub fn failing_start(name: &'static str, error: &'static str) -> RunnerRef {
    RunnerFn::new(name)
        .on_start(move |_ctx| async move { Err(Error::start(error)) })
        .arc()
}

/// Runner whose stop fails with `error`.
pub fn failing_stop(name: &'static str, error: &'static str) -> RunnerRef {
    RunnerFn::new(name)
        .on_stop(move |_ctx| async move { Err(Error::stop(error)) })
        .arc()
}
