//! # Example: http_like
//!
//! A server-shaped group: an accept loop that runs until stopped, a cache
//! warmed on start, and a metrics flusher, all stopped in reverse order on
//! Ctrl-C / SIGTERM with a bounded shutdown.
//!
//! ## Flow
//! ```text
//! Group::run()
//!     ├─► start: cache.warm ─► http.accept (blocks) ─► metrics.tick (blocks)
//!     ├─► SIGINT / SIGTERM ──► start returns Ok
//!     └─► stop (reverse, 3s): metrics ─► http ─► cache
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=runvisor=debug cargo run --example http_like --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use runvisor::{Context, Group, LogWriter, RunnerFn, RunnerRef, Signal, Subscribe};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn http(stopping: CancellationToken) -> RunnerRef {
    let served = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&served);
    RunnerFn::new("http")
        .on_start(move |ctx: Context| {
            let served = Arc::clone(&counter);
            let stopping = stopping.clone();
            async move {
                loop {
                    tokio::select! {
                        _ = stopping.cancelled() => return Ok(()),
                        cause = ctx.done() => return Err(cause.into()),
                        _ = tokio::time::sleep(Duration::from_millis(500)) => {
                            let n = served.fetch_add(1, Ordering::Relaxed) + 1;
                            println!("[http] served request #{n}");
                        }
                    }
                }
            }
        })
        .on_stop(move |_ctx| {
            let total = served.load(Ordering::Relaxed);
            async move {
                println!("[http] drained, {total} requests served");
                Ok(())
            }
        })
        .arc()
}

fn cache() -> RunnerRef {
    RunnerFn::new("cache")
        .on_start(|_ctx| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            println!("[cache] warmed");
            Ok(())
        })
        .on_stop(|_ctx| async {
            println!("[cache] flushed");
            Ok(())
        })
        .arc()
}

fn metrics(stopping: CancellationToken) -> RunnerRef {
    RunnerFn::new("metrics")
        .on_start(move |_ctx| {
            let stopping = stopping.clone();
            async move {
                stopping.cancelled().await;
                Ok(())
            }
        })
        .on_stop(|ctx: Context| async move {
            // Final flush, bounded by the stop timeout.
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(200)) => {
                    println!("[metrics] final flush done");
                    Ok(())
                }
                cause = ctx.done() => Err(cause.into()),
            }
        })
        .arc()
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("runvisor=info")),
        )
        .init();

    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let stopping = CancellationToken::new();
    let group = Group::builder("app")
        .runner(cache())
        .runner(http(stopping.clone()))
        .runner(metrics(stopping.clone()))
        .stop_signals(Signal::TERMINATION)
        .stop_timeout(Duration::from_secs(3))
        .sequential_stop(true)
        .reverse_stop(true)
        .stopping_token(stopping)
        .with_subscribers(subscribers)
        .build();

    println!("press Ctrl-C to stop");
    match group.run(&Context::background()).await {
        Ok(()) => println!("stopped gracefully"),
        Err(e) if e.is_shutdown_timeout() => println!("shutdown timed out: {e}"),
        Err(e) => println!("stopped with error: {e}"),
    }

    group.close().await;
    Ok(())
}
