//! # Example: nested
//!
//! Groups are runners, so they nest. Each level applies its own ordering:
//!
//! ```text
//! app (sequential start, sequential + reverse stop)
//!  ├─ db
//!  ├─ api (concurrent)
//!  │   ├─ http
//!  │   └─ grpc
//!  └─ jobs
//!
//! start: db ─► {http, grpc} ─► jobs (blocks)
//! stop:  jobs ─► {http, grpc} ─► db
//! ```
//!
//! `jobs` keeps the start phase open; the run ends after two seconds through
//! a context deadline.
//!
//! ## Run
//! ```bash
//! cargo run --example nested
//! ```

use std::time::Duration;

use runvisor::{Context, Group, RunnerFn, RunnerRef};

fn component(name: &'static str, blocks: bool) -> RunnerRef {
    RunnerFn::new(name)
        .on_start(move |ctx: Context| async move {
            println!("[{name}] start");
            if blocks {
                ctx.done().await;
            }
            Ok(())
        })
        .on_stop(move |_ctx| async move {
            println!("[{name}] stop");
            Ok(())
        })
        .arc()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let api = Group::builder("api")
        .runner(component("http", false))
        .runner(component("grpc", false))
        .build();

    let app = Group::builder("app")
        .runner(component("db", false))
        .group(api)
        .runner(component("jobs", true))
        .sequential_start(true)
        .sequential_stop(true)
        .reverse_stop(true)
        .stop_timeout(Duration::from_secs(1))
        .build();

    let (ctx, _cancel) = Context::background().with_timeout(Duration::from_secs(2));
    match app.run(&ctx).await {
        Ok(()) => println!("done"),
        Err(e) if e.is_timeout() => println!("run ended by deadline: {e}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
