mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use common::{Calls, Journal, blocking, counting, failing_start, journaled};
use runvisor::{Context, ContextError, Error, Group, GroupConfig, Phase, RunnerFn};

#[tokio::test]
async fn starts_every_runner_once() {
    let (a, b) = (Calls::default(), Calls::default());
    let group = Group::builder("app")
        .runner(counting("a", &a))
        .runner(counting("b", &b))
        .build();

    assert_eq!(group.start(&Context::background()).await, Ok(()));
    assert_eq!((a.starts(), b.starts()), (1, 1));
    assert_eq!((a.stops(), b.stops()), (0, 0));
}

#[tokio::test]
async fn first_start_error_returns_without_waiting_for_blocked_runners() {
    let (b, c) = (Calls::default(), Calls::default());
    let group = Group::builder("app")
        .runner(blocking("b", &b))
        .runner(failing_start("a", "boom"))
        .runner(blocking("c", &c))
        .build();

    let res = tokio::time::timeout(
        Duration::from_secs(1),
        group.start(&Context::background()),
    )
    .await
    .expect("start must not wait for blocked runners");

    assert_eq!(res, Err(Error::start("boom")));
}

#[tokio::test]
async fn returns_one_of_several_start_errors() {
    let group = Group::builder("app")
        .runner(failing_start("a", "boom"))
        .runner(failing_start("b", "boom"))
        .build();

    assert_eq!(
        group.start(&Context::background()).await,
        Err(Error::start("boom"))
    );
}

#[tokio::test]
async fn cancelled_context_is_returned() {
    let (ctx, cancel) = Context::background().with_cancel();
    cancel.cancel();
    let group = Group::builder("app").build();

    assert_eq!(
        group.start(&ctx).await,
        Err(Error::Context(ContextError::Canceled))
    );
}

#[tokio::test]
async fn elapsed_deadline_is_returned() {
    let calls = Calls::default();
    let (ctx, _cancel) = Context::background().with_timeout(Duration::from_millis(1));
    let group = Group::builder("app").runner(blocking("a", &calls)).build();

    let err = group.start(&ctx).await.unwrap_err();
    assert_eq!(err, Error::Context(ContextError::DeadlineExceeded));
    assert!(err.is_timeout());
}

#[tokio::test]
async fn context_cancelled_while_running() {
    let calls = Calls::default();
    let (ctx, cancel) = Context::background().with_cancel();
    let group = Group::builder("app").runner(blocking("a", &calls)).build();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
    });

    assert_eq!(
        group.start(&ctx).await,
        Err(Error::Context(ContextError::Canceled))
    );
    assert_eq!(calls.starts(), 1);
}

#[tokio::test]
async fn absent_runners_are_skipped() {
    let group = Group::new("app", vec![None, None, None], GroupConfig::default());
    assert_eq!(group.start(&Context::background()).await, Ok(()));
}

#[tokio::test]
async fn empty_group_starts() {
    let group = Group::builder("app").build();
    assert!(group.is_empty());
    assert_eq!(group.start(&Context::background()).await, Ok(()));
}

#[tokio::test]
async fn sequential_start_follows_list_order() {
    let journal = Journal::default();
    let group = Group::builder("app")
        .runner(journaled("a", &journal))
        .slot(None)
        .runner(journaled("b", &journal))
        .runner(journaled("c", &journal))
        .sequential_start(true)
        .build();

    assert_eq!(group.start(&Context::background()).await, Ok(()));
    assert_eq!(journal.entries(), ["a:start", "b:start", "c:start"]);
}

#[tokio::test]
async fn sequential_start_keeps_going_after_an_error() {
    let journal = Journal::default();
    let group = Group::builder("app")
        .runner(journaled("a", &journal))
        .runner(failing_start("b", "first"))
        .runner(failing_start("c", "second"))
        .runner(journaled("d", &journal))
        .sequential_start(true)
        .build();

    assert_eq!(
        group.start(&Context::background()).await,
        Err(Error::start("first"))
    );
    assert_eq!(journal.entries(), ["a:start", "d:start"]);
}

#[tokio::test]
async fn sequential_start_is_abandoned_when_context_ends() {
    let (ctx, _cancel) = Context::background().with_timeout(Duration::from_millis(20));
    let (first, second) = (Calls::default(), Calls::default());
    let group = Group::builder("app")
        .runner(blocking("first", &first))
        .runner(counting("second", &second))
        .sequential_start(true)
        .build();

    let err = group.start(&ctx).await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(first.starts(), 1);
    assert_eq!(second.starts(), 0);
}

#[tokio::test]
async fn in_flight_sequential_start_finishes_after_context_ends() {
    let finished = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&finished);
    let next = Calls::default();
    let group = Group::builder("app")
        .runner(
            RunnerFn::new("slow")
                .on_start(move |_ctx| {
                    let flag = Arc::clone(&flag);
                    async move {
                        tokio::time::sleep(Duration::from_millis(60)).await;
                        flag.store(true, Ordering::SeqCst);
                        Ok(())
                    }
                })
                .arc(),
        )
        .runner(counting("next", &next))
        .sequential_start(true)
        .build();

    let (ctx, _cancel) = Context::background().with_timeout(Duration::from_millis(10));
    assert_eq!(
        group.start(&ctx).await,
        Err(Error::Context(ContextError::DeadlineExceeded))
    );
    assert!(!finished.load(Ordering::SeqCst));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(finished.load(Ordering::SeqCst));
    assert_eq!(next.starts(), 0);
}

#[tokio::test]
async fn panicking_start_becomes_an_error() {
    let group = Group::builder("app")
        .runner(
            RunnerFn::new("bad")
                .on_start(|_ctx| async {
                    let explode = true;
                    if explode {
                        panic!("bad start");
                    }
                    Ok(())
                })
                .arc(),
        )
        .build();

    assert_eq!(
        group.start(&Context::background()).await,
        Err(Error::Panicked {
            runner: "bad".into(),
            phase: Phase::Start,
            info: "bad start".into(),
        })
    );
}
