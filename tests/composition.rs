mod common;

use std::time::Duration;

use common::{Calls, Journal, blocking, counting, failing_start, journaled};
use runvisor::{Context, ContextError, Error, Group, Runner};

#[tokio::test]
async fn nested_runners_start_and_stop_once() {
    let (a, b, c) = (Calls::default(), Calls::default(), Calls::default());
    let child = Group::builder("child")
        .runner(counting("b", &b))
        .runner(counting("c", &c))
        .build();
    let parent = Group::builder("parent")
        .runner(counting("a", &a))
        .group(child)
        .build();

    assert_eq!(parent.run(&Context::background()).await, Ok(()));
    for calls in [&a, &b, &c] {
        assert_eq!((calls.starts(), calls.stops()), (1, 1));
    }
}

#[tokio::test]
async fn each_level_applies_its_own_stop_order() {
    let journal = Journal::default();
    let child = Group::builder("child")
        .runner(journaled("b", &journal))
        .runner(journaled("c", &journal))
        .sequential_stop(true)
        .build();
    let parent = Group::builder("parent")
        .runner(journaled("a", &journal))
        .group(child)
        .runner(journaled("d", &journal))
        .sequential_stop(true)
        .reverse_stop(true)
        .build();

    parent.stop(&Context::background()).await.unwrap();
    assert_eq!(
        journal.entries(),
        ["d:stop", "b:stop", "c:stop", "a:stop"]
    );
}

#[tokio::test]
async fn nested_start_error_surfaces_at_the_top() {
    let calls = Calls::default();
    let child = Group::builder("child")
        .runner(blocking("b", &calls))
        .runner(failing_start("c", "broken"))
        .build();
    let parent = Group::builder("parent").group(child).build();

    assert_eq!(
        parent.run(&Context::background()).await,
        Err(Error::start("broken"))
    );
    assert_eq!(calls.stops(), 1);
}

#[tokio::test]
async fn nested_group_observes_parent_context() {
    let calls = Calls::default();
    let child = Group::builder("child").runner(blocking("b", &calls)).build();
    let parent = Group::builder("parent").group(child).build();

    let (ctx, _cancel) = Context::background().with_timeout(Duration::from_millis(15));
    assert_eq!(
        parent.run(&ctx).await,
        Err(Error::Context(ContextError::DeadlineExceeded))
    );
    assert_eq!((calls.starts(), calls.stops()), (1, 1));
}

#[test]
fn group_reports_its_name_as_a_runner() {
    let group = Group::builder("child").build().into_ref();
    assert_eq!(Runner::name(group.as_ref()), "child");
}
