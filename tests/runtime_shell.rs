// tests/runtime_shell.rs

mod common;
use crate::common::builders::BoardBuilder;
use crate::common::proxies::{PagedSearch, ScriptedChat};
use crate::common::{TestResult, collecting_sink, init_tracing};

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};

use flowdag::engine::{
    ControlEvent, ControlHandle, EngineOptions, EventLoop, Runtime, StatusEvent,
};
use flowdag::programs::ProgramRegistry;
use flowdag::store::{DocumentStore, NodeId};

fn filter_board(items: &[&str]) -> (Arc<dyn DocumentStore>, NodeId) {
    let board = BoardBuilder::new();
    let input = board.container("Input", items);
    let program = board.program("filter", &[("question", "keep it?")]);
    let kept = board.container("Kept", &[]);
    board.wire(&input, &program);
    board.wire(&program, &kept);
    (board.shared(), kept)
}

#[tokio::test]
async fn once_mode_exits_when_the_board_settles() -> TestResult {
    init_tracing();

    let (store, kept) = filter_board(&["one", "two"]);
    let chat = Arc::new(ScriptedChat::new("Yes"));
    let (sink, events) = collecting_sink();
    let mut event_loop = EventLoop::new(Arc::clone(&store), ProgramRegistry::builtin(), sink);
    event_loop.set_collaborators(chat.clone(), Arc::new(PagedSearch::empty()));

    let (control_tx, control_rx) = mpsc::channel::<ControlEvent>(16);
    control_tx.send(ControlEvent::Start).await?;

    let options = EngineOptions {
        exit_when_settled: true,
        idle_wait: Duration::from_millis(5),
    };
    let runtime = Runtime::new(event_loop, control_rx, options);

    // Upper bound on how long the runtime may take to settle and exit.
    timeout(Duration::from_secs(3), runtime.run()).await??;

    assert_eq!(chat.call_count(), 2);
    assert_eq!(store.items(&kept).len(), 2);

    let events = events.lock().unwrap();
    assert!(matches!(events.first(), Some(StatusEvent::Started)));
    assert!(matches!(events.last(), Some(StatusEvent::Stopped(None))));

    Ok(())
}

#[tokio::test]
async fn cancel_affordance_stops_a_live_loop() -> TestResult {
    init_tracing();

    let (store, kept) = filter_board(&["one", "two", "three"]);
    let chat = Arc::new(ScriptedChat::new("Yes"));
    let (sink, events) = collecting_sink();
    let mut event_loop = EventLoop::new(Arc::clone(&store), ProgramRegistry::builtin(), sink);
    event_loop.set_collaborators(chat.clone(), Arc::new(PagedSearch::empty()));

    let (control_tx, control_rx) = mpsc::channel::<ControlEvent>(16);
    let handle = ControlHandle::new(event_loop.abort_flag(), control_tx.clone());

    let options = EngineOptions {
        exit_when_settled: false,
        idle_wait: Duration::from_millis(5),
    };
    let runtime = Runtime::new(event_loop, control_rx, options);
    let task = tokio::spawn(runtime.run());

    assert!(handle.send(ControlEvent::Start).await);
    // Let the board settle; a live loop keeps idling instead of exiting.
    tokio::time::sleep(Duration::from_millis(100)).await;

    handle.stop();
    assert!(handle.send(ControlEvent::Shutdown).await);
    timeout(Duration::from_secs(3), task).await???;

    // One run per item, no re-runs while the loop idled.
    assert_eq!(chat.call_count(), 3);
    assert_eq!(store.items(&kept).len(), 3);
    let events = events.lock().unwrap();
    assert!(matches!(events.last(), Some(StatusEvent::Stopped(None))));

    Ok(())
}
