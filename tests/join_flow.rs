// tests/join_flow.rs

mod common;
use crate::common::builders::BoardBuilder;
use crate::common::proxies::{PagedSearch, ScriptedChat};
use crate::common::{TestResult, collecting_sink, drive_to_settle, init_tracing, with_timeout};

use std::sync::Arc;

use flowdag::engine::EventLoop;
use flowdag::programs::ProgramRegistry;
use flowdag::store::{DocumentStore, NodeId};

struct JoinBoard {
    store: Arc<dyn DocumentStore>,
    output: NodeId,
}

fn join_board(keys: &[&str], values: &[&str], sources: usize) -> JoinBoard {
    let board = BoardBuilder::new();
    let left = board.container("Problems", keys);
    let right = board.container("Solutions", values);
    let program = board.program("join", &[("relation", "can be solved by")]);
    let output = board.container("Output", &[]);
    board.wire(&left, &program);
    if sources == 2 {
        board.wire(&right, &program);
    }
    board.wire(&program, &output);
    JoinBoard {
        store: board.shared(),
        output,
    }
}

async fn settle(store: Arc<dyn DocumentStore>, chat: Arc<ScriptedChat>) {
    let (sink, _events) = collecting_sink();
    let mut event_loop = EventLoop::new(store, ProgramRegistry::builtin(), sink);
    event_loop.set_collaborators(chat, Arc::new(PagedSearch::empty()));
    event_loop.start();
    with_timeout(drive_to_settle(&mut event_loop, 50)).await;
}

#[tokio::test]
async fn matched_options_are_emitted_after_their_key() -> TestResult {
    init_tracing();

    let board = join_board(
        &["slow startup"],
        &["add an index", "buy a plant", "cache the config"],
        2,
    );
    // Prose around the array must not break extraction; indices are 1-based.
    let chat = Arc::new(ScriptedChat::with_replies(
        "[]",
        &["Sure thing: [1, 3] as requested"],
    ));

    settle(Arc::clone(&board.store), chat.clone()).await;

    assert_eq!(chat.call_count(), 1);
    let output = board.store.items(&board.output);
    let texts: Vec<&str> = output.iter().map(|i| i.text.as_str()).collect();
    assert_eq!(texts, vec!["slow startup", "add an index", "cache the config"]);
    assert_eq!(output[0].metadata.get("role").map(String::as_str), Some("key"));
    assert_eq!(output[1].metadata.get("role").map(String::as_str), Some("match"));
    assert_eq!(output[2].metadata.get("role").map(String::as_str), Some("match"));

    Ok(())
}

#[tokio::test]
async fn join_requires_exactly_two_sources() -> TestResult {
    init_tracing();

    let board = join_board(&["only one side"], &[], 1);
    let chat = Arc::new(ScriptedChat::new("[]"));

    settle(Arc::clone(&board.store), chat.clone()).await;

    // Guard fires before any completion is requested.
    assert_eq!(chat.call_count(), 0);
    assert!(board.store.items(&board.output).is_empty());

    Ok(())
}

#[tokio::test]
async fn unparsable_reply_emits_key_but_no_matches() -> TestResult {
    init_tracing();

    let board = join_board(&["one problem"], &["a fix"], 2);
    // No array anywhere in the reply.
    let chat = Arc::new(ScriptedChat::new("I cannot help with that"));

    settle(Arc::clone(&board.store), chat.clone()).await;

    assert_eq!(chat.call_count(), 1);
    let output = board.store.items(&board.output);
    // The key was already emitted when the reply came back unusable.
    assert_eq!(output.len(), 1);
    assert_eq!(output[0].text, "one problem");

    Ok(())
}
