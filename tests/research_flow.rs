// tests/research_flow.rs

mod common;
use crate::common::builders::BoardBuilder;
use crate::common::proxies::{PagedSearch, ScriptedChat};
use crate::common::{TestResult, collecting_sink, init_tracing};

use std::sync::Arc;

use flowdag::engine::{EventLoop, TickOutcome};
use flowdag::programs::ProgramRegistry;
use flowdag::store::{DocumentStore, NodeId};

fn research_board(query: &str, limit: &str) -> (Arc<dyn DocumentStore>, NodeId, NodeId) {
    let board = BoardBuilder::new();
    let program = board.program("research-lookup", &[("query", query), ("limit", limit)]);
    let results = board.container("Results", &[]);
    board.wire(&program, &results);
    (board.shared(), program, results)
}

fn new_loop(store: Arc<dyn DocumentStore>, search: Arc<PagedSearch>) -> EventLoop {
    let (sink, _events) = collecting_sink();
    let mut event_loop = EventLoop::new(store, ProgramRegistry::builtin(), sink);
    event_loop.set_collaborators(Arc::new(ScriptedChat::new("unused")), search);
    event_loop
}

#[tokio::test]
async fn pages_until_the_limit_is_reached() -> TestResult {
    init_tracing();

    let (store, _program, results) = research_board("widget ergonomics", "7");
    let search = Arc::new(PagedSearch::with_numbered_hits(12));
    let mut event_loop = new_loop(Arc::clone(&store), search.clone());

    event_loop.start();
    let outcome = event_loop.tick().await?;
    assert!(matches!(outcome, TickOutcome::Ran(_)));

    // Two pages of five cover a limit of seven.
    assert_eq!(search.call_count(), 2);
    let items = store.items(&results);
    assert_eq!(items.len(), 7);
    assert_eq!(items[0].text, "Result 1");
    assert_eq!(
        items[0].metadata.get("url").map(String::as_str),
        Some("https://example.test/1")
    );
    assert_eq!(
        items[0].metadata.get("snippet").map(String::as_str),
        Some("Summary of result 1")
    );
    assert_eq!(items[6].text, "Result 7");

    Ok(())
}

#[tokio::test]
async fn short_corpus_stops_at_the_last_page() -> TestResult {
    init_tracing();

    let (store, _program, results) = research_board("widget ergonomics", "10");
    let search = Arc::new(PagedSearch::with_numbered_hits(3));
    let mut event_loop = new_loop(Arc::clone(&store), search.clone());

    event_loop.start();
    event_loop.tick().await?;

    assert_eq!(search.call_count(), 1);
    assert_eq!(store.items(&results).len(), 3);

    Ok(())
}

#[tokio::test]
async fn rerun_replaces_stale_results() -> TestResult {
    init_tracing();

    let (store, program, results) = research_board("pointer latency", "10");
    let search = Arc::new(PagedSearch::with_numbered_hits(3));
    let mut event_loop = new_loop(Arc::clone(&store), search.clone());

    event_loop.start();
    event_loop.tick().await?;
    assert_eq!(store.items(&results).len(), 3);

    // A new query re-triggers the node; the old hits must not pile up
    // underneath the fresh ones.
    store.set_config(&program, "query", "editor input lag");
    for _ in 0..6 {
        event_loop.tick().await?;
    }

    assert_eq!(search.call_count(), 2);
    assert_eq!(store.items(&results).len(), 3);

    Ok(())
}

#[tokio::test]
async fn empty_query_searches_nothing() -> TestResult {
    init_tracing();

    let (store, _program, results) = research_board("", "10");
    let search = Arc::new(PagedSearch::with_numbered_hits(12));
    let mut event_loop = new_loop(Arc::clone(&store), search.clone());

    event_loop.start();
    let outcome = event_loop.tick().await?;
    assert!(matches!(outcome, TickOutcome::Ran(_)));

    assert_eq!(search.call_count(), 0);
    assert!(store.items(&results).is_empty());

    Ok(())
}
