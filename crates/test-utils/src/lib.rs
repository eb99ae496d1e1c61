pub mod builders;
pub mod proxies;

use std::sync::{Arc, Mutex, Once};

use tracing_subscriber::{EnvFilter, fmt};

use flowdag::engine::{EventLoop, StatusEvent, StatusSink, TickOutcome};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Status sink that records every event for later assertions.
pub fn collecting_sink() -> (StatusSink, Arc<Mutex<Vec<StatusEvent>>>) {
    let events: Arc<Mutex<Vec<StatusEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink_events = Arc::clone(&events);
    let sink: StatusSink = Arc::new(move |event| {
        sink_events.lock().unwrap().push(event);
    });
    (sink, events)
}

/// Tick the loop until the board settles (a full pass with no stale node),
/// the loop leaves Running, or `max_ticks` is hit. Returns the outcomes.
pub async fn drive_to_settle(event_loop: &mut EventLoop, max_ticks: usize) -> Vec<TickOutcome> {
    let mut outcomes = Vec::new();
    for _ in 0..max_ticks {
        if event_loop.is_settled() || !event_loop.is_running() {
            break;
        }
        let outcome = event_loop.tick().await.expect("tick failed");
        if outcome == TickOutcome::Waiting {
            break;
        }
        outcomes.push(outcome);
    }
    outcomes
}
