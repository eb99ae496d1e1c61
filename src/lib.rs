// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fingerprint;
pub mod graph;
pub mod logging;
pub mod programs;
pub mod proxy;
pub mod store;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::BoardFile;
use crate::engine::{ControlEvent, EngineOptions, EventLoop, Runtime, StatusEvent, StatusSink};
use crate::graph::planner;
use crate::programs::ProgramRegistry;
use crate::proxy::SearchHit;
use crate::proxy::offline::{KeywordChat, StaticSearch};
use crate::store::{DocumentStore, Node, NodeId};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - board loading
/// - the memory document store
/// - the builtin program registry and offline collaborators
/// - the event loop + runtime
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let board = config::load_and_validate(&args.board)
        .with_context(|| format!("loading board {}", args.board))?;

    if args.dry_run {
        print_dry_run(&board);
        return Ok(());
    }

    let (store, labels) = config::build_store(&board);
    let store: Arc<dyn DocumentStore> = Arc::new(store);

    let registry = ProgramRegistry::builtin();

    // Control channel for the host surface (start/stop/create/shutdown).
    let (control_tx, control_rx) = mpsc::channel::<ControlEvent>(64);

    // Status consumer: render transitions through tracing.
    let status: StatusSink = Arc::new(|event: StatusEvent| match event {
        StatusEvent::Started => info!("board run started"),
        StatusEvent::Stopped(Some(reason)) => warn!(%reason, "board run stopped"),
        StatusEvent::Stopped(None) => info!("board run stopped"),
        StatusEvent::Progress(summary) => info!(%summary, "working"),
        StatusEvent::Waiting => {}
    });

    let mut event_loop = EventLoop::new(Arc::clone(&store), registry, status);

    // Offline collaborators: deterministic and network-free; the search
    // corpus comes from the board file.
    let corpus: Vec<SearchHit> = board
        .search_result
        .iter()
        .map(|r| SearchHit {
            title: r.title.clone(),
            url: r.url.clone(),
            snippet: r.snippet.clone(),
        })
        .collect();
    event_loop.set_collaborators(
        Arc::new(KeywordChat::new()),
        Arc::new(StaticSearch::new(corpus)),
    );

    // Ctrl-C -> graceful shutdown.
    {
        let tx = control_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(ControlEvent::Shutdown).await;
        });
    }

    control_tx
        .send(ControlEvent::Start)
        .await
        .map_err(|_| anyhow::anyhow!("control channel closed before start"))?;

    let options = EngineOptions {
        exit_when_settled: args.once,
        idle_wait: Duration::from_millis(args.idle_wait_ms),
    };

    Runtime::new(event_loop, control_rx, options).run().await?;

    print_board(store.as_ref(), &labels);
    Ok(())
}

/// Dry-run output: containers, programs and the planned execution order.
fn print_dry_run(board: &BoardFile) {
    println!("flowdag dry-run");
    println!();

    println!("containers ({}):", board.container.len());
    for (label, container) in board.container.iter() {
        let name = container.name.as_deref().unwrap_or(label);
        println!("  - {label} ({name}): {} item(s)", container.items.len());
    }

    println!("programs ({}):", board.program.len());
    for (label, program) in board.program.iter() {
        println!("  - {label}: {}", program.program_type);
        if !program.sources.is_empty() {
            println!("      sources: {:?}", program.sources);
        }
        if !program.targets.is_empty() {
            println!("      targets: {:?}", program.targets);
        }
        for (key, value) in program.config.iter() {
            println!("      {key} = {value:?}");
        }
    }

    let (store, labels) = config::build_store(board);
    let programs = graph::query::list_program_nodes(&store);
    if let Some(first) = programs.first() {
        let order = planner::plan_order(&store, &first.id);
        let by_id: BTreeMap<&NodeId, &String> = labels.iter().map(|(l, id)| (id, l)).collect();
        let order_labels: Vec<&str> = order
            .iter()
            .map(|id| by_id.get(id).map(|l| l.as_str()).unwrap_or(id.as_str()))
            .collect();
        println!("execution order: {order_labels:?}");
    }
}

/// Print final container contents after a run.
fn print_board(store: &dyn DocumentStore, labels: &BTreeMap<String, NodeId>) {
    let by_id: BTreeMap<&NodeId, &String> = labels.iter().map(|(l, id)| (id, l)).collect();

    for id in store.node_ids() {
        let Some(Node::Container(container)) = store.node(&id) else {
            continue;
        };
        let label = by_id.get(&id).map(|l| l.as_str()).unwrap_or(id.as_str());
        println!("{} ({label}): {} item(s)", container.name, container.items.len());
        for item in container.items {
            println!("  - {}", item.text);
        }
    }
}
