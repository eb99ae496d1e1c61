// src/graph/planner.rs

//! Execution-order planner.
//!
//! Program-to-program dependencies are derived by chaining
//! program -> container -> program edges: a program whose target container
//! feeds another program's sources must run first. The planner performs a
//! Kahn topological sort over that derived graph with a deterministic
//! ready-set policy, so `plan_order` on an unchanged board always yields
//! the same sequence.
//!
//! Cycle policy: program-level cycles are legal on the board. When the
//! ready set runs dry with nodes remaining, the smallest-id remaining node
//! is released and its unsatisfied in-edges are ignored for ordering
//! purposes only. Each node appears exactly once and the sort always
//! terminates.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::graph::query;
use crate::store::{DocumentStore, Node, NodeId};

/// Derived program-to-program dependency graph.
///
/// Node identity is the program node id; edge `a -> b` means "a's output
/// feeds b's input".
pub fn derive_program_graph<'a>(
    store: &dyn DocumentStore,
    program_ids: &'a [NodeId],
) -> DiGraphMap<&'a str, ()> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for id in program_ids {
        graph.add_node(id.as_str());
    }

    for id in program_ids {
        for mid in store.outgoing(id) {
            let Some(Node::Container(_)) = store.node(&mid) else {
                continue;
            };
            for succ in store.outgoing(&mid) {
                if let Some(other) = program_ids.iter().find(|p| *p == &succ) {
                    if other != id {
                        graph.add_edge(id.as_str(), other.as_str(), ());
                    }
                }
            }
        }
    }

    graph
}

/// Produce a deterministic, dependency-respecting ordering of all program
/// nodes, scheduling `start_id` as promptly as its dependencies allow.
pub fn plan_order(store: &dyn DocumentStore, start_id: &str) -> Vec<NodeId> {
    let program_ids: Vec<NodeId> = query::list_program_nodes(store)
        .into_iter()
        .map(|p| p.id)
        .collect();

    if program_ids.is_empty() {
        return Vec::new();
    }

    let graph = derive_program_graph(store, &program_ids);

    // Kahn's algorithm with explicit in-degree bookkeeping. BTree
    // collections keep candidate selection independent of hash iteration
    // order.
    let mut in_degree: BTreeMap<&str, usize> = program_ids
        .iter()
        .map(|id| {
            (
                id.as_str(),
                graph
                    .neighbors_directed(id.as_str(), petgraph::Direction::Incoming)
                    .count(),
            )
        })
        .collect();

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(id, _)| *id)
        .collect();

    let mut remaining: BTreeSet<&str> = program_ids.iter().map(|id| id.as_str()).collect();
    let mut order: Vec<NodeId> = Vec::with_capacity(program_ids.len());

    while !remaining.is_empty() {
        let next = if ready.contains(start_id) {
            start_id
        } else if let Some(id) = ready.iter().next() {
            id
        } else {
            // Cycle: release the smallest remaining id, ignoring its
            // unsatisfied in-edges for ordering only.
            let id = *remaining.iter().next().unwrap();
            debug!(node = %id, "cycle in program graph; releasing node out of order");
            id
        };

        ready.remove(next);
        remaining.remove(next);
        order.push(next.to_string());

        for succ in graph.neighbors_directed(next, petgraph::Direction::Outgoing) {
            if !remaining.contains(succ) {
                continue;
            }
            let deg = in_degree.get_mut(succ).unwrap();
            *deg = deg.saturating_sub(1);
            if *deg == 0 {
                ready.insert(succ);
            }
        }
    }

    order
}
