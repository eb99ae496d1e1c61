// tests/property_planner.rs

use std::collections::BTreeSet;

use proptest::prelude::*;

use flowdag::graph::planner::plan_order;
use flowdag::store::{MemoryStore, NodeId};
use flowdag_test_utils::builders::BoardBuilder;

/// A random board: `programs` program nodes, `containers` containers, and
/// arbitrary program<->container edges (cycles included on purpose).
#[derive(Debug, Clone)]
struct RandomBoard {
    programs: usize,
    containers: usize,
    /// (program index, container index, program-to-container?)
    edges: Vec<(usize, usize, bool)>,
}

fn board_strategy() -> impl Strategy<Value = RandomBoard> {
    (1..6usize, 1..6usize)
        .prop_flat_map(|(programs, containers)| {
            let edges = proptest::collection::vec(
                (0..programs, 0..containers, any::<bool>()),
                0..20,
            );
            edges.prop_map(move |edges| RandomBoard {
                programs,
                containers,
                edges,
            })
        })
}

fn build(board: &RandomBoard) -> (std::sync::Arc<MemoryStore>, Vec<NodeId>) {
    let builder = BoardBuilder::new();
    let program_ids: Vec<NodeId> = (0..board.programs)
        .map(|i| builder.program("filter", &[("question", &format!("q{i}"))]))
        .collect();
    let container_ids: Vec<NodeId> = (0..board.containers)
        .map(|i| builder.container(&format!("C{i}"), &[]))
        .collect();
    for (p, c, forward) in &board.edges {
        if *forward {
            builder.wire(&program_ids[*p], &container_ids[*c]);
        } else {
            builder.wire(&container_ids[*c], &program_ids[*p]);
        }
    }
    (builder.store(), program_ids)
}

/// An acyclic board: derived edges only ever point from a lower program
/// index to a higher one.
#[derive(Debug, Clone)]
struct DagBoard {
    programs: usize,
    edges: Vec<(usize, usize)>,
}

fn dag_strategy() -> impl Strategy<Value = DagBoard> {
    (2..6usize).prop_flat_map(|programs| {
        proptest::collection::vec((0..programs, 0..programs), 0..12).prop_map(move |raw| {
            DagBoard {
                programs,
                edges: raw
                    .into_iter()
                    .filter(|(a, b)| a != b)
                    .map(|(a, b)| (a.min(b), a.max(b)))
                    .collect(),
            }
        })
    })
}

proptest! {
    /// Every program node appears exactly once, whatever the wiring.
    #[test]
    fn plan_covers_every_program_exactly_once(board in board_strategy()) {
        let (store, program_ids) = build(&board);

        for start in &program_ids {
            let order = plan_order(store.as_ref(), start);
            prop_assert_eq!(order.len(), program_ids.len());
            let unique: BTreeSet<&NodeId> = order.iter().collect();
            prop_assert_eq!(unique.len(), program_ids.len());
        }
    }

    /// Planning is a pure function of the board and the start node.
    #[test]
    fn plan_is_deterministic(board in board_strategy()) {
        let (store, program_ids) = build(&board);

        for start in &program_ids {
            let first = plan_order(store.as_ref(), start);
            let second = plan_order(store.as_ref(), start);
            prop_assert_eq!(first, second);
        }
    }

    /// On acyclic boards the order satisfies every derived dependency edge.
    #[test]
    fn acyclic_plans_respect_every_edge(board in dag_strategy()) {
        let builder = BoardBuilder::new();
        let ids: Vec<NodeId> = (0..board.programs)
            .map(|i| builder.program("filter", &[("question", &format!("q{i}"))]))
            .collect();
        for (a, b) in &board.edges {
            let pipe = builder.container("pipe", &[]);
            builder.wire(&ids[*a], &pipe);
            builder.wire(&pipe, &ids[*b]);
        }

        let store = builder.store();
        for start in &ids {
            let order = plan_order(store.as_ref(), start);
            let pos = |id: &NodeId| order.iter().position(|n| n == id).unwrap();
            for (a, b) in &board.edges {
                prop_assert!(pos(&ids[*a]) < pos(&ids[*b]));
            }
        }
    }
}
