// src/graph/query.rs

//! Read-only queries over the document store.
//!
//! Every function here re-reads the store at call time; there is no caching.
//! Correctness of the engine depends on always observing the latest document
//! state. Ids that no longer resolve are filtered out silently: concurrent
//! user edits are expected and a vanished neighbour is not an error.

use crate::store::{ContainerNode, DocumentStore, Node, ProgramNode};

/// All program nodes on the board, sorted by id for stable iteration.
pub fn list_program_nodes(store: &dyn DocumentStore) -> Vec<ProgramNode> {
    let mut nodes: Vec<ProgramNode> = store
        .node_ids()
        .into_iter()
        .filter_map(|id| store.node(&id))
        .filter_map(|node| match node {
            Node::Program(p) => Some(p),
            Node::Container(_) => None,
        })
        .collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));
    nodes
}

/// Immediate predecessors in the store's native edge order.
pub fn upstream(store: &dyn DocumentStore, id: &str) -> Vec<Node> {
    store
        .incoming(id)
        .into_iter()
        .filter_map(|nid| store.node(&nid))
        .collect()
}

/// Immediate successors in the store's native edge order.
pub fn downstream(store: &dyn DocumentStore, id: &str) -> Vec<Node> {
    store
        .outgoing(id)
        .into_iter()
        .filter_map(|nid| store.node(&nid))
        .collect()
}

/// Source containers feeding a program node, in edge order.
pub fn upstream_containers(store: &dyn DocumentStore, id: &str) -> Vec<ContainerNode> {
    upstream(store, id)
        .into_iter()
        .filter_map(|node| match node {
            Node::Container(c) => Some(c),
            Node::Program(_) => None,
        })
        .collect()
}

/// Target containers fed by a program node, in edge order.
pub fn downstream_containers(store: &dyn DocumentStore, id: &str) -> Vec<ContainerNode> {
    downstream(store, id)
        .into_iter()
        .filter_map(|node| match node {
            Node::Container(c) => Some(c),
            Node::Program(_) => None,
        })
        .collect()
}
