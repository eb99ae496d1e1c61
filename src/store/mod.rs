// src/store/mod.rs

//! Document store abstraction.
//!
//! The engine never talks to a concrete canvas or persistence layer; it only
//! depends on [`DocumentStore`], which any host can satisfy. The in-tree
//! implementation is [`memory::MemoryStore`], an arena of nodes plus
//! adjacency lists, which is what the CLI and the tests use.
//!
//! All operations are synchronous, consistent reads/writes against the
//! store's current state. Operations on ids that no longer resolve are
//! deliberately tolerant (no-ops / `false` / empty results): concurrent user
//! edits are expected, and a vanished node is graph drift, not an error.

use std::collections::BTreeMap;
use std::fmt::Debug;

pub mod memory;

pub use memory::MemoryStore;

/// Opaque node identity, stable for the lifetime of the node.
pub type NodeId = String;

/// Atomic content unit held inside a container ("sticky").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub text: String,
    /// Program-specific structured metadata (e.g. `url`, `short_context`).
    pub metadata: BTreeMap<String, String>,
}

impl Item {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// A configured, executable operator instance on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramNode {
    pub id: NodeId,
    /// Type tag used for registry dispatch.
    pub program_type: String,
    /// Opaque program-specific configuration. `BTreeMap` so iteration order
    /// is stable for fingerprinting.
    pub config: BTreeMap<String, String>,
}

impl ProgramNode {
    /// Convenience accessor for a config field, empty string when unset.
    pub fn field(&self, key: &str) -> &str {
        self.config.get(key).map(String::as_str).unwrap_or("")
    }
}

/// A named, ordered collection of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerNode {
    pub id: NodeId,
    pub name: String,
    pub items: Vec<Item>,
}

/// Snapshot of any node in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Program(ProgramNode),
    Container(ContainerNode),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Program(p) => &p.id,
            Node::Container(c) => &c.id,
        }
    }

    pub fn as_program(&self) -> Option<&ProgramNode> {
        match self {
            Node::Program(p) => Some(p),
            Node::Container(_) => None,
        }
    }

    pub fn as_container(&self) -> Option<&ContainerNode> {
        match self {
            Node::Container(c) => Some(c),
            Node::Program(_) => None,
        }
    }
}

/// Abstract document/canvas store interface.
///
/// Methods take `&self`; implementations use interior mutability so the
/// engine and a running program can share one handle.
pub trait DocumentStore: Send + Sync + Debug {
    /// Snapshot of a single node, `None` if the id no longer resolves.
    fn node(&self, id: &str) -> Option<Node>;

    /// All node ids in insertion order.
    fn node_ids(&self) -> Vec<NodeId>;

    /// Successors of `id` in edge insertion order.
    fn outgoing(&self, id: &str) -> Vec<NodeId>;

    /// Predecessors of `id` in edge insertion order.
    fn incoming(&self, id: &str) -> Vec<NodeId>;

    /// Insert a program node; the store assigns and returns its id.
    fn insert_program(&self, program_type: &str, config: BTreeMap<String, String>) -> NodeId;

    /// Insert an empty container node; the store assigns and returns its id.
    fn insert_container(&self, name: &str) -> NodeId;

    /// Add a directed edge. Unknown endpoints are ignored.
    fn connect(&self, from: &str, to: &str);

    /// Remove a node and all edges touching it. Unknown ids are ignored.
    fn remove_node(&self, id: &str);

    /// Items of a container, empty when the id is gone or not a container.
    fn items(&self, container: &str) -> Vec<Item>;

    /// Append an item; returns `false` when the container vanished.
    fn append_item(&self, container: &str, item: Item) -> bool;

    /// Remove all items from a container.
    fn clear_items(&self, container: &str);

    /// Rename a container. Counts as a structural change.
    fn set_container_name(&self, container: &str, name: &str);

    /// Overwrite a single config field on a program node.
    fn set_config(&self, id: &str, key: &str, value: &str);

    /// Per-node scratch field (used for the persisted fingerprint).
    fn scratch(&self, id: &str, key: &str) -> Option<String>;

    fn set_scratch(&self, id: &str, key: &str, value: &str);

    /// Remove the given scratch key from every node.
    fn clear_scratch_key(&self, key: &str);

    /// Monotonically increasing counter, bumped on structural mutations
    /// (node/edge insert or removal, container rename). Item and scratch
    /// writes do not bump it, so a program's own output never trips its
    /// `is_changed` poll.
    fn generation(&self) -> u64;
}
