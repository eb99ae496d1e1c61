// src/programs/mod.rs

//! Program registry and operator interface.
//!
//! Every operator on the board is a static implementation of [`Program`]:
//! a uniform create / describe / run contract, dispatched by the type tag
//! persisted on the program node. The set of programs is fixed at startup;
//! there is no dynamic discovery.
//!
//! `run` implementations must poll [`ProgramContext::is_aborted`] and
//! [`ProgramContext::is_changed`] at every iteration boundary where they
//! process more than one item, and return early without partial corruption
//! when either fires.

use std::sync::Arc;

use crate::engine::signals::AbortFlag;
use crate::errors::Result;
use crate::graph::query;
use crate::proxy::{BoxFuture, ChatProxy, SearchProxy};
use crate::store::{DocumentStore, Item, NodeId, ProgramNode};

pub mod categorize;
pub mod filter;
pub mod join;
pub mod research;

pub use categorize::CategorizeProgram;
pub use filter::FilterProgram;
pub use join::JoinProgram;
pub use research::ResearchLookupProgram;

/// Progress reporting callback handed to running programs.
pub type ProgressSink = Arc<dyn Fn(String) + Send + Sync>;

/// Context for the create-flow.
pub struct CreationContext<'a> {
    pub store: &'a dyn DocumentStore,
    /// Containers selected in the host UI at creation time; programs may
    /// reuse them as sources instead of creating fresh ones.
    pub selected_containers: Vec<NodeId>,
}

/// Result of a program's create-flow: the node and its wiring, already
/// placed in the document.
#[derive(Debug, Clone)]
pub struct Creation {
    pub program_node: NodeId,
    pub source_ids: Vec<NodeId>,
    pub target_ids: Vec<NodeId>,
}

/// Context for a single `run` dispatch.
pub struct ProgramContext<'a> {
    pub store: &'a dyn DocumentStore,
    /// Source container ids captured at dispatch time, in edge order.
    pub source_ids: Vec<NodeId>,
    pub chat: &'a dyn ChatProxy,
    pub search: &'a dyn SearchProxy,
    abort: AbortFlag,
    baseline_generation: u64,
    progress: ProgressSink,
}

impl<'a> ProgramContext<'a> {
    pub fn new(
        store: &'a dyn DocumentStore,
        source_ids: Vec<NodeId>,
        chat: &'a dyn ChatProxy,
        search: &'a dyn SearchProxy,
        abort: AbortFlag,
        progress: ProgressSink,
    ) -> Self {
        let baseline_generation = store.generation();
        Self {
            store,
            source_ids,
            chat,
            search,
            abort,
            baseline_generation,
            progress,
        }
    }

    /// True once the loop has been asked to stop.
    pub fn is_aborted(&self) -> bool {
        self.abort.is_set()
    }

    /// True once the graph structure changed under the running program.
    pub fn is_changed(&self) -> bool {
        self.store.generation() != self.baseline_generation
    }

    /// Surface a one-line progress summary through the status channel.
    pub fn report(&self, summary: impl Into<String>) {
        (self.progress)(summary.into());
    }

    /// All items across the source containers, in source then item order.
    pub fn source_items(&self) -> Vec<Item> {
        self.source_ids
            .iter()
            .flat_map(|id| self.store.items(id))
            .collect()
    }
}

/// A registered program implementation.
pub trait Program: Send + Sync {
    /// Unique key; persisted on the program node as its type tag.
    fn name(&self) -> &'static str;

    /// Build a fresh program node plus any default source/target containers,
    /// wire the edges, and return the ids.
    fn create(&self, ctx: &CreationContext) -> Result<Creation>;

    /// One-line human-readable summary of the node's configuration.
    /// Must not mutate state.
    fn describe(&self, node: &ProgramNode, store: &dyn DocumentStore) -> String;

    /// Perform the node's work: read source items, call collaborators,
    /// write items into target containers.
    fn run<'a>(&'a self, ctx: &'a ProgramContext<'a>, node: &'a ProgramNode)
    -> BoxFuture<'a, Result<()>>;
}

/// Fixed set of programs resolved once at startup.
pub struct ProgramRegistry {
    programs: Vec<Box<dyn Program>>,
}

impl ProgramRegistry {
    pub fn new(programs: Vec<Box<dyn Program>>) -> Self {
        Self { programs }
    }

    /// All builtin operators.
    pub fn builtin() -> Self {
        Self::new(vec![
            Box::new(CategorizeProgram),
            Box::new(FilterProgram),
            Box::new(JoinProgram),
            Box::new(ResearchLookupProgram),
        ])
    }

    pub fn find(&self, name: &str) -> Option<&dyn Program> {
        self.programs
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    /// Resolve the program matching a node's type tag.
    pub fn find_matched(&self, node: &ProgramNode) -> Option<&dyn Program> {
        self.find(&node.program_type)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.programs.iter().map(|p| p.name()).collect()
    }
}

impl std::fmt::Debug for ProgramRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramRegistry")
            .field("programs", &self.names())
            .finish()
    }
}

/// Create the named default source containers, or reuse the containers
/// selected in the host UI when there are any.
pub fn create_or_use_sources(ctx: &CreationContext, names: &[&str]) -> Vec<NodeId> {
    if !ctx.selected_containers.is_empty() {
        return ctx.selected_containers.clone();
    }
    names.iter().map(|n| ctx.store.insert_container(n)).collect()
}

/// Create the named default target containers.
pub fn create_targets(ctx: &CreationContext, names: &[&str]) -> Vec<NodeId> {
    names.iter().map(|n| ctx.store.insert_container(n)).collect()
}

/// Target containers of a node re-read from the live store; programs call
/// this per iteration because the user may rewire mid-run.
pub fn live_targets(store: &dyn DocumentStore, node_id: &str) -> Vec<crate::store::ContainerNode> {
    query::downstream_containers(store, node_id)
}
