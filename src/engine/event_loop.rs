// src/engine/event_loop.rs

//! Event-loop core.
//!
//! Owns the work queue of pending program-node ids and processes at most
//! one node per tick: refill the queue from the planner when exhausted,
//! compare the node's fresh fingerprint against the persisted one, dispatch
//! the matched program when stale, then re-plan the downstream order so the
//! next tick reflects whatever the run changed.
//!
//! Errors from a tick are returned to the shell, which maps them to a
//! fail-fast `stop(message)`: a partially re-run pipeline is recoverable by
//! pressing start again, silently retried language-model side effects are
//! not.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::engine::{LoopState, StatusEvent, StatusSink, TickOutcome};
use crate::engine::signals::AbortFlag;
use crate::errors::{FlowdagError, Result};
use crate::fingerprint::{self, FINGERPRINT_KEY};
use crate::graph::{planner, query};
use crate::programs::{Creation, CreationContext, ProgramContext, ProgramRegistry};
use crate::proxy::{ChatProxy, SearchProxy};
use crate::store::{DocumentStore, Node, NodeId};

pub struct EventLoop {
    store: Arc<dyn DocumentStore>,
    registry: ProgramRegistry,
    chat: Option<Arc<dyn ChatProxy>>,
    search: Option<Arc<dyn SearchProxy>>,
    status: StatusSink,
    abort: AbortFlag,
    queue: VecDeque<NodeId>,
    state: LoopState,
    /// Nodes already processed since the last refill. Re-planning must not
    /// re-queue them: a pass visits each program node at most once, which is
    /// what bounds work on cyclic boards.
    processed_in_pass: BTreeSet<NodeId>,
    /// Did any program run since the last queue refill?
    ran_in_pass: bool,
    /// Has the queue been refilled at least once since start()?
    refilled_once: bool,
    /// A full pass completed with zero stale nodes.
    settled: bool,
}

impl EventLoop {
    pub fn new(store: Arc<dyn DocumentStore>, registry: ProgramRegistry, status: StatusSink) -> Self {
        Self {
            store,
            registry,
            chat: None,
            search: None,
            status,
            abort: AbortFlag::new(),
            queue: VecDeque::new(),
            state: LoopState::Idle,
            processed_in_pass: BTreeSet::new(),
            ran_in_pass: false,
            refilled_once: false,
            settled: false,
        }
    }

    /// Inject the chat/search collaborators. Ticks that need to dispatch a
    /// program fail with a setup error until this has been called.
    pub fn set_collaborators(&mut self, chat: Arc<dyn ChatProxy>, search: Arc<dyn SearchProxy>) {
        self.chat = Some(chat);
        self.search = Some(search);
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// A full pass over the board found nothing stale.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Shared abort flag, for building the cancel affordance.
    pub fn abort_flag(&self) -> AbortFlag {
        self.abort.clone()
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Idle -> Running: clear the queue, wipe every persisted fingerprint
    /// (forcing a full re-evaluation), reset signals, announce.
    pub fn start(&mut self) {
        info!("event loop starting; clearing persisted fingerprints");
        self.queue.clear();
        self.store.clear_scratch_key(FINGERPRINT_KEY);
        self.abort.clear();
        self.processed_in_pass.clear();
        self.ran_in_pass = false;
        self.refilled_once = false;
        self.settled = false;
        self.state = LoopState::Running;
        self.emit(StatusEvent::Started);
    }

    /// Running -> Idle. `reason` is `Some` for error stops.
    pub fn stop(&mut self, reason: Option<String>) {
        if self.state == LoopState::Idle {
            return;
        }
        info!(reason = reason.as_deref(), "event loop stopping");
        self.abort.set();
        self.state = LoopState::Idle;
        self.emit(StatusEvent::Stopped(reason));
    }

    /// Create-flow for the hosting UI: dispatch to the named program's
    /// `create`, which places the node and its default containers in the
    /// document.
    pub fn create_node(&self, program_type: &str, selection: Vec<NodeId>) -> Result<Creation> {
        let program = self
            .registry
            .find(program_type)
            .ok_or_else(|| FlowdagError::UnknownProgram(program_type.to_string()))?;
        let ctx = CreationContext {
            store: self.store.as_ref(),
            selected_containers: selection,
        };
        program.create(&ctx)
    }

    /// Process at most one program node.
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        if self.state != LoopState::Running {
            return Ok(TickOutcome::Waiting);
        }

        if self.queue.is_empty() && !self.refill_queue() {
            self.emit(StatusEvent::Waiting);
            return Ok(TickOutcome::Waiting);
        }

        let Some(id) = self.queue.pop_front() else {
            return Ok(TickOutcome::Waiting);
        };

        // The node may have been deleted since it was queued; concurrent
        // user edits are expected, so this is a silent skip.
        let Some(Node::Program(node)) = self.store.node(&id) else {
            debug!(node = %id, "queued node no longer resolves; skipping");
            return Ok(TickOutcome::Drifted(id));
        };

        let sources = query::upstream_containers(self.store.as_ref(), &id);
        let targets = query::downstream_containers(self.store.as_ref(), &id);
        let fresh = fingerprint::compute(&node, &sources, &targets);
        let existing = self.store.scratch(&id, FINGERPRINT_KEY);

        let outcome = if existing.as_deref() != Some(fresh.as_str()) {
            let program = self
                .registry
                .find_matched(&node)
                .ok_or_else(|| FlowdagError::UnknownProgram(node.program_type.clone()))?;

            let (Some(chat), Some(search)) = (self.chat.clone(), self.search.clone()) else {
                return Err(FlowdagError::SetupError(
                    "chat/search collaborators are not configured".to_string(),
                ));
            };

            self.emit(StatusEvent::Progress(
                program.describe(&node, self.store.as_ref()),
            ));

            let source_ids: Vec<NodeId> = sources.iter().map(|c| c.id.clone()).collect();
            let status = Arc::clone(&self.status);
            let progress: crate::programs::ProgressSink =
                Arc::new(move |summary: String| status(StatusEvent::Progress(summary)));

            let ctx = ProgramContext::new(
                self.store.as_ref(),
                source_ids,
                chat.as_ref(),
                search.as_ref(),
                self.abort.clone(),
                progress,
            );

            debug!(node = %id, program = node.program_type, "inputs changed; running program");
            program.run(&ctx, &node).await?;

            // Persisted only after a successful run, so a failed node is
            // retried on the next start.
            self.store.set_scratch(&id, FINGERPRINT_KEY, &fresh);
            self.ran_in_pass = true;
            TickOutcome::Ran(id.clone())
        } else {
            debug!(node = %id, "fingerprint unchanged; skipping");
            self.emit(StatusEvent::Waiting);
            TickOutcome::Unchanged(id.clone())
        };

        self.processed_in_pass.insert(id.clone());
        self.replan_after(&id);
        Ok(outcome)
    }

    /// Rebuild the queue from all current program nodes. Returns `false`
    /// when the board has no program nodes at all.
    fn refill_queue(&mut self) -> bool {
        let all = query::list_program_nodes(self.store.as_ref());
        let Some(first) = all.first() else {
            return false;
        };

        if self.refilled_once && !self.ran_in_pass {
            debug!("previous pass ran nothing; board is settled");
            self.settled = true;
        } else if self.ran_in_pass {
            self.settled = false;
        }
        self.refilled_once = true;
        self.ran_in_pass = false;
        self.processed_in_pass.clear();

        let order = planner::plan_order(self.store.as_ref(), &first.id);
        debug!(?order, "refilled execution queue");
        self.queue.extend(order);
        true
    }

    /// Recompute the downstream execution order starting at the node that
    /// was just processed and replace the remaining queue with the portion
    /// after it, so graph mutations made by the run are visible to the next
    /// tick.
    fn replan_after(&mut self, id: &str) {
        if self.store.node(id).is_none() {
            // The program deleted its own node; keep the stale remainder,
            // the next refill will correct it.
            warn!(node = %id, "processed node vanished during its own tick");
            return;
        }

        let order = planner::plan_order(self.store.as_ref(), id);
        let remaining: VecDeque<NodeId> = order
            .into_iter()
            .skip_while(|n| n != id)
            .skip(1)
            .filter(|n| !self.processed_in_pass.contains(n))
            .filter(|n| matches!(self.store.node(n), Some(Node::Program(_))))
            .collect();
        self.queue = remaining;
    }

    fn emit(&self, event: StatusEvent) {
        (self.status)(event);
    }
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("state", &self.state)
            .field("queue", &self.queue)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
