// src/engine/mod.rs

//! The scheduling engine.
//!
//! This module ties together:
//! - the event-loop core ([`event_loop`]): queue, fingerprint gate, program
//!   dispatch, downstream re-planning
//! - the async shell ([`runtime`]): control-event channel, tick driving,
//!   cooperative yields and bounded idle
//! - cancellation signals ([`signals`])
//!
//! The core is channel-free (statuses go through an injected callback) so
//! its semantics can be unit tested without Tokio plumbing; the shell owns
//! all IO and timing concerns.

use std::sync::Arc;
use std::time::Duration;

use crate::store::NodeId;

pub mod event_loop;
pub mod runtime;
pub mod signals;

pub use event_loop::EventLoop;
pub use runtime::Runtime;
pub use signals::{AbortFlag, ControlHandle};

/// Lifecycle state of the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// Named status transitions surfaced to the notification collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    Started,
    /// Carries a reason for error stops; `None` for a clean stop.
    Stopped(Option<String>),
    /// One-line summary of the work currently in flight.
    Progress(String),
    /// Nothing to do; the loop is idling until the board changes.
    Waiting,
}

/// Callback through which the core reports status transitions.
pub type StatusSink = Arc<dyn Fn(StatusEvent) + Send + Sync>;

/// Control surface exposed to the hosting UI.
#[derive(Debug, Clone)]
pub enum ControlEvent {
    Start,
    Stop {
        reason: Option<String>,
    },
    /// Create-flow for the named program type; `selection` carries the
    /// containers selected in the host UI, which programs may adopt as
    /// sources.
    CreateNode {
        program_type: String,
        selection: Vec<NodeId>,
    },
    Shutdown,
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The node was stale and its program ran.
    Ran(NodeId),
    /// Fingerprint matched; no work.
    Unchanged(NodeId),
    /// The node vanished between planning and execution.
    Drifted(NodeId),
    /// No program nodes on the board at all.
    Waiting,
}

/// Options used by the async shell.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Stop and exit once a full pass finds no stale node (`--once`).
    pub exit_when_settled: bool,
    /// Bounded idle between ticks when there is nothing to do.
    pub idle_wait: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            exit_when_settled: false,
            idle_wait: Duration::from_millis(50),
        }
    }
}
