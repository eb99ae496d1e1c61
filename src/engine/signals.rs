// src/engine/signals.rs

//! Cancellation and change signals.
//!
//! Stopping the loop never preempts a program mid-run; programs poll the
//! abort flag at safe points instead. The flag is a shared atomic so the
//! cancel affordance can flip it synchronously from the status consumer
//! while a completion is still in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use crate::engine::ControlEvent;

/// Shared per-run abort flag.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Cancel affordance handed to the status consumer.
///
/// `stop` takes effect in two steps: the abort flag flips immediately so a
/// running program can bail at its next poll, and a `Stop` control event is
/// queued so the loop transitions to Idle before scheduling further nodes.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    abort: AbortFlag,
    control_tx: mpsc::Sender<ControlEvent>,
}

impl ControlHandle {
    pub fn new(abort: AbortFlag, control_tx: mpsc::Sender<ControlEvent>) -> Self {
        Self { abort, control_tx }
    }

    pub fn stop(&self) {
        self.abort.set();
        let _ = self.control_tx.try_send(ControlEvent::Stop { reason: None });
    }

    /// Send an arbitrary control event (used by hosts for start/create).
    pub async fn send(&self, event: ControlEvent) -> bool {
        self.control_tx.send(event).await.is_ok()
    }
}
