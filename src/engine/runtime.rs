// src/engine/runtime.rs

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::engine::{ControlEvent, EngineOptions, EventLoop, TickOutcome};
use crate::errors::Result;

/// Async shell around [`EventLoop`].
///
/// Runs on the host's single event-processing task: while the loop is
/// Running it fires one tick at a time, yielding between ticks so the host
/// is never starved; while Idle it suspends on the control channel. Only
/// one program run is ever in flight.
pub struct Runtime {
    event_loop: EventLoop,
    control_rx: mpsc::Receiver<ControlEvent>,
    options: EngineOptions,
}

impl Runtime {
    pub fn new(
        event_loop: EventLoop,
        control_rx: mpsc::Receiver<ControlEvent>,
        options: EngineOptions,
    ) -> Self {
        Self {
            event_loop,
            control_rx,
            options,
        }
    }

    /// Main loop. Returns when a `Shutdown` control event arrives, the
    /// control channel closes, or (with `exit_when_settled`) the board
    /// settles.
    pub async fn run(mut self) -> Result<()> {
        info!("flowdag runtime started");

        loop {
            if !self.event_loop.is_running() {
                match self.control_rx.recv().await {
                    Some(event) => {
                        if self.handle_control(event) {
                            break;
                        }
                    }
                    None => {
                        info!("control channel closed; exiting");
                        break;
                    }
                }
                continue;
            }

            // Absorb control events that arrived during the previous tick
            // before doing more work; a pending Stop must win over the
            // next dispatch.
            if self.drain_control()? {
                break;
            }
            if !self.event_loop.is_running() {
                continue;
            }

            match self.event_loop.tick().await {
                Ok(TickOutcome::Waiting) => {
                    if self.options.exit_when_settled {
                        self.event_loop.stop(None);
                        break;
                    }
                    // Bounded idle, still responsive to control events.
                    tokio::select! {
                        _ = sleep(self.options.idle_wait) => {}
                        event = self.control_rx.recv() => match event {
                            Some(event) => {
                                if self.handle_control(event) {
                                    break;
                                }
                            }
                            None => break,
                        },
                    }
                }
                Ok(outcome) => {
                    debug!(?outcome, "tick complete");
                    // Cooperative yield so a single-threaded host keeps
                    // breathing between ticks.
                    tokio::task::yield_now().await;
                }
                Err(e) => {
                    // Fail fast: no retry, surface the reason and go Idle.
                    warn!(error = %e, "tick failed; stopping loop");
                    self.event_loop.stop(Some(e.to_string()));
                }
            }

            if self.options.exit_when_settled && self.event_loop.is_settled() {
                info!("board settled; exiting");
                self.event_loop.stop(None);
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    /// Non-blocking drain of pending control events. Returns `true` on
    /// shutdown.
    fn drain_control(&mut self) -> Result<bool> {
        loop {
            match self.control_rx.try_recv() {
                Ok(event) => {
                    if self.handle_control(event) {
                        return Ok(true);
                    }
                }
                Err(TryRecvError::Empty) => return Ok(false),
                Err(TryRecvError::Disconnected) => {
                    info!("control channel closed; exiting");
                    return Ok(true);
                }
            }
        }
    }

    /// Apply one control event. Returns `true` on shutdown.
    fn handle_control(&mut self, event: ControlEvent) -> bool {
        debug!(?event, "runtime received control event");
        match event {
            ControlEvent::Start => {
                self.event_loop.start();
            }
            ControlEvent::Stop { reason } => {
                self.event_loop.stop(reason);
            }
            ControlEvent::CreateNode {
                program_type,
                selection,
            } => match self.event_loop.create_node(&program_type, selection) {
                Ok(creation) => {
                    info!(
                        node = %creation.program_node,
                        program = %program_type,
                        "created program node"
                    );
                }
                Err(e) => {
                    // Creation failures are host-input errors; they do not
                    // stop a running loop.
                    warn!(error = %e, program = %program_type, "create failed");
                }
            },
            ControlEvent::Shutdown => {
                self.event_loop.stop(None);
                return true;
            }
        }
        false
    }

    /// Access to the wrapped loop, for tests and embedding hosts.
    pub fn event_loop(&self) -> &EventLoop {
        &self.event_loop
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("event_loop", &self.event_loop)
            .finish_non_exhaustive()
    }
}
