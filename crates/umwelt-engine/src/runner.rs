//! GmRunner - the actor wrapping one engine.
//!
//! Each runner owns its engine exclusively and runs in its own tokio
//! task. Event handling is strictly sequential: at most one handler
//! executes at a time, and the state after handler `n` is the input to
//! handler `n+1`. The only suspension points are between events.
//!
//! ```text
//!                      ┌──────────────────────────┐
//!                      │        GmRunner          │
//! EventBus ──mpsc────► │  events ──► GmEngine     │
//!                      │             handle()     │
//!                      │  publish ◄── completion  │──► EventBus
//!                      └──────────────────────────┘
//! ```
//!
//! A GM whose round is ready without waiting on anyone (no sub-GMs, or
//! all of them ignored) cycles immediately; the runner drains pending
//! events first and yields to the scheduler between cycles so the rest
//! of the graph keeps running.

use crate::GmEngine;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::info;
use umwelt_event::{BusEvent, Interest};

/// Runs one GM engine as an event-driven actor.
pub struct GmRunner {
    engine: GmEngine,
    events: mpsc::UnboundedReceiver<BusEvent>,
}

impl GmRunner {
    /// Subscribes the engine's bus and wraps the engine.
    #[must_use]
    pub fn new(engine: GmEngine) -> Self {
        let events = engine.bus().subscribe(Interest::gm());
        Self { engine, events }
    }

    /// Runs the event loop until shutdown or bus closure.
    ///
    /// Consumes the runner; spawn with `tokio::spawn(runner.run())`.
    pub async fn run(mut self) {
        let gm = self.engine.gm_name().to_string();
        info!(gm = %gm, "gm runner started");
        self.engine.start();

        loop {
            if self.engine.round_ready() {
                // Pending events take priority over immediate cycling.
                match self.events.try_recv() {
                    Ok(event) => {
                        if !self.engine.handle(&event) {
                            break;
                        }
                        continue;
                    }
                    Err(TryRecvError::Empty) => {
                        self.engine.complete_round();
                        tokio::task::yield_now().await;
                        continue;
                    }
                    Err(TryRecvError::Disconnected) => break,
                }
            }

            match self.events.recv().await {
                Some(event) => {
                    if !self.engine.handle(&event) {
                        break;
                    }
                }
                None => {
                    info!(gm = %gm, "event bus closed");
                    break;
                }
            }
        }

        info!(gm = %gm, "gm runner stopped");
    }
}
