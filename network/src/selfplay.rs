// SPDX-License-Identifier: MIT OR Apache-2.0

//! Self-play orchestrator
//!
//! Requests AI moves for whichever side is to move and plays them through
//! the client until the game ends or the run is stopped. Each loop iteration
//! is one [`SelfPlay::tick`]; [`SelfPlay::run`] drives ticks on the tokio
//! clock, so tests can use a paused runtime or call `tick` directly.

use crate::api::{AiOutcome, GameApi, STATUS_NO_MOVES};
use crate::client::GameClient;
use crate::config::SelfPlayConfig;
use crate::error::ApiError;
use crate::events::{ClientEvent, SelfPlayEvent};
use crate::session::SessionStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, warn};
use xionghan_core::Side;

#[derive(Debug, Error)]
pub enum SelfPlayError {
    #[error("Self-play is already running")]
    AlreadyRunning,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Why a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    GameOver(Option<Side>),
    NoMoves,
    Stopped,
    Aborted(String),
}

/// What one tick did and how long to wait before the next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    Paused(Duration),
    Moved { delay: Duration },
    Warned { delay: Duration },
    Finished(FinishReason),
}

/// Run/pause flags shared with other tasks
#[derive(Debug, Clone)]
pub struct SelfPlayHandle {
    running: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    events: broadcast::Sender<ClientEvent>,
}

impl SelfPlayHandle {
    fn new(events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
            events,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Stop the run. An AI answer still outstanding is discarded when it arrives.
    pub fn stop(&self) {
        self.paused.store(false, Ordering::SeqCst);
        if self.running.swap(false, Ordering::SeqCst) {
            self.emit(SelfPlayEvent::Stopped);
        }
    }

    /// Toggle pause; returns whether the run is now paused
    pub fn toggle_pause(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        let paused = !self.paused.fetch_xor(true, Ordering::SeqCst);
        self.emit(if paused {
            SelfPlayEvent::Paused
        } else {
            SelfPlayEvent::Resumed
        });
        paused
    }

    fn begin(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
    }

    fn finish(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
    }

    fn emit(&self, event: SelfPlayEvent) {
        info!("[self-play] {}", event);
        let _ = self.events.send(ClientEvent::SelfPlay(event));
    }
}

pub struct SelfPlay {
    config: SelfPlayConfig,
    handle: SelfPlayHandle,
}

impl SelfPlay {
    pub fn new<A: GameApi, S: SessionStore>(config: SelfPlayConfig, client: &GameClient<A, S>) -> Self {
        Self {
            config,
            handle: SelfPlayHandle::new(client.event_sender()),
        }
    }

    pub fn handle(&self) -> SelfPlayHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &SelfPlayConfig {
        &self.config
    }

    /// Start a fresh game and mark the run as running
    pub async fn start<A: GameApi, S: SessionStore>(
        &mut self,
        client: &mut GameClient<A, S>,
    ) -> Result<(), SelfPlayError> {
        if self.handle.is_running() {
            return Err(SelfPlayError::AlreadyRunning);
        }
        client.new_game().await?;
        self.handle.begin();

        let game_id = client.game_id().unwrap_or_default().to_string();
        self.handle.emit(SelfPlayEvent::Started { game_id });
        Ok(())
    }

    /// One iteration of the loop body
    pub async fn tick<A: GameApi, S: SessionStore>(&mut self, client: &mut GameClient<A, S>) -> Tick {
        if !self.handle.is_running() {
            return Tick::Finished(FinishReason::Stopped);
        }
        if self.handle.is_paused() {
            return Tick::Paused(self.config.pause_poll());
        }
        if client.state().is_game_over() {
            let winner = client.state().winner();
            self.handle.finish();
            self.handle.emit(SelfPlayEvent::GameOver { winner });
            return Tick::Finished(FinishReason::GameOver(winner));
        }

        let side = client.state().side_to_move();
        let params = match side {
            Side::Red => self.config.red,
            Side::Black => self.config.black,
        };
        self.handle.emit(SelfPlayEvent::Thinking { side, params });

        let result = client.ai_request(params.search(), self.config.time_ms).await;

        // Stopped while the request was outstanding
        if !self.handle.is_running() {
            info!("Discarding AI answer that arrived after stop");
            return Tick::Finished(FinishReason::Stopped);
        }

        match result {
            Err(e) => {
                let reason = e.to_string();
                self.handle.finish();
                self.handle.emit(SelfPlayEvent::Aborted(reason.clone()));
                Tick::Finished(FinishReason::Aborted(reason))
            }
            Ok(AiOutcome::NoMove { status, .. }) if status == STATUS_NO_MOVES => {
                self.handle.finish();
                self.handle.emit(SelfPlayEvent::NoMoves);
                Tick::Finished(FinishReason::NoMoves)
            }
            Ok(AiOutcome::NoMove { status, .. }) => {
                self.handle.emit(SelfPlayEvent::Warning { status });
                Tick::Warned {
                    delay: self.config.step_delay(),
                }
            }
            Ok(AiOutcome::Move { mv, .. }) => {
                self.handle.emit(SelfPlayEvent::Played { side, mv });
                if let Err(e) = client.play_move(mv).await {
                    warn!(%mv, error = %e, "Self-play move was not applied");
                }
                Tick::Moved {
                    delay: self.config.step_delay(),
                }
            }
        }
    }

    /// Tick until the run finishes
    pub async fn run<A: GameApi, S: SessionStore>(&mut self, client: &mut GameClient<A, S>) -> FinishReason {
        loop {
            match self.tick(client).await {
                Tick::Paused(delay) | Tick::Moved { delay } | Tick::Warned { delay } => {
                    tokio::time::sleep(delay).await;
                }
                Tick::Finished(reason) => return reason,
            }
        }
    }
}
