// SPDX-License-Identifier: MIT OR Apache-2.0

//! Game client controller
//!
//! [`GameClient`] owns the board state, the session and the API handle. All
//! mutations go through `&mut self`, so at most one state-changing exchange
//! is outstanding at a time.

use crate::api::{AiOutcome, GameApi, GameSnapshot};
use crate::config::AiMoveSettings;
use crate::dto::{AiMoveRequest, Search};
use crate::error::ApiError;
use crate::events::ClientEvent;
use crate::session::{Session, SessionManager, SessionStore};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use xionghan_core::{BoardState, ClickOutcome, GridGeometry, Move, Phase, Square};

const EVENT_BUFFER_SIZE: usize = 256;

/// Result of a move that the service answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The returned position replaced the board
    Applied { move_count: u32, changed: Vec<Square> },
    /// The service had forgotten the game; a new one was started instead
    GameRestarted,
}

/// Result of the one-shot AI move
#[derive(Debug, Clone, PartialEq)]
pub enum AiMoveResult {
    Played(Move),
    /// The engine produced no move; carries its status
    NoMove(String),
    GameRestarted,
}

pub struct GameClient<A, S> {
    api: A,
    state: BoardState,
    session: SessionManager<S>,
    ai_settings: AiMoveSettings,
    ai_in_flight: bool,
    events: broadcast::Sender<ClientEvent>,
}

impl<A: GameApi, S: SessionStore> GameClient<A, S> {
    pub fn new(api: A, store: S) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self {
            api,
            state: BoardState::new(),
            session: SessionManager::new(store),
            ai_settings: AiMoveSettings::default(),
            ai_in_flight: false,
            events,
        }
    }

    pub fn with_ai_settings(mut self, ai_settings: AiMoveSettings) -> Self {
        self.ai_settings = ai_settings;
        self
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn session(&self) -> &Session {
        self.session.session()
    }

    pub fn session_manager(&self) -> &SessionManager<S> {
        &self.session
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn game_id(&self) -> Option<&str> {
        self.session.game_id()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn event_sender(&self) -> broadcast::Sender<ClientEvent> {
        self.events.clone()
    }

    /// Whether the one-shot AI move is outstanding (its button is disabled)
    pub fn ai_move_in_flight(&self) -> bool {
        self.ai_in_flight
    }

    pub(crate) fn emit(&self, event: ClientEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Resume the stored game, or start a new one if there is none or the
    /// service no longer accepts it
    pub async fn load(&mut self) -> Result<(), ApiError> {
        if let Some(game_id) = self.session.stored_game_id() {
            match self.resume(&game_id).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(%game_id, error = %e, "Resume failed, starting a new game");
                    self.session.forget_game_id();
                }
            }
        }
        self.new_game().await
    }

    async fn resume(&mut self, game_id: &str) -> Result<(), ApiError> {
        let snapshot = self.api.resume_game(game_id).await?;
        self.apply_snapshot(&snapshot, None)?;
        self.session.resume(game_id);

        let move_count = self.session.move_count();
        info!(%game_id, move_count, "Game resumed");
        self.emit(ClientEvent::GameResumed {
            game_id: game_id.to_string(),
            move_count,
        });
        self.check_game_over();
        Ok(())
    }

    pub async fn new_game(&mut self) -> Result<(), ApiError> {
        let game = match self.api.new_game().await {
            Ok(game) => game,
            Err(e) => {
                self.emit(ClientEvent::Error(format!("无法开始新对局: {}", e)));
                return Err(e);
            }
        };
        self.apply_snapshot(&game.snapshot, None)?;
        self.session.start(&game.game_id);

        info!(game_id = %game.game_id, "New game started");
        self.emit(ClientEvent::GameStarted {
            game_id: game.game_id,
        });
        Ok(())
    }

    /// Handle a click on a square; a click on a candidate target plays it
    pub async fn click(&mut self, square: Square) -> Result<ClickOutcome, ApiError> {
        let outcome = self.state.click(square);
        if let ClickOutcome::Submit(mv) = outcome {
            self.send_move(mv).await?;
        }
        Ok(outcome)
    }

    /// Handle a pointer click; points off the grid are ignored
    pub async fn click_at(
        &mut self,
        geometry: &GridGeometry,
        x: f32,
        y: f32,
    ) -> Result<ClickOutcome, ApiError> {
        match geometry.square_at(x, y) {
            Some(square) => self.click(square).await,
            None => Ok(ClickOutcome::Ignored),
        }
    }

    /// Submit a move that did not come from a click
    pub async fn play_move(&mut self, mv: Move) -> Result<PlayOutcome, ApiError> {
        if self.state.is_game_over() {
            return Err(ApiError::GameOver);
        }
        if !self.state.begin_move(mv) {
            return Err(ApiError::Busy);
        }
        self.send_move(mv).await
    }

    /// Expects `mv` to be marked in flight on the store
    async fn send_move(&mut self, mv: Move) -> Result<PlayOutcome, ApiError> {
        let Some(game_id) = self.session.game_id().map(str::to_string) else {
            self.state.abort_move();
            return Err(ApiError::NoActiveGame);
        };

        let snapshot = match self.api.play_move(&game_id, mv).await {
            Ok(snapshot) => snapshot,
            Err(ApiError::UnknownGame) => {
                warn!(%game_id, "Game unknown to the service, starting a new one");
                self.state.abort_move();
                self.session.forget_game_id();
                self.new_game().await?;
                return Ok(PlayOutcome::GameRestarted);
            }
            Err(e) => {
                warn!(%game_id, %mv, error = %e, "Move rejected");
                self.state.abort_move();
                self.emit(ClientEvent::Warning(e.user_message()));
                return Err(e);
            }
        };

        let changed = match self.apply_snapshot(&snapshot, Some(mv)) {
            Ok(changed) => changed,
            Err(e) => {
                self.state.abort_move();
                return Err(e);
            }
        };
        let move_count = self.session.record_move();

        info!(%game_id, from = %mv.from, to = %mv.to, move_count, "Move applied");
        self.emit(ClientEvent::MovePlayed { mv, move_count });
        self.check_game_over();
        Ok(PlayOutcome::Applied {
            move_count,
            changed,
        })
    }

    /// Ask the engine for a move in the current position without applying it
    pub async fn ai_request(&self, search: Search, time_ms: u64) -> Result<AiOutcome, ApiError> {
        let game_id = self
            .session
            .game_id()
            .ok_or(ApiError::NoActiveGame)?
            .to_string();
        let position = self.state.expanded_notation()?;
        let request = AiMoveRequest::new(game_id, position, self.state.side_to_move(), search, time_ms);
        debug!(?request, "Requesting AI move");

        let outcome = self.api.request_ai_move(request).await?;
        self.emit(ClientEvent::AiStats(*outcome.stats()));
        Ok(outcome)
    }

    /// One AI move for the side to move, applied like a clicked move.
    ///
    /// Nothing is sent once the game is over.
    pub async fn request_ai_move(&mut self) -> Result<AiMoveResult, ApiError> {
        if self.state.is_game_over() {
            return Err(ApiError::GameOver);
        }
        if self.ai_in_flight || matches!(self.state.phase(), Phase::MoveInFlight(_)) {
            return Err(ApiError::Busy);
        }

        self.ai_in_flight = true;
        let search = Search::Depth(self.ai_settings.max_depth);
        let result = self.ai_request(search, self.ai_settings.time_ms).await;
        self.ai_in_flight = false;

        match result {
            Ok(AiOutcome::Move { mv, stats }) => {
                info!(%mv, %stats, "AI move received");
                match self.play_move(mv).await? {
                    PlayOutcome::Applied { .. } => Ok(AiMoveResult::Played(mv)),
                    PlayOutcome::GameRestarted => Ok(AiMoveResult::GameRestarted),
                }
            }
            Ok(AiOutcome::NoMove { status, .. }) => {
                warn!(%status, "AI produced no move");
                self.emit(ClientEvent::Warning(format!("AI: {}", status)));
                Ok(AiMoveResult::NoMove(status))
            }
            Err(ApiError::UnknownGame) => {
                warn!("Game unknown to the service, starting a new one");
                self.session.forget_game_id();
                self.new_game().await?;
                Ok(AiMoveResult::GameRestarted)
            }
            Err(e) => {
                self.emit(ClientEvent::Error(format!("AI 走棋失败: {}", e)));
                Err(e)
            }
        }
    }

    fn apply_snapshot(
        &mut self,
        snapshot: &GameSnapshot,
        last_move: Option<Move>,
    ) -> Result<Vec<Square>, ApiError> {
        let result = self
            .state
            .replace(&snapshot.position, snapshot.legal_moves.clone(), last_move);
        match result {
            Ok(changed) => Ok(changed),
            Err(e) => {
                warn!(position = %snapshot.position, error = %e, "Discarding malformed position");
                self.emit(ClientEvent::Error(format!("Malformed position: {}", e)));
                Err(e.into())
            }
        }
    }

    fn check_game_over(&self) {
        if let Some(winner) = self.state.winner() {
            info!(%winner, "Game over");
            self.emit(ClientEvent::GameOver { winner });
        }
    }
}
