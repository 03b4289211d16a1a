// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common utilities for Xionghan client integration tests
//!
//! `FakeServer` is an in-memory game service. It keeps one position per game
//! id, generates one-step orthogonal moves as the legal-move list, and lets a
//! test script AI answers, inject failures and hold AI answers until released.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};
use tokio::sync::Notify;
use xionghan_core::{decode, encode, Move, Square, BOARD_SIZE};
use xionghan_network::api::STATUS_NO_MOVES;
use xionghan_network::{
    AiMoveRequest, AiOutcome, AiStats, ApiError, GameApi, GameSnapshot, NewGame,
};

/// Red chariot at 156, Red king at 162, Black king at 6
pub const START: &str = "6e6/13/13/13/13/13/13/13/13/13/13/13/A5E6 w";

static INIT_LOGGING: Once = Once::new();

/// Only show warnings unless RUST_LOG is set
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

pub fn sq(index: usize) -> Square {
    Square::new(index).unwrap()
}

pub fn mv(from: usize, to: usize) -> Move {
    Move::new(sq(from), sq(to))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    NewGame,
    Resume(String),
    Play(String, Move),
    Ai(AiMoveRequest),
}

#[derive(Default)]
struct FakeState {
    start: String,
    next_id: u32,
    games: HashMap<String, String>,
    calls: Vec<Call>,
    play_errors: VecDeque<ApiError>,
    ai_script: VecDeque<Result<AiOutcome, ApiError>>,
    hold_ai: bool,
}

pub struct FakeServer {
    state: Mutex<FakeState>,
    ai_requested: Notify,
    ai_release: Notify,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Self::with_start(START)
    }

    pub fn with_start(start: &str) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                start: start.to_string(),
                ..FakeState::default()
            }),
            ai_requested: Notify::new(),
            ai_release: Notify::new(),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn new_game_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::NewGame))
    }

    pub fn play_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Play(..)))
    }

    pub fn ai_requests(&self) -> Vec<AiMoveRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Ai(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    /// Register a game id that a previous run left behind
    pub fn insert_game(&self, game_id: &str, position: &str) {
        self.state
            .lock()
            .unwrap()
            .games
            .insert(game_id.to_string(), position.to_string());
    }

    /// Make the service forget a game, as after a restart
    pub fn forget_game(&self, game_id: &str) {
        self.state.lock().unwrap().games.remove(game_id);
    }

    pub fn position(&self, game_id: &str) -> Option<String> {
        self.state.lock().unwrap().games.get(game_id).cloned()
    }

    pub fn fail_next_play(&self, err: ApiError) {
        self.state.lock().unwrap().play_errors.push_back(err);
    }

    pub fn script_ai(&self, answer: Result<AiOutcome, ApiError>) {
        self.state.lock().unwrap().ai_script.push_back(answer);
    }

    pub fn script_ai_move(&self, from: usize, to: usize) {
        self.script_ai(Ok(AiOutcome::Move {
            mv: mv(from, to),
            stats: AiStats::default(),
        }));
    }

    /// Hold every AI answer until `release_ai` is called
    pub fn hold_ai(&self) {
        self.state.lock().unwrap().hold_ai = true;
    }

    /// Resolves once an AI request has reached the server
    pub async fn ai_requested(&self) {
        self.ai_requested.notified().await;
    }

    pub fn release_ai(&self) {
        self.ai_release.notify_one();
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn snapshot(position: &str) -> GameSnapshot {
        GameSnapshot {
            position: position.to_string(),
            legal_moves: legal_moves(position),
        }
    }
}

/// One step up, down, left or right onto an empty or enemy square
pub fn legal_moves(position: &str) -> Vec<Move> {
    let Ok(pos) = decode(position) else {
        return Vec::new();
    };
    if !pos.board.has_king(xionghan_core::Side::Red) || !pos.board.has_king(xionghan_core::Side::Black) {
        return Vec::new();
    }

    let mut moves = Vec::new();
    for (from, piece) in pos.board.pieces() {
        if piece.side != pos.side_to_move {
            continue;
        }
        let (row, col) = (from.row() as isize, from.col() as isize);
        for (dr, dc) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            let (r, c) = (row + dr, col + dc);
            if r < 0 || c < 0 || r >= BOARD_SIZE as isize || c >= BOARD_SIZE as isize {
                continue;
            }
            let Some(to) = Square::from_row_col(r as usize, c as usize) else {
                continue;
            };
            match pos.board.get(to) {
                Some(other) if other.side == piece.side => {}
                _ => moves.push(Move::new(from, to)),
            }
        }
    }
    moves
}

fn apply(position: &str, mv: Move) -> String {
    let mut pos = decode(position).unwrap();
    let piece = pos.board.remove(mv.from).unwrap();
    pos.board.remove(mv.to);
    pos.board.place(mv.to, piece);
    encode(&pos.board, pos.side_to_move.opposite())
}

/// `GameApi` backed by a shared [`FakeServer`]
#[derive(Clone)]
pub struct FakeApi(pub Arc<FakeServer>);

#[async_trait]
impl GameApi for FakeApi {
    async fn new_game(&self) -> Result<NewGame, ApiError> {
        let server = &self.0;
        let mut state = server.state.lock().unwrap();
        state.calls.push(Call::NewGame);
        state.next_id += 1;
        let game_id = format!("game-{}", state.next_id);
        let start = state.start.clone();
        state.games.insert(game_id.clone(), start.clone());
        Ok(NewGame {
            game_id,
            snapshot: FakeServer::snapshot(&start),
        })
    }

    async fn resume_game(&self, game_id: &str) -> Result<GameSnapshot, ApiError> {
        self.0.record(Call::Resume(game_id.to_string()));
        match self.0.position(game_id) {
            Some(position) => Ok(FakeServer::snapshot(&position)),
            None => Err(ApiError::UnknownGame),
        }
    }

    async fn play_move(&self, game_id: &str, mv: Move) -> Result<GameSnapshot, ApiError> {
        let mut state = self.0.state.lock().unwrap();
        state.calls.push(Call::Play(game_id.to_string(), mv));
        if let Some(err) = state.play_errors.pop_front() {
            return Err(err);
        }
        let Some(position) = state.games.get(game_id).cloned() else {
            return Err(ApiError::UnknownGame);
        };
        if !legal_moves(&position).contains(&mv) {
            return Err(ApiError::from_response(400, "illegal move"));
        }
        let next = apply(&position, mv);
        state.games.insert(game_id.to_string(), next.clone());
        Ok(FakeServer::snapshot(&next))
    }

    async fn request_ai_move(&self, request: AiMoveRequest) -> Result<AiOutcome, ApiError> {
        let (hold, scripted, position) = {
            let mut state = self.0.state.lock().unwrap();
            state.calls.push(Call::Ai(request.clone()));
            let position = state.games.get(&request.game_id).cloned();
            (state.hold_ai, state.ai_script.pop_front(), position)
        };

        if hold {
            self.0.ai_requested.notify_one();
            self.0.ai_release.notified().await;
        }

        if let Some(answer) = scripted {
            return answer;
        }
        let Some(position) = position else {
            return Err(ApiError::UnknownGame);
        };
        Ok(match legal_moves(&position).first() {
            Some(&mv) => AiOutcome::Move {
                mv,
                stats: AiStats {
                    win_prob: Some(0.5),
                    depth: Some(request.max_depth),
                    nodes: Some(1234),
                },
            },
            None => AiOutcome::NoMove {
                status: STATUS_NO_MOVES.to_string(),
                stats: AiStats::default(),
            },
        })
    }
}
