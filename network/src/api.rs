// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed access to the game service
//!
//! [`GameApi`] is the seam between the controller and the transport: every
//! call resolves to domain types or an [`ApiError`], never to raw HTTP.

use crate::dto::{
    AiMoveRequest, AiMoveResponse, NewGameResponse, PlayRequest, PositionResponse, StateRequest,
};
use crate::error::ApiError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use xionghan_core::Move;

/// Status the AI endpoint reports when it produced a move
pub const STATUS_OK: &str = "ok";

/// Status the AI endpoint reports when the side to move has no legal move
pub const STATUS_NO_MOVES: &str = "no_moves";

/// Position and legal moves as returned by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    /// Compact notation
    pub position: String,
    pub legal_moves: Vec<Move>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    pub game_id: String,
    pub snapshot: GameSnapshot,
}

/// Search statistics attached to an AI answer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AiStats {
    pub win_prob: Option<f32>,
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
}

impl AiStats {
    /// Win probability of the side to move as a percentage, e.g. "57.3%"
    pub fn win_percent(&self) -> Option<String> {
        self.win_prob.map(|p| format!("{:.1}%", p * 100.0))
    }

    /// Node count with a `k` suffix above a thousand, e.g. "12.3k"
    pub fn nodes_display(&self) -> Option<String> {
        self.nodes.map(|n| {
            if n > 1000 {
                format!("{:.1}k", n as f64 / 1000.0)
            } else {
                n.to_string()
            }
        })
    }
}

impl std::fmt::Display for AiStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(win) = self.win_percent() {
            parts.push(format!("win {}", win));
        }
        if let Some(depth) = self.depth {
            parts.push(format!("depth {}", depth));
        }
        if let Some(nodes) = self.nodes_display() {
            parts.push(format!("nodes {}", nodes));
        }
        if parts.is_empty() {
            f.write_str("-")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Answer of the AI endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum AiOutcome {
    /// A move to apply through the normal move path
    Move { mv: Move, stats: AiStats },
    /// No move was produced; `status` is the service's reason
    NoMove { status: String, stats: AiStats },
}

impl AiOutcome {
    pub fn stats(&self) -> &AiStats {
        match self {
            AiOutcome::Move { stats, .. } | AiOutcome::NoMove { stats, .. } => stats,
        }
    }

    fn from_response(resp: AiMoveResponse) -> Self {
        let stats = AiStats {
            win_prob: resp.win_prob,
            depth: resp.depth,
            nodes: resp.nodes,
        };
        let best = resp.best_move.and_then(|raw| raw.to_move());
        match best {
            Some(mv) if resp.status == STATUS_OK => AiOutcome::Move { mv, stats },
            _ => AiOutcome::NoMove {
                status: resp.status,
                stats,
            },
        }
    }
}

#[async_trait]
pub trait GameApi: Send + Sync {
    /// Start a fresh game
    async fn new_game(&self) -> Result<NewGame, ApiError>;

    /// Fetch the current state of an existing game
    async fn resume_game(&self, game_id: &str) -> Result<GameSnapshot, ApiError>;

    /// Submit a move
    async fn play_move(&self, game_id: &str, mv: Move) -> Result<GameSnapshot, ApiError>;

    /// Ask the engine for a move; `request.position` must be fully expanded
    async fn request_ai_move(&self, request: AiMoveRequest) -> Result<AiOutcome, ApiError>;
}

/// [`GameApi`] over HTTP with JSON bodies
#[derive(Debug, Clone)]
pub struct HttpGameApi {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpGameApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("xionghan-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, path: &str, body: Option<&B>) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned + Send,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http_client.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = ApiError::from_response(status.as_u16(), &text);
            warn!(%url, status = status.as_u16(), error = %err, "Request rejected");
            return Err(err);
        }

        let parsed = response.json::<R>().await?;
        debug!(%url, "Request succeeded");
        Ok(parsed)
    }
}

#[async_trait]
impl GameApi for HttpGameApi {
    #[instrument(skip(self))]
    async fn new_game(&self) -> Result<NewGame, ApiError> {
        let resp: NewGameResponse = self.post::<(), _>("/api/new_game", None).await?;
        Ok(NewGame {
            game_id: resp.game_id,
            snapshot: GameSnapshot {
                position: resp.position,
                legal_moves: resp.legal_moves.unwrap_or_default(),
            },
        })
    }

    #[instrument(skip(self))]
    async fn resume_game(&self, game_id: &str) -> Result<GameSnapshot, ApiError> {
        let resp: PositionResponse = self
            .post("/api/state", Some(&StateRequest { game_id }))
            .await?;
        Ok(resp.into())
    }

    #[instrument(skip(self), fields(from = %mv.from, to = %mv.to))]
    async fn play_move(&self, game_id: &str, mv: Move) -> Result<GameSnapshot, ApiError> {
        let resp: PositionResponse = self
            .post("/api/play", Some(&PlayRequest { game_id, mv }))
            .await?;
        Ok(resp.into())
    }

    #[instrument(skip(self, request), fields(game_id = %request.game_id, to_move = %request.to_move))]
    async fn request_ai_move(&self, request: AiMoveRequest) -> Result<AiOutcome, ApiError> {
        let resp: AiMoveResponse = self.post("/api/ai_move", Some(&request)).await?;
        Ok(AiOutcome::from_response(resp))
    }
}

impl From<PositionResponse> for GameSnapshot {
    fn from(resp: PositionResponse) -> Self {
        Self {
            position: resp.position,
            legal_moves: resp.legal_moves.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ai_response(json: &str) -> AiOutcome {
        AiOutcome::from_response(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn ok_status_with_move() {
        let outcome = ai_response(
            r#"{"status":"ok","best_move":{"from":150,"to":137},"win_prob":0.573,"depth":4,"nodes":12345}"#,
        );
        match outcome {
            AiOutcome::Move { mv, stats } => {
                assert_eq!(mv.from.index(), 150);
                assert_eq!(mv.to.index(), 137);
                assert_eq!(stats.win_percent().as_deref(), Some("57.3%"));
                assert_eq!(stats.nodes_display().as_deref(), Some("12.3k"));
            }
            other => panic!("expected a move, got {:?}", other),
        }
    }

    #[test]
    fn non_ok_status_never_yields_a_move() {
        // A best_move next to a non-ok status must not be applied
        let outcome = ai_response(r#"{"status":"timeout","best_move":{"from":1,"to":2}}"#);
        assert!(matches!(outcome, AiOutcome::NoMove { ref status, .. } if status == "timeout"));

        let outcome = ai_response(r#"{"status":"no_moves","best_move":{"from":-1,"to":-1}}"#);
        assert!(matches!(outcome, AiOutcome::NoMove { ref status, .. } if status == STATUS_NO_MOVES));
    }

    #[test]
    fn stats_display() {
        let stats = AiStats {
            win_prob: None,
            depth: Some(3),
            nodes: Some(999),
        };
        assert_eq!(stats.to_string(), "depth 3, nodes 999");

        let at_threshold = AiStats {
            nodes: Some(1000),
            ..AiStats::default()
        };
        assert_eq!(at_threshold.nodes_display().as_deref(), Some("1000"));
        let above = AiStats {
            nodes: Some(1001),
            ..AiStats::default()
        };
        assert_eq!(above.nodes_display().as_deref(), Some("1.0k"));
        assert_eq!(AiStats::default().to_string(), "-");
    }

    #[test]
    fn base_url_is_normalised() {
        let api = HttpGameApi::new("http://127.0.0.1:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base_url(), "http://127.0.0.1:8080");
    }
}
