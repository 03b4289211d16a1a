// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the game service's JSON API

use serde::{Deserialize, Serialize};
use xionghan_core::{Move, Side, Square};

#[derive(Debug, Serialize)]
pub struct StateRequest<'a> {
    pub game_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PlayRequest<'a> {
    pub game_id: &'a str,
    #[serde(rename = "move")]
    pub mv: Move,
}

/// Search parameters of an AI-move request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Search {
    /// Plain depth-limited search, no MCTS fields sent
    Depth(u32),
    /// Alpha-beta at the given depth
    AlphaBeta(u32),
    /// Monte Carlo tree search with the given number of simulations
    Mcts(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiMoveRequest {
    pub game_id: String,
    /// Fully expanded notation
    pub position: String,
    pub to_move: Side,
    pub max_depth: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcts_simulations: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_mcts: Option<bool>,
    pub time_ms: u64,
}

impl AiMoveRequest {
    pub fn new(game_id: String, position: String, to_move: Side, search: Search, time_ms: u64) -> Self {
        let (max_depth, mcts_simulations, use_mcts) = match search {
            Search::Depth(depth) => (depth, None, None),
            Search::AlphaBeta(depth) => (depth, Some(0), Some(false)),
            Search::Mcts(simulations) => (1, Some(simulations), Some(true)),
        };
        Self {
            game_id,
            position,
            to_move,
            max_depth,
            mcts_simulations,
            use_mcts,
            time_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewGameResponse {
    pub game_id: String,
    pub position: String,
    #[serde(default)]
    pub legal_moves: Option<Vec<Move>>,
}

/// Body of `/api/state` and `/api/play`
#[derive(Debug, Deserialize)]
pub struct PositionResponse {
    pub position: String,
    #[serde(default)]
    pub legal_moves: Option<Vec<Move>>,
}

/// The service reports "no move" as `{from: -1, to: -1}`, so endpoints are
/// kept signed here and validated afterwards.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawMove {
    pub from: i64,
    pub to: i64,
}

impl RawMove {
    pub fn to_move(self) -> Option<Move> {
        let from = Square::try_from(self.from).ok()?;
        let to = Square::try_from(self.to).ok()?;
        Some(Move::new(from, to))
    }
}

#[derive(Debug, Deserialize)]
pub struct AiMoveResponse {
    pub status: String,
    #[serde(default)]
    pub best_move: Option<RawMove>,
    #[serde(default)]
    pub win_prob: Option<f32>,
    #[serde(default)]
    pub depth: Option<u32>,
    #[serde(default)]
    pub nodes: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_request_payloads() {
        let req = AiMoveRequest::new("g".into(), "p w".into(), Side::Black, Search::Mcts(800), 60_000);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["to_move"], 1);
        assert_eq!(json["max_depth"], 1);
        assert_eq!(json["mcts_simulations"], 800);
        assert_eq!(json["use_mcts"], true);

        let req = AiMoveRequest::new("g".into(), "p w".into(), Side::Red, Search::AlphaBeta(4), 60_000);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["max_depth"], 4);
        assert_eq!(json["mcts_simulations"], 0);
        assert_eq!(json["use_mcts"], false);

        let req = AiMoveRequest::new("g".into(), "p w".into(), Side::Red, Search::Depth(2), 5000);
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("use_mcts").is_none());
        assert!(json.get("mcts_simulations").is_none());
        assert_eq!(json["time_ms"], 5000);
    }

    #[test]
    fn no_move_sentinel() {
        let resp: AiMoveResponse = serde_json::from_str(
            r#"{"status":"no_moves","best_move":{"from":-1,"to":-1},"score":0,"depth":3,"nodes":10}"#,
        )
        .unwrap();
        assert_eq!(resp.status, "no_moves");
        assert!(resp.best_move.unwrap().to_move().is_none());
        assert_eq!(resp.win_prob, None);
    }

    #[test]
    fn null_legal_moves() {
        let resp: PositionResponse =
            serde_json::from_str(r#"{"position":"13 w","legal_moves":null,"status":"ongoing"}"#).unwrap();
        assert!(resp.legal_moves.is_none());
    }
}
