// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events broadcast to observers of a game client

use crate::api::AiStats;
use crate::config::SideParams;
use std::fmt;
use xionghan_core::{Move, Side};

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    GameStarted { game_id: String },
    GameResumed { game_id: String, move_count: u32 },
    MovePlayed { mv: Move, move_count: u32 },
    AiStats(AiStats),
    /// Operator-facing warning; the game state did not change
    Warning(String),
    Error(String),
    GameOver { winner: Side },
    SelfPlay(SelfPlayEvent),
}

/// One step of a self-play run. `Display` gives the log line.
#[derive(Debug, Clone, PartialEq)]
pub enum SelfPlayEvent {
    Started { game_id: String },
    Thinking { side: Side, params: SideParams },
    Played { side: Side, mv: Move },
    /// The engine answered with a status other than "ok" or "no_moves"
    Warning { status: String },
    NoMoves,
    GameOver { winner: Option<Side> },
    Aborted(String),
    Paused,
    Resumed,
    Stopped,
}

impl fmt::Display for SelfPlayEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelfPlayEvent::Started { game_id } => write!(f, "self-play started (game {})", game_id),
            SelfPlayEvent::Thinking { side, params } => write!(
                f,
                "{} thinking ({} val={})...",
                side,
                params.algo.label(),
                params.value
            ),
            SelfPlayEvent::Played { side, mv } => write!(f, "{} plays {}", side, mv),
            SelfPlayEvent::Warning { status } => write!(f, "warning: {}", status),
            SelfPlayEvent::NoMoves => f.write_str("no legal moves, game over"),
            SelfPlayEvent::GameOver { winner: Some(side) } => write!(f, "game over, {} wins", side),
            SelfPlayEvent::GameOver { winner: None } => f.write_str("game over"),
            SelfPlayEvent::Aborted(reason) => write!(f, "aborted: {}", reason),
            SelfPlayEvent::Paused => f.write_str("paused"),
            SelfPlayEvent::Resumed => f.write_str("resumed"),
            SelfPlayEvent::Stopped => f.write_str("stopped"),
        }
    }
}
