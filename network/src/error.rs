// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for exchanges with the game service.
//!
//! Failure bodies are plain text; they are classified once here so nothing
//! above the transport ever matches on server strings.

use thiserror::Error;
use xionghan_core::NotationError;

/// Body the service sends with 404 when it no longer knows a game
pub const GAME_NOT_FOUND_BODY: &str = "game not found";

/// Body the service sends with 400 when a move would repeat a position a third time
pub const REPETITION_FORBIDDEN_BODY: &str = "repetition_forbidden";

/// Warning shown when the service rejects a move for repetition
pub const REPETITION_WARNING: &str = "长将提醒：重复局面已达 3 次，这步已被禁止，请换一步。";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never completed
    #[error("Network failure: {0}")]
    Network(String),

    /// The service does not recognise the game id
    #[error("Game not found")]
    UnknownGame,

    /// The move would repeat a position for the third time
    #[error("Repetition forbidden")]
    RepetitionForbidden,

    /// Any other non-2xx response, with the raw server text
    #[error("Rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// A 2xx response whose body could not be parsed
    #[error("Malformed response: {0}")]
    Decode(String),

    /// A position string in a response could not be decoded
    #[error("Malformed position: {0}")]
    Notation(#[from] NotationError),

    /// No game id is active yet
    #[error("No active game")]
    NoActiveGame,

    /// Another state-changing request is still outstanding
    #[error("A request is already in flight")]
    Busy,

    /// A king has been captured; no further moves are sent
    #[error("Game is over")]
    GameOver,
}

impl ApiError {
    /// Classify a non-2xx response
    pub fn from_response(status: u16, body: &str) -> Self {
        let body = body.trim();
        match (status, body) {
            (404, GAME_NOT_FOUND_BODY) => ApiError::UnknownGame,
            (400, REPETITION_FORBIDDEN_BODY) => ApiError::RepetitionForbidden,
            _ => ApiError::Rejected {
                status,
                message: body.to_string(),
            },
        }
    }

    /// Text shown to the operator
    pub fn user_message(&self) -> String {
        match self {
            ApiError::RepetitionForbidden => REPETITION_WARNING.to_string(),
            ApiError::Rejected { status, message } if message.is_empty() => {
                format!("走棋失败: HTTP {}", status)
            }
            ApiError::Rejected { message, .. } => format!("走棋失败: {}", message),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
