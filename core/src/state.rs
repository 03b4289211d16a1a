// SPDX-License-Identifier: MIT OR Apache-2.0

//! Board state store
//!
//! Holds the position mirrored from the game service together with the
//! legal-move list, the last move and the current selection. A new position
//! is decoded completely before anything is swapped in, so a malformed
//! response never leaves the store half updated.

use crate::interaction::Selection;
use crate::notation::{self, Position};
use crate::{Board, Move, NotationError, Piece, Side, Square};

/// Terminal-state detection result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Both kings are on the board
    Ongoing,
    /// The other side's king has been captured
    Won(Side),
}

impl Outcome {
    /// Status line for display
    pub fn describe(self) -> &'static str {
        match self {
            Outcome::Ongoing => "进行中 (Playing)",
            Outcome::Won(Side::Red) => "红方胜 (Red Wins)",
            Outcome::Won(Side::Black) => "黑方胜 (Black Wins)",
        }
    }
}

/// The single mutable snapshot of the current game
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    position: Position,
    /// Compact notation exactly as received
    notation: String,
    legal_moves: Vec<Move>,
    last_move: Option<Move>,
    pub(crate) selection: Selection,
    pub(crate) in_flight: Option<Move>,
}

impl BoardState {
    /// Empty board, Red to move, nothing received yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole snapshot with a freshly received position.
    ///
    /// Clears the selection and any in-flight move. Returns the squares whose
    /// content changed so a renderer can redraw only those.
    pub fn replace(
        &mut self,
        notation: &str,
        legal_moves: Vec<Move>,
        last_move: Option<Move>,
    ) -> Result<Vec<Square>, NotationError> {
        let position = notation::decode(notation)?;
        let changed = Board::diff(&self.position.board, &position.board);

        self.position = position;
        self.notation = notation.trim().to_string();
        self.legal_moves = legal_moves;
        self.last_move = last_move;
        self.selection = Selection::none();
        self.in_flight = None;

        tracing::debug!(
            changed = changed.len(),
            legal = self.legal_moves.len(),
            side = %self.position.side_to_move,
            "Board replaced"
        );
        Ok(changed)
    }

    pub fn board(&self) -> &Board {
        &self.position.board
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn side_to_move(&self) -> Side {
        self.position.side_to_move
    }

    /// Compact notation of the current position, empty before the first update
    pub fn notation(&self) -> &str {
        &self.notation
    }

    /// Fully expanded notation, as the AI-move request requires
    pub fn expanded_notation(&self) -> Result<String, NotationError> {
        notation::expand(&self.notation)
    }

    /// Whether any position has been received yet
    pub fn has_position(&self) -> bool {
        !self.notation.is_empty()
    }

    pub fn legal_moves(&self) -> &[Move] {
        &self.legal_moves
    }

    /// Last applied move, for highlighting
    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.position.board.get(sq)
    }

    /// Whether a candidate move of the selection lands on an occupied square
    pub fn is_capture(&self, mv: Move) -> bool {
        self.piece_at(mv.to).is_some()
    }

    /// Game is over once either king is missing; Red's king is checked first.
    pub fn outcome(&self) -> Outcome {
        let board = &self.position.board;
        if !board.has_king(Side::Red) {
            Outcome::Won(Side::Black)
        } else if !board.has_king(Side::Black) {
            Outcome::Won(Side::Red)
        } else {
            Outcome::Ongoing
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome() != Outcome::Ongoing
    }

    pub fn winner(&self) -> Option<Side> {
        match self.outcome() {
            Outcome::Won(side) => Some(side),
            Outcome::Ongoing => None,
        }
    }
}
