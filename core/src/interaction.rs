// SPDX-License-Identifier: MIT OR Apache-2.0

//! Selection and click handling
//!
//! Clicking moves the store between three phases: nothing selected, a piece
//! of the side to move selected (with its candidate moves), and a move
//! submitted to the service but not yet answered.

use crate::state::BoardState;
use crate::{Move, Square};

/// The selected square and the legal moves that start from it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<Square>,
    candidates: Vec<Move>,
}

impl Selection {
    /// No selection
    pub fn none() -> Self {
        Self::default()
    }

    /// Select `square`, keeping exactly the legal moves that start there
    pub fn select(square: Square, legal_moves: &[Move]) -> Self {
        Self {
            selected: Some(square),
            candidates: legal_moves
                .iter()
                .copied()
                .filter(|m| m.from == square)
                .collect(),
        }
    }

    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    pub fn candidates(&self) -> &[Move] {
        &self.candidates
    }

    /// Candidate move landing on `to`, if any
    pub fn target(&self, to: Square) -> Option<Move> {
        self.candidates.iter().copied().find(|m| m.to == to)
    }
}

/// Interaction phase derived from the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Selected(Square),
    MoveInFlight(Move),
}

/// What a click did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Game over or a move already in flight
    Ignored,
    /// A piece of the side to move is now selected
    Selected(Square),
    /// Selection cleared (empty square or opponent piece)
    Cleared,
    /// The click hit a candidate target; the caller must send this move
    Submit(Move),
}

impl BoardState {
    pub fn phase(&self) -> Phase {
        match (self.in_flight, self.selection.selected()) {
            (Some(mv), _) => Phase::MoveInFlight(mv),
            (None, Some(sq)) => Phase::Selected(sq),
            (None, None) => Phase::Idle,
        }
    }

    /// Handle a click on `square`.
    ///
    /// A returned [`ClickOutcome::Submit`] puts the store in the in-flight
    /// phase; the caller finishes it with [`BoardState::replace`] on success
    /// or [`BoardState::abort_move`] on failure.
    pub fn click(&mut self, square: Square) -> ClickOutcome {
        if self.in_flight.is_some() || self.is_game_over() {
            return ClickOutcome::Ignored;
        }

        if let Some(mv) = self.selection.target(square) {
            self.in_flight = Some(mv);
            return ClickOutcome::Submit(mv);
        }

        match self.piece_at(square) {
            Some(piece) if piece.side == self.side_to_move() => {
                self.selection = Selection::select(square, self.legal_moves());
                tracing::debug!(
                    %square,
                    candidates = self.selection.candidates().len(),
                    "Piece selected"
                );
                ClickOutcome::Selected(square)
            }
            _ => {
                self.selection = Selection::none();
                ClickOutcome::Cleared
            }
        }
    }

    /// Mark a move that did not come from a click (AI move) as in flight.
    ///
    /// Returns `false` if another move is already outstanding.
    pub fn begin_move(&mut self, mv: Move) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        self.in_flight = Some(mv);
        true
    }

    /// The outstanding move failed; the selection is kept as it was
    pub fn abort_move(&mut self) {
        self.in_flight = None;
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::none();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Side;

    // Red king at (12,6), Red chariot at (12,0), Black king at (0,6)
    const POS: &str = "6e6/13/13/13/13/13/13/13/13/13/13/13/A5E6 w";

    fn sq(i: usize) -> Square {
        Square::new(i).unwrap()
    }

    fn mv(from: usize, to: usize) -> Move {
        Move::new(sq(from), sq(to))
    }

    fn state() -> BoardState {
        let legal = vec![mv(156, 143), mv(156, 157), mv(162, 149), mv(156, 130)];
        let mut state = BoardState::new();
        state.replace(POS, legal, None).unwrap();
        state
    }

    #[test]
    fn selecting_own_piece_filters_candidates() {
        let mut state = state();
        assert_eq!(state.click(sq(156)), ClickOutcome::Selected(sq(156)));
        assert_eq!(
            state.selection().candidates(),
            &[mv(156, 143), mv(156, 157), mv(156, 130)]
        );
        assert_eq!(state.phase(), Phase::Selected(sq(156)));
    }

    #[test]
    fn empty_or_opponent_square_clears() {
        let mut state = state();
        state.click(sq(156));
        assert_eq!(state.click(sq(80)), ClickOutcome::Cleared);
        assert_eq!(state.selection(), &Selection::none());

        state.click(sq(156));
        assert_eq!(state.click(sq(6)), ClickOutcome::Cleared, "black king is not Red's");
        assert!(state.selection().candidates().is_empty());
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn reselecting_switches_piece() {
        let mut state = state();
        state.click(sq(156));
        assert_eq!(state.click(sq(162)), ClickOutcome::Selected(sq(162)));
        assert_eq!(state.selection().candidates(), &[mv(162, 149)]);
    }

    #[test]
    fn clicking_target_submits_and_blocks_further_clicks() {
        let mut state = state();
        state.click(sq(156));
        assert_eq!(state.click(sq(143)), ClickOutcome::Submit(mv(156, 143)));
        assert_eq!(state.phase(), Phase::MoveInFlight(mv(156, 143)));
        assert_eq!(state.click(sq(162)), ClickOutcome::Ignored);
    }

    #[test]
    fn failed_move_keeps_selection() {
        let mut state = state();
        state.click(sq(156));
        state.click(sq(143));
        state.abort_move();
        assert_eq!(state.phase(), Phase::Selected(sq(156)));
        assert_eq!(state.selection().candidates().len(), 3);
    }

    #[test]
    fn successful_move_clears_selection() {
        let mut state = state();
        state.click(sq(156));
        state.click(sq(143));
        state
            .replace("6e6/13/13/13/13/13/13/13/13/13/13/A</6E6 b", vec![], Some(mv(156, 143)))
            .unwrap();
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.side_to_move(), Side::Black);
    }

    #[test]
    fn clicks_ignored_after_game_over() {
        let mut state = BoardState::new();
        state
            .replace("13/13/13/13/13/13/13/13/13/13/13/13/A5E6 w", vec![mv(156, 143)], None)
            .unwrap();
        assert!(state.is_game_over());
        assert_eq!(state.click(sq(156)), ClickOutcome::Ignored);
    }

    #[test]
    fn begin_move_rejects_second_move() {
        let mut state = state();
        assert!(state.begin_move(mv(162, 149)));
        assert!(!state.begin_move(mv(156, 143)));
        state.abort_move();
        assert!(state.begin_move(mv(156, 143)));
    }
}
