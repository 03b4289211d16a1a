// SPDX-License-Identifier: MIT OR Apache-2.0

//! Board representation

use crate::{Piece, PieceKind, Side, Square, NUM_SQUARES};

/// A full 13x13 board snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// Cells in row-major order
    squares: Vec<Option<Piece>>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Self {
            squares: vec![None; NUM_SQUARES],
        }
    }

    /// Get the piece at the specified square
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    /// Place a piece on an empty square
    pub fn place(&mut self, sq: Square, piece: Piece) -> bool {
        let cell = &mut self.squares[sq.index()];
        if cell.is_some() {
            return false;
        }
        *cell = Some(piece);
        true
    }

    /// Remove the piece at the specified square
    pub fn remove(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()].take()
    }

    /// Iterate over occupied squares
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }

    /// Whether the king of `side` is still on the board
    pub fn has_king(&self, side: Side) -> bool {
        self.pieces()
            .any(|(_, p)| p.kind == PieceKind::King && p.side == side)
    }

    pub fn is_empty(&self) -> bool {
        self.squares.iter().all(Option::is_none)
    }

    /// Squares whose content differs between two snapshots, in index order
    pub fn diff(old: &Board, new: &Board) -> Vec<Square> {
        Square::all()
            .filter(|&sq| old.get(sq) != new.get(sq))
            .collect()
    }
}
