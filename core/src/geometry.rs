// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping between pointer coordinates and squares

use crate::{Square, BOARD_SIZE};

/// Affine grid layout: square `(row, col)` is centred at
/// `(origin + step * col, origin + step * row)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub origin: f32,
    pub step: f32,
}

impl Default for GridGeometry {
    /// The layout used by the board artwork: first line at 50, 100 apart
    fn default() -> Self {
        Self {
            origin: 50.0,
            step: 100.0,
        }
    }
}

impl GridGeometry {
    pub fn new(origin: f32, step: f32) -> Self {
        Self { origin, step }
    }

    /// Square nearest to the pointer, or `None` when it falls off the grid
    pub fn square_at(&self, x: f32, y: f32) -> Option<Square> {
        if !x.is_finite() || !y.is_finite() || self.step <= 0.0 {
            return None;
        }
        let col = ((x - self.origin) / self.step).round();
        let row = ((y - self.origin) / self.step).round();

        let limit = BOARD_SIZE as f32;
        if row < 0.0 || row >= limit || col < 0.0 || col >= limit {
            return None;
        }
        Square::from_row_col(row as usize, col as usize)
    }

    /// Centre of a square in pointer coordinates
    pub fn center(&self, sq: Square) -> (f32, f32) {
        (
            self.origin + self.step * sq.col() as f32,
            self.origin + self.step * sq.row() as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_centres() {
        let grid = GridGeometry::default();
        for sq in Square::all() {
            let (x, y) = grid.center(sq);
            assert_eq!(grid.square_at(x, y), Some(sq));
            assert_eq!(grid.square_at(x + 40.0, y - 40.0), Some(sq));
        }
    }

    #[test]
    fn outside_grid_is_none() {
        let grid = GridGeometry::default();
        assert_eq!(grid.square_at(-10.0, 50.0), None);
        assert_eq!(grid.square_at(50.0, 1300.0), None);
        assert_eq!(grid.square_at(f32::NAN, 50.0), None);
        assert_eq!(grid.square_at(5.0, 5.0).map(Square::index), Some(0));
        assert_eq!(grid.square_at(1249.0, 1249.0).map(Square::index), Some(168));
    }
}
