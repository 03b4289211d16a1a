// SPDX-License-Identifier: MIT OR Apache-2.0

//! Xionghan Core - Board model and client-side game state
//!
//! This crate provides the pure (I/O free) half of the client:
//! - Square, side, piece and move types for the 13x13 board
//! - The compact position notation codec (decode / expand / encode)
//! - The board state store mirrored from the remote game service
//! - Selection and click handling for interactive play
//! - Pointer geometry for mapping screen points onto squares

#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod board;
pub mod geometry;
pub mod interaction;
pub mod notation;
pub mod state;

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use thiserror::Error;

pub use board::Board;
pub use geometry::GridGeometry;
pub use interaction::{ClickOutcome, Phase, Selection};
pub use notation::{decode, encode, expand, Position};
pub use state::{BoardState, Outcome};

/// Width and height of the board
pub const BOARD_SIZE: usize = 13;

/// Number of squares on the board
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// Player side. The wire value is the integer used by the game service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Side {
    /// Red moves first and is written in upper case
    Red = 0,
    /// Black is written in lower case
    Black = 1,
}

impl Side {
    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Red => Side::Black,
            Side::Black => Side::Red,
        }
    }

    /// Integer used on the wire (`to_move`)
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Side::Red => "Red",
            Side::Black => "Black",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A cell index `0..NUM_SQUARES` in row-major order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Square(u16);

impl Square {
    /// Create a square from a raw index, `None` if off the board
    pub fn new(index: usize) -> Option<Self> {
        (index < NUM_SQUARES).then_some(Square(index as u16))
    }

    /// Create a square from row and column, `None` if off the board
    pub fn from_row_col(row: usize, col: usize) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Square((row * BOARD_SIZE + col) as u16))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn row(self) -> usize {
        self.index() / BOARD_SIZE
    }

    pub fn col(self) -> usize {
        self.index() % BOARD_SIZE
    }

    /// Iterate over every square of the board
    pub fn all() -> impl Iterator<Item = Square> {
        (0..NUM_SQUARES).map(|i| Square(i as u16))
    }
}

impl TryFrom<i64> for Square {
    type Error = GameError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(Square::new)
            .ok_or(GameError::InvalidSquare(value))
    }
}

impl From<Square> for i64 {
    fn from(sq: Square) -> Self {
        sq.0 as i64
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of piece kinds, keyed by their lower-case notation letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    /// `a` 车
    Chariot,
    /// `b` 马
    Horse,
    /// `c` 相
    Elephant,
    /// `d` 士
    Advisor,
    /// `e` 皇 / 单于, the piece whose capture ends the game
    King,
    /// `f` 炮
    Cannon,
    /// `g` 兵 / 卒
    Pawn,
    /// `h` 檑
    Catapult,
    /// `i` 锋
    Spear,
    /// `j` 卫
    Guard,
}

impl PieceKind {
    /// Parse a lower-case notation letter
    pub fn from_letter(letter: char) -> Option<Self> {
        let kind = match letter {
            'a' => PieceKind::Chariot,
            'b' => PieceKind::Horse,
            'c' => PieceKind::Elephant,
            'd' => PieceKind::Advisor,
            'e' => PieceKind::King,
            'f' => PieceKind::Cannon,
            'g' => PieceKind::Pawn,
            'h' => PieceKind::Catapult,
            'i' => PieceKind::Spear,
            'j' => PieceKind::Guard,
            _ => return None,
        };
        Some(kind)
    }

    /// Lower-case notation letter
    pub fn letter(self) -> char {
        match self {
            PieceKind::Chariot => 'a',
            PieceKind::Horse => 'b',
            PieceKind::Elephant => 'c',
            PieceKind::Advisor => 'd',
            PieceKind::King => 'e',
            PieceKind::Cannon => 'f',
            PieceKind::Pawn => 'g',
            PieceKind::Catapult => 'h',
            PieceKind::Spear => 'i',
            PieceKind::Guard => 'j',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Chariot => "chariot",
            PieceKind::Horse => "horse",
            PieceKind::Elephant => "elephant",
            PieceKind::Advisor => "advisor",
            PieceKind::King => "king",
            PieceKind::Cannon => "cannon",
            PieceKind::Pawn => "pawn",
            PieceKind::Catapult => "catapult",
            PieceKind::Spear => "spear",
            PieceKind::Guard => "guard",
        }
    }
}

/// A piece on the board. Pieces are replaced, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
}

impl Piece {
    pub fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }

    /// Parse a notation letter; upper case is Red, lower case is Black
    pub fn from_char(ch: char) -> Option<Self> {
        let side = if ch.is_ascii_uppercase() { Side::Red } else { Side::Black };
        PieceKind::from_letter(ch.to_ascii_lowercase()).map(|kind| Piece { kind, side })
    }

    /// Notation letter for this piece
    pub fn to_char(self) -> char {
        match self.side {
            Side::Red => self.kind.letter().to_ascii_uppercase(),
            Side::Black => self.kind.letter(),
        }
    }
}

/// A move between two squares. Legality is decided by the game service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Errors raised by the board model
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A square index outside the board
    #[error("Invalid square index {0}")]
    InvalidSquare(i64),

    /// Position notation could not be decoded
    #[error(transparent)]
    Notation(#[from] NotationError),
}

/// Errors raised while decoding position notation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    /// The side-to-move token after the board part is missing
    #[error("Missing side-to-move token")]
    MissingSideToMove,

    /// More rows than the board has
    #[error("Too many rows: expected at most {expected}, found {found}")]
    TooManyRows { expected: usize, found: usize },

    /// A row expands past the board width
    #[error("Row {row} is wider than {width} squares")]
    RowOverflow { row: usize, width: usize },

    /// A character that is neither a run length nor a piece letter
    #[error("Unknown piece letter {0:?}")]
    UnknownPiece(char),
}
