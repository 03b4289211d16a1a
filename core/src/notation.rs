// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compact position notation
//!
//! A position is written as 13 `/`-separated rows followed by a space and a
//! side-to-move token (`w` for Red, anything else for Black). Inside a row,
//! piece letters occupy one square each (upper case Red, lower case Black),
//! `.` is one empty square and a run-length token stands for consecutive
//! empty squares. Run lengths are written as `'0' + n`, so `1`-`9` cover
//! 1-9 empties and the four glyphs after `9` (`:` `;` `<` `=`) cover 10-13.
//!
//! Decoding is lenient about short rows and missing trailing rows (the
//! remaining squares are empty) but a row that runs past the board width is
//! rejected with [`NotationError::RowOverflow`].

use crate::{Board, NotationError, Piece, Side, Square, BOARD_SIZE};

/// Code point that run-length tokens are offset from
const RUN_BASE: u32 = '0' as u32;

/// Board plus side to move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    pub side_to_move: Side,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            board: Board::new(),
            side_to_move: Side::Red,
        }
    }
}

/// Number of empty squares a run-length token stands for
fn run_length(ch: char) -> Option<usize> {
    match ch {
        '1'..='9' | ':'..='=' => Some((ch as u32 - RUN_BASE) as usize),
        _ => None,
    }
}

/// Token for a run of `n` empty squares, `1 <= n <= 13`
fn run_token(n: usize) -> char {
    debug_assert!((1..=BOARD_SIZE).contains(&n));
    char::from_u32(RUN_BASE + n as u32).unwrap_or('.')
}

fn split_side(notation: &str) -> Result<(&str, &str), NotationError> {
    let trimmed = notation.trim();
    let (board_part, side) = trimmed
        .split_once(char::is_whitespace)
        .ok_or(NotationError::MissingSideToMove)?;
    let side = side.trim();
    if side.is_empty() {
        return Err(NotationError::MissingSideToMove);
    }
    Ok((board_part, side))
}

fn split_rows(board_part: &str) -> Result<Vec<&str>, NotationError> {
    let rows: Vec<&str> = board_part.split('/').collect();
    if rows.len() > BOARD_SIZE {
        return Err(NotationError::TooManyRows {
            expected: BOARD_SIZE,
            found: rows.len(),
        });
    }
    Ok(rows)
}

fn parse_side(token: &str) -> Side {
    if token == "w" {
        Side::Red
    } else {
        Side::Black
    }
}

/// Decode a single row into its cells, padding a short row with empties
pub fn decode_row(row_str: &str, row: usize) -> Result<Vec<Option<Piece>>, NotationError> {
    let mut cells = vec![None; BOARD_SIZE];
    let mut col = 0usize;

    for ch in row_str.chars() {
        if let Some(n) = run_length(ch) {
            col += n;
        } else if ch == '.' {
            col += 1;
        } else {
            let piece = Piece::from_char(ch).ok_or(NotationError::UnknownPiece(ch))?;
            if col >= BOARD_SIZE {
                return Err(NotationError::RowOverflow { row, width: BOARD_SIZE });
            }
            cells[col] = Some(piece);
            col += 1;
        }
    }

    if col > BOARD_SIZE {
        return Err(NotationError::RowOverflow { row, width: BOARD_SIZE });
    }
    Ok(cells)
}

/// Decode a full notation string into a board and side to move
pub fn decode(notation: &str) -> Result<Position, NotationError> {
    let (board_part, side) = split_side(notation)?;
    let rows = split_rows(board_part)?;

    let mut board = Board::new();
    for (r, row_str) in rows.iter().enumerate() {
        for (c, cell) in decode_row(row_str, r)?.into_iter().enumerate() {
            if let (Some(piece), Some(sq)) = (cell, Square::from_row_col(r, c)) {
                board.place(sq, piece);
            }
        }
    }

    Ok(Position {
        board,
        side_to_move: parse_side(side),
    })
}

/// Expand a row to exactly one character per square.
///
/// Run lengths become `.`, a short row is padded with `.`, and a row wider
/// than the board is a [`NotationError::RowOverflow`], as in [`decode`].
pub fn expand_row(row_str: &str, row: usize) -> Result<String, NotationError> {
    Ok(decode_row(row_str, row)?
        .into_iter()
        .map(|cell| cell.map_or('.', Piece::to_char))
        .collect())
}

/// Expand a notation into its one-character-per-square form.
///
/// Every one of the 13 rows comes out 13 characters wide, missing trailing
/// rows included. The side-to-move token is kept verbatim.
pub fn expand(notation: &str) -> Result<String, NotationError> {
    let (board_part, side) = split_side(notation)?;
    let rows = split_rows(board_part)?;

    let expanded = (0..BOARD_SIZE)
        .map(|r| expand_row(rows.get(r).copied().unwrap_or(""), r))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("{} {}", expanded.join("/"), side))
}

/// Compress a board into notation, the inverse of [`decode`]
pub fn encode(board: &Board, side_to_move: Side) -> String {
    let mut out = String::new();
    for r in 0..BOARD_SIZE {
        if r > 0 {
            out.push('/');
        }
        let mut empty = 0;
        for c in 0..BOARD_SIZE {
            let piece = Square::from_row_col(r, c).and_then(|sq| board.get(sq));
            match piece {
                Some(p) => {
                    if empty > 0 {
                        out.push(run_token(empty));
                        empty = 0;
                    }
                    out.push(p.to_char());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push(run_token(empty));
        }
    }
    out.push(' ');
    out.push(match side_to_move {
        Side::Red => 'w',
        Side::Black => 'b',
    });
    out
}

impl Position {
    /// Compact notation for this position
    pub fn encode(&self) -> String {
        encode(&self.board, self.side_to_move)
    }
}
