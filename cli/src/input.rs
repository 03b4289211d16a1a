// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parsing of interactive commands read from stdin

use anyhow::{anyhow, Result};
use xionghan_core::{Square, BOARD_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Click a square: select a piece or play to a highlighted target
    Click(Square),
    /// Ask the engine for one move
    Ai,
    New,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  <row> <col>   click a square (0-12 each)
  sq <n>        click square by index (0-168)
  ai            let the engine play one move
  new           start a new game
  show          print the board again
  quit          exit";

pub fn parse_command(input: &str) -> Result<Command> {
    let input = input.trim().to_lowercase();
    let parts: Vec<&str> = input.split_whitespace().collect();

    match parts.as_slice() {
        ["ai"] => Ok(Command::Ai),
        ["new"] => Ok(Command::New),
        ["show"] | [] => Ok(Command::Show),
        ["help"] | ["?"] => Ok(Command::Help),
        ["quit"] | ["exit"] | ["q"] => Ok(Command::Quit),
        ["sq", n] => {
            let index: usize = n
                .parse()
                .map_err(|_| anyhow!("Invalid square index '{}'", n))?;
            Square::new(index)
                .map(Command::Click)
                .ok_or_else(|| anyhow!("Square index must be below {}", BOARD_SIZE * BOARD_SIZE))
        }
        [row, col] => {
            let row: usize = row.parse().map_err(|_| anyhow!("Invalid row '{}'", row))?;
            let col: usize = col.parse().map_err(|_| anyhow!("Invalid column '{}'", col))?;
            Square::from_row_col(row, col)
                .map(Command::Click)
                .ok_or_else(|| anyhow!("Row and column must be between 0 and {}", BOARD_SIZE - 1))
        }
        _ => Err(anyhow!("Unknown command '{}'. Type 'help' for a list.", input)),
    }
}
