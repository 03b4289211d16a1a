// SPDX-License-Identifier: MIT OR Apache-2.0

//! ASCII board rendering for the CLI.

use xionghan_core::{BoardState, Square, BOARD_SIZE};
use xionghan_network::Session;

/// Render the board as ASCII art.
///
/// Pieces use their notation letter (upper case Red, lower case Black), `.`
/// is an empty square and `*` marks both ends of the last move.
pub fn render_board(state: &BoardState) -> String {
    let mut output = String::new();
    let last = state.last_move();

    output.push_str(&column_labels());
    for row in 0..BOARD_SIZE {
        output.push_str(&format!("{:>2} ", row));
        for col in 0..BOARD_SIZE {
            let Some(sq) = Square::from_row_col(row, col) else {
                continue;
            };
            let symbol = state.piece_at(sq).map(|p| p.to_char()).unwrap_or('.');
            let marker = match last {
                Some(mv) if mv.from == sq || mv.to == sq => '*',
                _ => ' ',
            };
            output.push_str(&format!(" {}{}", marker, symbol));
        }
        output.push_str(&format!("  {}", row));
        output.push('\n');
    }
    output.push_str(&column_labels());

    output
}

fn column_labels() -> String {
    let mut labels = String::from("   ");
    for col in 0..BOARD_SIZE {
        labels.push_str(&format!("{:>3}", col));
    }
    labels.push('\n');
    labels
}

/// One-line summary under the board
pub fn status_line(state: &BoardState, session: &Session) -> String {
    let game = session.game_id.as_deref().unwrap_or("-");
    let mut line = format!(
        "game {} | move {} | {} to move | {}",
        game,
        session.move_count,
        state.side_to_move(),
        state.outcome().describe()
    );
    if let Some(mv) = state.last_move() {
        line.push_str(&format!(" | last {}", mv));
    }
    if let Some(sq) = state.selection().selected() {
        let targets: Vec<String> = state
            .selection()
            .candidates()
            .iter()
            .map(|m| {
                if state.is_capture(*m) {
                    format!("{}x", m.to)
                } else {
                    m.to.to_string()
                }
            })
            .collect();
        line.push_str(&format!(" | selected {} -> [{}]", sq, targets.join(" ")));
    }
    line
}
