//! Terminal-oriented board renderer.
//!
//! `render_board_diagram` emits the same text format `board_parser` reads, so
//! positions can be dumped from a game and pasted back into a test.
//! `render_game_state` draws a hex board as a hexagon for human eyes.

use crate::game_state::{
    game_state::GameState,
    game_types::{Geometry, Placement},
};

/// Render the position in the parseable diagram format.
pub fn render_board_diagram(game_state: &GameState) -> String {
    let width = game_state.grid_width();
    let mut out = format!(
        "{} {} {}\n",
        game_state.geometry().name(),
        game_state.side(),
        game_state.side_to_move().symbol()
    );

    for row in 0..width {
        for col in 0..width {
            out.push(cell_char(game_state, Placement::new(row as u8, col as u8), '-'));
            if col + 1 < width {
                out.push(' ');
            }
        }
        if row + 1 < width {
            out.push('\n');
        }
    }

    out
}

/// Render the board for terminal output.
///
/// Square boards are printed as a grid with row and column indices. Hex
/// boards are indented so each row sits half a cell to the right of the one
/// above, which makes the six neighbours of a cell visually adjacent.
pub fn render_game_state(game_state: &GameState) -> String {
    let width = game_state.grid_width();
    let mut out = String::new();

    match game_state.geometry() {
        Geometry::Square => {
            out.push_str("   ");
            for col in 0..width {
                out.push_str(&format!("{col:<2}"));
            }
            out.push('\n');
            for row in 0..width {
                out.push_str(&format!("{row:>2} "));
                for col in 0..width {
                    out.push(cell_char(game_state, Placement::new(row as u8, col as u8), ' '));
                    out.push(' ');
                }
                out.push('\n');
            }
        }
        Geometry::Hex => {
            let side = game_state.side();
            for row in 0..width {
                // Rows below the middle start further right.
                let first_col = row.saturating_sub(side - 1);
                let last_col = (row + side - 1).min(width - 1);
                let indent = (side - 1).abs_diff(row);
                out.push_str(&format!("{row:>2} "));
                out.push_str(&" ".repeat(indent));
                for col in first_col..=last_col {
                    out.push(cell_char(game_state, Placement::new(row as u8, col as u8), ' '));
                    out.push(' ');
                }
                out.push('\n');
            }
        }
    }

    out.push_str(&format!(
        "{} to move, B {} W {}",
        game_state.side_to_move(),
        game_state.stats().stones[0],
        game_state.stats().stones[1]
    ));

    out
}

fn cell_char(game_state: &GameState, p: Placement, off_board: char) -> char {
    if !game_state.is_on_board(p) {
        return off_board;
    }
    match game_state.owner(p) {
        Some(player) => player.symbol(),
        None => '.',
    }
}

#[cfg(test)]
mod tests {
    use super::{render_board_diagram, render_game_state};
    use crate::utils::board_parser::parse_board;

    #[test]
    fn diagram_output_parses_back() {
        let text = "hex 3 W\n\
                    B . . - -\n\
                    . W . . -\n\
                    . . . . .\n\
                    - . . B .\n\
                    - - . . W";
        let state = parse_board(text).expect("parse");
        let rendered = render_board_diagram(&state);
        let reparsed = parse_board(&rendered).expect("reparse");
        assert_eq!(reparsed.fingerprint(), state.fingerprint());
        assert!(rendered.starts_with("hex 3 W\n"));
    }

    #[test]
    fn hex_render_shows_only_board_cells() {
        let state = parse_board(
            "hex 2 B\n\
             B W -\n\
             . . .\n\
             - . .",
        )
        .expect("parse");
        let rendered = render_game_state(&state);
        assert!(!rendered.contains('-'));
        assert!(rendered.contains("B W"));
        assert!(rendered.ends_with("Black to move, B 1 W 1"));
    }
}
