//! Text-diagram-to-GameState parser.
//!
//! A diagram is a header line `<square|hex> <side> <B|W>` followed by one line
//! per grid row. Cells are whitespace-separated single characters: `B` and `W`
//! for stones, `.` for an empty cell, and `-` for a grid cell that lies off a
//! hex board. Blank lines are ignored.
//!
//! ```text
//! hex 2 B
//! B W -
//! . . .
//! - . .
//! ```

use crate::errors::{OustError, OustResult};
use crate::game_state::game_state::GameState;
use crate::game_state::game_types::{Geometry, Placement, Player};
use crate::search::zobrist::MAX_GRID_WIDTH;

pub fn parse_board(text: &str) -> OustResult<GameState> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let header = lines
        .next()
        .ok_or_else(|| OustError::InvalidBoardHeader("missing header line".to_owned()))?;
    let (geometry, side, side_to_move) = parse_header(header)?;

    let width = geometry.grid_width(side);
    let mut cells = Vec::with_capacity(width * width);

    for row in 0..width {
        let line = lines
            .next()
            .ok_or_else(|| OustError::InvalidBoardLayout(format!("missing row {row}")))?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != width {
            return Err(OustError::InvalidBoardLayout(format!(
                "row {row} has {} cells, expected {width}",
                tokens.len()
            )));
        }

        for (col, token) in tokens.iter().enumerate() {
            let on_board = geometry.contains(side, row as isize, col as isize);
            cells.push(parse_cell(token, on_board, Placement::new(row as u8, col as u8))?);
        }
    }

    if lines.next().is_some() {
        return Err(OustError::InvalidBoardLayout(
            "diagram has extra trailing rows".to_owned(),
        ));
    }

    GameState::from_cells(geometry, side, cells, side_to_move)
}

fn parse_header(header: &str) -> OustResult<(Geometry, usize, Player)> {
    let mut parts = header.split_whitespace();

    let geometry_part = parts
        .next()
        .ok_or_else(|| OustError::InvalidBoardHeader(header.to_owned()))?;
    let side_part = parts
        .next()
        .ok_or_else(|| OustError::InvalidBoardHeader(format!("missing side in '{header}'")))?;
    let mover_part = parts.next().ok_or_else(|| {
        OustError::InvalidBoardHeader(format!("missing side to move in '{header}'"))
    })?;
    if parts.next().is_some() {
        return Err(OustError::InvalidBoardHeader(format!(
            "extra fields in '{header}'"
        )));
    }

    let geometry = Geometry::from_name(geometry_part).ok_or_else(|| {
        OustError::InvalidBoardHeader(format!("unknown geometry '{geometry_part}'"))
    })?;
    let side = side_part
        .parse::<usize>()
        .map_err(|_| OustError::InvalidBoardHeader(format!("invalid side '{side_part}'")))?;

    let mut mover_chars = mover_part.chars();
    let side_to_move = match (mover_chars.next(), mover_chars.next()) {
        (Some(ch), None) => Player::from_symbol(ch),
        _ => None,
    }
    .ok_or_else(|| OustError::InvalidBoardHeader(format!("invalid side to move '{mover_part}'")))?;

    // Reject sizes before indexing rows with them.
    if side < 2 || side > MAX_GRID_WIDTH || geometry.grid_width(side) > MAX_GRID_WIDTH {
        return Err(OustError::InvalidBoardSize(side));
    }

    Ok((geometry, side, side_to_move))
}

fn parse_cell(token: &str, on_board: bool, at: Placement) -> OustResult<Option<Player>> {
    let mut chars = token.chars();
    let ch = match (chars.next(), chars.next()) {
        (Some(ch), None) => ch,
        (Some(ch), Some(_)) => return Err(OustError::InvalidBoardToken(ch)),
        (None, _) => return Err(OustError::InvalidBoardLayout(format!("empty token at {at}"))),
    };

    match (ch, on_board) {
        ('-', false) | ('.', false) => Ok(None),
        ('-', true) => Err(OustError::InvalidBoardLayout(format!(
            "{at} is on the board but marked '-'"
        ))),
        (_, false) => Err(OustError::OutOfBounds(at)),
        ('.', true) => Ok(None),
        (ch, true) => Player::from_symbol(ch)
            .map(Some)
            .ok_or(OustError::InvalidBoardToken(ch)),
    }
}
