//! A complete turn: every placement one player makes before the mover changes.

use std::fmt;

use crate::errors::OustResult;
use crate::game_state::game_state::GameState;
use crate::game_state::game_types::Placement;

/// Ordered placements made by one player without interruption.
///
/// Every placement except the last one captures; the last one either does not
/// capture (the mover changes) or ends the game. An empty turn is a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Turn {
    placements: Vec<Placement>,
}

impl Turn {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn pass() -> Self {
        Self::default()
    }

    #[inline]
    pub fn from_placements(placements: Vec<Placement>) -> Self {
        Self { placements }
    }

    #[inline]
    pub fn push(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    #[inline]
    pub fn first(&self) -> Option<Placement> {
        self.placements.first().copied()
    }

    #[inline]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter()
    }

    /// Apply the turn to a copy of `state`. An empty turn is played as a pass.
    pub fn apply_to(&self, state: &GameState) -> OustResult<GameState> {
        let mut next = state.clone();
        if self.is_empty() {
            next.pass_turn()?;
            return Ok(next);
        }
        for &placement in &self.placements {
            next.apply_placement(placement)?;
        }
        Ok(next)
    }

    /// Check that replaying the turn on `state` follows the turn invariant.
    ///
    /// The mover must stay the same (and every placement must capture) until
    /// the last placement, after which the game is over or the mover changed.
    pub fn is_valid_for(&self, state: &GameState) -> bool {
        if self.is_empty() {
            return state.legal_placements().is_empty();
        }
        let mover = state.side_to_move();
        let mut sim = state.clone();
        let last = self.placements.len() - 1;
        for (i, &placement) in self.placements.iter().enumerate() {
            if sim.is_game_over() || sim.side_to_move() != mover {
                return false;
            }
            if sim.apply_placement(placement).is_err() {
                return false;
            }
            if i < last && !sim.stats().last_placement_captured {
                return false;
            }
        }
        sim.is_game_over() || sim.side_to_move() != mover
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.placements.is_empty() {
            return write!(f, "pass");
        }
        for (i, p) in self.placements.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Turn;
    use crate::game_state::game_types::Placement;
    use crate::utils::board_parser::parse_board;

    #[test]
    fn display_lists_placements_or_pass() {
        assert_eq!(Turn::pass().to_string(), "pass");
        let turn = Turn::from_placements(vec![Placement::new(1, 0), Placement::new(3, 3)]);
        assert_eq!(turn.to_string(), "(1,0) (3,3)");
    }

    #[test]
    fn single_quiet_placement_is_a_valid_turn() {
        let state = parse_board("square 4 B\n. . . .\n. . . .\n. . . .\n. . . .").expect("parse");
        let turn = Turn::from_placements(vec![Placement::new(1, 1)]);
        assert!(turn.is_valid_for(&state));
        let after = turn.apply_to(&state).expect("apply");
        assert_eq!(after.stones(crate::game_state::game_types::Player::Black), 1);
    }

    #[test]
    fn truncated_capture_chain_is_not_a_valid_turn() {
        // Black captures at (1,0) but White still has a stone, so Black must
        // keep placing; a one-placement turn is incomplete.
        let state = parse_board(
            "square 4 B\n\
             B W . .\n\
             . . . .\n\
             . . . W\n\
             . . . .",
        )
        .expect("parse");
        let turn = Turn::from_placements(vec![Placement::new(1, 0)]);
        assert!(!turn.is_valid_for(&state));

        let completed = Turn::from_placements(vec![Placement::new(1, 0), Placement::new(3, 0)]);
        assert!(completed.is_valid_for(&state));
    }
}
