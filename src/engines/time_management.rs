//! Reusable time-management strategies for per-turn budgeting.
//!
//! Hosts pass raw limits (`movetime`, remaining clocks) and the engine decides
//! the final per-turn allocation based on strategy.

use std::time::Duration;

use crate::engines::engine_trait::GoParams;
use crate::game_state::game_state::GameState;
use crate::game_state::game_types::Player;

pub const DEFAULT_TURN_BUDGET_MS: u64 = 5_000;
pub const DEFAULT_SAFETY_MARGIN_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeManagementStrategy {
    /// Spend the configured budget on every turn.
    FixedPerTurn,
    /// Split the remaining clock over the turns the board can still hold.
    ClockFraction,
}

/// Fixed per-turn budget with a safety margin kept back for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBudget {
    pub budget_ms: u64,
    pub safety_margin_ms: u64,
}

impl Default for TimeBudget {
    fn default() -> Self {
        Self {
            budget_ms: DEFAULT_TURN_BUDGET_MS,
            safety_margin_ms: DEFAULT_SAFETY_MARGIN_MS,
        }
    }
}

impl TimeBudget {
    pub fn new(budget_ms: u64, safety_margin_ms: u64) -> Self {
        Self {
            budget_ms,
            safety_margin_ms,
        }
    }

    /// Search time left after the margin, never below 1 ms.
    #[inline]
    pub fn effective(&self) -> Duration {
        Duration::from_millis(self.budget_ms.saturating_sub(self.safety_margin_ms).max(1))
    }
}

/// Resolve the search deadline for this turn. `None` means no deadline.
///
/// Precedence: `infinite`, then `movetime_ms`, then the side's clock under
/// `ClockFraction`, then a bare `depth` request (search to that depth), and
/// finally the configured fixed budget.
pub fn resolve_turn_budget(
    game_state: &GameState,
    params: &GoParams,
    strategy: TimeManagementStrategy,
    budget: TimeBudget,
) -> Option<Duration> {
    if params.infinite {
        return None;
    }
    if let Some(movetime) = params.movetime_ms {
        return Some(TimeBudget::new(movetime, budget.safety_margin_ms).effective());
    }

    let remaining = match game_state.side_to_move() {
        Player::Black => params.black_time_ms,
        Player::White => params.white_time_ms,
    };
    if let (TimeManagementStrategy::ClockFraction, Some(remaining)) = (strategy, remaining) {
        let per_turn = clock_fraction_ms(game_state, remaining);
        return Some(TimeBudget::new(per_turn, budget.safety_margin_ms).effective());
    }

    if params.depth.is_some() {
        return None;
    }
    Some(budget.effective())
}

fn clock_fraction_ms(game_state: &GameState, remaining_ms: u64) -> u64 {
    // Each of our turns fills at least one cell; assume the opponent fills as
    // many, with a floor so the last turns are not starved.
    let empty = game_state.stats().empty_cells as u64;
    let expected_turns_left = (empty / 2).max(8);
    let per_turn = remaining_ms / expected_turns_left;
    per_turn.clamp(1, (remaining_ms / 4).max(1))
}

#[cfg(test)]
mod tests {
    use super::{resolve_turn_budget, TimeBudget, TimeManagementStrategy};
    use crate::engines::engine_trait::GoParams;
    use crate::game_state::game_state::GameState;
    use crate::game_state::game_types::{Geometry, Player};
    use std::time::Duration;

    #[test]
    fn default_budget_keeps_the_margin() {
        let state = GameState::new_game();
        let got = resolve_turn_budget(
            &state,
            &GoParams::default(),
            TimeManagementStrategy::FixedPerTurn,
            TimeBudget::default(),
        );
        assert_eq!(got, Some(Duration::from_millis(4_900)));
    }

    #[test]
    fn movetime_and_infinite_take_precedence() {
        let state = GameState::new_game();
        let params = GoParams {
            movetime_ms: Some(300),
            ..GoParams::default()
        };
        let got = resolve_turn_budget(
            &state,
            &params,
            TimeManagementStrategy::ClockFraction,
            TimeBudget::default(),
        );
        assert_eq!(got, Some(Duration::from_millis(200)));

        let params = GoParams {
            infinite: true,
            movetime_ms: Some(300),
            ..GoParams::default()
        };
        assert_eq!(
            resolve_turn_budget(
                &state,
                &params,
                TimeManagementStrategy::FixedPerTurn,
                TimeBudget::default()
            ),
            None
        );
    }

    #[test]
    fn depth_only_request_has_no_deadline() {
        let state = GameState::new_game();
        let params = GoParams {
            depth: Some(3),
            ..GoParams::default()
        };
        assert_eq!(
            resolve_turn_budget(
                &state,
                &params,
                TimeManagementStrategy::FixedPerTurn,
                TimeBudget::default()
            ),
            None
        );
    }

    #[test]
    fn clock_fraction_uses_the_movers_clock() {
        let state = GameState::new(Geometry::Square, 4).expect("board");
        assert_eq!(state.side_to_move(), Player::Black);
        let params = GoParams {
            black_time_ms: Some(8_000),
            white_time_ms: Some(1),
            ..GoParams::default()
        };
        // 16 empty cells -> 8 expected turns -> 1000 ms, minus the margin.
        let got = resolve_turn_budget(
            &state,
            &params,
            TimeManagementStrategy::ClockFraction,
            TimeBudget::default(),
        );
        assert_eq!(got, Some(Duration::from_millis(900)));
    }
}
