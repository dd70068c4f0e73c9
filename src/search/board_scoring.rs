//! Pluggable board evaluation interfaces and the Oust heuristic.
//!
//! Search remains modular by delegating static position scoring to this trait,
//! allowing alternate weightings to be swapped without altering search code.

use std::cmp::Reverse;

use crate::game_state::derived_stats::GroupMap;
use crate::game_state::game_state::GameState;
use crate::game_state::game_types::Player;

/// Value of a won terminal position. Search subtracts the ply distance so
/// quicker wins rank higher.
pub const WIN_SCORE: f64 = 1.0e9;

/// Every non-terminal evaluation is clamped into `[-HEURISTIC_LIMIT, HEURISTIC_LIMIT]`.
pub const HEURISTIC_LIMIT: f64 = 1.0e8;

/// Groups at most this large are candidates for the vulnerability penalty.
pub const VULNERABLE_GROUP_SIZE: usize = 3;

/// Upper bound on simulated placements in the greedy capture-chain estimate.
pub const CHAIN_ESTIMATE_CAP: usize = 50;

/// True for values only a terminal position can produce.
#[inline]
pub fn is_decisive(value: f64) -> bool {
    value.abs() > HEURISTIC_LIMIT
}

pub trait BoardScorer: Send + Sync {
    /// Score from the perspective of `perspective`; higher is better for it.
    fn score(&self, game_state: &GameState, perspective: Player) -> f64;
}

/// Named weights of the Oust heuristic.
///
/// Material terms are per stone, group terms per stone of size difference or
/// per group, and threat terms per capturing placement or chain step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicWeights {
    pub own_stones: f64,
    pub enemy_stones: f64,
    pub largest_group: f64,
    pub group_count: f64,
    pub mobility: f64,
    pub capture_threat: f64,
    pub capture_chain: f64,
    pub vulnerable_group: f64,
    pub singleton_early: f64,
    pub singleton_late: f64,
    /// Fill ratio below which singletons count as seeds instead of liabilities.
    pub opening_fill: f64,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            own_stones: 0.5,
            enemy_stones: 150.0,
            largest_group: 80.0,
            group_count: 15.0,
            mobility: 3.0,
            capture_threat: 500.0,
            capture_chain: 150.0,
            vulnerable_group: 60.0,
            singleton_early: 20.0,
            singleton_late: 25.0,
            opening_fill: 0.3,
        }
    }
}

impl HeuristicWeights {
    /// Cheap weighting used to rank first placements and complete capture
    /// chains: drops the terms that need extra simulation.
    pub fn ordering() -> Self {
        Self {
            mobility: 0.0,
            capture_chain: 0.0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OustHeuristic {
    pub weights: HeuristicWeights,
}

impl OustHeuristic {
    pub fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }

    pub fn ordering() -> Self {
        Self::new(HeuristicWeights::ordering())
    }

    fn terminal_score(game_state: &GameState, perspective: Player) -> f64 {
        match game_state.winner() {
            Some(winner) if winner == perspective => WIN_SCORE,
            Some(_) => -WIN_SCORE,
            None => 0.0,
        }
    }

    /// Own small groups touching a larger enemy group, minus the same count
    /// for the opponent.
    fn vulnerability_balance(groups: &GroupMap, perspective: Player) -> f64 {
        let mut balance = 0i32;
        for id in 0..groups.group_count() as u32 {
            let size = groups.size_of(id);
            if size > VULNERABLE_GROUP_SIZE {
                continue;
            }
            let threatened = groups
                .touching_groups(id)
                .iter()
                .any(|&other| groups.size_of(other) > size);
            if threatened {
                balance += if groups.owner_of(id) == perspective { 1 } else { -1 };
            }
        }
        f64::from(balance)
    }
}

/// Number of placements `player` could chain by always taking the capture
/// that removes the most stones, starting from `game_state` with `player` on
/// turn.
pub fn greedy_chain_length(game_state: &GameState, player: Player, cap: usize) -> usize {
    let mut sim = game_state.with_side_to_move(player);
    let mut steps = 0usize;
    while steps < cap && !sim.is_game_over() && sim.side_to_move() == player {
        let best = sim
            .capturing_placements_for(player)
            .into_iter()
            .max_by_key(|&(p, captured)| (captured, Reverse(p)));
        let Some((placement, _)) = best else {
            break;
        };
        if sim.apply_placement(placement).is_err() {
            break;
        }
        steps += 1;
    }
    steps
}

impl BoardScorer for OustHeuristic {
    fn score(&self, game_state: &GameState, perspective: Player) -> f64 {
        if game_state.is_game_over() {
            return Self::terminal_score(game_state, perspective);
        }

        let w = &self.weights;
        let enemy = perspective.opposite();
        let stats = game_state.stats();

        let mut score = 0.0;

        score += w.own_stones * stats.stones_of(perspective) as f64;
        score -= w.enemy_stones * stats.stones_of(enemy) as f64;

        score += w.largest_group
            * (stats.largest_group_of(perspective) as f64 - stats.largest_group_of(enemy) as f64);
        score -= w.group_count
            * (stats.groups_of(perspective) as f64 - stats.groups_of(enemy) as f64);

        if w.mobility != 0.0 && game_state.side_to_move() == perspective {
            score += w.mobility * game_state.legal_placements().len() as f64;
        }

        if w.capture_threat != 0.0 || w.capture_chain != 0.0 {
            let own_captures = game_state.capturing_placements_for(perspective).len();
            let enemy_captures = game_state.capturing_placements_for(enemy).len();
            score += w.capture_threat * (own_captures as f64 - enemy_captures as f64);

            if w.capture_chain != 0.0 && enemy_captures > 0 {
                let chain = greedy_chain_length(game_state, enemy, CHAIN_ESTIMATE_CAP);
                score -= w.capture_chain * chain as f64;
            }
        }

        if w.vulnerable_group != 0.0 {
            let groups = GroupMap::build(game_state);
            score -= w.vulnerable_group * Self::vulnerability_balance(&groups, perspective);
        }

        let singletons =
            stats.singletons_of(perspective) as f64 - stats.singletons_of(enemy) as f64;
        if stats.fill_ratio() < w.opening_fill {
            score += w.singleton_early * singletons;
        } else {
            score -= w.singleton_late * singletons;
        }

        score.clamp(-HEURISTIC_LIMIT, HEURISTIC_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        greedy_chain_length, is_decisive, BoardScorer, HeuristicWeights, OustHeuristic,
        HEURISTIC_LIMIT, WIN_SCORE,
    };
    use crate::game_state::game_types::{Placement, Player};
    use crate::utils::board_parser::parse_board;

    const MIDGAME: &str = "square 5 B\n\
                           B B . W .\n\
                           . W . . .\n\
                           . . B . W\n\
                           W . . . .\n\
                           . . B W .";

    #[test]
    fn evaluation_is_deterministic_and_pure() {
        let state = parse_board(MIDGAME).expect("parse");
        let before = state.fingerprint();
        let scorer = OustHeuristic::default();
        let a = scorer.score(&state, Player::Black);
        let b = scorer.score(&state, Player::Black);
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(state.fingerprint(), before);
        assert!(a.abs() <= HEURISTIC_LIMIT);
    }

    #[test]
    fn terminal_positions_saturate() {
        let mut state = parse_board(
            "square 4 B\n\
             B W . .\n\
             . . . .\n\
             . . . .\n\
             . . . .",
        )
        .expect("parse");
        state.apply_placement(Placement::new(1, 0)).expect("win");
        let scorer = OustHeuristic::default();
        assert_eq!(scorer.score(&state, Player::Black), WIN_SCORE);
        assert_eq!(scorer.score(&state, Player::White), -WIN_SCORE);
        assert!(is_decisive(WIN_SCORE));
        assert!(!is_decisive(scorer.score(&parse_board(MIDGAME).expect("parse"), Player::White)));
    }

    #[test]
    fn fewer_enemy_stones_scores_higher() {
        let crowded = parse_board(
            "square 4 B\n\
             B . . W\n\
             . . . .\n\
             W . . .\n\
             . . . W",
        )
        .expect("parse");
        let sparse = parse_board(
            "square 4 B\n\
             B . . W\n\
             . . . .\n\
             . . . .\n\
             . . . .",
        )
        .expect("parse");
        let scorer = OustHeuristic::new(HeuristicWeights::ordering());
        assert!(scorer.score(&sparse, Player::Black) > scorer.score(&crowded, Player::Black));
    }

    #[test]
    fn greedy_chain_follows_forced_captures() {
        let state = parse_board(
            "square 4 B\n\
             B W . .\n\
             . . . .\n\
             . . . .\n\
             . . W B",
        )
        .expect("parse");
        // Black: (1,0) captures (0,1); then (2,3) reaches size 2 against the
        // white singleton at (3,2) and wins.
        assert_eq!(greedy_chain_length(&state, Player::Black, 50), 2);
        assert_eq!(greedy_chain_length(&state, Player::Black, 1), 1);
    }
}
