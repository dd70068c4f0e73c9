//! Iterative deepening over the turn tree.
//!
//! Runs root searches at depth 1, 2, 3, … until the time budget runs out, the
//! cancellation token trips, a forced win is proven, or the depth ceiling is
//! reached. Only fully completed depths are reported; an interrupted depth is
//! thrown away.

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::game_state::game_state::GameState;
use crate::game_state::turn::Turn;
use crate::search::alpha_beta::{SearchConfig, SearchEngine};
use crate::search::board_scoring::{BoardScorer, OustHeuristic, HEURISTIC_LIMIT};
use crate::search::cancellation::CancellationToken;
use crate::search::transposition_table::TTStats;
use crate::search::turn_generator::{GreedyCompletion, TurnCompletion, TurnGenerator};

/// Per-depth trace entry.
#[derive(Debug, Clone)]
pub struct IterationReport {
    pub depth: u8,
    pub turn: Turn,
    pub value: f64,
    /// Cumulative nodes at the end of this depth.
    pub nodes: u64,
    pub elapsed: Duration,
}

/// Result of one `decide` call.
#[derive(Debug, Clone, Default)]
pub struct Decision {
    pub turn: Turn,
    pub score: f64,
    /// Deepest fully completed depth; 0 when only the fallback is available.
    pub depth_reached: u8,
    pub nodes: u64,
    pub elapsed: Duration,
    pub tt_stats: TTStats,
    pub iterations: Vec<IterationReport>,
}

#[derive(Debug, Clone)]
pub struct IterativeDeepeningController<
    S: BoardScorer = OustHeuristic,
    C: TurnCompletion = GreedyCompletion,
> {
    pub search: SearchEngine<S, C>,
}

impl Default for IterativeDeepeningController<OustHeuristic, GreedyCompletion> {
    fn default() -> Self {
        Self {
            search: SearchEngine::with_defaults(),
        }
    }
}

impl<S: BoardScorer, C: TurnCompletion> IterativeDeepeningController<S, C> {
    pub fn new(scorer: S, generator: TurnGenerator<C>, config: SearchConfig) -> Self {
        Self {
            search: SearchEngine::new(scorer, generator, config),
        }
    }

    /// Choose a turn for the side to move.
    ///
    /// `budget` of `None` means no deadline: search runs to
    /// `SearchConfig::max_depth` unless `cancel` is raised. The returned turn
    /// is empty only when the side to move has no legal placement.
    pub fn decide(
        &mut self,
        game_state: &GameState,
        budget: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Decision {
        let started = Instant::now();
        let token = match budget {
            Some(b) => cancel.with_deadline(started + b),
            None => cancel.clone(),
        };

        self.search.reset();

        let mut decision = Decision::default();

        // Depth-1 ordering fallback; also tells whether there is anything to do.
        let candidates = self.search.generator.generate(game_state);
        let Some(fallback) = candidates.first() else {
            decision.score = self.search.scorer.score(game_state, game_state.side_to_move());
            decision.elapsed = started.elapsed();
            info!("no legal placement for {}, passing", game_state.side_to_move());
            return decision;
        };
        decision.turn = fallback.turn.clone();
        decision.score = self
            .search
            .scorer
            .score(&fallback.state_after, game_state.side_to_move());
        let single_candidate = candidates.len() == 1;

        let max_depth = self.search.config.max_depth.max(1);
        for depth in 1..=max_depth {
            if token.is_cancelled() {
                break;
            }
            let Some(result) = self.search.search_root(game_state, depth, &token) else {
                break;
            };

            let elapsed = started.elapsed();
            debug!(
                "depth {} value {:.2} nodes {} elapsed {:?} turn {}",
                depth,
                result.value,
                self.search.nodes(),
                elapsed,
                result.turn
            );

            decision.turn = result.turn.clone();
            decision.score = result.value;
            decision.depth_reached = depth;
            decision.iterations.push(IterationReport {
                depth,
                turn: result.turn,
                value: result.value,
                nodes: self.search.nodes(),
                elapsed,
            });

            if result.value > HEURISTIC_LIMIT {
                debug!("forced win found at depth {depth}, stopping");
                break;
            }
            if single_candidate {
                break;
            }
        }

        decision.nodes = self.search.nodes();
        decision.elapsed = started.elapsed();
        decision.tt_stats = self.search.tt_stats();

        info!(
            "decided {} for {}: value {:.2}, depth {}, nodes {}, {:?}",
            decision.turn,
            game_state.side_to_move(),
            decision.score,
            decision.depth_reached,
            decision.nodes,
            decision.elapsed
        );

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::IterativeDeepeningController;
    use crate::game_state::game_state::GameState;
    use crate::game_state::game_types::{Geometry, Placement, Player};
    use crate::search::alpha_beta::SearchConfig;
    use crate::search::board_scoring::{BoardScorer, OustHeuristic};
    use crate::search::cancellation::{CancellationToken, HostTimer};
    use crate::search::turn_generator::TurnGenerator;
    use crate::utils::board_parser::parse_board;
    use std::time::{Duration, Instant};

    fn controller(max_depth: u8) -> IterativeDeepeningController {
        IterativeDeepeningController::new(
            OustHeuristic::default(),
            TurnGenerator::default(),
            SearchConfig {
                max_depth,
                ..SearchConfig::default()
            },
        )
    }

    #[test]
    fn capture_scenario_on_small_square_board() {
        let state = parse_board(
            "square 4 B\n\
             B W . .\n\
             . . . .\n\
             . . . .\n\
             . . . .",
        )
        .expect("parse");
        let mut ids = controller(6);
        let decision = ids.decide(&state, Some(Duration::from_secs(5)), &CancellationToken::new());
        assert_eq!(decision.turn.placements(), &[Placement::new(1, 0)]);
        assert!(decision.turn.is_valid_for(&state));
        // The win is proven at depth 1, so deeper iterations are skipped.
        assert_eq!(decision.depth_reached, 1);
        let after = decision.turn.apply_to(&state).expect("apply");
        assert_eq!(after.winner(), Some(Player::Black));
    }

    #[test]
    fn decision_is_non_empty_when_placements_exist() {
        let state = GameState::new(Geometry::Hex, 3).expect("board");
        let mut ids = controller(2);
        let decision = ids.decide(&state, None, &CancellationToken::new());
        assert!(!decision.turn.is_empty());
        assert!(decision.turn.is_valid_for(&state));
        assert_eq!(decision.depth_reached, 2);
        assert_eq!(decision.iterations.len(), 2);
        assert!(decision.nodes > 0);
    }

    #[test]
    fn larger_budget_never_reaches_less_depth() {
        let state = parse_board(
            "square 4 B\n\
             B . . .\n\
             . . W .\n\
             . . . .\n\
             . W . B",
        )
        .expect("parse");
        let tight = controller(2).decide(&state, Some(Duration::ZERO), &CancellationToken::new());
        let loose = controller(2).decide(&state, None, &CancellationToken::new());
        assert!(loose.depth_reached >= tight.depth_reached);
        assert_eq!(loose.depth_reached, 2);
        assert!(!tight.turn.is_empty());
        assert!(tight.turn.is_valid_for(&state));
    }

    #[test]
    fn pre_cancelled_decision_returns_the_fallback() {
        let state = GameState::new(Geometry::Hex, 4).expect("board");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let decision = controller(8).decide(&state, None, &cancel);
        assert_eq!(decision.depth_reached, 0);
        assert!(!decision.turn.is_empty());
        assert!(decision.turn.is_valid_for(&state));

        // Reported on the same scale as completed depths.
        let fallback = TurnGenerator::default().generate(&state).remove(0);
        assert_eq!(decision.turn, fallback.turn);
        let expected = OustHeuristic::default().score(&fallback.state_after, Player::Black);
        assert_eq!(decision.score.to_bits(), expected.to_bits());
    }

    #[test]
    fn host_cancel_mid_search_returns_promptly() {
        let state = GameState::new(Geometry::Hex, 5).expect("board");
        let cancel = CancellationToken::new();
        let timer = HostTimer::spawn(cancel.flag(), Duration::from_millis(50));
        let started = Instant::now();
        let decision = controller(32).decide(&state, None, &cancel);
        let waited = started.elapsed();
        timer.join();
        assert!(
            waited < Duration::from_millis(50) + Duration::from_secs(1),
            "took {waited:?}"
        );
        assert!(!decision.turn.is_empty());
        assert!(decision.turn.is_valid_for(&state));
    }

    #[test]
    fn no_placement_yields_a_pass() {
        let state = parse_board(
            "square 2 B\n\
             B W\n\
             W B",
        )
        .expect("parse");
        let decision = controller(4).decide(&state, None, &CancellationToken::new());
        assert!(decision.turn.is_empty());
        assert_eq!(decision.depth_reached, 0);
    }

    #[test]
    fn single_candidate_stops_after_depth_one() {
        // Black's only empty cell is a quiet placement.
        let state = parse_board(
            "square 2 B\n\
             B W\n\
             W .",
        )
        .expect("parse");
        let decision = controller(6).decide(&state, None, &CancellationToken::new());
        assert_eq!(decision.turn.placements(), &[Placement::new(1, 1)]);
        assert_eq!(decision.depth_reached, 1);
    }
}
