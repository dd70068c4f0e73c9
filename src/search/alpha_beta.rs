//! Alpha-beta minimax over complete turns.
//!
//! Each edge of the tree is a whole `Turn` produced by the `TurnGenerator`,
//! so one ply here is one change of mover. The maximizing side is the player
//! to move at the root. Search returns `None` as soon as the cancellation
//! token trips; callers keep whatever they completed before that.

use crate::game_state::game_state::GameState;
use crate::game_state::game_types::Player;
use crate::game_state::turn::Turn;
use crate::search::board_scoring::{BoardScorer, OustHeuristic, HEURISTIC_LIMIT};
use crate::search::cancellation::CancellationToken;
use crate::search::transposition_table::{TTEntry, TTStats, TranspositionTable};
use crate::search::turn_generator::{GreedyCompletion, TurnCompletion, TurnGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Hard ceiling on iterative-deepening depth, in turns.
    pub max_depth: u8,
    pub use_transposition_table: bool,
    /// With pruning off the search visits the full minimax tree.
    pub use_alpha_beta: bool,
    pub tt_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            use_transposition_table: true,
            use_alpha_beta: true,
            tt_capacity: TranspositionTable::DEFAULT_CAPACITY,
        }
    }
}

/// Outcome of one completed root search.
#[derive(Debug, Clone)]
pub struct RootSearchResult {
    pub turn: Turn,
    pub value: f64,
    pub depth: u8,
    /// Candidate turns considered at the root.
    pub root_candidates: usize,
}

/// Shift terminal values toward zero by the ply they were found at, so a
/// win in fewer turns outranks a later one.
#[inline]
fn adjust_for_ply(value: f64, ply: u32) -> f64 {
    if value > HEURISTIC_LIMIT {
        value - f64::from(ply)
    } else if value < -HEURISTIC_LIMIT {
        value + f64::from(ply)
    } else {
        value
    }
}

#[derive(Debug, Clone)]
pub struct SearchEngine<S: BoardScorer = OustHeuristic, C: TurnCompletion = GreedyCompletion> {
    pub scorer: S,
    pub generator: TurnGenerator<C>,
    pub config: SearchConfig,
    tt: TranspositionTable,
    nodes: u64,
    root_player: Player,
}

impl SearchEngine<OustHeuristic, GreedyCompletion> {
    pub fn with_defaults() -> Self {
        Self::new(
            OustHeuristic::default(),
            TurnGenerator::default(),
            SearchConfig::default(),
        )
    }
}

impl<S: BoardScorer, C: TurnCompletion> SearchEngine<S, C> {
    pub fn new(scorer: S, generator: TurnGenerator<C>, config: SearchConfig) -> Self {
        Self {
            scorer,
            generator,
            config,
            tt: TranspositionTable::with_capacity(config.tt_capacity),
            nodes: 0,
            root_player: Player::Black,
        }
    }

    /// Forget everything from a previous decision.
    pub fn reset(&mut self) {
        if self.tt.capacity() != self.config.tt_capacity.max(1) {
            self.tt = TranspositionTable::with_capacity(self.config.tt_capacity);
        } else {
            self.tt.reset();
        }
        self.nodes = 0;
    }

    #[inline]
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    #[inline]
    pub fn tt_stats(&self) -> TTStats {
        self.tt.stats()
    }

    fn leaf_value(&self, game_state: &GameState, ply: u32) -> f64 {
        adjust_for_ply(self.scorer.score(game_state, self.root_player), ply)
    }

    /// Search the root to `depth` turns. `None` if cancelled before the
    /// depth completed.
    pub fn search_root(
        &mut self,
        game_state: &GameState,
        depth: u8,
        cancel: &CancellationToken,
    ) -> Option<RootSearchResult> {
        let depth = depth.max(1);
        self.root_player = game_state.side_to_move();
        if cancel.is_cancelled() {
            return None;
        }
        self.nodes += 1;

        let key = game_state.fingerprint();
        let hint = if self.config.use_transposition_table {
            self.tt.probe(key).and_then(|e| e.best_move)
        } else {
            None
        };

        let candidates = self.generator.generate_with_hint(game_state, hint);
        if candidates.is_empty() {
            return Some(RootSearchResult {
                turn: Turn::pass(),
                value: self.leaf_value(game_state, 0),
                depth,
                root_candidates: 0,
            });
        }

        let mut alpha = f64::NEG_INFINITY;
        let beta = f64::INFINITY;
        let mut best: Option<(usize, f64)> = None;

        for (idx, candidate) in candidates.iter().enumerate() {
            let value = self.alpha_beta(&candidate.state_after, depth - 1, alpha, beta, 1, cancel)?;
            // Strictly better only: the first of equal turns is kept.
            if best.map_or(true, |(_, b)| value > b) {
                best = Some((idx, value));
            }
            if self.config.use_alpha_beta && value > alpha {
                alpha = value;
            }
        }

        let (best_idx, best_value) = best?;
        let best_turn = candidates[best_idx].turn.clone();

        if self.config.use_transposition_table {
            self.tt.store(TTEntry {
                key,
                depth,
                value: best_value,
                best_move: best_turn.first(),
            });
        }

        Some(RootSearchResult {
            turn: best_turn,
            value: best_value,
            depth,
            root_candidates: candidates.len(),
        })
    }

    fn alpha_beta(
        &mut self,
        game_state: &GameState,
        depth: u8,
        mut alpha: f64,
        mut beta: f64,
        ply: u32,
        cancel: &CancellationToken,
    ) -> Option<f64> {
        if cancel.is_cancelled() {
            return None;
        }
        self.nodes += 1;

        if depth == 0 || game_state.is_game_over() {
            return Some(self.leaf_value(game_state, ply));
        }

        let key = game_state.fingerprint();
        let mut hint = None;
        if self.config.use_transposition_table {
            if let Some(entry) = self.tt.probe(key) {
                if entry.depth >= depth {
                    return Some(entry.value);
                }
                hint = entry.best_move;
            }
        }

        let candidates = self.generator.generate_with_hint(game_state, hint);
        if candidates.is_empty() {
            return Some(self.leaf_value(game_state, ply));
        }

        let maximizing = game_state.side_to_move() == self.root_player;
        let mut best_value = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        let mut best_move = None;

        for candidate in &candidates {
            let value =
                self.alpha_beta(&candidate.state_after, depth - 1, alpha, beta, ply + 1, cancel)?;

            if maximizing {
                if value > best_value {
                    best_value = value;
                    best_move = candidate.turn.first();
                }
                alpha = alpha.max(value);
            } else {
                if value < best_value {
                    best_value = value;
                    best_move = candidate.turn.first();
                }
                beta = beta.min(value);
            }

            if self.config.use_alpha_beta && beta <= alpha {
                break;
            }
        }

        if self.config.use_transposition_table {
            self.tt.store(TTEntry {
                key,
                depth,
                value: best_value,
                best_move,
            });
        }

        Some(best_value)
    }
}

#[cfg(test)]
mod tests {
    use super::{SearchConfig, SearchEngine};
    use crate::game_state::game_state::GameState;
    use crate::game_state::game_types::{Geometry, Placement, Player};
    use crate::search::board_scoring::{is_decisive, OustHeuristic, WIN_SCORE};
    use crate::search::cancellation::CancellationToken;
    use crate::search::turn_generator::{TurnGenerationConfig, TurnGenerator};
    use crate::utils::board_parser::parse_board;

    fn engine(use_alpha_beta: bool, use_transposition_table: bool) -> SearchEngine {
        let generation = TurnGenerationConfig {
            top_k: 4,
            ..TurnGenerationConfig::default()
        };
        SearchEngine::new(
            OustHeuristic::default(),
            TurnGenerator::new(generation),
            SearchConfig {
                use_alpha_beta,
                use_transposition_table,
                ..SearchConfig::default()
            },
        )
    }

    #[test]
    fn alpha_beta_matches_plain_minimax() {
        let boards = [
            "square 3 B\n\
             B . .\n\
             . W .\n\
             . . .",
            "square 4 W\n\
             B . . W\n\
             . B . .\n\
             . . W .\n\
             . . . B",
        ];
        for text in boards {
            let state = parse_board(text).expect("parse");
            for depth in 1..=3 {
                let cancel = CancellationToken::new();
                let mut pruned = engine(true, false);
                let mut full = engine(false, false);
                let a = pruned.search_root(&state, depth, &cancel).expect("search");
                let b = full.search_root(&state, depth, &cancel).expect("search");
                assert_eq!(a.value.to_bits(), b.value.to_bits(), "depth {depth}");
                assert_eq!(a.turn, b.turn, "depth {depth}");
                assert!(pruned.nodes() <= full.nodes());
            }
        }
    }

    #[test]
    fn transposition_table_does_not_change_the_choice() {
        let boards = [
            "square 4 B\n\
             . . . .\n\
             . . . .\n\
             . . . .\n\
             . . . .",
            "square 4 W\n\
             B . . W\n\
             . B . .\n\
             . . W .\n\
             . . . B",
        ];
        for text in boards {
            let state = parse_board(text).expect("parse");
            let cancel = CancellationToken::new();
            let mut with_tt = engine(true, true);
            let mut without_tt = engine(true, false);
            let a = with_tt.search_root(&state, 4, &cancel).expect("search");
            let b = without_tt.search_root(&state, 4, &cancel).expect("search");
            assert!(with_tt.tt_stats().hits > 0, "{:?}", with_tt.tt_stats());
            assert_eq!(a.turn, b.turn);
            assert_eq!(without_tt.tt_stats().probes, 0);
        }
    }

    #[test]
    fn finds_the_immediate_win() {
        let state = parse_board(
            "square 4 B\n\
             B W . .\n\
             . . . .\n\
             . . . .\n\
             . . . .",
        )
        .expect("parse");
        let mut search = SearchEngine::with_defaults();
        let result = search
            .search_root(&state, 2, &CancellationToken::new())
            .expect("search");
        assert_eq!(result.turn.placements(), &[Placement::new(1, 0)]);
        assert!(is_decisive(result.value));
        assert_eq!(result.value, WIN_SCORE - 1.0);
    }

    #[test]
    fn cancelled_search_returns_none() {
        let state = GameState::new(Geometry::Hex, 3).expect("board");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut search = SearchEngine::with_defaults();
        assert!(search.search_root(&state, 3, &cancel).is_none());
    }

    #[test]
    fn no_candidates_yields_a_pass() {
        let state = parse_board(
            "square 2 W\n\
             B W\n\
             W B",
        )
        .expect("parse");
        let mut search = SearchEngine::with_defaults();
        let result = search
            .search_root(&state, 2, &CancellationToken::new())
            .expect("search");
        assert!(result.turn.is_empty());
        assert_eq!(result.root_candidates, 0);
        assert_eq!(state.side_to_move(), Player::White);
    }
}
