//! Candidate turn generation.
//!
//! A turn can hold several placements, so branching on every legal sequence
//! is hopeless. The generator branches only on the first placement: legal
//! first placements are ranked by a one-ply evaluation, the best `top_k` are
//! kept, and each one is completed by a `TurnCompletion` policy until the
//! mover changes or the game ends.

use log::warn;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::game_state::game_state::GameState;
use crate::game_state::game_types::{Placement, Player};
use crate::game_state::turn::Turn;
use crate::search::board_scoring::{BoardScorer, OustHeuristic};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnGenerationConfig {
    /// First placements kept after ranking.
    pub top_k: usize,
    /// Hard cap on placements in one generated turn.
    pub max_turn_placements: usize,
    /// Drop quiet placements that land next to an enemy stone, unless that
    /// leaves nothing.
    pub filter_suicidal: bool,
    /// Upper bound of the deterministic tie-break noise added to ranking scores.
    pub tie_break_jitter: f64,
    pub seed: u64,
}

impl Default for TurnGenerationConfig {
    fn default() -> Self {
        Self {
            top_k: 8,
            max_turn_placements: 50,
            filter_suicidal: true,
            tie_break_jitter: 0.25,
            seed: 0x5EED_0057,
        }
    }
}

/// A complete turn with the position it produces.
#[derive(Debug, Clone)]
pub struct CandidateTurn {
    pub turn: Turn,
    pub state_after: GameState,
    /// Ranking score of the first placement, from the mover's perspective.
    pub order_score: f64,
}

/// Chooses the next placement while the mover keeps the turn after a capture.
pub trait TurnCompletion: Send + Sync {
    fn next_placement(&self, game_state: &GameState) -> Option<Placement>;
}

/// Picks the legal placement with the best one-ply score. Ties go to the
/// first placement in row-major order.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyCompletion {
    pub scorer: OustHeuristic,
}

impl GreedyCompletion {
    pub fn new() -> Self {
        Self {
            scorer: OustHeuristic::ordering(),
        }
    }
}

impl TurnCompletion for GreedyCompletion {
    fn next_placement(&self, game_state: &GameState) -> Option<Placement> {
        let mover = game_state.side_to_move();
        let mut best: Option<(Placement, f64)> = None;
        for placement in game_state.legal_placements() {
            let mut sim = game_state.clone();
            if let Err(err) = sim.apply_placement(placement) {
                warn!("skipping completion placement {placement}: {err}");
                continue;
            }
            let score = self.scorer.score(&sim, mover);
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((placement, score));
            }
        }
        best.map(|(p, _)| p)
    }
}

/// Deterministic noise in `[0, amplitude)` for a placement in a position.
///
/// Depends only on its arguments so the same node always orders its
/// children the same way, whatever order the tree is visited in.
pub fn tie_break_jitter(seed: u64, fingerprint: u64, placement: Placement, amplitude: f64) -> f64 {
    if amplitude <= 0.0 {
        return 0.0;
    }
    let cell = (u64::from(placement.row) << 8) | u64::from(placement.col);
    let mix = seed ^ fingerprint.rotate_left(17) ^ cell.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut rng = StdRng::seed_from_u64(mix);
    rng.random::<f64>() * amplitude
}

#[derive(Debug, Clone)]
pub struct TurnGenerator<C: TurnCompletion = GreedyCompletion> {
    pub config: TurnGenerationConfig,
    pub scorer: OustHeuristic,
    pub completion: C,
}

impl Default for TurnGenerator<GreedyCompletion> {
    fn default() -> Self {
        Self::new(TurnGenerationConfig::default())
    }
}

impl TurnGenerator<GreedyCompletion> {
    pub fn new(config: TurnGenerationConfig) -> Self {
        Self {
            config,
            scorer: OustHeuristic::ordering(),
            completion: GreedyCompletion::new(),
        }
    }
}

impl<C: TurnCompletion> TurnGenerator<C> {
    pub fn with_completion(config: TurnGenerationConfig, completion: C) -> Self {
        Self {
            config,
            scorer: OustHeuristic::ordering(),
            completion,
        }
    }

    /// Quiet placement next to an enemy stone: it cannot capture and hands
    /// the opponent a target.
    fn is_suicidal(game_state: &GameState, placement: Placement, mover: Player) -> bool {
        !game_state.touches_own_stone(placement, mover)
            && game_state.touches_enemy_stone(placement, mover)
    }

    /// Legal first placements, pre-filtered when configured.
    fn first_placements(&self, game_state: &GameState, mover: Player) -> Vec<Placement> {
        let legal = game_state.legal_placements();
        if !self.config.filter_suicidal {
            return legal;
        }
        let kept: Vec<Placement> = legal
            .iter()
            .copied()
            .filter(|&p| !Self::is_suicidal(game_state, p, mover))
            .collect();
        if kept.is_empty() {
            legal
        } else {
            kept
        }
    }

    /// Candidate turns for the side to move, best first.
    ///
    /// Empty only when the game is over or the mover has no legal placement.
    pub fn generate(&self, game_state: &GameState) -> Vec<CandidateTurn> {
        self.generate_with_hint(game_state, None)
    }

    /// Like `generate`, but a `hint` first placement (usually the stored best
    /// move of this position) is always kept and ranked first.
    pub fn generate_with_hint(
        &self,
        game_state: &GameState,
        hint: Option<Placement>,
    ) -> Vec<CandidateTurn> {
        if game_state.is_game_over() {
            return Vec::new();
        }
        let mover = game_state.side_to_move();
        let fingerprint = game_state.fingerprint();

        let mut ranked: Vec<(Placement, GameState, f64)> = Vec::new();
        for placement in self.first_placements(game_state, mover) {
            let mut after = game_state.clone();
            if let Err(err) = after.apply_placement(placement) {
                warn!("skipping first placement {placement}: {err}");
                continue;
            }
            let score = self.scorer.score(&after, mover)
                + tie_break_jitter(
                    self.config.seed,
                    fingerprint,
                    placement,
                    self.config.tie_break_jitter,
                );
            ranked.push((placement, after, score));
        }

        ranked.sort_by(|a, b| b.2.total_cmp(&a.2));
        if let Some(hint) = hint {
            if let Some(pos) = ranked.iter().position(|(p, _, _)| *p == hint) {
                let hinted = ranked.remove(pos);
                ranked.insert(0, hinted);
            }
        }
        ranked.truncate(self.config.top_k.max(1));

        ranked
            .into_iter()
            .map(|(placement, after, order_score)| {
                let (turn, state_after) = self.complete_turn(placement, after, mover);
                CandidateTurn {
                    turn,
                    state_after,
                    order_score,
                }
            })
            .collect()
    }

    /// Extend a turn that starts with `first` until the mover changes, the
    /// game ends, or the placement cap is hit.
    fn complete_turn(&self, first: Placement, mut state: GameState, mover: Player) -> (Turn, GameState) {
        let mut turn = Turn::from_placements(vec![first]);
        while !state.is_game_over() && state.side_to_move() == mover {
            if turn.len() >= self.config.max_turn_placements {
                warn!(
                    "capture chain truncated after {} placements",
                    self.config.max_turn_placements
                );
                break;
            }
            let Some(next) = self.completion.next_placement(&state) else {
                break;
            };
            if let Err(err) = state.apply_placement(next) {
                warn!("capture chain stopped at {next}: {err}");
                break;
            }
            turn.push(next);
        }
        (turn, state)
    }
}
