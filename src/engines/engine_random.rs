//! Random-placement baseline engine.
//!
//! Picks uniformly among legal placements, and keeps picking while a capture
//! lets it place again. Seeded, so a game against it can be replayed; used as
//! a sparring partner in match series and integration tests.

use log::warn;
use rand::prelude::IndexedRandom;
use rand::{rngs::StdRng, SeedableRng};

use crate::engines::engine_trait::{Engine, EngineOutput, GoParams};
use crate::errors::{OustError, OustResult};
use crate::game_state::game_state::GameState;
use crate::game_state::turn::Turn;

pub const RANDOM_TURN_CAP: usize = 50;

pub struct RandomEngine {
    seed: u64,
    rng: StdRng,
}

impl RandomEngine {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A complete random turn for the side to move; empty when it must pass.
    pub fn random_turn(&mut self, game_state: &GameState) -> OustResult<Turn> {
        let mover = game_state.side_to_move();
        let mut state = game_state.clone();
        let mut turn = Turn::new();
        while !state.is_game_over() && state.side_to_move() == mover {
            if turn.len() >= RANDOM_TURN_CAP {
                warn!("random turn truncated after {RANDOM_TURN_CAP} placements");
                break;
            }
            let legal = state.legal_placements();
            let Some(&placement) = legal.as_slice().choose(&mut self.rng) else {
                break;
            };
            state.apply_placement(placement)?;
            turn.push(placement);
        }
        Ok(turn)
    }
}

impl Default for RandomEngine {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Engine for RandomEngine {
    fn name(&self) -> &str {
        "Oust Random"
    }

    fn new_game(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    fn set_option(&mut self, name: &str, value: &str) -> OustResult<()> {
        if name.eq_ignore_ascii_case("Seed") {
            self.seed = value
                .trim()
                .parse::<u64>()
                .map_err(|_| OustError::InvalidOptionValue {
                    name: name.to_owned(),
                    value: value.to_owned(),
                })?;
            self.rng = StdRng::seed_from_u64(self.seed);
            return Ok(());
        }
        Err(OustError::UnknownOption(name.to_owned()))
    }

    fn choose_turn(&mut self, game_state: &GameState, params: &GoParams) -> OustResult<EngineOutput> {
        if game_state.is_game_over() {
            return Err(OustError::GameOver);
        }
        let legal = game_state.legal_placements().len();
        let turn = self.random_turn(game_state)?;

        let mut out = EngineOutput {
            turn,
            ..EngineOutput::default()
        };
        out.info_lines.push(format!(
            "info string random_engine legal_placements {legal}"
        ));
        if let Some(depth) = params.depth {
            out.info_lines
                .push(format!("info string random_engine ignoring_depth {depth}"));
        }
        Ok(out)
    }
}
