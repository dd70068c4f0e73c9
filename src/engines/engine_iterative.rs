//! Iterative-deepening alpha-beta engine.
//!
//! Wraps the `IterativeDeepeningController` with host-facing configuration:
//! runtime options, time management, and cancellation through either an
//! engine-owned token or a host-installed stop signal. `fixed_depth` gives
//! the depth-limited player with no deadline.

use std::sync::{atomic::AtomicBool, Arc};
use std::time::Duration;

use crate::engines::engine_trait::{Engine, EngineOutput, GoParams};
use crate::engines::time_management::{resolve_turn_budget, TimeBudget, TimeManagementStrategy};
use crate::errors::{OustError, OustResult};
use crate::game_state::game_state::GameState;
use crate::search::alpha_beta::SearchConfig;
use crate::search::board_scoring::{HeuristicWeights, OustHeuristic};
use crate::search::cancellation::CancellationToken;
use crate::search::iterative_deepening::{Decision, IterativeDeepeningController};
use crate::search::turn_generator::{TurnGenerationConfig, TurnGenerator};

pub struct IterativeEngine {
    controller: IterativeDeepeningController,
    budget: TimeBudget,
    time_strategy: TimeManagementStrategy,
    fixed_depth: bool,
    cancel: CancellationToken,
    stop_signal: Option<Arc<AtomicBool>>,
}

impl IterativeEngine {
    pub fn new() -> Self {
        Self::with_config(
            HeuristicWeights::default(),
            TurnGenerationConfig::default(),
            SearchConfig::default(),
        )
    }

    pub fn with_config(
        weights: HeuristicWeights,
        generation: TurnGenerationConfig,
        search: SearchConfig,
    ) -> Self {
        Self {
            controller: IterativeDeepeningController::new(
                OustHeuristic::new(weights),
                TurnGenerator::new(generation),
                search,
            ),
            budget: TimeBudget::default(),
            time_strategy: TimeManagementStrategy::FixedPerTurn,
            fixed_depth: false,
            cancel: CancellationToken::new(),
            stop_signal: None,
        }
    }

    /// Search exactly to `depth` turns every time, with no deadline.
    pub fn fixed_depth(depth: u8) -> Self {
        let mut engine = Self::with_config(
            HeuristicWeights::default(),
            TurnGenerationConfig::default(),
            SearchConfig {
                max_depth: depth.max(1),
                ..SearchConfig::default()
            },
        );
        engine.fixed_depth = true;
        engine
    }

    pub fn with_budget(mut self, budget: TimeBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_time_strategy(mut self, strategy: TimeManagementStrategy) -> Self {
        self.time_strategy = strategy;
        self
    }

    pub fn search_config(&self) -> SearchConfig {
        self.controller.search.config
    }

    pub fn generation_config(&self) -> TurnGenerationConfig {
        self.controller.search.generator.config
    }

    /// Token sharing this engine's stop flag; raise it from another thread to
    /// interrupt `decide`.
    ///
    /// The flag is cleared when a decision starts, so a cancel raised before
    /// `decide`/`choose_turn` begins is lost. Hosts that need a sticky stop
    /// install their own flag with `set_stop_signal`.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
        if let Some(stop) = &self.stop_signal {
            CancellationToken::from_flag(Arc::clone(stop)).cancel();
        }
    }

    fn active_token(&self) -> CancellationToken {
        match &self.stop_signal {
            Some(stop) => CancellationToken::from_flag(Arc::clone(stop)),
            None => self.cancel.clone(),
        }
    }

    /// Decide with the engine's own budget and depth ceiling.
    pub fn decide(&mut self, game_state: &GameState) -> Decision {
        let budget = if self.fixed_depth {
            None
        } else {
            Some(self.budget.effective())
        };
        self.run(game_state, budget, None)
    }

    fn run(&mut self, game_state: &GameState, budget: Option<Duration>, depth: Option<u8>) -> Decision {
        if self.stop_signal.is_none() {
            self.cancel.reset();
        }
        let token = self.active_token();

        let configured = self.controller.search.config.max_depth;
        if let Some(depth) = depth {
            self.controller.search.config.max_depth = depth.max(1);
        }
        let decision = self.controller.decide(game_state, budget, &token);
        self.controller.search.config.max_depth = configured;
        decision
    }
}

impl Default for IterativeEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_option<T: std::str::FromStr>(name: &str, value: &str) -> OustResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| OustError::InvalidOptionValue {
            name: name.to_owned(),
            value: value.to_owned(),
        })
}

fn parse_bool_option(name: &str, value: &str) -> OustResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(OustError::InvalidOptionValue {
            name: name.to_owned(),
            value: value.to_owned(),
        }),
    }
}

impl Engine for IterativeEngine {
    fn name(&self) -> &str {
        "Oust Iterative"
    }

    fn new_game(&mut self) {
        self.controller.search.reset();
    }

    fn set_option(&mut self, name: &str, value: &str) -> OustResult<()> {
        if name.eq_ignore_ascii_case("MaxDepth") {
            let depth = parse_option::<u8>(name, value)?;
            self.controller.search.config.max_depth = depth.max(1);
            return Ok(());
        }
        if name.eq_ignore_ascii_case("TopK") {
            let top_k = parse_option::<usize>(name, value)?;
            self.controller.search.generator.config.top_k = top_k.max(1);
            return Ok(());
        }
        if name.eq_ignore_ascii_case("MoveTimeMs") {
            self.budget.budget_ms = parse_option::<u64>(name, value)?;
            return Ok(());
        }
        if name.eq_ignore_ascii_case("SafetyMarginMs") {
            self.budget.safety_margin_ms = parse_option::<u64>(name, value)?;
            return Ok(());
        }
        if name.eq_ignore_ascii_case("Seed") {
            self.controller.search.generator.config.seed = parse_option::<u64>(name, value)?;
            return Ok(());
        }
        if name.eq_ignore_ascii_case("UseTT") {
            self.controller.search.config.use_transposition_table =
                parse_bool_option(name, value)?;
            return Ok(());
        }
        if name.eq_ignore_ascii_case("UseAlphaBeta") {
            self.controller.search.config.use_alpha_beta = parse_bool_option(name, value)?;
            return Ok(());
        }
        if name.eq_ignore_ascii_case("TimeStrategy") {
            self.time_strategy = match value.trim().to_ascii_lowercase().as_str() {
                "fixed" => TimeManagementStrategy::FixedPerTurn,
                "clock" | "fraction" => TimeManagementStrategy::ClockFraction,
                _ => {
                    return Err(OustError::InvalidOptionValue {
                        name: name.to_owned(),
                        value: value.to_owned(),
                    })
                }
            };
            return Ok(());
        }
        Err(OustError::UnknownOption(name.to_owned()))
    }

    fn set_stop_signal(&mut self, stop_signal: Option<Arc<AtomicBool>>) {
        self.stop_signal = stop_signal;
    }

    fn choose_turn(&mut self, game_state: &GameState, params: &GoParams) -> OustResult<EngineOutput> {
        if game_state.is_game_over() {
            return Err(OustError::GameOver);
        }

        let depth = params.depth.or(self
            .fixed_depth
            .then_some(self.controller.search.config.max_depth));
        let effective = GoParams {
            depth,
            ..params.clone()
        };
        let budget = resolve_turn_budget(game_state, &effective, self.time_strategy, self.budget);

        let decision = self.run(game_state, budget, depth);

        let mut out = EngineOutput {
            turn: decision.turn.clone(),
            score: Some(decision.score),
            depth_reached: decision.depth_reached,
            nodes: decision.nodes,
            info_lines: Vec::new(),
        };
        for it in &decision.iterations {
            out.info_lines.push(format!(
                "info depth {} score {:.2} nodes {} time {} turn {}",
                it.depth,
                it.value,
                it.nodes,
                it.elapsed.as_millis(),
                it.turn
            ));
        }
        out.info_lines.push(format!(
            "info string iterative_engine budget_ms {} tt_probes {} tt_hits {} tt_stores {} tt_clears {}",
            budget.map_or_else(|| "none".to_owned(), |b| b.as_millis().to_string()),
            decision.tt_stats.probes,
            decision.tt_stats.hits,
            decision.tt_stats.stores,
            decision.tt_stats.clears
        ));
        if decision.depth_reached == 0 && !decision.turn.is_empty() {
            out.info_lines
                .push("info string iterative_engine fallback_turn".to_owned());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::IterativeEngine;
    use crate::engines::engine_trait::{Engine, GoParams};
    use crate::errors::OustError;
    use crate::game_state::game_state::GameState;
    use crate::game_state::game_types::{Geometry, Placement};
    use crate::utils::board_parser::parse_board;
    use std::sync::{atomic::AtomicBool, Arc};

    #[test]
    fn fixed_depth_engine_reports_requested_depth() {
        let state = GameState::new(Geometry::Square, 4).expect("board");
        let mut engine = IterativeEngine::fixed_depth(2);
        let out = engine
            .choose_turn(&state, &GoParams::default())
            .expect("engine should choose a turn");
        assert_eq!(out.depth_reached, 2);
        assert!(out.turn.is_valid_for(&state));
        assert!(out.info_lines.iter().any(|l| l.starts_with("info depth 2")));
        assert!(out.info_lines.iter().any(|l| l.contains("budget_ms none")));
        // The configured ceiling is not changed by a per-call override.
        let out = engine
            .choose_turn(
                &state,
                &GoParams {
                    depth: Some(1),
                    ..GoParams::default()
                },
            )
            .expect("engine should choose a turn");
        assert_eq!(out.depth_reached, 1);
        assert_eq!(engine.search_config().max_depth, 2);
    }

    #[test]
    fn takes_the_winning_capture() {
        let state = parse_board(
            "square 4 B\n\
             B W . .\n\
             . . . .\n\
             . . . .\n\
             . . . .",
        )
        .expect("parse");
        let mut engine = IterativeEngine::new();
        let decision = engine.decide(&state);
        assert_eq!(decision.turn.placements(), &[Placement::new(1, 0)]);
    }

    #[test]
    fn options_are_validated() {
        let mut engine = IterativeEngine::new();
        engine.set_option("TopK", "5").expect("valid");
        engine.set_option("UseTT", "off").expect("valid");
        engine.set_option("Seed", "42").expect("valid");
        assert_eq!(engine.generation_config().top_k, 5);
        assert_eq!(engine.generation_config().seed, 42);
        assert!(!engine.search_config().use_transposition_table);

        assert_eq!(
            engine.set_option("MaxDepth", "deep").unwrap_err(),
            OustError::InvalidOptionValue {
                name: "MaxDepth".to_owned(),
                value: "deep".to_owned(),
            }
        );
        assert_eq!(
            engine.set_option("Ponder", "true").unwrap_err(),
            OustError::UnknownOption("Ponder".to_owned())
        );
    }

    #[test]
    fn raised_stop_signal_yields_the_fallback() {
        let state = GameState::new(Geometry::Hex, 4).expect("board");
        let mut engine = IterativeEngine::new();
        engine.set_stop_signal(Some(Arc::new(AtomicBool::new(true))));
        let out = engine
            .choose_turn(&state, &GoParams::default())
            .expect("engine should choose a turn");
        assert_eq!(out.depth_reached, 0);
        assert!(!out.turn.is_empty());
        assert!(out
            .info_lines
            .iter()
            .any(|l| l.contains("fallback_turn")));
    }

    #[test]
    fn finished_game_is_an_error() {
        let mut state = parse_board(
            "square 3 B\n\
             B W .\n\
             . . .\n\
             . . .",
        )
        .expect("parse");
        state.apply_placement(Placement::new(1, 0)).expect("win");
        let mut engine = IterativeEngine::fixed_depth(1);
        assert_eq!(
            engine.choose_turn(&state, &GoParams::default()).unwrap_err(),
            OustError::GameOver
        );
    }
}
