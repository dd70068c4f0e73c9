//! Minimal head-to-head engine match harness for local testing.
//!
//! This module runs two `Engine` implementations against each other with an
//! optional seeded random opening prefix. Every returned turn is replayed
//! against the rules before it is applied, so a harness run doubles as a
//! turn-validity check.

use chrono::{DateTime, Local};
use log::info;
use rand::prelude::IndexedRandom;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Instant;

use crate::engines::engine_trait::{Engine, GoParams};
use crate::errors::{OustError, OustResult};
use crate::game_state::game_state::GameState;
use crate::game_state::game_types::{Geometry, Player};
use crate::game_state::turn::Turn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Win(Player),
    /// Game ended by two passes with equal stone counts.
    Draw,
    MaxTurns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerId {
    Player1,
    Player2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesOutcome {
    PlayerWin { player: PlayerId, color: Player },
    Draw,
    MaxTurns,
}

#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub geometry: Geometry,
    pub side: usize,
    pub max_turns: u16,
    pub opening_min_turns: u8,
    pub opening_max_turns: u8,
    pub go_params: GoParams,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            geometry: Geometry::Hex,
            side: 7,
            max_turns: 400,
            opening_min_turns: 2,
            opening_max_turns: 6,
            go_params: GoParams::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    pub final_state: GameState,
    pub started_at: DateTime<Local>,
    pub opening_turns: Vec<Turn>,
    pub played_turns: Vec<Turn>,
    pub black_turn_count: u32,
    pub white_turn_count: u32,
    pub black_total_time_ns: u128,
    pub white_total_time_ns: u128,
}

#[derive(Debug, Clone)]
pub struct MatchSeriesConfig {
    pub games: u16,
    pub base_seed: u64,
    pub per_game: MatchConfig,
    pub verbose: bool,
}

impl Default for MatchSeriesConfig {
    fn default() -> Self {
        Self {
            games: 9,
            base_seed: 0,
            per_game: MatchConfig::default(),
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchSeriesStats {
    pub games: u16,
    pub player1_wins: u16,
    pub player2_wins: u16,
    pub draws: u16,
    pub unfinished: u16,
    pub outcomes: Vec<SeriesOutcome>,
    pub player1_turns: u32,
    pub player2_turns: u32,
    pub player1_total_time_ns: u128,
    pub player2_total_time_ns: u128,
    pub player1_avg_turn_time_ms: f64,
    pub player2_avg_turn_time_ms: f64,
    pub overall_avg_turn_time_ms: f64,
}

impl MatchSeriesStats {
    pub fn report(&self) -> String {
        format!(
            "games={} player1_wins={} player2_wins={} draws={} unfinished={} p1_avg_ms={:.3} p2_avg_ms={:.3} overall_avg_ms={:.3}",
            self.games,
            self.player1_wins,
            self.player2_wins,
            self.draws,
            self.unfinished,
            self.player1_avg_turn_time_ms,
            self.player2_avg_turn_time_ms,
            self.overall_avg_turn_time_ms
        )
    }
}

/// Play a single seeded engine-vs-engine match.
///
/// `engine_black` moves first.
pub fn play_engine_match(
    mut engine_black: Box<dyn Engine>,
    mut engine_white: Box<dyn Engine>,
    seed: u64,
    config: MatchConfig,
) -> OustResult<MatchResult> {
    let start = GameState::new(config.geometry, config.side)?;
    play_match_internal(start, &mut engine_black, &mut engine_white, seed, config, true)
}

/// Play a match from a caller-provided position, without random opening turns.
pub fn play_engine_match_from_state(
    mut engine_black: Box<dyn Engine>,
    mut engine_white: Box<dyn Engine>,
    start_state: GameState,
    seed: u64,
    config: MatchConfig,
) -> OustResult<MatchResult> {
    play_match_internal(
        start_state,
        &mut engine_black,
        &mut engine_white,
        seed,
        config,
        false,
    )
}

fn play_match_internal(
    mut state: GameState,
    engine_black: &mut Box<dyn Engine>,
    engine_white: &mut Box<dyn Engine>,
    seed: u64,
    config: MatchConfig,
    apply_random_opening: bool,
) -> OustResult<MatchResult> {
    let started_at = Local::now();
    engine_black.new_game();
    engine_white.new_game();

    let opening_turns = if apply_random_opening {
        let (after, turns) = apply_seeded_random_opening(
            &state,
            seed,
            config.opening_min_turns,
            config.opening_max_turns,
        )?;
        state = after;
        turns
    } else {
        Vec::new()
    };

    let mut result = MatchResult {
        outcome: MatchOutcome::MaxTurns,
        final_state: state.clone(),
        started_at,
        opening_turns,
        played_turns: Vec::new(),
        black_turn_count: 0,
        white_turn_count: 0,
        black_total_time_ns: 0,
        white_total_time_ns: 0,
    };

    for _ in 0..config.max_turns {
        if state.is_game_over() {
            break;
        }
        if state.legal_placements().is_empty() {
            state.pass_turn()?;
            result.played_turns.push(Turn::pass());
            continue;
        }

        let mover = state.side_to_move();
        let engine = match mover {
            Player::Black => &mut *engine_black,
            Player::White => &mut *engine_white,
        };
        let started = Instant::now();
        let out = engine.choose_turn(&state, &config.go_params)?;
        let elapsed_ns = started.elapsed().as_nanos();

        if out.turn.is_empty() || !out.turn.is_valid_for(&state) {
            return Err(OustError::InvalidTurn {
                engine: engine.name().to_owned(),
                turn: out.turn.to_string(),
            });
        }

        match mover {
            Player::Black => {
                result.black_turn_count = result.black_turn_count.saturating_add(1);
                result.black_total_time_ns = result.black_total_time_ns.saturating_add(elapsed_ns);
            }
            Player::White => {
                result.white_turn_count = result.white_turn_count.saturating_add(1);
                result.white_total_time_ns = result.white_total_time_ns.saturating_add(elapsed_ns);
            }
        }

        state = out.turn.apply_to(&state)?;
        result.played_turns.push(out.turn);
    }

    if state.is_game_over() {
        result.outcome = match state.winner() {
            Some(winner) => MatchOutcome::Win(winner),
            None => MatchOutcome::Draw,
        };
    }
    result.final_state = state;
    Ok(result)
}

/// Play a series of matches and aggregate win/loss/draw statistics.
///
/// Player colors are randomized each game (deterministic from `base_seed`).
pub fn play_engine_match_series<F1, F2>(
    player1_factory: F1,
    player2_factory: F2,
    config: MatchSeriesConfig,
) -> OustResult<MatchSeriesStats>
where
    F1: Fn() -> Box<dyn Engine>,
    F2: Fn() -> Box<dyn Engine>,
{
    let mut stats = MatchSeriesStats {
        games: config.games,
        ..MatchSeriesStats::default()
    };
    let mut color_rng = StdRng::seed_from_u64(config.base_seed ^ 0xA5A5_5A5A_0123_4567);

    for i in 0..config.games {
        let player1_is_black = color_rng.random_bool(0.5);
        let seed = config.base_seed.wrapping_add(u64::from(i));

        let result = if player1_is_black {
            play_engine_match(
                player1_factory(),
                player2_factory(),
                seed,
                config.per_game.clone(),
            )?
        } else {
            play_engine_match(
                player2_factory(),
                player1_factory(),
                seed,
                config.per_game.clone(),
            )?
        };

        let (p1_turns, p1_ns, p2_turns, p2_ns) = if player1_is_black {
            (
                result.black_turn_count,
                result.black_total_time_ns,
                result.white_turn_count,
                result.white_total_time_ns,
            )
        } else {
            (
                result.white_turn_count,
                result.white_total_time_ns,
                result.black_turn_count,
                result.black_total_time_ns,
            )
        };
        stats.player1_turns = stats.player1_turns.saturating_add(p1_turns);
        stats.player2_turns = stats.player2_turns.saturating_add(p2_turns);
        stats.player1_total_time_ns = stats.player1_total_time_ns.saturating_add(p1_ns);
        stats.player2_total_time_ns = stats.player2_total_time_ns.saturating_add(p2_ns);

        let mapped = match result.outcome {
            MatchOutcome::Win(color) => {
                let player1_won = (color == Player::Black) == player1_is_black;
                if player1_won {
                    stats.player1_wins += 1;
                    SeriesOutcome::PlayerWin {
                        player: PlayerId::Player1,
                        color,
                    }
                } else {
                    stats.player2_wins += 1;
                    SeriesOutcome::PlayerWin {
                        player: PlayerId::Player2,
                        color,
                    }
                }
            }
            MatchOutcome::Draw => {
                stats.draws += 1;
                SeriesOutcome::Draw
            }
            MatchOutcome::MaxTurns => {
                stats.unfinished += 1;
                SeriesOutcome::MaxTurns
            }
        };
        stats.outcomes.push(mapped);

        if config.verbose {
            info!(
                "[series] {} game {}/{} seed={} player1={} result={:?} turns={}",
                result.started_at.format("%Y-%m-%d %H:%M:%S"),
                i + 1,
                config.games,
                seed,
                if player1_is_black { "Black" } else { "White" },
                mapped,
                result.played_turns.len()
            );
        }
    }

    stats.player1_avg_turn_time_ms =
        avg_ns_per_turn_ms(stats.player1_total_time_ns, stats.player1_turns);
    stats.player2_avg_turn_time_ms =
        avg_ns_per_turn_ms(stats.player2_total_time_ns, stats.player2_turns);

    let total_ns = stats
        .player1_total_time_ns
        .saturating_add(stats.player2_total_time_ns);
    let total_turns = stats.player1_turns.saturating_add(stats.player2_turns);
    stats.overall_avg_turn_time_ms = avg_ns_per_turn_ms(total_ns, total_turns);

    Ok(stats)
}

#[inline]
fn avg_ns_per_turn_ms(total_ns: u128, turns: u32) -> f64 {
    if turns == 0 {
        0.0
    } else {
        (total_ns as f64) / (turns as f64) / 1_000_000.0
    }
}

/// Play a seeded number of uniformly random turns from `initial`.
fn apply_seeded_random_opening(
    initial: &GameState,
    seed: u64,
    min_turns: u8,
    max_turns: u8,
) -> OustResult<(GameState, Vec<Turn>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = initial.clone();
    let mut turns = Vec::new();

    let low = min_turns.min(max_turns);
    let high = max_turns.max(min_turns);
    let target_turns = if low == high {
        low
    } else {
        rng.random_range(low..=high)
    };

    for _ in 0..target_turns {
        if state.is_game_over() {
            break;
        }
        let mover = state.side_to_move();
        let mut turn = Turn::new();
        while !state.is_game_over() && state.side_to_move() == mover {
            let legal = state.legal_placements();
            let Some(&placement) = legal.as_slice().choose(&mut rng) else {
                break;
            };
            state.apply_placement(placement)?;
            turn.push(placement);
        }
        if turn.is_empty() {
            state.pass_turn()?;
        }
        turns.push(turn);
    }

    Ok((state, turns))
}
