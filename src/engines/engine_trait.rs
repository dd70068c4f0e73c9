//! Engine abstraction layer used by hosts and the match harness.
//!
//! Defines common input parameters and output payloads so different engine
//! strategies can be selected at runtime behind a single trait interface.

use std::sync::{atomic::AtomicBool, Arc};

use crate::errors::OustResult;
use crate::game_state::game_state::GameState;
use crate::game_state::turn::Turn;

/// Per-turn search limits supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct GoParams {
    /// Fixed depth in turns; overrides the engine's configured ceiling.
    pub depth: Option<u8>,
    /// Wall-clock budget for this turn.
    pub movetime_ms: Option<u64>,
    /// Remaining clocks, used by clock-based time management.
    pub black_time_ms: Option<u64>,
    pub white_time_ms: Option<u64>,
    /// Search until stopped through the stop signal.
    pub infinite: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    /// Chosen turn; empty means pass.
    pub turn: Turn,
    pub score: Option<f64>,
    pub depth_reached: u8,
    pub nodes: u64,
    pub info_lines: Vec<String>,
}

pub trait Engine: Send {
    fn name(&self) -> &str;

    fn new_game(&mut self) {}

    fn set_option(&mut self, _name: &str, _value: &str) -> OustResult<()> {
        Ok(())
    }

    /// Install a host-owned flag that aborts the current search when raised.
    fn set_stop_signal(&mut self, _stop_signal: Option<Arc<AtomicBool>>) {}

    fn choose_turn(&mut self, game_state: &GameState, params: &GoParams) -> OustResult<EngineOutput>;
}
