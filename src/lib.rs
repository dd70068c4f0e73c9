//! Crate root module declarations for the Oust decision engine.
//!
//! This file exposes all top-level subsystems (rule engine, search, engines,
//! and utility helpers) so binaries, benches, and external tooling can import
//! stable module paths.

pub mod errors;

pub mod game_state {
    pub mod derived_stats;
    pub mod game_state;
    pub mod game_types;
    pub mod turn;
}

pub mod search {
    pub mod alpha_beta;
    pub mod board_scoring;
    pub mod cancellation;
    pub mod iterative_deepening;
    pub mod transposition_table;
    pub mod turn_generator;
    pub mod zobrist;
}

pub mod engines {
    pub mod engine_iterative;
    pub mod engine_random;
    pub mod engine_trait;
    pub mod time_management;
}

pub mod utils {
    pub mod board_parser;
    pub mod engine_match_harness;
    pub mod render_game_state;
}
