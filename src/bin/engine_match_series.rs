//! Standalone engine-vs-engine series runner.
//!
//! Run with:
//! `cargo run --release --bin engine_match_series`
//! `cargo run --release --bin engine_match_series -- --verbose`

use oust_engine::engines::engine_iterative::IterativeEngine;
use oust_engine::engines::engine_random::RandomEngine;
use oust_engine::engines::engine_trait::Engine;
use oust_engine::errors::OustError;
use oust_engine::game_state::game_types::Geometry;
use oust_engine::utils::engine_match_harness::{
    play_engine_match_series, MatchConfig, MatchSeriesConfig,
};

fn main() -> Result<(), OustError> {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose" || a == "-v");

    // Customize these two lines to experiment with different engines/depths.
    let player1 = || Box::new(IterativeEngine::fixed_depth(3)) as Box<dyn Engine>;
    let player2 = || Box::new(RandomEngine::new(99)) as Box<dyn Engine>;

    let stats = play_engine_match_series(
        player1,
        player2,
        MatchSeriesConfig {
            games: 10,
            base_seed: 1234,
            per_game: MatchConfig {
                geometry: Geometry::Hex,
                side: 5,
                max_turns: 300,
                opening_min_turns: 2,
                opening_max_turns: 6,
                ..MatchConfig::default()
            },
            verbose,
        },
    )?;

    println!("{}", stats.report());
    println!("outcomes: {:?}", stats.outcomes);
    Ok(())
}
