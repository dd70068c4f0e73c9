//! Terminal self-play demo.
//!
//! `cargo run --release -- [--side N] [--movetime MS] [--square]`
//!
//! The iterative engine plays Black against the seeded random engine and the
//! board is printed after every turn. Set `RUST_LOG=debug` to see the
//! per-iteration search trace.

use oust_engine::engines::engine_iterative::IterativeEngine;
use oust_engine::engines::engine_random::RandomEngine;
use oust_engine::engines::engine_trait::{Engine, GoParams};
use oust_engine::errors::OustResult;
use oust_engine::game_state::game_state::GameState;
use oust_engine::game_state::game_types::{Geometry, Player};
use oust_engine::utils::render_game_state::render_game_state;

const MAX_DEMO_TURNS: usize = 500;

fn arg_value(args: &[String], flag: &str) -> Option<u64> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

fn main() -> OustResult<()> {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    let side = arg_value(&args, "--side").unwrap_or(5) as usize;
    let movetime = arg_value(&args, "--movetime").unwrap_or(500);
    let geometry = if args.iter().any(|a| a == "--square") {
        Geometry::Square
    } else {
        Geometry::Hex
    };

    let mut state = GameState::new(geometry, side)?;
    let mut black = IterativeEngine::new();
    let mut white = RandomEngine::new(7);
    let params = GoParams {
        movetime_ms: Some(movetime),
        ..GoParams::default()
    };

    println!("{}", render_game_state(&state));
    for _ in 0..MAX_DEMO_TURNS {
        if state.is_game_over() {
            break;
        }
        if state.legal_placements().is_empty() {
            println!("{} passes", state.side_to_move());
            state.pass_turn()?;
            continue;
        }
        let mover = state.side_to_move();
        let out = match mover {
            Player::Black => black.choose_turn(&state, &params)?,
            Player::White => white.choose_turn(&state, &params)?,
        };
        for line in &out.info_lines {
            println!("{line}");
        }
        println!("{mover} plays {}", out.turn);
        state = out.turn.apply_to(&state)?;
        println!("{}", render_game_state(&state));
    }

    match (state.is_game_over(), state.winner()) {
        (true, Some(winner)) => println!("{winner} wins"),
        (true, None) => println!("draw"),
        (false, _) => println!("stopped after {MAX_DEMO_TURNS} turns"),
    }
    Ok(())
}
