//! Zobrist hashing for board fingerprints.
//!
//! The keys are generated from a fixed seed so fingerprints are deterministic
//! across runs, which keeps transposition behaviour reproducible in tests.

use std::sync::OnceLock;

use crate::game_state::game_state::GameState;
use crate::game_state::game_types::Player;

/// Largest backing-grid width the key tables cover.
pub const MAX_GRID_WIDTH: usize = 32;
const MAX_CELLS: usize = MAX_GRID_WIDTH * MAX_GRID_WIDTH;

#[derive(Debug)]
struct ZobristTables {
    stones: [[u64; MAX_CELLS]; 2],
    side_to_move: u64,
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

#[inline]
fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> ZobristTables {
    let mut seed: u64 = 0x0A57_0A57_D1CE_5EED;

    let mut stones = [[0u64; MAX_CELLS]; 2];
    for player in &mut stones {
        for cell in player.iter_mut() {
            *cell = next_random_u64(&mut seed);
        }
    }

    let side_to_move = next_random_u64(&mut seed);

    ZobristTables {
        stones,
        side_to_move,
    }
}

#[inline]
fn next_random_u64(state: &mut u64) -> u64 {
    // splitmix64
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Key for a stone of `player` on backing-grid cell `cell_index`.
#[inline]
pub fn stone_key(player: Player, cell_index: usize) -> u64 {
    tables().stones[player.index()][cell_index]
}

/// Side-to-move toggle key (xor in when White is to move).
#[inline]
pub fn side_to_move_key() -> u64 {
    tables().side_to_move
}

/// Compute the full fingerprint from scratch.
pub fn compute_zobrist_key(state: &GameState) -> u64 {
    let mut key = 0u64;
    for p in state.on_board_cells() {
        if let Some(owner) = state.owner(p) {
            key ^= stone_key(owner, state.cell_index(p));
        }
    }
    if state.side_to_move() == Player::White {
        key ^= side_to_move_key();
    }
    key
}
