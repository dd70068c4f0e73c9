//! Errors used throughout the Oust engine.
//!
//! `OustError` is the single error type returned by the rule engine, the board
//! text format and the host-facing engine layer. The decision core itself
//! never returns errors to its caller: a cancelled or degenerate search still
//! produces a (possibly empty) turn.
//!
//! Usage guidelines:
//! - Rule-engine operations that can be handed bad input (`apply_placement`,
//!   board construction, diagram parsing) return `OustResult`.
//! - Search code that simulates placements it obtained from
//!   `legal_placements` treats an error as a rule-engine inconsistency: it
//!   logs it and skips the candidate instead of propagating it.

use thiserror::Error;

use crate::game_state::game_types::Placement;

pub type OustResult<T> = Result<T, OustError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OustError {
    /// The coordinate does not name a cell of this board.
    #[error("placement {0} is not on the board")]
    OutOfBounds(Placement),

    /// The target cell already holds a stone.
    #[error("cell {0} is already occupied")]
    CellOccupied(Placement),

    /// The placement touches friendly stones without making a legal capture.
    #[error("illegal placement {placement}: {reason}")]
    IllegalPlacement {
        placement: Placement,
        reason: &'static str,
    },

    /// No further placements are accepted once a winner is known.
    #[error("the game is already over")]
    GameOver,

    /// Board sizes must fit the fingerprint tables.
    #[error("unsupported board size {0}")]
    InvalidBoardSize(usize),

    /// A passing move was requested while legal placements exist.
    #[error("cannot pass while {0} legal placements are available")]
    PassNotAllowed(usize),

    /// The header line of a board diagram is malformed.
    #[error("invalid board header: {0}")]
    InvalidBoardHeader(String),

    /// An unexpected character was found in a board diagram.
    #[error("invalid board token '{0}'")]
    InvalidBoardToken(char),

    /// A board diagram row has the wrong number of cells, or rows are missing.
    #[error("invalid board layout: {0}")]
    InvalidBoardLayout(String),

    /// An engine returned a turn that does not replay legally.
    #[error("engine '{engine}' returned an invalid turn: {turn}")]
    InvalidTurn { engine: String, turn: String },

    /// `Engine::set_option` was called with a name the engine does not know.
    #[error("unknown engine option '{0}'")]
    UnknownOption(String),

    /// `Engine::set_option` was called with a value that does not parse.
    #[error("invalid value '{value}' for option '{name}'")]
    InvalidOptionValue { name: String, value: String },
}
