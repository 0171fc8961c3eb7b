//! # Game Errors
//!
//! Per-call protocol failures are recoverable values. Bootstrap failures are
//! kept behind an `Arc` because the process-wide engine hands the same first
//! failure to every caller.

use std::sync::Arc;

use simple_chess_abi::{AbiError, GameState};
use simple_chess_native::BootstrapError;
use thiserror::Error;

/// Everything a game operation can fail with.
#[derive(Error, Debug, Clone)]
pub enum ChessError {
    /// The engine rejected a FEN position.
    #[error("invalid position: {fen}")]
    InvalidPosition {
        /// The rejected FEN.
        fen: String,
    },

    /// The engine rejected a move.
    #[error("illegal move: {notation}")]
    IllegalMove {
        /// The move in coordinate notation.
        notation: String,
    },

    /// A move could not be constructed.
    #[error("invalid move: {reason}")]
    InvalidMove {
        /// What was wrong with it.
        reason: &'static str,
    },

    /// Text that does not name a square.
    #[error("invalid square: {text:?}")]
    InvalidSquare {
        /// The text given.
        text: String,
    },

    /// A draw was claimed when none is claimable.
    #[error("no draw can be claimed in this position")]
    DrawNotClaimable,

    /// A mutation was attempted on a finished game.
    #[error("game is over ({state:?})")]
    GameOver {
        /// The terminal state.
        state: GameState,
    },

    /// The engine returned no record for an operation that cannot fail.
    #[error("native engine returned no game from {operation}")]
    NativeFailure {
        /// The native operation.
        operation: &'static str,
    },

    /// A native record held an undecodable value.
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// The native engine could not be brought up.
    #[error(transparent)]
    Bootstrap(Arc<BootstrapError>),
}

impl From<BootstrapError> for ChessError {
    fn from(err: BootstrapError) -> Self {
        Self::Bootstrap(Arc::new(err))
    }
}

/// Result type for game operations.
pub type ChessResult<T> = Result<T, ChessError>;
