//! # Simple Chess
//!
//! Safe game handles over the native `simple-chess-games` engine.
//!
//! ```text
//! ┌─────────────────┐   ┌─────────────────────┐   ┌──────────────────┐
//! │ simple_chess    │   │ simple_chess_native │   │ simple_chess_abi │
//! │                 │──▶│                     │──▶│                  │
//! │ • GameManager   │   │ • Platform resolver │   │ • #[repr(C)]     │
//! │ • GameHandle    │   │ • Extractor         │   │   records        │
//! │ • GameView      │   │ • Loader            │   │ • Marshaling     │
//! └─────────────────┘   └─────────────────────┘   └──────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use simple_chess::{Color, GameManager, GameState};
//!
//! let games = GameManager::native()?;
//! let game = games.create_standard_game()?;
//! let opening = game.view()?;
//!
//! let first = opening.available_moves[0];
//! let next = game.make_move(&first)?;
//! game.destroy();
//!
//! let over = next.resign(Color::Black)?;
//! assert_eq!(over.state()?, GameState::WhiteWon);
//! # Ok::<(), simple_chess::ChessError>(())
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod handle;
pub mod model;
pub mod runtime;

pub use error::{ChessError, ChessResult};
pub use handle::{GameHandle, GameManager};
pub use model::{
    CastlingRights, GameView, HistoryEntry, Move, Piece, PlayedMove, Position, Square,
};
pub use runtime::{engine, init, teardown};

pub use simple_chess_abi::{CastlingRight, ChessEngine, CheckType, Color, DrawReason, GameState, PieceType};
