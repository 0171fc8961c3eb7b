//! # Simple Chess ABI
//!
//! Byte-exact mirrors of the records exchanged with the native
//! `simple-chess-games` engine, plus the helpers that turn foreign memory
//! into owned Rust values.
//!
//! ## Layout Rules
//!
//! 1. **Field order is the contract** - every record is `#[repr(C)]` and
//!    declared in the engine's order
//! 2. **Byte booleans** - flags are `u8` holding 0 or 1, never `bool`
//! 3. **Raw enumerations** - enumerated fields are stored as `i32` and only
//!    become Rust enums through a checked conversion
//! 4. **Inline values** - nested records are embedded by value; the only
//!    pointers are the two borrowed views inside [`Game`]
//!
//! ```text
//! Game ─┬─ history ─────────▶ [GameHistoryEntry; history_size]   (borrowed)
//!       ├─ available_moves ─▶ [PieceMove; available_move_count]  (borrowed)
//!       └─ current_stage: GameStage ── board: Board ── [Piece; 64]
//! ```
//!
//! Borrowed views are valid only while the owning handle is alive. Use
//! [`marshal`] to copy them out before the handle is destroyed.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod engine;
pub mod enums;
pub mod error;
pub mod marshal;
pub mod records;

pub use engine::ChessEngine;
pub use enums::{CastlingRight, CheckType, Color, DrawReason, GameState, PieceType};
pub use error::{AbiError, AbiResult};
pub use marshal::{decode_text, encode_text, materialize, materialize_sequence};
pub use records::{
    Board, Game, GameHistoryEntry, GameStage, Piece, PieceMove, PlayedMove, Square,
    BOARD_SQUARES, FEN_CAPACITY, NOTATION_CAPACITY,
};
