//! # Native Entry Points
//!
//! The seven functions exported by the engine, as C function-pointer types
//! and as the [`ChessEngine`] trait the handle manager is written against.
//!
//! Every factory and mutating function returns a freshly allocated
//! [`Game`]; a null return is the engine's only failure signal.

#![allow(unsafe_code)]

use std::ffi::CStr;

use crate::enums::Color;
use crate::records::{Game, PieceMove};

/// Exported symbol names, NUL-terminated for symbol lookup.
pub mod symbols {
    /// `Game* simple_chess_create_new_game(void)`
    pub const CREATE_NEW_GAME: &[u8] = b"simple_chess_create_new_game\0";
    /// `Game* simple_chess_create_game_from_fen(const char*)`
    pub const CREATE_GAME_FROM_FEN: &[u8] = b"simple_chess_create_game_from_fen\0";
    /// `Game* simple_chess_make_move(const Game*, PieceMove)`
    pub const MAKE_MOVE: &[u8] = b"simple_chess_make_move\0";
    /// `Game* simple_chess_make_move_with_draw_offer(const Game*, PieceMove, bool)`
    pub const MAKE_MOVE_WITH_DRAW_OFFER: &[u8] = b"simple_chess_make_move_with_draw_offer\0";
    /// `Game* simple_chess_claim_draw(const Game*)`
    pub const CLAIM_DRAW: &[u8] = b"simple_chess_claim_draw\0";
    /// `Game* simple_chess_resign(const Game*, Color)`
    pub const RESIGN: &[u8] = b"simple_chess_resign\0";
    /// `void destroy_game(Game*)`
    pub const DESTROY_GAME: &[u8] = b"destroy_game\0";
}

/// `simple_chess_create_new_game`
pub type CreateNewGameFn = unsafe extern "C" fn() -> *mut Game;
/// `simple_chess_create_game_from_fen`
pub type CreateGameFromFenFn = unsafe extern "C" fn(fen: *const std::ffi::c_char) -> *mut Game;
/// `simple_chess_make_move`
pub type MakeMoveFn = unsafe extern "C" fn(game: *const Game, piece_move: PieceMove) -> *mut Game;
/// `simple_chess_make_move_with_draw_offer`
pub type MakeMoveWithDrawOfferFn =
    unsafe extern "C" fn(game: *const Game, piece_move: PieceMove, offer_draw: bool) -> *mut Game;
/// `simple_chess_claim_draw`
pub type ClaimDrawFn = unsafe extern "C" fn(game: *const Game) -> *mut Game;
/// `simple_chess_resign`
pub type ResignFn = unsafe extern "C" fn(game: *const Game, resigner: i32) -> *mut Game;
/// `destroy_game`
pub type DestroyGameFn = unsafe extern "C" fn(game: *mut Game);

/// The native engine's game protocol.
///
/// Implemented by the dynamically loaded library, and by in-process fakes
/// in tests. Calls are synchronous. Implementations must be usable from
/// several threads at once as long as no two calls share a `Game`.
pub trait ChessEngine: Send + Sync {
    /// New game at the standard starting position.
    fn create_new_game(&self) -> *mut Game;

    /// New game from a FEN position; null if the position is invalid.
    fn create_game_from_fen(&self, fen: &CStr) -> *mut Game;

    /// Plays `piece_move`; null if it is illegal.
    ///
    /// # Safety
    ///
    /// `game` must be a live record returned by this engine.
    unsafe fn make_move(&self, game: *const Game, piece_move: PieceMove) -> *mut Game;

    /// Plays `piece_move` and records a draw offer; null if it is illegal.
    ///
    /// # Safety
    ///
    /// `game` must be a live record returned by this engine.
    unsafe fn make_move_with_draw_offer(
        &self,
        game: *const Game,
        piece_move: PieceMove,
        offer_draw: bool,
    ) -> *mut Game;

    /// Claims a draw; null if none is claimable.
    ///
    /// # Safety
    ///
    /// `game` must be a live record returned by this engine.
    unsafe fn claim_draw(&self, game: *const Game) -> *mut Game;

    /// `resigner` resigns.
    ///
    /// # Safety
    ///
    /// `game` must be a live record returned by this engine.
    unsafe fn resign(&self, game: *const Game, resigner: Color) -> *mut Game;

    /// Frees a record.
    ///
    /// # Safety
    ///
    /// `game` must be a live record returned by this engine, and must not be
    /// used again afterwards.
    unsafe fn destroy_game(&self, game: *mut Game);
}
