//! # Game Handles
//!
//! Exclusive ownership of native game records.
//!
//! ```text
//!  GameManager ──create──▶ GameHandle(A) ──make_move──▶ GameHandle(B)
//!                               │                            │
//!                             drop                         drop
//!                               ▼                            ▼
//!                       destroy_game(A)              destroy_game(B)
//! ```
//!
//! Mutations never consume or invalidate the handle they are called on. Each
//! returns a new, independently owned handle; the caller decides when the
//! old one goes. A handle is destroyed exactly once, when it is dropped or
//! passed to [`GameHandle::destroy`].
//!
//! Distinct handles may be used on different threads. A single handle is
//! not `Sync`, so concurrent calls against one record are not expressible.

#![allow(unsafe_code)]

use std::ffi::CString;
use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

use simple_chess_abi::{ChessEngine, Color, Game, GameState, FEN_CAPACITY};

use crate::error::{ChessError, ChessResult};
use crate::model::{GameView, HistoryEntry, Move, Position};

/// Creates games on one engine.
#[derive(Clone)]
pub struct GameManager {
    engine: Arc<dyn ChessEngine>,
}

impl GameManager {
    /// Manager over `engine`.
    #[must_use]
    pub fn new(engine: Arc<dyn ChessEngine>) -> Self {
        Self { engine }
    }

    /// The process-wide native engine.
    pub fn native() -> ChessResult<Self> {
        crate::runtime::engine().map(Self::new)
    }

    /// New game at the standard starting position.
    pub fn create_standard_game(&self) -> ChessResult<GameHandle> {
        let raw = self.engine.create_new_game();
        GameHandle::adopt(&self.engine, raw)
            .ok_or(ChessError::NativeFailure { operation: "create_new_game" })
    }

    /// New game from a FEN position.
    ///
    /// Text that cannot fit the engine's FEN buffer, or that contains a NUL,
    /// is rejected without calling the engine.
    pub fn create_from_position(&self, fen: &str) -> ChessResult<GameHandle> {
        create_from_fen(&self.engine, fen)
    }
}

impl fmt::Debug for GameManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameManager").finish_non_exhaustive()
    }
}

fn create_from_fen(engine: &Arc<dyn ChessEngine>, fen: &str) -> ChessResult<GameHandle> {
    let invalid = || ChessError::InvalidPosition { fen: fen.to_string() };
    if fen.len() >= FEN_CAPACITY {
        return Err(invalid());
    }
    let text = CString::new(fen).map_err(|_| invalid())?;
    let raw = engine.create_game_from_fen(&text);
    GameHandle::adopt(engine, raw).ok_or_else(invalid)
}

/// Owner of one native game record.
pub struct GameHandle {
    game: NonNull<Game>,
    engine: Arc<dyn ChessEngine>,
}

// SAFETY: the record is exclusively owned and engine calls on distinct
// records are independent. Not Sync: NonNull keeps shared access
// single-threaded.
unsafe impl Send for GameHandle {}

impl GameHandle {
    fn adopt(engine: &Arc<dyn ChessEngine>, raw: *mut Game) -> Option<Self> {
        NonNull::new(raw).map(|game| Self { game, engine: Arc::clone(engine) })
    }

    fn record(&self) -> &Game {
        // SAFETY: the record stays live until this handle is dropped
        unsafe { self.game.as_ref() }
    }

    /// Current game state.
    pub fn state(&self) -> ChessResult<GameState> {
        Ok(self.record().game_state()?)
    }

    /// FEN of the current position.
    #[must_use]
    pub fn fen(&self) -> String {
        self.record().current_stage.fen_text()
    }

    /// Owned snapshot of the record, including both borrowed views.
    pub fn view(&self) -> ChessResult<GameView> {
        let game = self.record();

        // SAFETY: `game` is live for the duration of this call
        let (history, moves) = unsafe { (game.history_entries(), game.legal_moves()) };

        Ok(GameView {
            state: game.game_state()?,
            draw_reason: game.drawn_because()?,
            history: history.iter().map(HistoryEntry::from_abi).collect::<Result<_, _>>()?,
            position: Position::from_abi(&game.current_stage)?,
            available_moves: moves.iter().map(Move::from_abi).collect::<Result<_, _>>()?,
            claimable_draw: game.claimable_draw()?,
        })
    }

    /// Current position only, without copying history or moves.
    pub fn position(&self) -> ChessResult<Position> {
        Ok(Position::from_abi(&self.record().current_stage)?)
    }

    /// Plays `piece_move`, returning the resulting game.
    pub fn make_move(&self, piece_move: &Move) -> ChessResult<GameHandle> {
        self.ensure_playing()?;
        // SAFETY: the record is live
        let raw = unsafe { self.engine.make_move(self.game.as_ptr(), piece_move.to_abi()) };
        self.successor(raw, || ChessError::IllegalMove { notation: piece_move.to_string() })
    }

    /// Plays `piece_move`, optionally offering a draw with it.
    pub fn make_move_with_draw_offer(&self, piece_move: &Move, offer_draw: bool) -> ChessResult<GameHandle> {
        self.ensure_playing()?;
        // SAFETY: the record is live
        let raw = unsafe {
            self.engine
                .make_move_with_draw_offer(self.game.as_ptr(), piece_move.to_abi(), offer_draw)
        };
        self.successor(raw, || ChessError::IllegalMove { notation: piece_move.to_string() })
    }

    /// Claims a draw for the side to move.
    pub fn claim_draw(&self) -> ChessResult<GameHandle> {
        self.ensure_playing()?;
        if self.record().claimable_draw()?.is_none() {
            return Err(ChessError::DrawNotClaimable);
        }
        // SAFETY: the record is live
        let raw = unsafe { self.engine.claim_draw(self.game.as_ptr()) };
        self.successor(raw, || ChessError::DrawNotClaimable)
    }

    /// `resigner` resigns; the other side wins.
    pub fn resign(&self, resigner: Color) -> ChessResult<GameHandle> {
        self.ensure_playing()?;
        // SAFETY: the record is live
        let raw = unsafe { self.engine.resign(self.game.as_ptr(), resigner) };
        self.successor(raw, || ChessError::NativeFailure { operation: "resign" })
    }

    /// Full position before a history entry's move.
    ///
    /// Builds a temporary game from the entry's FEN and destroys it before
    /// returning.
    pub fn position_before(&self, entry: &HistoryEntry) -> ChessResult<Position> {
        let scratch = create_from_fen(&self.engine, &entry.fen_before)?;
        scratch.position()
    }

    /// Releases the native record.
    pub fn destroy(self) {
        drop(self);
    }

    fn ensure_playing(&self) -> ChessResult<()> {
        match self.state()? {
            GameState::Playing => Ok(()),
            state => Err(ChessError::GameOver { state }),
        }
    }

    fn successor(&self, raw: *mut Game, on_null: impl FnOnce() -> ChessError) -> ChessResult<GameHandle> {
        Self::adopt(&self.engine, raw).ok_or_else(on_null)
    }
}

impl Drop for GameHandle {
    fn drop(&mut self) {
        tracing::debug!(game = ?self.game, "destroying game");
        // SAFETY: owned record, destroyed exactly once here
        unsafe { self.engine.destroy_game(self.game.as_ptr()) }
    }
}

impl fmt::Debug for GameHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameHandle")
            .field("state", &self.record().state)
            .field("fen", &self.fen())
            .finish_non_exhaustive()
    }
}
