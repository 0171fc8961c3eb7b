//! # Native Records
//!
//! `#[repr(C)]` mirrors of the engine's structs. Sizes and offsets below are
//! for a 64-bit target and are pinned by the layout tests at the bottom of
//! this file.
//!
//! | Record             | Size | Align |
//! |--------------------|------|-------|
//! | `Square`           |    2 |     1 |
//! | `Piece`            |    8 |     4 |
//! | `PieceMove`        |   20 |     4 |
//! | `PlayedMove`       |   48 |     4 |
//! | `Board`            |  576 |     4 |
//! | `GameStage`        |  688 |     4 |
//! | `GameHistoryEntry` |  140 |     4 |
//! | `Game`             |  736 |     8 |
//!
//! Records are plain data. None of them owns native resources; the handle
//! that owns a [`Game`] lives in the `simple_chess` crate.

#![allow(unsafe_code)]

use bytemuck::{Pod, Zeroable};

use crate::enums::{CheckType, Color, DrawReason, GameState, PieceType};
use crate::error::{read_flag, AbiError, AbiResult};
use crate::marshal::{decode_text, materialize};

/// Capacity of every FEN buffer, terminator included.
pub const FEN_CAPACITY: usize = 90;

/// Capacity of the algebraic-notation buffer, terminator included.
pub const NOTATION_CAPACITY: usize = 8;

/// Squares on the board.
pub const BOARD_SQUARES: usize = 64;

/// A square, identified by rank (1-8) and file (`b'a'`-`b'h'`).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Square {
    /// Rank, 1-8.
    pub rank: u8,
    /// File, ASCII `a`-`h`.
    pub file: u8,
}

impl Square {
    /// Creates a square without validating it.
    #[inline]
    #[must_use]
    pub const fn new(rank: u8, file: u8) -> Self {
        Self { rank, file }
    }

    /// Square for board index `index` (0 = a1, 63 = h8).
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= BOARD_SQUARES {
            return None;
        }
        let rank = u8::try_from(index / 8).ok()? + 1;
        let file = b'a' + u8::try_from(index % 8).ok()?;
        Some(Self { rank, file })
    }

    /// Returns the square unchanged if it lies on the board.
    pub fn validate(self) -> AbiResult<Self> {
        if (1..=8).contains(&self.rank) && (b'a'..=b'h').contains(&self.file) {
            Ok(self)
        } else {
            Err(AbiError::InvalidSquare { rank: self.rank, file: self.file })
        }
    }

    /// Board index of a valid square.
    pub fn index(self) -> AbiResult<usize> {
        let square = self.validate()?;
        Ok(usize::from(square.rank - 1) * 8 + usize::from(square.file - b'a'))
    }
}

/// A piece: type and color, each a 4-byte enumeration.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Piece {
    /// Raw [`PieceType`].
    pub piece_type: i32,
    /// Raw [`Color`].
    pub color: i32,
}

impl Piece {
    /// Creates a piece record.
    #[inline]
    #[must_use]
    pub const fn new(piece_type: PieceType, color: Color) -> Self {
        Self { piece_type: piece_type.to_raw(), color: color.to_raw() }
    }

    /// Decoded piece type.
    pub fn kind(&self) -> AbiResult<PieceType> {
        PieceType::try_from(self.piece_type)
    }

    /// Decoded color.
    pub fn side(&self) -> AbiResult<Color> {
        Color::try_from(self.color)
    }
}

/// A move as submitted to the engine, or listed among legal moves.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroable)]
pub struct PieceMove {
    /// The piece being moved.
    pub piece: Piece,
    /// Origin square.
    pub src: Square,
    /// Destination square.
    pub dst: Square,
    /// Byte-boolean: pawn promotion.
    pub is_promotion: u8,
    /// Raw [`PieceType`]; meaningful only when `is_promotion` is 1.
    pub promoted_to: i32,
}

impl PieceMove {
    /// Builds a move record. `promoted_to` is written as 0 when there is no
    /// promotion.
    #[must_use]
    pub const fn new(piece: Piece, src: Square, dst: Square, promotion: Option<PieceType>) -> Self {
        let (is_promotion, promoted_to) = match promotion {
            Some(kind) => (1, kind.to_raw()),
            None => (0, 0),
        };
        Self { piece, src, dst, is_promotion, promoted_to }
    }

    /// The promotion type, if this move promotes.
    pub fn promotion(&self) -> AbiResult<Option<PieceType>> {
        if read_flag("is_promotion", self.is_promotion)? {
            PieceType::try_from(self.promoted_to).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// A move that has been played, as recorded in the history.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroable)]
pub struct PlayedMove {
    /// The move itself.
    pub piece_move: PieceMove,
    /// Byte-boolean: the move captured a piece.
    pub is_capture: u8,
    /// Meaningful only when `is_capture` is 1.
    pub captured_piece: Piece,
    /// Raw [`CheckType`].
    pub check_type: i32,
    /// Byte-boolean: the mover offered a draw.
    pub offers_draw: u8,
    /// NUL-terminated SAN, truncated to fit.
    pub in_algebraic_notation: [u8; NOTATION_CAPACITY],
}

impl PlayedMove {
    /// The captured piece, if any.
    pub fn captured(&self) -> AbiResult<Option<Piece>> {
        Ok(read_flag("is_capture", self.is_capture)?.then_some(self.captured_piece))
    }

    /// Decoded check type.
    pub fn check(&self) -> AbiResult<CheckType> {
        CheckType::try_from(self.check_type)
    }

    /// Whether a draw offer accompanied the move.
    pub fn draw_offered(&self) -> AbiResult<bool> {
        read_flag("offers_draw", self.offers_draw)
    }

    /// Algebraic notation as text.
    #[must_use]
    pub fn notation(&self) -> String {
        decode_text(&self.in_algebraic_notation)
    }
}

/// Board contents, indexed 0 (a1) to 63 (h8).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroable)]
pub struct Board {
    /// Byte-boolean per square.
    pub occupied: [u8; BOARD_SQUARES],
    /// Meaningful only where `occupied[i]` is 1.
    pub piece_at: [Piece; BOARD_SQUARES],
}

impl Board {
    /// The piece on square `index`, or `None` when empty or out of range.
    pub fn piece(&self, index: usize) -> AbiResult<Option<Piece>> {
        match self.occupied.get(index) {
            Some(&flag) => Ok(read_flag("occupied", flag)?.then(|| self.piece_at[index])),
            None => Ok(None),
        }
    }

    /// Every occupied square with its piece, in index order.
    pub fn pieces(&self) -> AbiResult<Vec<(usize, Piece)>> {
        let mut out = Vec::with_capacity(32);
        for index in 0..BOARD_SQUARES {
            if let Some(piece) = self.piece(index)? {
                out.push((index, piece));
            }
        }
        Ok(out)
    }
}

/// A complete position.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroable)]
pub struct GameStage {
    /// Board contents.
    pub board: Board,
    /// Raw [`Color`] to move.
    pub active_color: i32,
    /// bit0 white king-side, bit1 white queen-side, bit2 black king-side,
    /// bit3 black queen-side.
    pub castling_rights: u8,
    /// Half-move clock for the 50/75-move rules.
    pub half_moves_since_last_capture_or_pawn_advance: u16,
    /// Full-move number.
    pub full_moves: u16,
    /// Byte-boolean: an en passant target exists.
    pub has_en_passant_target: u8,
    /// Meaningful only when `has_en_passant_target` is 1.
    pub en_passant_target: Square,
    /// Raw [`CheckType`] of the side to move.
    pub check_status: i32,
    /// NUL-terminated FEN of this position.
    pub fen: [u8; FEN_CAPACITY],
}

impl GameStage {
    /// Decoded side to move.
    pub fn side_to_move(&self) -> AbiResult<Color> {
        Color::try_from(self.active_color)
    }

    /// The en passant target, if any.
    pub fn en_passant(&self) -> AbiResult<Option<Square>> {
        if read_flag("has_en_passant_target", self.has_en_passant_target)? {
            self.en_passant_target.validate().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Decoded check status.
    pub fn check(&self) -> AbiResult<CheckType> {
        CheckType::try_from(self.check_status)
    }

    /// FEN as text.
    #[must_use]
    pub fn fen_text(&self) -> String {
        decode_text(&self.fen)
    }
}

/// One history entry: the position before a move, and the move.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroable)]
pub struct GameHistoryEntry {
    /// FEN before the move.
    pub fen: [u8; FEN_CAPACITY],
    /// The move played from that position.
    pub played_move: PlayedMove,
}

impl GameHistoryEntry {
    /// FEN as text.
    #[must_use]
    pub fn fen_text(&self) -> String {
        decode_text(&self.fen)
    }
}

/// The record behind every game handle.
///
/// `history` and `available_moves` are borrowed views into memory owned by
/// the same native allocation. They dangle once the handle is destroyed.
#[repr(C)]
#[derive(Debug, Zeroable)]
pub struct Game {
    /// Raw [`GameState`].
    pub state: i32,
    /// Raw [`DrawReason`]; meaningful only when drawn.
    pub draw_reason: i32,
    /// Base of the history array.
    pub history: *const GameHistoryEntry,
    /// Entries in `history`.
    pub history_size: u16,
    /// Base of the legal-move array.
    pub available_moves: *const PieceMove,
    /// Entries in `available_moves`.
    pub available_move_count: u16,
    /// Current position.
    pub current_stage: GameStage,
    /// Byte-boolean: the side to move may claim a draw.
    pub is_draw_claimable: u8,
    /// Raw [`DrawReason`]; meaningful only when claimable.
    pub reason_to_claim_draw: i32,
}

impl Game {
    /// Decoded game state.
    pub fn game_state(&self) -> AbiResult<GameState> {
        GameState::try_from(self.state)
    }

    /// Why the game was drawn, when it was.
    pub fn drawn_because(&self) -> AbiResult<Option<DrawReason>> {
        match self.game_state()? {
            GameState::Drawn => DrawReason::try_from(self.draw_reason).map(Some),
            _ => Ok(None),
        }
    }

    /// The reason the side to move may claim a draw, if it may.
    pub fn claimable_draw(&self) -> AbiResult<Option<DrawReason>> {
        if read_flag("is_draw_claimable", self.is_draw_claimable)? {
            DrawReason::try_from(self.reason_to_claim_draw).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Owned copy of the history view.
    ///
    /// # Safety
    ///
    /// `self` must be the live record of a handle that has not been
    /// destroyed, so that `history` points at `history_size` entries.
    #[must_use]
    pub unsafe fn history_entries(&self) -> Vec<GameHistoryEntry> {
        // SAFETY: forwarded to the caller
        unsafe { materialize(self.history, usize::from(self.history_size)) }
    }

    /// Owned copy of the legal-move view.
    ///
    /// # Safety
    ///
    /// Same contract as [`Game::history_entries`].
    #[must_use]
    pub unsafe fn legal_moves(&self) -> Vec<PieceMove> {
        // SAFETY: forwarded to the caller
        unsafe { materialize(self.available_moves, usize::from(self.available_move_count)) }
    }
}
