//! # Host Model
//!
//! Owned, validated values copied out of native records. Nothing here
//! points into engine memory, so every value outlives the handle it was
//! read from.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use simple_chess_abi as abi;
use simple_chess_abi::{
    AbiResult, CastlingRight, CheckType, Color, DrawReason, GameState, PieceType, BOARD_SQUARES,
};

use crate::error::{ChessError, ChessResult};

/// A square on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    rank: u8,
    file: u8,
}

impl Square {
    /// The square at `rank` (1-8) and `file` (`'a'`-`'h'`, either case).
    #[must_use]
    pub fn new(rank: u8, file: char) -> Option<Self> {
        let file = u8::try_from(file.to_ascii_lowercase()).ok()?;
        let square = abi::Square::new(rank, file).validate().ok()?;
        Some(Self { rank: square.rank, file: square.file })
    }

    /// Square for board index `index` (0 = a1, 63 = h8).
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        abi::Square::from_index(index).map(|s| Self { rank: s.rank, file: s.file })
    }

    /// All 64 squares, a1 first, h8 last.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..BOARD_SQUARES).filter_map(Self::from_index)
    }

    /// Rank, 1-8.
    #[inline]
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.rank
    }

    /// File, `'a'`-`'h'`.
    #[inline]
    #[must_use]
    pub const fn file(self) -> char {
        self.file as char
    }

    /// Board index, 0-63.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        (self.rank as usize - 1) * 8 + (self.file - b'a') as usize
    }

    /// Colour of the square; a1 is dark.
    #[must_use]
    pub const fn color(self) -> Color {
        if (self.rank + (self.file - b'a')) % 2 == 1 {
            Color::Black
        } else {
            Color::White
        }
    }

    pub(crate) const fn to_abi(self) -> abi::Square {
        abi::Square::new(self.rank, self.file)
    }

    pub(crate) fn from_abi(square: abi::Square) -> AbiResult<Self> {
        let square = square.validate()?;
        Ok(Self { rank: square.rank, file: square.file })
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank)
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(text: &str) -> ChessResult<Self> {
        let invalid = || ChessError::InvalidSquare { text: text.to_string() };
        let mut chars = text.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };
        let rank = rank.to_digit(10).and_then(|r| u8::try_from(r).ok()).ok_or_else(invalid)?;
        Self::new(rank, file).ok_or_else(invalid)
    }
}

/// A piece: kind and colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    /// Kind of piece.
    pub kind: PieceType,
    /// Owner.
    pub color: Color,
}

impl Piece {
    /// Creates a piece.
    #[inline]
    #[must_use]
    pub const fn new(kind: PieceType, color: Color) -> Self {
        Self { kind, color }
    }

    pub(crate) const fn to_abi(self) -> abi::Piece {
        abi::Piece::new(self.kind, self.color)
    }

    pub(crate) fn from_abi(piece: &abi::Piece) -> AbiResult<Self> {
        Ok(Self { kind: piece.kind()?, color: piece.side()? })
    }
}

/// A move to submit: regular, or a pawn promotion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    piece: Piece,
    from: Square,
    to: Square,
    promotion: Option<PieceType>,
}

impl Move {
    /// A regular move.
    #[must_use]
    pub const fn new(piece: Piece, from: Square, to: Square) -> Self {
        Self { piece, from, to, promotion: None }
    }

    /// A pawn promotion to queen, rook, bishop or knight.
    pub fn promotion(piece: Piece, from: Square, to: Square, promote_to: PieceType) -> ChessResult<Self> {
        if piece.kind != PieceType::Pawn {
            return Err(ChessError::InvalidMove { reason: "only pawns can promote" });
        }
        if !promote_to.is_promotion_target() {
            return Err(ChessError::InvalidMove {
                reason: "promotion must be to queen, rook, bishop or knight",
            });
        }
        Ok(Self { piece, from, to, promotion: Some(promote_to) })
    }

    /// Moving piece.
    #[must_use]
    pub const fn piece(&self) -> Piece {
        self.piece
    }

    /// Origin square.
    #[must_use]
    pub const fn src(&self) -> Square {
        self.from
    }

    /// Destination square.
    #[must_use]
    pub const fn dst(&self) -> Square {
        self.to
    }

    /// Promotion type, if any.
    #[must_use]
    pub const fn promoted_to(&self) -> Option<PieceType> {
        self.promotion
    }

    pub(crate) const fn to_abi(&self) -> abi::PieceMove {
        abi::PieceMove::new(self.piece.to_abi(), self.from.to_abi(), self.to.to_abi(), self.promotion)
    }

    pub(crate) fn from_abi(record: &abi::PieceMove) -> AbiResult<Self> {
        Ok(Self {
            piece: Piece::from_abi(&record.piece)?,
            from: Square::from_abi(record.src)?,
            to: Square::from_abi(record.dst)?,
            promotion: record.promotion()?,
        })
    }
}

impl fmt::Display for Move {
    /// Coordinate notation, `e2e4` or `e7e8q`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        match self.promotion {
            Some(PieceType::Queen) => f.write_str("q"),
            Some(PieceType::Rook) => f.write_str("r"),
            Some(PieceType::Bishop) => f.write_str("b"),
            Some(PieceType::Knight) => f.write_str("n"),
            _ => Ok(()),
        }
    }
}

/// A move as it was played.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayedMove {
    /// The move.
    pub piece_move: Move,
    /// Captured piece, if any.
    pub captured: Option<Piece>,
    /// Check delivered.
    pub check: CheckType,
    /// Whether the mover offered a draw.
    pub offers_draw: bool,
    /// Standard algebraic notation.
    pub notation: String,
}

impl PlayedMove {
    /// Whether the move gave check without mating.
    #[must_use]
    pub fn is_check(&self) -> bool {
        self.check == CheckType::Check
    }

    /// Whether the move mated.
    #[must_use]
    pub fn is_checkmate(&self) -> bool {
        self.check == CheckType::Checkmate
    }

    pub(crate) fn from_abi(record: &abi::PlayedMove) -> AbiResult<Self> {
        Ok(Self {
            piece_move: Move::from_abi(&record.piece_move)?,
            captured: record.captured()?.as_ref().map(Piece::from_abi).transpose()?,
            check: record.check()?,
            offers_draw: record.draw_offered()?,
            notation: record.notation(),
        })
    }
}

/// Remaining castling rights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    /// Decodes a bitmask; undefined bits are dropped.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & CastlingRight::MASK)
    }

    /// The bitmask.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether `right` remains.
    #[inline]
    #[must_use]
    pub const fn contains(self, right: CastlingRight) -> bool {
        self.0 & right.bit() != 0
    }

    /// Remaining rights, lowest bit first.
    pub fn iter(self) -> impl Iterator<Item = CastlingRight> {
        CastlingRight::ALL.into_iter().filter(move |right| self.contains(*right))
    }
}

/// A full position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// FEN of the position.
    pub fen: String,
    /// Side to move.
    pub active_color: Color,
    /// Remaining castling rights.
    pub castling_rights: CastlingRights,
    /// En passant target, if any.
    pub en_passant_target: Option<Square>,
    /// Half-moves since the last capture or pawn advance.
    pub half_move_clock: u16,
    /// Full-move number.
    pub full_moves: u16,
    /// Check status of the side to move.
    pub check: CheckType,
    /// Occupied squares.
    pub board: BTreeMap<Square, Piece>,
}

impl Position {
    /// Whether the side to move is in check but not mated.
    #[must_use]
    pub fn is_in_check(&self) -> bool {
        self.check == CheckType::Check
    }

    /// Whether the side to move is mated.
    #[must_use]
    pub fn is_in_checkmate(&self) -> bool {
        self.check == CheckType::Checkmate
    }

    /// Piece on `square`.
    #[must_use]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.get(&square).copied()
    }

    pub(crate) fn from_abi(stage: &abi::GameStage) -> AbiResult<Self> {
        let mut board = BTreeMap::new();
        for (index, piece) in stage.board.pieces()? {
            if let Some(square) = Square::from_index(index) {
                board.insert(square, Piece::from_abi(&piece)?);
            }
        }
        Ok(Self {
            fen: stage.fen_text(),
            active_color: stage.side_to_move()?,
            castling_rights: CastlingRights::from_bits(stage.castling_rights),
            en_passant_target: stage.en_passant()?.map(Square::from_abi).transpose()?,
            half_move_clock: stage.half_moves_since_last_capture_or_pawn_advance,
            full_moves: stage.full_moves,
            check: stage.check()?,
            board,
        })
    }
}

/// One history entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    /// FEN of the position before the move.
    pub fen_before: String,
    /// The move played from it.
    pub played_move: PlayedMove,
}

impl HistoryEntry {
    pub(crate) fn from_abi(entry: &abi::GameHistoryEntry) -> AbiResult<Self> {
        Ok(Self { fen_before: entry.fen_text(), played_move: PlayedMove::from_abi(&entry.played_move)? })
    }
}

/// Owned snapshot of a game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameView {
    /// Game state.
    pub state: GameState,
    /// Why the game was drawn; set only when drawn.
    pub draw_reason: Option<DrawReason>,
    /// Moves played so far, oldest first.
    pub history: Vec<HistoryEntry>,
    /// Current position.
    pub position: Position,
    /// Legal moves in the current position.
    pub available_moves: Vec<Move>,
    /// Reason the side to move may claim a draw, if it may.
    pub claimable_draw: Option<DrawReason>,
}

impl GameView {
    /// Legal moves starting on `square`.
    pub fn available_moves_for(&self, square: Square) -> impl Iterator<Item = &Move> + '_ {
        self.available_moves.iter().filter(move |m| m.from == square)
    }

    /// Whether the side to move may claim a draw.
    #[must_use]
    pub fn can_claim_draw(&self) -> bool {
        self.claimable_draw.is_some()
    }

    /// Side to move.
    #[must_use]
    pub fn active_color(&self) -> Color {
        self.position.active_color
    }

    /// Whether the game has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.state.is_terminal()
    }
}
