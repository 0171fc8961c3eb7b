//! # Closed Enumerations
//!
//! Every enumerated field the engine writes is a 4-byte integer. Records
//! keep the raw `i32`; these types are what it decodes into. A value
//! outside the listed discriminants is an [`AbiError::OutOfDomain`], never
//! a transmute.

use crate::error::{AbiError, AbiResult};

/// The color of each side.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    /// White moves first.
    White = 0,
    /// Black.
    Black = 1,
}

impl Color {
    /// Returns the other side.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Raw ABI value.
    #[inline]
    #[must_use]
    pub const fn to_raw(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for Color {
    type Error = AbiError;

    fn try_from(value: i32) -> AbiResult<Self> {
        match value {
            0 => Ok(Self::White),
            1 => Ok(Self::Black),
            _ => Err(AbiError::OutOfDomain { field: "Color", value }),
        }
    }
}

/// The type of a chess piece.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceType {
    /// Pawn.
    Pawn = 0,
    /// Rook.
    Rook = 1,
    /// Knight.
    Knight = 2,
    /// Bishop.
    Bishop = 3,
    /// Queen.
    Queen = 4,
    /// King.
    King = 5,
}

impl PieceType {
    /// All piece types in discriminant order.
    pub const ALL: [Self; 6] = [
        Self::Pawn,
        Self::Rook,
        Self::Knight,
        Self::Bishop,
        Self::Queen,
        Self::King,
    ];

    /// Whether a pawn may be promoted to this type.
    #[inline]
    #[must_use]
    pub const fn is_promotion_target(self) -> bool {
        matches!(self, Self::Queen | Self::Rook | Self::Bishop | Self::Knight)
    }

    /// Raw ABI value.
    #[inline]
    #[must_use]
    pub const fn to_raw(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for PieceType {
    type Error = AbiError;

    fn try_from(value: i32) -> AbiResult<Self> {
        match value {
            0 => Ok(Self::Pawn),
            1 => Ok(Self::Rook),
            2 => Ok(Self::Knight),
            3 => Ok(Self::Bishop),
            4 => Ok(Self::Queen),
            5 => Ok(Self::King),
            _ => Err(AbiError::OutOfDomain { field: "PieceType", value }),
        }
    }
}

/// The kind of check delivered by a move, or present in a position.
#[repr(i32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CheckType {
    /// No check.
    #[default]
    None = 0,
    /// Check.
    Check = 1,
    /// Checkmate.
    Checkmate = 2,
}

impl TryFrom<i32> for CheckType {
    type Error = AbiError;

    fn try_from(value: i32) -> AbiResult<Self> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Check),
            2 => Ok(Self::Checkmate),
            _ => Err(AbiError::OutOfDomain { field: "CheckType", value }),
        }
    }
}

/// The overall state of a game.
#[repr(i32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Moves may still be submitted.
    #[default]
    Playing = 0,
    /// Drawn; see the draw reason.
    Drawn = 1,
    /// White won.
    WhiteWon = 2,
    /// Black won.
    BlackWon = 3,
}

impl GameState {
    /// Drawn and won states accept no further mutation.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Playing)
    }

    /// The state reached when `color` resigns.
    #[inline]
    #[must_use]
    pub const fn after_resignation_of(color: Color) -> Self {
        match color {
            Color::White => Self::BlackWon,
            Color::Black => Self::WhiteWon,
        }
    }
}

impl TryFrom<i32> for GameState {
    type Error = AbiError;

    fn try_from(value: i32) -> AbiResult<Self> {
        match value {
            0 => Ok(Self::Playing),
            1 => Ok(Self::Drawn),
            2 => Ok(Self::WhiteWon),
            3 => Ok(Self::BlackWon),
            _ => Err(AbiError::OutOfDomain { field: "GameState", value }),
        }
    }
}

/// Reasons a game may be drawn.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawReason {
    /// Side to move has no legal move and is not in check.
    Stalemate = 0,
    /// Neither side can mate.
    InsufficientMaterial = 1,
    /// A draw offer was accepted.
    OfferedAndAccepted = 2,
    /// Same position three times (claimable).
    ThreeFoldRepetition = 3,
    /// Same position five times (automatic).
    FiveFoldRepetition = 4,
    /// Fifty moves without capture or pawn advance (claimable).
    FiftyMoveRule = 5,
    /// Seventy-five moves without capture or pawn advance (automatic).
    SeventyFiveMoveRule = 6,
}

impl TryFrom<i32> for DrawReason {
    type Error = AbiError;

    fn try_from(value: i32) -> AbiResult<Self> {
        match value {
            0 => Ok(Self::Stalemate),
            1 => Ok(Self::InsufficientMaterial),
            2 => Ok(Self::OfferedAndAccepted),
            3 => Ok(Self::ThreeFoldRepetition),
            4 => Ok(Self::FiveFoldRepetition),
            5 => Ok(Self::FiftyMoveRule),
            6 => Ok(Self::SeventyFiveMoveRule),
            _ => Err(AbiError::OutOfDomain { field: "DrawReason", value }),
        }
    }
}

/// One bit of the castling-rights mask.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CastlingRight {
    /// bit0
    WhiteKingSide = 0x01,
    /// bit1
    WhiteQueenSide = 0x02,
    /// bit2
    BlackKingSide = 0x04,
    /// bit3
    BlackQueenSide = 0x08,
}

impl CastlingRight {
    /// All four rights, lowest bit first.
    pub const ALL: [Self; 4] = [
        Self::WhiteKingSide,
        Self::WhiteQueenSide,
        Self::BlackKingSide,
        Self::BlackQueenSide,
    ];

    /// Mask covering every defined bit.
    pub const MASK: u8 = 0x0F;

    /// The bit this right occupies.
    #[inline]
    #[must_use]
    pub const fn bit(self) -> u8 {
        self as u8
    }
}
