//! # ABI Error Types
//!
//! Raised when a record read from the engine holds a value outside its
//! declared domain.

use thiserror::Error;

/// A field of a native record could not be decoded.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiError {
    /// An enumerated integer holds a value outside its closed domain.
    #[error("{field} holds {value}, which is outside its domain")]
    OutOfDomain {
        /// The enumeration being decoded.
        field: &'static str,
        /// The raw value found.
        value: i32,
    },

    /// A byte-boolean holds something other than 0 or 1.
    #[error("byte-boolean {field} holds {value}, expected 0 or 1")]
    InvalidBoolean {
        /// The flag being decoded.
        field: &'static str,
        /// The raw byte found.
        value: u8,
    },

    /// A square lies outside ranks 1-8 / files a-h.
    #[error("square (rank {rank}, file {file:#04x}) is off the board")]
    InvalidSquare {
        /// Raw rank byte.
        rank: u8,
        /// Raw file byte.
        file: u8,
    },
}

/// Result type for ABI decoding.
pub type AbiResult<T> = Result<T, AbiError>;

/// Decodes a byte-boolean, rejecting anything but 0 and 1.
pub(crate) fn read_flag(field: &'static str, value: u8) -> AbiResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(AbiError::InvalidBoolean { field, value }),
    }
}
