//! Error types for BinSpec operations.

use thiserror::Error;

/// Result type for BinSpec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for BinSpec operations.
///
/// Every positioned variant carries a bit offset. Errors raised by
/// [`crate::SpecType::parse`] start out relative to the bits the type was
/// handed; the driver rebases them onto the absolute stream position.
#[derive(Error, Debug)]
pub enum Error {
    /// The source ran out before the requested bit span was covered.
    #[error("truncated input reading {type_name} at bit {offset}: needed {needed} bits, only {available} available")]
    TruncatedInput {
        type_name: &'static str,
        offset: u64,
        needed: u64,
        available: u64,
    },

    /// Raw bits do not form a valid value for the type.
    #[error("cannot decode {type_name} at bit {offset}: {reason}")]
    Decode {
        type_name: &'static str,
        offset: u64,
        reason: String,
    },

    /// Semantic check raised through [`crate::Specification::fail`].
    #[error("validation failed at bit {offset}: {message}")]
    Validation { offset: u64, message: String },

    /// The type's own parameters cannot describe a decodable field.
    #[error("invalid spec type {type_name}: {reason}")]
    InvalidSpecType {
        type_name: &'static str,
        reason: String,
    },

    /// Declared width is above the session limit.
    #[error("field {type_name} declares {bits} bits, maximum is {max}")]
    FieldTooLarge {
        type_name: &'static str,
        bits: usize,
        max: usize,
    },

    /// Bytes remain where the end of input was expected.
    #[error("expected end of input at bit {offset}")]
    TrailingData { offset: u64 },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a decode error positioned at the start of the parsed bits.
    pub fn decode(type_name: &'static str, reason: impl Into<String>) -> Self {
        Self::Decode {
            type_name,
            offset: 0,
            reason: reason.into(),
        }
    }

    /// Creates an invalid spec type error.
    pub fn invalid_spec_type(type_name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSpecType {
            type_name,
            reason: reason.into(),
        }
    }

    /// Creates a truncation error.
    pub fn truncated(type_name: &'static str, offset: u64, needed: u64, available: u64) -> Self {
        Self::TruncatedInput {
            type_name,
            offset,
            needed,
            available,
        }
    }

    /// Returns the bit offset the error refers to, if it has one.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::TruncatedInput { offset, .. }
            | Self::Decode { offset, .. }
            | Self::Validation { offset, .. }
            | Self::TrailingData { offset } => Some(*offset),
            _ => None,
        }
    }

    /// Returns true for [`Error::TruncatedInput`].
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::TruncatedInput { .. })
    }

    /// Names the field whose read ran out of input.
    pub fn with_type_name(self, name: &'static str) -> Self {
        match self {
            Self::TruncatedInput {
                offset,
                needed,
                available,
                ..
            } => Self::TruncatedInput {
                type_name: name,
                offset,
                needed,
                available,
            },
            other => other,
        }
    }

    /// Shifts a relative offset by `base` bits.
    ///
    /// Used when a parse result produced against a sub-window is reported
    /// against its enclosing window.
    pub fn offset_by(self, base: u64) -> Self {
        match self {
            Self::Decode {
                type_name,
                offset,
                reason,
            } => Self::Decode {
                type_name,
                offset: offset + base,
                reason,
            },
            Self::TruncatedInput {
                type_name,
                offset,
                needed,
                available,
            } => Self::TruncatedInput {
                type_name,
                offset: offset + base,
                needed,
                available,
            },
            Self::Validation { offset, message } => Self::Validation {
                offset: offset + base,
                message,
            },
            other => other,
        }
    }
}
