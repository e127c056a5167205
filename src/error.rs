//! Error types for the tagwire codec

use thiserror::Error;

use crate::wire_type::WireType;

/// Errors that can occur during field encoding or decoding
#[derive(Debug, Error)]
pub enum Error {
    /// A required field was not found before the end of its struct
    #[error("required field with tag {tag} is missing")]
    MissingRequiredField {
        /// Tag that was looked up
        tag: u8,
    },

    /// On-wire type cannot be read as the requested kind
    #[error("type mismatch for tag {tag}: expected {expected}, found {}", found.name())]
    TypeMismatch {
        /// Tag of the offending field
        tag: u8,
        /// Kind the reader asked for
        expected: &'static str,
        /// Wire type actually present
        found: WireType,
    },

    /// Length or count prefix is negative, over the limit, or runs past the input
    #[error("malformed length prefix: {length}")]
    MalformedLength {
        /// Decoded length value
        length: i64,
    },

    /// Structs, lists or maps are nested deeper than the configured limit
    #[error("nesting deeper than {limit} levels")]
    DepthLimitExceeded {
        /// Configured `max_depth`
        limit: usize,
    },

    /// String payload is not valid UTF-8
    #[error("string field with tag {tag} is not valid UTF-8")]
    InvalidUtf8 {
        /// Tag of the offending field
        tag: u8,
    },

    /// Head nibble does not name a known wire type
    #[error("invalid wire type code {0}")]
    InvalidWireType(u8),

    /// Underlying stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if this error reports an absent required field
    #[inline]
    pub fn is_missing_field(&self) -> bool {
        matches!(self, Error::MissingRequiredField { .. })
    }

    pub(crate) fn mismatch(tag: u8, expected: &'static str, found: WireType) -> Self {
        Error::TypeMismatch {
            tag,
            expected,
            found,
        }
    }
}

/// Result type alias for tagwire operations
pub type Result<T> = core::result::Result<T, Error>;
