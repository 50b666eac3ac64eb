//! Error types for BODYSTRUCTURE and ENVELOPE decoding.

use thiserror::Error;

/// Errors that can occur while decoding a server response or navigating
/// the resulting part tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A token required by the grammar was missing or malformed.
    #[error("Unexpected token at offset {offset}: expected {expected}")]
    UnexpectedToken {
        /// Byte offset where the token was expected.
        offset: usize,
        /// Description of what the grammar required here.
        expected: &'static str,
    },

    /// A `{n}` literal announced more bytes than the input holds.
    #[error("Unterminated literal at offset {offset}: {declared_len} bytes declared")]
    UnterminatedLiteral {
        /// Byte offset of the opening `{`.
        offset: usize,
        /// Length announced by the literal prefix.
        declared_len: usize,
    },

    /// A parenthesized list was never closed, or closed without being opened.
    #[error("Unbalanced parentheses at offset {offset}")]
    UnbalancedParens {
        /// Byte offset where the imbalance was detected.
        offset: usize,
    },

    /// Multipart or embedded-message nesting exceeded the configured limit.
    #[error("Structure nesting exceeds the limit of {limit}")]
    DepthExceeded {
        /// The configured maximum depth.
        limit: usize,
    },

    /// The input was rejected before parsing because of its size.
    #[error("Input of {len} bytes exceeds the limit of {limit}")]
    InputTooLarge {
        /// Length of the rejected input.
        len: usize,
        /// The configured maximum input length.
        limit: usize,
    },

    /// A part path could not be resolved against a tree.
    #[error("Invalid part path {path:?}: {reason}")]
    InvalidPath {
        /// The path as supplied by the caller.
        path: String,
        /// Why resolution failed.
        reason: PathFault,
    },
}

/// Reasons a part path fails to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathFault {
    /// A segment is not a positive decimal integer without leading zeros.
    #[error("segment {0:?} is not a positive decimal index")]
    Malformed(String),

    /// A multipart has fewer children than the index asks for.
    #[error("index {index} is out of range for {len} children")]
    OutOfRange {
        /// The 1-based index that was requested.
        index: u32,
        /// Number of children available.
        len: usize,
    },

    /// Segments remain after reaching a part that has no sub-parts.
    #[error("part {at} has no sub-parts")]
    NotAddressable {
        /// Label of the leaf where navigation stopped.
        at: String,
    },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_offsets() {
        let err = Error::UnterminatedLiteral {
            offset: 7,
            declared_len: 5,
        };
        assert_eq!(
            err.to_string(),
            "Unterminated literal at offset 7: 5 bytes declared"
        );

        let err = Error::UnexpectedToken {
            offset: 12,
            expected: "')'",
        };
        assert!(err.to_string().contains("offset 12"));
    }

    #[test]
    fn test_invalid_path_message() {
        let err = Error::InvalidPath {
            path: "1.9".to_string(),
            reason: PathFault::OutOfRange { index: 9, len: 2 },
        };
        assert_eq!(
            err.to_string(),
            "Invalid part path \"1.9\": index 9 is out of range for 2 children"
        );
    }
}
