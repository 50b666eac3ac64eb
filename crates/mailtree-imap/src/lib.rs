//! # mailtree-imap
//!
//! Decodes the responses an IMAP server returns for the `BODYSTRUCTURE` and
//! `ENVELOPE` fetch items (RFC 3501 §7.4.2) into an in-memory tree of MIME
//! parts, so a client can browse a message and locate attachments without
//! downloading it.
//!
//! ## Features
//!
//! - **Binary-safe tokens**: `NIL`, quoted strings, `{n}` literals and bare
//!   atoms from lenient servers
//! - **Closed part shapes**: multipart, single part and embedded
//!   `message/rfc822`, matched exhaustively
//! - **Bounded nesting**: hostile structures fail with
//!   [`Error::DepthExceeded`] instead of exhausting the stack
//! - **Path addressing**: dotted paths that step through embedded messages
//! - **Sans-I/O**: pure functions over byte slices, safe to call from any
//!   number of threads
//!
//! ## Quick Start
//!
//! ```
//! use mailtree_imap::parse_bodystructure;
//!
//! let response = b"((\"TEXT\" \"PLAIN\" (\"CHARSET\" \"UTF-8\") NIL NIL \"7BIT\" 20 1)\
//!     (\"APPLICATION\" \"PDF\" (\"NAME\" \"q3.pdf\") NIL NIL \"BASE64\" 4096 NIL \
//!      (\"ATTACHMENT\" (\"FILENAME\" \"q3.pdf\")) NIL NIL) \"MIXED\")";
//!
//! let root = parse_bodystructure(response)?;
//! assert_eq!(root.content_type, "multipart/mixed");
//!
//! let pdf = root.resolve("2")?;
//! assert_eq!(pdf.path.to_string(), "1.2");
//! assert_eq!(pdf.filename(), Some("q3.pdf"));
//! assert_eq!(root.attachments().len(), 1);
//! # Ok::<(), mailtree_imap::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`parser`]: cursor, token reader and the structure/envelope builders
//! - [`types`]: the part tree, envelopes and addresses
//! - [`config`]: depth and size limits, path numbering

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
mod fetch;
pub mod parser;
mod resolve;
pub mod types;

pub use config::{DEFAULT_MAX_DEPTH, ParserConfig, ParserConfigBuilder, PathNumbering};
pub use error::{Error, PathFault, Result};
pub use fetch::FetchResponse;
pub use parser::Parser;
pub use resolve::{resolve, resolve_path};
pub use types::{
    Address, BodyFields, Disposition, Envelope, Extension, Params, Part, PartKind, PartPath, Parts,
};

/// Parses a BODYSTRUCTURE response with the default configuration.
pub fn parse_bodystructure(input: &[u8]) -> Result<Part> {
    Parser::default().bodystructure(input)
}

/// Parses an ENVELOPE response with the default configuration.
pub fn parse_envelope(input: &[u8]) -> Result<Envelope> {
    Parser::default().envelope(input)
}

/// Parses an untagged FETCH line with the default configuration.
pub fn parse_fetch_response(input: &[u8]) -> Result<FetchResponse> {
    Parser::default().fetch(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_trees_are_shareable() {
        assert_send_sync::<Part>();
        assert_send_sync::<Envelope>();
        assert_send_sync::<Parser>();
    }
}
