//! Sans-I/O parser for BODYSTRUCTURE and ENVELOPE responses.
//!
//! # Architecture
//!
//! - **Cursor**: read position over the raw bytes
//! - **Token reader**: `nstring` grammar and the lists built from it
//! - **Structure and envelope builders**: assemble the value trees
//!
//! # Example
//!
//! ```
//! use mailtree_imap::parser::Parser;
//!
//! let input = b"(\"TEXT\" \"PLAIN\" (\"CHARSET\" \"UTF-8\") NIL NIL \"7BIT\" 1152 23)";
//! let part = Parser::default().bodystructure(input).unwrap();
//!
//! assert_eq!(part.content_type, "text/plain");
//! assert_eq!(part.line_count(), Some(23));
//! ```

pub mod cursor;
mod envelope;
mod reader;
mod structure;

pub use cursor::{Cursor, NString};
pub(crate) use envelope::parse_envelope;
pub use structure::StructureBuilder;

use crate::config::ParserConfig;
use crate::types::{Envelope, Part, PartPath};
use crate::{Error, Result};

/// Parser with a fixed configuration.
///
/// Holds no per-parse state; one instance may be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Creates a parser with the given configuration.
    #[must_use]
    pub const fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses a BODYSTRUCTURE response into a part tree.
    ///
    /// A leading `(BODYSTRUCTURE` or `BODYSTRUCTURE` is skipped. Only
    /// whitespace may follow the structure.
    pub fn bodystructure(&self, input: &[u8]) -> Result<Part> {
        self.check_len(input)?;
        tracing::debug!(
            len = input.len(),
            max_depth = self.config.max_depth,
            "Parsing BODYSTRUCTURE"
        );

        let mut cursor = Cursor::new(input);
        let wrapped = skip_tag(&mut cursor, b"BODYSTRUCTURE");
        let part = self.structure(&mut cursor)?;
        if wrapped {
            cursor.expect_close()?;
        }
        cursor.expect_end()?;

        Ok(part)
    }

    /// Parses an ENVELOPE response.
    ///
    /// A leading `(ENVELOPE` or `ENVELOPE` is skipped.
    pub fn envelope(&self, input: &[u8]) -> Result<Envelope> {
        self.check_len(input)?;
        tracing::debug!(len = input.len(), "Parsing ENVELOPE");

        let mut cursor = Cursor::new(input);
        let wrapped = skip_tag(&mut cursor, b"ENVELOPE");
        let envelope = parse_envelope(&mut cursor)?;
        if wrapped {
            cursor.expect_close()?;
        }
        cursor.expect_end()?;

        Ok(envelope)
    }

    /// Parses a body structure at the cursor, labelled per the configuration.
    pub(crate) fn structure(&self, cursor: &mut Cursor<'_>) -> Result<Part> {
        let prefix = if self.config.numbering.is_sections() {
            PartPath::empty()
        } else {
            PartPath::root()
        };

        StructureBuilder::new(self.config.max_depth)
            .parse(cursor, &prefix)?
            .ok_or_else(|| cursor.unexpected("'(' opening body structure"))
    }

    pub(crate) fn check_len(&self, input: &[u8]) -> Result<()> {
        match self.config.max_input_len {
            Some(limit) if input.len() > limit => Err(Error::InputTooLarge {
                len: input.len(),
                limit,
            }),
            _ => Ok(()),
        }
    }
}

/// Skips an optional `(NAME` or `NAME` tag. Returns true if the tag opened
/// a parenthesis that the caller must close.
fn skip_tag(cursor: &mut Cursor<'_>, name: &[u8]) -> bool {
    cursor.skip_whitespace();
    let start = cursor.position();

    if cursor.eat(b'(') {
        cursor.skip_whitespace();
        if cursor.eat_keyword(name) {
            return true;
        }
        cursor.rewind(start);
        return false;
    }

    cursor.eat_keyword(name);
    false
}

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
    use crate::config::PathNumbering;

    const LEAF: &[u8] = b"(\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 3 1)";

    #[test]
    fn test_tag_forms() {
        let parser = Parser::default();
        let tagged = [
            b"(BODYSTRUCTURE (\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 3 1))\r\n".to_vec(),
            b"BODYSTRUCTURE (\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 3 1)".to_vec(),
            LEAF.to_vec(),
        ];
        for input in &tagged {
            let part = parser.bodystructure(input).unwrap();
            assert_eq!(part.content_type, "text/plain");
        }
    }

    #[test]
    fn test_unclosed_tag() {
        let input = b"(BODYSTRUCTURE (\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 3 1)";
        assert!(matches!(
            Parser::default().bodystructure(input),
            Err(Error::UnbalancedParens { .. })
        ));
    }

    #[test]
    fn test_trailing_garbage() {
        let mut input = LEAF.to_vec();
        input.extend_from_slice(b" extra");
        assert!(matches!(
            Parser::default().bodystructure(&input),
            Err(Error::UnexpectedToken {
                expected: "end of input",
                ..
            })
        ));

        let mut input = LEAF.to_vec();
        input.push(b')');
        assert!(matches!(
            Parser::default().bodystructure(&input),
            Err(Error::UnbalancedParens { .. })
        ));
    }

    #[test]
    fn test_input_limit() {
        let parser = Parser::new(ParserConfig::builder().max_input_len(8).build());
        assert_eq!(
            parser.bodystructure(LEAF),
            Err(Error::InputTooLarge {
                len: LEAF.len(),
                limit: 8
            })
        );
    }

    #[test]
    fn test_sections_numbering() {
        let input = b"((\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 3 1)\
                      ((\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 3 1) \"ALTERNATIVE\") \"MIXED\")";
        let parser = Parser::new(
            ParserConfig::builder()
                .numbering(PathNumbering::Sections)
                .build(),
        );
        let root = parser.bodystructure(input).unwrap();
        assert_eq!(root.path.to_string(), "1");
        assert_eq!(root.children()[0].path.to_string(), "1");
        assert_eq!(root.children()[1].path.to_string(), "2");
        assert_eq!(root.children()[1].children()[0].path.to_string(), "2.1");
    }

    #[test]
    fn test_envelope_tag() {
        let input = b"(ENVELOPE (NIL \"s\" NIL NIL NIL NIL NIL NIL NIL NIL))";
        let envelope = Parser::default().envelope(input).unwrap();
        assert_eq!(envelope.subject.as_deref(), Some("s"));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            Parser::default().bodystructure(b""),
            Err(Error::UnexpectedToken { offset: 0, .. })
        ));
    }
}
