//! Extraction of ENVELOPE and BODYSTRUCTURE from an untagged FETCH line.
//!
//! ```text
//! * 12 FETCH (UID 4827 RFC822.SIZE 44827 ENVELOPE (...) BODYSTRUCTURE (...))
//! ```
//!
//! Items other than `UID`, `RFC822.SIZE`, `ENVELOPE`, `BODYSTRUCTURE` and
//! section-less `BODY` are skipped, literals included.

use crate::parser::{Cursor, Parser, parse_envelope};
use crate::types::{Envelope, Part};
use crate::Result;

/// The items of one FETCH response this crate decodes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchResponse {
    /// Message sequence number.
    pub seq: u32,
    /// UID, if requested.
    pub uid: Option<u32>,
    /// RFC822.SIZE, if requested.
    pub size: Option<u64>,
    /// Envelope, if requested.
    pub envelope: Option<Envelope>,
    /// Body structure from `BODYSTRUCTURE` or `BODY`.
    pub body_structure: Option<Part>,
}

impl Parser {
    /// Parses a `* <seq> FETCH (...)` line.
    pub fn fetch(&self, input: &[u8]) -> Result<FetchResponse> {
        self.check_len(input)?;
        tracing::debug!(len = input.len(), "Parsing FETCH response");

        let mut cursor = Cursor::new(input);
        cursor.skip_whitespace();
        if !cursor.eat(b'*') {
            return Err(cursor.unexpected("'*'"));
        }

        let seq = cursor
            .read_number("message sequence number")?
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| cursor.unexpected("message sequence number"))?;

        cursor.skip_whitespace();
        if !cursor.eat_keyword(b"FETCH") {
            return Err(cursor.unexpected("FETCH"));
        }
        cursor.expect_open("'(' opening fetch items")?;

        let mut response = FetchResponse {
            seq,
            ..FetchResponse::default()
        };

        loop {
            cursor.skip_whitespace();
            if cursor.eat(b')') {
                break;
            }
            if cursor.is_eof() {
                return Err(crate::Error::UnbalancedParens {
                    offset: cursor.position(),
                });
            }

            let name = cursor.read_string("fetch item name")?.to_ascii_uppercase();
            match name.as_str() {
                "UID" => {
                    let uid = cursor
                        .read_number("UID")?
                        .and_then(|n| u32::try_from(n).ok())
                        .ok_or_else(|| cursor.unexpected("UID"))?;
                    response.uid = Some(uid);
                }
                "RFC822.SIZE" => response.size = cursor.read_number("RFC822.SIZE")?,
                "ENVELOPE" => response.envelope = Some(parse_envelope(&mut cursor)?),
                "BODYSTRUCTURE" | "BODY" => {
                    response.body_structure = Some(self.structure(&mut cursor)?);
                }
                _ => {
                    tracing::trace!(item = %name, "Skipping fetch item");
                    cursor.skip_value()?;
                }
            }
        }

        cursor.expect_end()?;
        Ok(response)
    }
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
    use crate::Error;

    #[test]
    fn test_parse_fetch_items() {
        let data = b"* 12 FETCH (FLAGS (\\Seen \\Flagged) UID 4827 RFC822.SIZE 3 \
            INTERNALDATE \"17-Jul-1996 02:44:25 -0700\" \
            ENVELOPE (NIL \"hi\" NIL NIL NIL NIL NIL NIL NIL NIL) \
            BODY[HEADER] {3}\r\n)()\
            BODYSTRUCTURE (\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 3 1))\r\n";
        let response = Parser::default().fetch(data).unwrap();

        assert_eq!(response.seq, 12);
        assert_eq!(response.uid, Some(4827));
        assert_eq!(response.size, Some(3));
        assert_eq!(response.envelope.unwrap().subject.as_deref(), Some("hi"));
        assert_eq!(response.body_structure.unwrap().content_type, "text/plain");
    }

    #[test]
    fn test_body_without_extension_data() {
        let data = b"* 1 FETCH (BODY ((\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 3 1)\
            (\"IMAGE\" \"GIF\" NIL NIL NIL \"BASE64\" 90) \"MIXED\"))";
        let response = Parser::default().fetch(data).unwrap();
        let root = response.body_structure.unwrap();
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.extension().disposition, None);
    }

    #[test]
    fn test_not_a_fetch() {
        assert!(matches!(
            Parser::default().fetch(b"* 3 EXISTS"),
            Err(Error::UnexpectedToken {
                expected: "FETCH",
                ..
            })
        ));
        assert!(Parser::default().fetch(b"A1 OK done").is_err());
    }

    #[test]
    fn test_uid_out_of_range() {
        assert!(matches!(
            Parser::default().fetch(b"* 3 FETCH (UID 4294967296)"),
            Err(Error::UnexpectedToken { expected: "UID", .. })
        ));
        assert!(matches!(
            Parser::default().fetch(b"* 3 FETCH (UID NIL)"),
            Err(Error::UnexpectedToken { expected: "UID", .. })
        ));
        assert_eq!(
            Parser::default().fetch(b"* 3 FETCH (UID 4294967295)").unwrap().uid,
            Some(u32::MAX)
        );
    }

    #[test]
    fn test_unclosed_items() {
        assert!(matches!(
            Parser::default().fetch(b"* 3 FETCH (UID 7"),
            Err(Error::UnbalancedParens { .. })
        ));
    }
}
