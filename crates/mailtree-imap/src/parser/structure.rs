//! BODYSTRUCTURE decoding.
//!
//! ```text
//! body           = "(" (body-type-1part / body-type-mpart) ")"
//! body-type-mpart = 1*body SP media-subtype [SP body-ext-mpart]
//! body-type-1part = (body-type-basic / body-type-msg / body-type-text)
//!                   [SP body-ext-1part]
//! ```

use std::num::NonZeroU32;

use crate::types::{BodyFields, Extension, Part, PartKind, PartPath};
use crate::{Error, Result};

use super::cursor::Cursor;
use super::envelope::parse_envelope;

const MESSAGE_RFC822: &str = "message/rfc822";

/// Recursive builder for part trees with a nesting bound.
#[derive(Debug, Clone, Copy)]
pub struct StructureBuilder {
    max_depth: usize,
}

impl StructureBuilder {
    /// Creates a builder that rejects nesting deeper than `max_depth`.
    #[must_use]
    pub const fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Parses one body at the cursor.
    ///
    /// Returns `Ok(None)` if the next token is not `(`. Children of a
    /// multipart are labelled `prefix.i`; an empty prefix labels the node
    /// itself `1` and its children `i`.
    pub fn parse(&self, cursor: &mut Cursor<'_>, prefix: &PartPath) -> Result<Option<Part>> {
        self.parse_at(cursor, prefix, 1)
    }

    fn parse_at(
        &self,
        cursor: &mut Cursor<'_>,
        prefix: &PartPath,
        depth: usize,
    ) -> Result<Option<Part>> {
        cursor.skip_whitespace();
        if !cursor.eat(b'(') {
            return Ok(None);
        }
        if depth > self.max_depth {
            return Err(Error::DepthExceeded {
                limit: self.max_depth,
            });
        }

        let label = if prefix.is_empty() {
            PartPath::root()
        } else {
            prefix.clone()
        };

        cursor.skip_whitespace();
        let part = if cursor.peek() == Some(b'(') {
            self.multipart(cursor, prefix, label, depth)?
        } else {
            self.single(cursor, label, depth)?
        };

        let skipped = cursor.skip_to_close()?;
        if skipped > 0 {
            tracing::debug!(path = %part.path, skipped, "Skipped unknown body extension data");
        }
        cursor.expect_close()?;

        tracing::trace!(path = %part.path, content_type = %part.content_type, "Parsed part");
        Ok(Some(part))
    }

    fn multipart(
        &self,
        cursor: &mut Cursor<'_>,
        prefix: &PartPath,
        label: PartPath,
        depth: usize,
    ) -> Result<Part> {
        let mut children = Vec::new();
        let mut index = NonZeroU32::MIN;
        while let Some(child) = self.parse_at(cursor, &prefix.child(index), depth + 1)? {
            children.push(child);
            index = index.saturating_add(1);
        }

        let subtype = cursor.read_string("multipart subtype")?;
        let params = cursor.read_param_pairs()?;
        let extension = Extension {
            md5: None,
            disposition: cursor.read_disposition()?,
            language: cursor.read_language()?,
            location: cursor.read_optional()?,
        };

        Ok(Part {
            content_type: format!("multipart/{}", subtype.to_ascii_lowercase()),
            path: label,
            kind: PartKind::Multipart {
                children,
                params,
                extension,
            },
        })
    }

    fn single(&self, cursor: &mut Cursor<'_>, label: PartPath, depth: usize) -> Result<Part> {
        let media_type = cursor.read_string("media type")?;
        let media_subtype = cursor.read_string("media subtype")?;
        let content_type = format!("{media_type}/{media_subtype}").to_ascii_lowercase();

        let fields = BodyFields {
            params: cursor.read_param_pairs()?,
            content_id: cursor.read_field("content id")?,
            description: cursor.read_field("content description")?,
            encoding: cursor.read_field("content transfer encoding")?,
            size: cursor.read_number("body size")?,
        };

        let kind = if content_type == MESSAGE_RFC822 {
            let envelope = parse_envelope(cursor)?;
            let embedded = self
                .parse_at(cursor, &label.child(NonZeroU32::MIN), depth + 1)?
                .ok_or_else(|| cursor.unexpected("'(' opening embedded body"))?;
            let line_count = cursor.read_optional_number("body lines")?;

            PartKind::Message {
                fields,
                envelope: Box::new(envelope),
                embedded: Box::new(embedded),
                line_count,
                extension: read_extension(cursor)?,
            }
        } else {
            let line_count = if content_type.starts_with("text/") {
                cursor.read_optional_number("body lines")?
            } else {
                None
            };

            PartKind::Single {
                fields,
                line_count,
                extension: read_extension(cursor)?,
            }
        };

        Ok(Part {
            content_type,
            path: label,
            kind,
        })
    }
}

/// Reads the single-part extension fields; each may be missing.
fn read_extension(cursor: &mut Cursor<'_>) -> Result<Extension> {
    Ok(Extension {
        md5: cursor.read_optional()?,
        disposition: cursor.read_disposition()?,
        language: cursor.read_language()?,
        location: cursor.read_optional()?,
    })
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
    use crate::config::DEFAULT_MAX_DEPTH;

    fn parse(input: &[u8]) -> Result<Option<Part>> {
        StructureBuilder::new(DEFAULT_MAX_DEPTH).parse(&mut Cursor::new(input), &PartPath::root())
    }

    #[test]
    fn test_text_plain() {
        let part = parse(
            b"(\"TEXT\" \"PLAIN\" (\"CHARSET\" \"UTF-8\") NIL NIL \"7BIT\" 1152 23 NIL NIL NIL NIL)",
        )
        .unwrap()
        .unwrap();

        assert_eq!(part.content_type, "text/plain");
        assert_eq!(part.path.to_string(), "1");
        assert_eq!(part.params().unwrap().get("CHARSET"), Some("UTF-8"));
        assert_eq!(part.size(), Some(1152));
        assert_eq!(part.line_count(), Some(23));
        assert_eq!(part.disposition(), None);
        let fields = part.fields().unwrap();
        assert_eq!(fields.encoding.as_deref(), Some("7BIT"));
        assert_eq!(fields.content_id, None);
    }

    #[test]
    fn test_not_a_body() {
        assert_eq!(parse(b"NIL").unwrap(), None);
        assert_eq!(parse(b"").unwrap(), None);
    }

    #[test]
    fn test_multipart_children() {
        let part = parse(
            b"((\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 10 1)\
              (\"IMAGE\" \"PNG\" NIL NIL NIL \"BASE64\" 2048) \"MIXED\")",
        )
        .unwrap()
        .unwrap();

        assert_eq!(part.content_type, "multipart/mixed");
        let paths: Vec<String> = part.children().iter().map(|c| c.path.to_string()).collect();
        assert_eq!(paths, ["1.1", "1.2"]);
        assert_eq!(part.children()[1].line_count(), None);
        assert_eq!(part.extension(), &Extension::default());
    }

    #[test]
    fn test_empty_prefix_children() {
        let input = b"((\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 10 1)\
                      (\"TEXT\" \"HTML\" NIL NIL NIL \"7BIT\" 20 1) \"ALTERNATIVE\")";
        let part = StructureBuilder::new(DEFAULT_MAX_DEPTH)
            .parse(&mut Cursor::new(input), &PartPath::empty())
            .unwrap()
            .unwrap();

        assert_eq!(part.path.to_string(), "1");
        assert_eq!(part.children()[0].path.to_string(), "1");
        assert_eq!(part.children()[1].path.to_string(), "2");
    }

    #[test]
    fn test_message_rfc822() {
        let part = parse(
            b"(\"MESSAGE\" \"RFC822\" NIL NIL NIL \"7BIT\" 512 \
              (NIL \"inner\" NIL NIL NIL NIL NIL NIL NIL NIL) \
              (\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 100 5) 12)",
        )
        .unwrap()
        .unwrap();

        assert!(part.is_message());
        assert_eq!(part.line_count(), Some(12));
        assert_eq!(part.envelope().unwrap().subject.as_deref(), Some("inner"));
        let embedded = part.embedded().unwrap();
        assert_eq!(embedded.path.to_string(), "1.1");
        assert_eq!(embedded.content_type, "text/plain");
    }

    #[test]
    fn test_extension_data() {
        let part = parse(
            b"(\"APPLICATION\" \"PDF\" (\"NAME\" \"a.pdf\") \"<id@x>\" \"Report\" \"BASE64\" 4096 \
              \"abc123\" (\"ATTACHMENT\" (\"FILENAME\" \"a.pdf\")) (\"EN\" \"FR\") \"http://x/a.pdf\" \
              (\"X-FUTURE\" 1) 42)",
        )
        .unwrap()
        .unwrap();

        let extension = part.extension();
        assert_eq!(extension.md5.as_deref(), Some("abc123"));
        assert!(extension.disposition.as_ref().unwrap().is_attachment());
        assert_eq!(extension.language.as_ref().unwrap().len(), 2);
        assert_eq!(extension.location.as_deref(), Some("http://x/a.pdf"));
        assert_eq!(part.fields().unwrap().content_id.as_deref(), Some("<id@x>"));
        assert!(part.is_attachment());
    }

    #[test]
    fn test_nil_size_is_unknown() {
        let part = parse(b"(\"APPLICATION\" \"OCTET-STREAM\" NIL NIL NIL NIL NIL)")
            .unwrap()
            .unwrap();
        assert_eq!(part.size(), None);
        assert_eq!(part.fields().unwrap().encoding, None);
    }

    #[test]
    fn test_missing_required_field() {
        let err = parse(b"(\"TEXT\" \"PLAIN\" NIL NIL)").unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { offset: 23, .. }));
    }

    #[test]
    fn test_unclosed_part() {
        let err = parse(b"(\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 10 1").unwrap_err();
        assert!(matches!(err, Error::UnbalancedParens { .. }));
    }

    #[test]
    fn test_depth_limit() {
        let input = b"(((\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 1 1) \"MIXED\") \"MIXED\")";
        let builder = StructureBuilder::new(2);
        let err = builder
            .parse(&mut Cursor::new(input), &PartPath::root())
            .unwrap_err();
        assert_eq!(err, Error::DepthExceeded { limit: 2 });

        let builder = StructureBuilder::new(3);
        assert!(builder.parse(&mut Cursor::new(input), &PartPath::root()).is_ok());
    }
}
