//! The MIME part tree.

use super::envelope::Envelope;
use super::params::{Disposition, Params};
use super::path::PartPath;

/// One MIME entity of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Part {
    /// Lower-cased `type/subtype`.
    pub content_type: String,
    /// Label assigned while the tree was built.
    pub path: PartPath,
    /// Shape-specific data.
    pub kind: PartKind,
}

/// The three shapes a part can take.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PartKind {
    /// `multipart/*`: an ordered, non-empty list of sub-parts.
    Multipart {
        /// Child parts in wire order.
        children: Vec<Part>,
        /// Content-Type parameters.
        params: Option<Params>,
        /// Trailing extension data (`md5` is always `None`).
        extension: Extension,
    },
    /// Any other single part.
    Single {
        /// Basic body fields.
        fields: BodyFields,
        /// Line count, reported for `text/*` parts only.
        line_count: Option<u64>,
        /// Trailing extension data.
        extension: Extension,
    },
    /// `message/rfc822`: an embedded message with its own envelope and body.
    Message {
        /// Basic body fields.
        fields: BodyFields,
        /// Envelope of the embedded message.
        envelope: Box<Envelope>,
        /// Body structure of the embedded message.
        embedded: Box<Part>,
        /// Line count of the embedded message.
        line_count: Option<u64>,
        /// Trailing extension data.
        extension: Extension,
    },
}

/// Fields every single part carries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyFields {
    /// Content-Type parameters.
    pub params: Option<Params>,
    /// Content-ID.
    pub content_id: Option<String>,
    /// Content-Description.
    pub description: Option<String>,
    /// Content-Transfer-Encoding.
    pub encoding: Option<String>,
    /// Body size in octets, `None` when the server sent `NIL`.
    pub size: Option<u64>,
}

/// Optional body extension data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extension {
    /// Content-MD5.
    pub md5: Option<String>,
    /// Content-Disposition.
    pub disposition: Option<Disposition>,
    /// Content-Language tags.
    pub language: Option<Vec<String>>,
    /// Content-Location.
    pub location: Option<String>,
}

impl Part {
    /// Returns the primary type, e.g. `text`.
    #[must_use]
    pub fn main_type(&self) -> &str {
        self.content_type
            .split_once('/')
            .map_or(self.content_type.as_str(), |(main, _)| main)
    }

    /// Returns the subtype, e.g. `plain`.
    #[must_use]
    pub fn subtype(&self) -> &str {
        self.content_type
            .split_once('/')
            .map_or("", |(_, sub)| sub)
    }

    /// Returns true for `multipart/*` parts.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self.kind, PartKind::Multipart { .. })
    }

    /// Returns true for `message/rfc822` parts.
    #[must_use]
    pub const fn is_message(&self) -> bool {
        matches!(self.kind, PartKind::Message { .. })
    }

    /// Returns the sub-parts of a multipart, or an empty slice.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match &self.kind {
            PartKind::Multipart { children, .. } => children,
            _ => &[],
        }
    }

    /// Returns the embedded message body of a `message/rfc822` part.
    #[must_use]
    pub fn embedded(&self) -> Option<&Self> {
        match &self.kind {
            PartKind::Message { embedded, .. } => Some(embedded),
            _ => None,
        }
    }

    /// Returns the envelope of a `message/rfc822` part.
    #[must_use]
    pub fn envelope(&self) -> Option<&Envelope> {
        match &self.kind {
            PartKind::Message { envelope, .. } => Some(envelope),
            _ => None,
        }
    }

    /// Returns the basic body fields of a single part.
    #[must_use]
    pub const fn fields(&self) -> Option<&BodyFields> {
        match &self.kind {
            PartKind::Single { fields, .. } | PartKind::Message { fields, .. } => Some(fields),
            PartKind::Multipart { .. } => None,
        }
    }

    /// Returns the extension data.
    #[must_use]
    pub const fn extension(&self) -> &Extension {
        match &self.kind {
            PartKind::Multipart { extension, .. }
            | PartKind::Single { extension, .. }
            | PartKind::Message { extension, .. } => extension,
        }
    }

    /// Returns the Content-Type parameters.
    #[must_use]
    pub fn params(&self) -> Option<&Params> {
        match &self.kind {
            PartKind::Multipart { params, .. } => params.as_ref(),
            PartKind::Single { fields, .. } | PartKind::Message { fields, .. } => {
                fields.params.as_ref()
            }
        }
    }

    /// Returns the Content-Disposition.
    #[must_use]
    pub const fn disposition(&self) -> Option<&Disposition> {
        self.extension().disposition.as_ref()
    }

    /// Returns the size in octets of a single part.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.fields().and_then(|f| f.size)
    }

    /// Returns the line count of a text or embedded-message part.
    #[must_use]
    pub const fn line_count(&self) -> Option<u64> {
        match &self.kind {
            PartKind::Single { line_count, .. } | PartKind::Message { line_count, .. } => {
                *line_count
            }
            PartKind::Multipart { .. } => None,
        }
    }

    /// Returns the file name from the disposition, falling back to the
    /// Content-Type `name` parameter.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.disposition()
            .and_then(Disposition::filename)
            .or_else(|| self.params().and_then(|p| p.get("name")))
    }

    /// Returns true if this single part looks like an attachment.
    ///
    /// Inline text is body content; inline parts of other types count when
    /// they carry a file name.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        if self.is_multipart() {
            return false;
        }
        match self.disposition() {
            Some(d) if d.is_attachment() => true,
            Some(d) if d.is_inline() && self.main_type() == "text" => false,
            _ => self.filename().is_some(),
        }
    }

    /// Iterates every node depth-first, parents before children, stepping
    /// into embedded messages.
    #[must_use]
    pub fn iter(&self) -> Parts<'_> {
        Parts { stack: vec![self] }
    }

    /// Collects the parts that look like attachments.
    #[must_use]
    pub fn attachments(&self) -> Vec<&Self> {
        self.iter().filter(|p| p.is_attachment()).collect()
    }

    /// Finds the node carrying the given label.
    ///
    /// Descendants are searched before `self`: with section numbering the
    /// first top-level child shares the root's label `1`.
    #[must_use]
    pub fn find(&self, path: &PartPath) -> Option<&Self> {
        self.iter()
            .skip(1)
            .find(|p| &p.path == path)
            .or_else(|| (&self.path == path).then_some(self))
    }
}

impl<'a> IntoIterator for &'a Part {
    type Item = &'a Part;
    type IntoIter = Parts<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Depth-first iterator over a part tree.
#[derive(Debug, Clone)]
pub struct Parts<'a> {
    stack: Vec<&'a Part>,
}

impl<'a> Iterator for Parts<'a> {
    type Item = &'a Part;

    fn next(&mut self) -> Option<Self::Item> {
        let part = self.stack.pop()?;
        match &part.kind {
            PartKind::Multipart { children, .. } => self.stack.extend(children.iter().rev()),
            PartKind::Message { embedded, .. } => self.stack.push(embedded),
            PartKind::Single { .. } => {}
        }
        Some(part)
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

    fn leaf(content_type: &str, path: &str, extension: Extension) -> Part {
        Part {
            content_type: content_type.to_string(),
            path: path.parse().unwrap(),
            kind: PartKind::Single {
                fields: BodyFields::default(),
                line_count: None,
                extension,
            },
        }
    }

    fn attachment(name: &str) -> Extension {
        Extension {
            disposition: Some(Disposition {
                kind: "attachment".to_string(),
                params: Some([("filename", name)].into_iter().collect()),
            }),
            ..Default::default()
        }
    }

    fn sample() -> Part {
        let inner = leaf("text/plain", "1.2.1", Extension::default());
        let message = Part {
            content_type: "message/rfc822".to_string(),
            path: "1.2".parse().unwrap(),
            kind: PartKind::Message {
                fields: BodyFields::default(),
                envelope: Box::default(),
                embedded: Box::new(inner),
                line_count: Some(4),
                extension: Extension::default(),
            },
        };
        Part {
            content_type: "multipart/mixed".to_string(),
            path: PartPath::root(),
            kind: PartKind::Multipart {
                children: vec![
                    leaf("text/plain", "1.1", Extension::default()),
                    message,
                    leaf("application/pdf", "1.3", attachment("a.pdf")),
                ],
                params: None,
                extension: Extension::default(),
            },
        }
    }

    #[test]
    fn test_type_segments() {
        let part = leaf("text/html", "1", Extension::default());
        assert_eq!(part.main_type(), "text");
        assert_eq!(part.subtype(), "html");
    }

    #[test]
    fn test_iter_is_preorder() {
        let root = sample();
        let paths: Vec<String> = root.iter().map(|p| p.path.to_string()).collect();
        assert_eq!(paths, ["1", "1.1", "1.2", "1.2.1", "1.3"]);
    }

    #[test]
    fn test_find_by_label() {
        let root = sample();
        let found = root.find(&"1.2.1".parse().unwrap()).unwrap();
        assert_eq!(found.content_type, "text/plain");
        assert!(root.find(&"1.4".parse().unwrap()).is_none());
    }

    #[test]
    fn test_attachments() {
        let root = sample();
        let attachments = root.attachments();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].filename(), Some("a.pdf"));
    }

    #[test]
    fn test_inline_parts() {
        let inline = |name: Option<&str>| Extension {
            disposition: Some(Disposition {
                kind: "inline".to_string(),
                params: name.map(|n| [("filename", n)].into_iter().collect()),
            }),
            ..Default::default()
        };

        assert!(leaf("image/png", "1", inline(Some("logo.png"))).is_attachment());
        assert!(!leaf("image/png", "1", inline(None)).is_attachment());
        assert!(!leaf("text/plain", "1", inline(Some("notes.txt"))).is_attachment());
    }

    #[test]
    fn test_find_prefers_descendants() {
        let root = Part {
            content_type: "multipart/mixed".to_string(),
            path: PartPath::root(),
            kind: PartKind::Multipart {
                children: vec![
                    leaf("text/plain", "1", Extension::default()),
                    leaf("image/png", "2", Extension::default()),
                ],
                params: None,
                extension: Extension::default(),
            },
        };

        assert_eq!(root.find(&PartPath::root()).unwrap().content_type, "text/plain");
        assert_eq!(root.find(&"2".parse().unwrap()).unwrap().content_type, "image/png");

        let single = leaf("text/plain", "1", Extension::default());
        assert_eq!(single.find(&PartPath::root()), Some(&single));
    }

    #[test]
    fn test_accessors_by_shape() {
        let root = sample();
        assert!(root.is_multipart());
        assert_eq!(root.children().len(), 3);
        assert!(root.fields().is_none());

        let message = &root.children()[1];
        assert!(message.is_message());
        assert_eq!(message.line_count(), Some(4));
        assert!(message.envelope().is_some());
        assert_eq!(message.embedded().unwrap().path.to_string(), "1.2.1");
    }
}
