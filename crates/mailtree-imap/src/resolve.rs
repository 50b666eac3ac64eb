//! Navigation of a part tree by dotted path.
//!
//! Paths are relative to the node navigation starts from: `2.1` is the
//! first child of the root's second child. A `message/rfc822` part is
//! entered with the index `1`, which leads to its embedded body.

use crate::error::{Error, PathFault};
use crate::types::{Part, PartKind, PartPath};
use crate::Result;

/// Resolves a dotted path such as `1.3.1.2` against `root`.
///
/// The empty path resolves to `root` itself.
pub fn resolve<'a>(root: &'a Part, path: &str) -> Result<&'a Part> {
    let parsed = PartPath::parse(path).map_err(|reason| Error::InvalidPath {
        path: path.to_string(),
        reason,
    })?;
    resolve_path(root, &parsed)
}

/// Resolves an already parsed path against `root`.
pub fn resolve_path<'a>(root: &'a Part, path: &PartPath) -> Result<&'a Part> {
    let invalid = |reason| Error::InvalidPath {
        path: path.to_string(),
        reason,
    };

    let mut current = root;
    for &index in path.segments() {
        current = match &current.kind {
            PartKind::Multipart { children, .. } => usize::try_from(index.get() - 1)
                .ok()
                .and_then(|i| children.get(i))
                .ok_or_else(|| {
                    invalid(PathFault::OutOfRange {
                        index: index.get(),
                        len: children.len(),
                    })
                })?,
            PartKind::Message { embedded, .. } => {
                if index.get() != 1 {
                    tracing::warn!(
                        %path,
                        at = %current.path,
                        index = index.get(),
                        "Embedded message addressed with an index other than 1"
                    );
                }
                embedded
            }
            PartKind::Single { .. } => {
                return Err(invalid(PathFault::NotAddressable {
                    at: current.path.to_string(),
                }));
            }
        };
    }

    Ok(current)
}

impl Part {
    /// Resolves a dotted path relative to this part.
    pub fn resolve(&self, path: &str) -> Result<&Self> {
        resolve(self, path)
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
    use crate::parse_bodystructure;

    const MIXED: &[u8] = b"((\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 10 1)\
        (\"MESSAGE\" \"RFC822\" NIL NIL NIL \"7BIT\" 900 \
         (NIL \"fwd\" NIL NIL NIL NIL NIL NIL NIL NIL) \
         ((\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 10 1)\
          (\"TEXT\" \"HTML\" NIL NIL NIL \"7BIT\" 20 1) \"ALTERNATIVE\") 30) \
        \"MIXED\")";

    #[test]
    fn test_empty_path_is_root() {
        let root = parse_bodystructure(MIXED).unwrap();
        assert_eq!(resolve(&root, "").unwrap(), &root);
    }

    #[test]
    fn test_resolve_children() {
        let root = parse_bodystructure(MIXED).unwrap();
        assert_eq!(root.resolve("1").unwrap().content_type, "text/plain");
        assert_eq!(root.resolve("2").unwrap().content_type, "message/rfc822");
    }

    #[test]
    fn test_resolve_through_embedded_message() {
        let root = parse_bodystructure(MIXED).unwrap();

        let embedded = root.resolve("2.1").unwrap();
        assert_eq!(embedded.content_type, "multipart/alternative");
        assert_eq!(embedded.path.to_string(), "1.2.1");

        let html = root.resolve("2.1.2").unwrap();
        assert_eq!(html.content_type, "text/html");
        assert_eq!(html.path.to_string(), "1.2.1.2");
    }

    #[test]
    fn test_wrong_embedded_index_still_descends() {
        let root = parse_bodystructure(MIXED).unwrap();
        assert_eq!(
            root.resolve("2.3").unwrap().content_type,
            "multipart/alternative"
        );
    }

    #[test]
    fn test_out_of_range() {
        let root = parse_bodystructure(MIXED).unwrap();
        assert_eq!(
            root.resolve("3").unwrap_err(),
            Error::InvalidPath {
                path: "3".to_string(),
                reason: PathFault::OutOfRange { index: 3, len: 2 },
            }
        );
    }

    #[test]
    fn test_into_leaf() {
        let root = parse_bodystructure(MIXED).unwrap();
        assert!(matches!(
            root.resolve("1.1"),
            Err(Error::InvalidPath {
                reason: PathFault::NotAddressable { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_malformed() {
        let root = parse_bodystructure(MIXED).unwrap();
        assert!(matches!(
            root.resolve("1.0"),
            Err(Error::InvalidPath {
                reason: PathFault::Malformed(_),
                ..
            })
        ));
    }
}
