//! Randomized structure trees rendered to wire form and decoded back.

#![allow(clippy::unwrap_used)]

use std::fmt::Write as _;

use mailtree_imap::{Error, Part, PathFault, parse_bodystructure};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Node {
    Leaf { media: String, subtype: String, size: u32 },
    Text { subtype: String, size: u32, lines: u32 },
    Multipart { children: Vec<Node>, subtype: String },
    Message(Box<Node>),
}

impl Node {
    fn content_type(&self) -> String {
        match self {
            Self::Leaf { media, subtype, .. } => format!("{media}/{subtype}"),
            Self::Text { subtype, .. } => format!("text/{subtype}"),
            Self::Multipart { subtype, .. } => format!("multipart/{subtype}"),
            Self::Message(_) => "message/rfc822".to_string(),
        }
        .to_ascii_lowercase()
    }

    fn render(&self, out: &mut String) {
        match self {
            Self::Leaf {
                media,
                subtype,
                size,
            } => {
                write!(out, "(\"{media}\" \"{subtype}\" NIL NIL NIL \"BASE64\" {size})").unwrap();
            }
            Self::Text {
                subtype,
                size,
                lines,
            } => {
                write!(
                    out,
                    "(\"TEXT\" \"{subtype}\" (\"CHARSET\" \"UTF-8\") NIL NIL \"7BIT\" {size} {lines} NIL NIL NIL NIL)"
                )
                .unwrap();
            }
            Self::Multipart { children, subtype } => {
                out.push('(');
                for child in children {
                    child.render(out);
                }
                write!(out, " \"{subtype}\" (\"BOUNDARY\" \"b\") NIL NIL NIL)").unwrap();
            }
            Self::Message(inner) => {
                out.push_str(
                    "(\"MESSAGE\" \"RFC822\" NIL NIL NIL \"7BIT\" 100 \
                     (NIL \"fwd\" NIL NIL NIL NIL NIL NIL NIL NIL) ",
                );
                inner.render(out);
                out.push_str(" 5)");
            }
        }
    }

    fn to_wire(&self) -> String {
        let mut out = String::new();
        self.render(&mut out);
        out
    }
}

fn node() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        ("X-[A-Za-z]{1,6}", "[A-Za-z]{1,8}", any::<u32>()).prop_map(|(media, subtype, size)| {
            Node::Leaf {
                media,
                subtype,
                size,
            }
        }),
        ("[A-Za-z]{1,8}", any::<u32>(), any::<u32>()).prop_map(|(subtype, size, lines)| {
            Node::Text {
                subtype,
                size,
                lines,
            }
        }),
    ];

    leaf.prop_recursive(5, 48, 4, |inner| {
        prop_oneof![
            (prop::collection::vec(inner.clone(), 1..5), "[A-Za-z]{1,8}")
                .prop_map(|(children, subtype)| Node::Multipart { children, subtype }),
            inner.prop_map(|n| Node::Message(Box::new(n))),
        ]
    })
}

fn join(segments: &[u32]) -> String {
    segments
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Walks the generated tree and the decoded tree together.
fn check(root: &Part, node: &Node, part: &Part, relative: &mut Vec<u32>) {
    assert_eq!(part.content_type, node.content_type());

    let mut label = vec![1];
    label.extend_from_slice(relative);
    assert_eq!(part.path.to_string(), join(&label));

    let resolved = root.resolve(&join(relative)).unwrap();
    assert_eq!(resolved, part);

    match node {
        Node::Leaf { size, .. } => {
            assert_eq!(part.size(), Some(u64::from(*size)));
            assert!(part.line_count().is_none());
        }
        Node::Text { size, lines, .. } => {
            assert_eq!(part.size(), Some(u64::from(*size)));
            assert_eq!(part.line_count(), Some(u64::from(*lines)));
        }
        Node::Multipart { children, .. } => {
            assert_eq!(part.children().len(), children.len());
            for (i, (child, decoded)) in children.iter().zip(part.children()).enumerate() {
                relative.push(u32::try_from(i + 1).unwrap());
                check(root, child, decoded, relative);
                relative.pop();
            }

            relative.push(u32::try_from(children.len() + 1).unwrap());
            let err = root.resolve(&join(relative)).unwrap_err();
            assert!(matches!(
                err,
                Error::InvalidPath {
                    reason: PathFault::OutOfRange { .. },
                    ..
                }
            ));
            relative.pop();
        }
        Node::Message(inner) => {
            assert_eq!(part.line_count(), Some(5));
            relative.push(1);
            check(root, inner, part.embedded().unwrap(), relative);
            relative.pop();
        }
    }
}

proptest! {
    #[test]
    fn decoded_tree_matches_generated(tree in node()) {
        let root = parse_bodystructure(tree.to_wire().as_bytes()).unwrap();
        check(&root, &tree, &root, &mut Vec::new());
    }

    #[test]
    fn every_truncation_is_rejected(tree in node(), cut in any::<prop::sample::Index>()) {
        let wire = tree.to_wire();
        let end = cut.index(wire.len());
        prop_assert!(parse_bodystructure(&wire.as_bytes()[..end]).is_err());
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = parse_bodystructure(&bytes);
    }

    #[test]
    fn iteration_visits_every_part(tree in node()) {
        let root = parse_bodystructure(tree.to_wire().as_bytes()).unwrap();
        for part in &root {
            let found = root.find(&part.path).unwrap();
            prop_assert_eq!(found, part);
        }
    }
}
