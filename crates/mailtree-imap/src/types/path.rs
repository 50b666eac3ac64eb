//! Dotted part paths.
//!
//! A path is a sequence of 1-based indices such as `1.3.1.2`. Paths label
//! nodes as they are built and address nodes when resolving.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use crate::error::{Error, PathFault};

/// A dotted decimal part path.
///
/// The empty path is the implicit root prefix: its first child is `1`,
/// not `.1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "String", try_from = "String"))]
pub struct PartPath(Vec<NonZeroU32>);

impl PartPath {
    /// Returns the empty path.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Returns the root label, `1`.
    #[must_use]
    pub fn root() -> Self {
        Self(vec![NonZeroU32::MIN])
    }

    /// Returns the path of this node's `index`-th child.
    #[must_use]
    pub fn child(&self, index: NonZeroU32) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(index);
        Self(segments)
    }

    /// Returns the individual indices.
    #[must_use]
    pub fn segments(&self) -> &[NonZeroU32] {
        &self.0
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for the empty path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses a dotted path. The empty string yields the empty path.
    pub fn parse(s: &str) -> std::result::Result<Self, PathFault> {
        if s.is_empty() {
            return Ok(Self::empty());
        }

        s.split('.').map(parse_segment).collect::<Result<_, _>>().map(Self)
    }
}

fn parse_segment(segment: &str) -> std::result::Result<NonZeroU32, PathFault> {
    let well_formed = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && !segment.starts_with('0');

    well_formed
        .then(|| segment.parse::<u32>().ok())
        .flatten()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| PathFault::Malformed(segment.to_string()))
}

impl fmt::Display for PartPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for PartPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).map_err(|reason| Error::InvalidPath {
            path: s.to_string(),
            reason,
        })
    }
}

impl From<PartPath> for String {
    fn from(path: PartPath) -> Self {
        path.to_string()
    }
}

impl TryFrom<String> for PartPath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
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

    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn test_root_and_children() {
        let root = PartPath::root();
        assert_eq!(root.to_string(), "1");
        assert_eq!(root.child(nz(2)).to_string(), "1.2");
        assert_eq!(root.child(nz(2)).child(nz(10)).to_string(), "1.2.10");
    }

    #[test]
    fn test_empty_prefix_child() {
        assert_eq!(PartPath::empty().child(nz(3)).to_string(), "3");
        assert_eq!(PartPath::empty().to_string(), "");
    }

    #[test]
    fn test_parse_valid() {
        let path: PartPath = "1.3.1.2".parse().unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.to_string(), "1.3.1.2");
        assert!("".parse::<PartPath>().unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["0", "01", "1..2", "1.", ".1", "a", "1.-2", "99999999999"] {
            assert!(
                matches!(PartPath::parse(bad), Err(PathFault::Malformed(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_str_wraps_invalid_path() {
        let err = "1.x".parse::<PartPath>().unwrap_err();
        assert!(matches!(err, Error::InvalidPath { ref path, .. } if path == "1.x"));
    }
}
