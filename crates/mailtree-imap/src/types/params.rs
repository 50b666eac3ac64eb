//! Body parameters and content dispositions.

/// Ordered `attribute value` pairs from a parenthesized parameter list.
///
/// Whether a list was present at all is expressed by wrapping this in an
/// `Option`: `NIL` decodes to `None`, `()` to an empty `Params`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Params(Vec<(String, String)>);

impl Params {
    /// Creates an empty parameter list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a pair, keeping any earlier pair with the same key.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Returns the first value whose key matches, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Iterates the pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the list held no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A `Content-Disposition` as reported in body extension data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Disposition {
    /// Disposition type as sent by the server, e.g. `ATTACHMENT`.
    pub kind: String,
    /// Disposition parameters, `None` when the server sent `NIL`.
    pub params: Option<Params>,
}

impl Disposition {
    /// Returns true for `attachment`, ignoring case.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.kind.eq_ignore_ascii_case("attachment")
    }

    /// Returns true for `inline`, ignoring case.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.kind.eq_ignore_ascii_case("inline")
    }

    /// Returns the `filename` parameter, if any.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.params.as_ref().and_then(|p| p.get("filename"))
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

    #[test]
    fn test_get_is_case_insensitive_and_ordered() {
        let params: Params = [("CHARSET", "UTF-8"), ("charset", "latin1")]
            .into_iter()
            .collect();
        assert_eq!(params.get("charset"), Some("UTF-8"));
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("boundary"), None);
    }

    #[test]
    fn test_absent_and_empty_differ() {
        let absent: Option<Params> = None;
        let empty = Some(Params::new());
        assert_ne!(absent, empty);
    }

    #[test]
    fn test_disposition_filename() {
        let disposition = Disposition {
            kind: "ATTACHMENT".to_string(),
            params: Some([("FILENAME", "report.pdf")].into_iter().collect()),
        };
        assert!(disposition.is_attachment());
        assert!(!disposition.is_inline());
        assert_eq!(disposition.filename(), Some("report.pdf"));
    }
}
