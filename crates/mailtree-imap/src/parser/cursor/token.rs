//! Three-state result of reading an `nstring`.

use std::borrow::Cow;

/// Outcome of reading one `nstring` token.
///
/// `NoMatch` means no token of this kind starts at the cursor. It ends
/// loops and marks missing trailing fields, and is never confused with an
/// explicit `NIL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NString<'a> {
    /// The `NIL` keyword.
    Nil,
    /// Nothing readable as an `nstring` at this position.
    NoMatch,
    /// A quoted string, literal or atom. Borrowed unless unescaping was needed.
    Value(Cow<'a, [u8]>),
}

impl NString<'_> {
    /// Returns true for a string value.
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Returns true for `Nil` or `NoMatch`, the tokens that end a list.
    #[must_use]
    pub const fn is_terminator(&self) -> bool {
        !self.is_value()
    }

    /// Returns the raw bytes of a string value.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Value(bytes) => Some(bytes),
            Self::Nil | Self::NoMatch => None,
        }
    }

    /// Converts a string value to UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn into_string(self) -> Option<String> {
        match self {
            Self::Value(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Self::Nil | Self::NoMatch => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parser::Cursor;

    #[test]
    fn test_literal_bytes_and_lossy_string() {
        let mut cursor = Cursor::new(b"{4}\r\na\xff)b");
        let token = cursor.read_nstring().unwrap();

        assert_eq!(token.as_bytes(), Some(&b"a\xff)b"[..]));
        assert_eq!(token.into_string().as_deref(), Some("a\u{fffd})b"));
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_terminators() {
        assert!(NString::Nil.is_terminator());
        assert!(NString::NoMatch.is_terminator());
        assert!(!NString::Value(Cow::Borrowed(b"x")).is_terminator());
    }
}
