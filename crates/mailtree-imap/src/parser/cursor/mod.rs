//! Read position over an IMAP response buffer.
//!
//! The cursor only ever moves forward. Lookahead helpers that fail leave the
//! position where it was.

mod token;

pub use token::NString;

use crate::{Error, Result};

/// Read position over an immutable input buffer.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of the input.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Returns the current byte offset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the unread input.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    /// Returns true if all input has been consumed.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Peeks at the current byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Advances by one byte and returns it.
    pub fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Consumes a run of spaces.
    pub fn skip_whitespace(&mut self) {
        while self.peek() == Some(b' ') {
            self.pos += 1;
        }
    }

    /// Consumes trailing whitespace, including line breaks.
    pub fn skip_trailing_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Consumes exactly `n` bytes, or nothing if fewer remain.
    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.input.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    /// Consumes bytes while `pred` holds and returns them.
    pub fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    /// Consumes `byte` if it is next.
    pub fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes `keyword` (ASCII case-insensitive) if it is next and is not
    /// immediately followed by another atom character.
    pub fn eat_keyword(&mut self, keyword: &[u8]) -> bool {
        let Some(candidate) = self.input.get(self.pos..self.pos + keyword.len()) else {
            return false;
        };
        let boundary = self
            .input
            .get(self.pos + keyword.len())
            .is_none_or(|&b| !is_atom_char(b));

        if boundary && candidate.eq_ignore_ascii_case(keyword) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    /// Moves back to an offset previously returned by [`Self::position`].
    pub(crate) fn rewind(&mut self, pos: usize) {
        debug_assert!(pos <= self.pos);
        self.pos = pos;
    }

    /// Creates an unexpected-token error at the current position.
    #[must_use]
    pub const fn unexpected(&self, expected: &'static str) -> Error {
        Error::UnexpectedToken {
            offset: self.pos,
            expected,
        }
    }

    /// Expects and consumes `(`.
    pub fn expect_open(&mut self, expected: &'static str) -> Result<()> {
        self.skip_whitespace();
        if self.eat(b'(') {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Expects and consumes `)`.
    ///
    /// Running out of input here means a list was never closed.
    pub fn expect_close(&mut self) -> Result<()> {
        self.skip_whitespace();
        match self.peek() {
            Some(b')') => {
                self.pos += 1;
                Ok(())
            }
            None => Err(Error::UnbalancedParens { offset: self.pos }),
            Some(_) => Err(self.unexpected("')'")),
        }
    }

    /// Requires that only whitespace remains.
    pub fn expect_end(&mut self) -> Result<()> {
        self.skip_trailing_whitespace();
        match self.peek() {
            None => Ok(()),
            Some(b')') => Err(Error::UnbalancedParens { offset: self.pos }),
            Some(_) => Err(self.unexpected("end of input")),
        }
    }
}

/// Returns true if the byte may appear in a bare atom.
///
/// Excludes `( ) { SP % * " \` and control characters. `]` is accepted so
/// that atoms like `BODY[1]` from lenient servers stay in one piece.
#[must_use]
pub const fn is_atom_char(b: u8) -> bool {
    !matches!(b, b'(' | b')' | b'{' | b' ' | b'%' | b'*' | b'"' | b'\\') && b > 0x1F && b != 0x7F
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
    fn test_skip_whitespace() {
        let mut cursor = Cursor::new(b"   (");
        cursor.skip_whitespace();
        assert_eq!(cursor.position(), 3);
        assert_eq!(cursor.peek(), Some(b'('));
    }

    #[test]
    fn test_take_exact() {
        let mut cursor = Cursor::new(b"hello world");
        assert_eq!(cursor.take(5), Some(&b"hello"[..]));
        assert_eq!(cursor.take(100), None);
        assert_eq!(cursor.position(), 5);
        assert_eq!(cursor.remaining(), b" world");
    }

    #[test]
    fn test_eat_keyword_requires_boundary() {
        let mut cursor = Cursor::new(b"NILS");
        assert!(!cursor.eat_keyword(b"NIL"));
        assert_eq!(cursor.position(), 0);

        let mut cursor = Cursor::new(b"nil)");
        assert!(cursor.eat_keyword(b"NIL"));
        assert_eq!(cursor.peek(), Some(b')'));
    }

    #[test]
    fn test_expect_close_at_eof() {
        let mut cursor = Cursor::new(b"  ");
        assert_eq!(
            cursor.expect_close(),
            Err(Error::UnbalancedParens { offset: 2 })
        );
    }

    #[test]
    fn test_expect_close_wrong_token() {
        let mut cursor = Cursor::new(b"\"x\"");
        assert!(matches!(
            cursor.expect_close(),
            Err(Error::UnexpectedToken { offset: 0, .. })
        ));
    }

    #[test]
    fn test_expect_end() {
        let mut cursor = Cursor::new(b" \r\n");
        assert!(cursor.expect_end().is_ok());

        let mut cursor = Cursor::new(b" )");
        assert_eq!(
            cursor.expect_end(),
            Err(Error::UnbalancedParens { offset: 1 })
        );
    }

    #[test]
    fn test_is_atom_char() {
        assert!(is_atom_char(b'A'));
        assert!(is_atom_char(b'7'));
        assert!(is_atom_char(b']'));
        assert!(is_atom_char(0xC3));
        assert!(!is_atom_char(b' '));
        assert!(!is_atom_char(b'('));
        assert!(!is_atom_char(b'{'));
        assert!(!is_atom_char(b'\\'));
        assert!(!is_atom_char(b'\r'));
    }
}
