//! Token readers for the `nstring` grammar and the lists built from it.

use std::borrow::Cow;

use crate::types::{Address, Disposition, Params};
use crate::{Error, Result};

use super::cursor::{Cursor, NString, is_atom_char};

impl<'a> Cursor<'a> {
    /// Reads one `nstring`: `NIL`, a quoted string, a literal or a bare atom.
    ///
    /// Leading spaces are skipped. On `NoMatch` the position is unchanged.
    pub fn read_nstring(&mut self) -> Result<NString<'a>> {
        let start = self.position();
        self.skip_whitespace();

        match self.peek() {
            Some(b'"') => self.read_quoted().map(NString::Value),
            Some(b'{') => self.read_literal().map(|bytes| NString::Value(Cow::Borrowed(bytes))),
            Some(b) if is_atom_char(b) => {
                let atom = self.take_while(is_atom_char);
                if atom.eq_ignore_ascii_case(b"NIL") {
                    Ok(NString::Nil)
                } else {
                    Ok(NString::Value(Cow::Borrowed(atom)))
                }
            }
            _ => {
                self.rewind(start);
                Ok(NString::NoMatch)
            }
        }
    }

    /// Reads a quoted string, unescaping `\"` and `\\`.
    fn read_quoted(&mut self) -> Result<Cow<'a, [u8]>> {
        self.advance();

        let body = self.remaining();
        let plain = body.iter().position(|&b| b == b'"' || b == b'\\');
        if let Some(end) = plain
            && body[end] == b'"'
        {
            self.take(end + 1);
            return Ok(Cow::Borrowed(&body[..end]));
        }

        let mut result = Vec::with_capacity(body.len().min(256));
        loop {
            match self.advance() {
                Some(b'"') => return Ok(Cow::Owned(result)),
                Some(b'\\') => match self.peek() {
                    Some(c @ (b'"' | b'\\')) => {
                        self.advance();
                        result.push(c);
                    }
                    Some(_) => return Err(self.unexpected("escaped '\"' or '\\\\'")),
                    None => return Err(self.unexpected("closing '\"'")),
                },
                Some(c) => result.push(c),
                None => return Err(self.unexpected("closing '\"'")),
            }
        }
    }

    /// Reads a `{n}` CRLF literal and returns its `n` raw bytes.
    fn read_literal(&mut self) -> Result<&'a [u8]> {
        let offset = self.position();
        self.advance();

        let digits = self.take_while(|b| b.is_ascii_digit());
        let declared_len = std::str::from_utf8(digits)
            .ok()
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| self.unexpected("literal length"))?;

        if !self.eat(b'}') {
            return Err(self.unexpected("'}' after literal length"));
        }
        if !(self.eat(b'\r') && self.eat(b'\n')) {
            return Err(self.unexpected("CRLF after literal length"));
        }

        self.take(declared_len).ok_or(Error::UnterminatedLiteral {
            offset,
            declared_len,
        })
    }

    /// Reads an `nstring` that the grammar requires to be present.
    ///
    /// `NIL` is accepted and yields `None`.
    pub fn read_field(&mut self, expected: &'static str) -> Result<Option<String>> {
        self.skip_whitespace();
        match self.read_nstring()? {
            NString::NoMatch => Err(self.unexpected(expected)),
            token => Ok(token.into_string()),
        }
    }

    /// Reads a string that may be neither `NIL` nor missing.
    pub fn read_string(&mut self, expected: &'static str) -> Result<String> {
        self.skip_whitespace();
        self.read_nstring()?
            .into_string()
            .ok_or_else(|| self.unexpected(expected))
    }

    /// Reads an optional trailing `nstring`; `NIL` and `NoMatch` both yield `None`.
    pub fn read_optional(&mut self) -> Result<Option<String>> {
        Ok(self.read_nstring()?.into_string())
    }

    /// Reads a non-negative number the grammar requires. `NIL` yields `None`.
    pub fn read_number(&mut self, expected: &'static str) -> Result<Option<u64>> {
        self.skip_whitespace();
        let offset = self.position();
        match self.read_nstring()? {
            NString::NoMatch => Err(self.unexpected(expected)),
            token => number_value(&token, offset, expected),
        }
    }

    /// Reads an optional trailing number. `NIL` and a missing token yield `None`.
    pub fn read_optional_number(&mut self, expected: &'static str) -> Result<Option<u64>> {
        self.skip_whitespace();
        let offset = self.position();
        let token = self.read_nstring()?;
        number_value(&token, offset, expected)
    }

    /// Reads a parameter list: `NIL`, or `(key value ...)`.
    ///
    /// The list ends at the first key that reads as `NIL` or not at all.
    /// `NIL` and a missing list both yield `None`; `()` yields empty params.
    pub fn read_param_pairs(&mut self) -> Result<Option<Params>> {
        self.skip_whitespace();
        if !self.eat(b'(') {
            return match self.read_nstring()? {
                NString::Nil | NString::NoMatch => Ok(None),
                NString::Value(_) => Err(self.unexpected("parameter list")),
            };
        }

        let mut params = Params::new();
        loop {
            let key = self.read_nstring()?;
            if key.is_terminator() {
                break;
            }
            let value = match self.read_nstring()? {
                NString::NoMatch => return Err(self.unexpected("parameter value")),
                value => value.into_string().unwrap_or_default(),
            };
            params.push(key.into_string().unwrap_or_default(), value);
        }
        self.expect_close()?;

        Ok(Some(params))
    }

    /// Reads a disposition: `NIL`, or `(type params)`.
    pub fn read_disposition(&mut self) -> Result<Option<Disposition>> {
        self.skip_whitespace();
        if !self.eat(b'(') {
            return match self.read_nstring()? {
                NString::Nil | NString::NoMatch => Ok(None),
                NString::Value(_) => Err(self.unexpected("disposition")),
            };
        }

        let kind = self.read_string("disposition type")?;
        let params = self.read_param_pairs()?;
        self.expect_close()?;

        Ok(Some(Disposition { kind, params }))
    }

    /// Reads a language: `NIL`, a single string, or a list of strings.
    pub fn read_language(&mut self) -> Result<Option<Vec<String>>> {
        self.skip_whitespace();
        if !self.eat(b'(') {
            return Ok(self.read_optional()?.map(|tag| vec![tag]));
        }

        let mut tags = Vec::new();
        while let Some(tag) = self.read_optional()? {
            tags.push(tag);
        }
        self.expect_close()?;

        Ok(Some(tags))
    }

    /// Reads an address list: `NIL`, or `(address ...)`.
    pub fn read_address_list(&mut self) -> Result<Option<Vec<Address>>> {
        self.skip_whitespace();
        if !self.eat(b'(') {
            return match self.read_nstring()? {
                NString::Nil => Ok(None),
                _ => Err(self.unexpected("address list")),
            };
        }

        let mut addresses = Vec::new();
        while let Some(address) = self.read_address()? {
            addresses.push(address);
        }
        self.expect_close()?;

        Ok(Some(addresses))
    }

    /// Reads one `(name source-route account host)` address.
    ///
    /// Returns `None` on `NIL` or when no address starts here, which ends
    /// the enclosing list.
    pub fn read_address(&mut self) -> Result<Option<Address>> {
        let start = self.position();
        self.skip_whitespace();
        if !self.eat(b'(') {
            if !self.eat_keyword(b"NIL") {
                self.rewind(start);
            }
            return Ok(None);
        }

        let name = self.read_field("address name")?;
        let source_route = self.read_field("address source route")?;
        let account = self.read_field("address mailbox")?;
        let host = self.read_field("address host")?;
        self.expect_close()?;

        Ok(Some(Address {
            name,
            source_route,
            account,
            host,
        }))
    }

    /// Skips values up to, but not including, the `)` closing the current list.
    ///
    /// Nested lists, quoted strings and literals are skipped whole. Returns
    /// the number of top-level values skipped.
    pub fn skip_to_close(&mut self) -> Result<usize> {
        let mut skipped = 0;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b')') | None => return Ok(skipped),
                _ => {
                    self.skip_value()?;
                    skipped += 1;
                }
            }
        }
    }

    /// Skips one value: a token or a balanced parenthesized list.
    pub fn skip_value(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(Error::UnbalancedParens {
                    offset: self.position(),
                }),
                Some(b'(') => {
                    self.advance();
                    depth += 1;
                }
                Some(b')') if depth > 0 => {
                    self.advance();
                    depth -= 1;
                }
                Some(b')') => return Err(self.unexpected("value")),
                Some(_) => {
                    if self.read_nstring()? == NString::NoMatch {
                        // Stray specials such as `\` in flag names.
                        self.advance();
                    }
                }
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }
}

fn number_value(token: &NString<'_>, offset: usize, expected: &'static str) -> Result<Option<u64>> {
    match token.as_bytes() {
        None => Ok(None),
        Some(bytes) => parse_number(bytes)
            .map(Some)
            .ok_or(Error::UnexpectedToken { offset, expected }),
    }
}

/// Parses ASCII digits as a `u64`.
fn parse_number(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(bytes).ok()?.parse().ok()
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

    fn value(bytes: &[u8]) -> NString<'_> {
        NString::Value(Cow::Borrowed(bytes))
    }

    #[test]
    fn test_nstring_nil_any_case() {
        let mut cursor = Cursor::new(b"NIL nil Nil");
        assert_eq!(cursor.read_nstring().unwrap(), NString::Nil);
        assert_eq!(cursor.read_nstring().unwrap(), NString::Nil);
        assert_eq!(cursor.read_nstring().unwrap(), NString::Nil);
        assert_eq!(cursor.read_nstring().unwrap(), NString::NoMatch);
    }

    #[test]
    fn test_nstring_quoted() {
        let mut cursor = Cursor::new(b"\"hello world\"");
        assert_eq!(cursor.read_nstring().unwrap(), value(b"hello world"));
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_nstring_quoted_escapes() {
        let mut cursor = Cursor::new(b"\"say \\\"hi\\\" \\\\o/\"");
        assert_eq!(
            cursor.read_nstring().unwrap().into_string().unwrap(),
            "say \"hi\" \\o/"
        );
    }

    #[test]
    fn test_nstring_quoted_unterminated() {
        let mut cursor = Cursor::new(b"\"abc");
        assert!(matches!(
            cursor.read_nstring(),
            Err(Error::UnexpectedToken { offset: 4, .. })
        ));
    }

    #[test]
    fn test_nstring_literal_is_byte_exact() {
        let mut cursor = Cursor::new(b"{8}\r\n(a\")\r\n{x NIL");
        assert_eq!(cursor.read_nstring().unwrap(), value(b"(a\")\r\n{x"));
        assert_eq!(cursor.read_nstring().unwrap(), NString::Nil);
    }

    #[test]
    fn test_nstring_literal_unterminated() {
        let mut cursor = Cursor::new(b"{5}\r\nab");
        assert_eq!(
            cursor.read_nstring(),
            Err(Error::UnterminatedLiteral {
                offset: 0,
                declared_len: 5
            })
        );
    }

    #[test]
    fn test_nstring_literal_requires_crlf() {
        let mut cursor = Cursor::new(b"{2}ab");
        assert!(matches!(
            cursor.read_nstring(),
            Err(Error::UnexpectedToken { offset: 3, .. })
        ));
    }

    #[test]
    fn test_nstring_atom_fallback() {
        let mut cursor = Cursor::new(b"7BIT 1152)");
        assert_eq!(cursor.read_nstring().unwrap(), value(b"7BIT"));
        assert_eq!(cursor.read_nstring().unwrap(), value(b"1152"));
        assert_eq!(cursor.read_nstring().unwrap(), NString::NoMatch);
        assert_eq!(cursor.peek(), Some(b')'));
    }

    #[test]
    fn test_nstring_no_match_keeps_position() {
        let mut cursor = Cursor::new(b"  (x)");
        assert_eq!(cursor.read_nstring().unwrap(), NString::NoMatch);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_param_pairs_nil_and_empty_differ() {
        let nil = Cursor::new(b"NIL").read_param_pairs().unwrap();
        let empty = Cursor::new(b"()").read_param_pairs().unwrap();
        assert_eq!(nil, None);
        assert_eq!(empty, Some(Params::new()));
        assert_ne!(nil, empty);
    }

    #[test]
    fn test_param_pairs_entries() {
        let mut cursor = Cursor::new(b"(\"CHARSET\" \"UTF-8\" \"NAME\" {5}\r\na b.c)");
        let params = cursor.read_param_pairs().unwrap().unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("charset"), Some("UTF-8"));
        assert_eq!(params.get("name"), Some("a b.c"));
    }

    #[test]
    fn test_param_pairs_missing_is_absent() {
        let mut cursor = Cursor::new(b")");
        assert_eq!(cursor.read_param_pairs().unwrap(), None);
        assert_eq!(cursor.peek(), Some(b')'));
    }

    #[test]
    fn test_param_pairs_unclosed() {
        let mut cursor = Cursor::new(b"(\"A\" \"B\"");
        assert!(matches!(
            cursor.read_param_pairs(),
            Err(Error::UnbalancedParens { .. })
        ));
    }

    #[test]
    fn test_disposition() {
        let mut cursor = Cursor::new(b"(\"ATTACHMENT\" (\"FILENAME\" \"a.pdf\"))");
        let disposition = cursor.read_disposition().unwrap().unwrap();
        assert_eq!(disposition.kind, "ATTACHMENT");
        assert_eq!(disposition.filename(), Some("a.pdf"));

        let mut cursor = Cursor::new(b"(\"INLINE\" NIL)");
        let disposition = cursor.read_disposition().unwrap().unwrap();
        assert_eq!(disposition.params, None);

        assert_eq!(Cursor::new(b"NIL").read_disposition().unwrap(), None);
    }

    #[test]
    fn test_language_forms() {
        assert_eq!(Cursor::new(b"NIL").read_language().unwrap(), None);
        assert_eq!(
            Cursor::new(b"\"EN\"").read_language().unwrap(),
            Some(vec!["EN".to_string()])
        );
        assert_eq!(
            Cursor::new(b"(\"EN\" \"DE\")").read_language().unwrap(),
            Some(vec!["EN".to_string(), "DE".to_string()])
        );
    }

    #[test]
    fn test_number() {
        let mut cursor = Cursor::new(b"1152 NIL 7 )");
        assert_eq!(cursor.read_number("size").unwrap(), Some(1152));
        assert_eq!(cursor.read_number("size").unwrap(), None);
        assert_eq!(cursor.read_optional_number("lines").unwrap(), Some(7));
        assert_eq!(cursor.read_optional_number("lines").unwrap(), None);
        assert!(matches!(
            cursor.read_number("size"),
            Err(Error::UnexpectedToken { expected: "size", .. })
        ));

        let mut cursor = Cursor::new(b"+12");
        assert!(matches!(
            cursor.read_number("size"),
            Err(Error::UnexpectedToken { offset: 0, expected: "size" })
        ));
    }

    #[test]
    fn test_address_list() {
        let mut cursor = Cursor::new(
            b"((\"Bob\" NIL \"bob\" \"x.com\")(NIL NIL \"eve\" \"y.org\"))",
        );
        let list = cursor.read_address_list().unwrap().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].display(), "Bob <bob@x.com>");
        assert_eq!(list[1].display(), "eve@y.org");
    }

    #[test]
    fn test_address_list_nil_and_empty() {
        assert_eq!(Cursor::new(b"NIL").read_address_list().unwrap(), None);
        assert_eq!(
            Cursor::new(b"()").read_address_list().unwrap(),
            Some(Vec::new())
        );
    }

    #[test]
    fn test_skip_to_close() {
        let mut cursor = Cursor::new(b"\"x\" (1 (2 {3}\r\n))))) NIL \\Seen)");
        assert_eq!(cursor.skip_to_close().unwrap(), 5);
        assert_eq!(cursor.peek(), Some(b')'));
    }
}
