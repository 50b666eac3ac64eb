//! ENVELOPE decoding.

use crate::Result;
use crate::types::Envelope;

use super::cursor::Cursor;

/// Parses an envelope tuple at the cursor.
///
/// ```text
/// envelope = "(" date SP subject SP from SP sender SP reply-to SP to SP
///            cc SP bcc SP in-reply-to SP message-id ")"
/// ```
pub fn parse_envelope(cursor: &mut Cursor<'_>) -> Result<Envelope> {
    cursor.expect_open("'(' opening envelope")?;

    let date = cursor.read_field("envelope date")?;
    let subject = cursor.read_field("envelope subject")?;
    let from = cursor.read_address_list()?;
    let sender = cursor.read_address_list()?;
    let reply_to = cursor.read_address_list()?;
    let to = cursor.read_address_list()?;
    let cc = cursor.read_address_list()?;
    let bcc = cursor.read_address_list()?;
    let in_reply_to = cursor.read_field("envelope in-reply-to")?;
    let message_id = cursor.read_field("envelope message-id")?;

    cursor.expect_close()?;

    Ok(Envelope {
        date,
        subject,
        from,
        sender,
        reply_to,
        to,
        cc,
        bcc,
        in_reply_to,
        message_id,
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
    use crate::Error;

    #[test]
    fn test_parse_envelope() {
        let data = b"(\"date\" \"subject\" NIL NIL NIL NIL NIL NIL \"in-reply-to\" \"message-id\")";
        let mut cursor = Cursor::new(data);
        let envelope = parse_envelope(&mut cursor).unwrap();

        assert_eq!(envelope.date, Some("date".to_string()));
        assert_eq!(envelope.subject, Some("subject".to_string()));
        assert_eq!(envelope.from, None);
        assert_eq!(envelope.in_reply_to, Some("in-reply-to".to_string()));
        assert_eq!(envelope.message_id, Some("message-id".to_string()));
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_parse_envelope_addresses() {
        let data = b"(NIL {6}\r\nHi (1) ((\"Ann\" NIL \"ann\" \"a.net\")) () NIL \
            ((NIL NIL \"bob\" \"b.net\")(NIL NIL \"cy\" \"c.net\")) NIL NIL NIL NIL)";
        let mut cursor = Cursor::new(data);
        let envelope = parse_envelope(&mut cursor).unwrap();

        assert_eq!(envelope.date, None);
        assert_eq!(envelope.subject.as_deref(), Some("Hi (1)"));
        let from = envelope.from.unwrap();
        assert_eq!(from[0].display(), "Ann <ann@a.net>");
        assert_eq!(envelope.sender, Some(Vec::new()));
        assert_eq!(envelope.reply_to, None);
        assert_eq!(envelope.to.unwrap().len(), 2);
    }

    #[test]
    fn test_parse_envelope_truncated() {
        let data = b"(\"date\" \"subject\" NIL NIL";
        let mut cursor = Cursor::new(data);
        assert!(matches!(
            parse_envelope(&mut cursor),
            Err(Error::UnexpectedToken { .. })
        ));
    }
}
