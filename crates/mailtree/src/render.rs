//! Output formatting.

use std::io::Write;

use anyhow::Result;
use mailtree_imap::{Address, Envelope, Part};

/// Writes a part and its descendants, one line per part.
pub fn tree(out: &mut impl Write, root: &Part, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, root)?;
        writeln!(out)?;
        return Ok(());
    }

    write_part(out, root, 0)
}

fn write_part(out: &mut impl Write, part: &Part, indent: usize) -> Result<()> {
    let mut line = format!("{:indent$}{} {}", "", part.path, part.content_type);
    if let Some(size) = part.size() {
        line.push_str(&format!(" {size}B"));
    }
    if let Some(lines) = part.line_count() {
        line.push_str(&format!(" {lines}L"));
    }
    if let Some(name) = part.filename() {
        line.push_str(&format!(" {name:?}"));
    }
    if part.is_attachment() {
        line.push_str(" [attachment]");
    }
    writeln!(out, "{line}")?;

    if let Some(envelope) = part.envelope()
        && let Some(subject) = &envelope.subject
    {
        writeln!(out, "{:indent$}  subject: {subject}", "")?;
    }
    for child in part.children() {
        write_part(out, child, indent + 2)?;
    }
    if let Some(embedded) = part.embedded() {
        write_part(out, embedded, indent + 2)?;
    }
    Ok(())
}

/// Writes the envelope fields that are present.
pub fn envelope(out: &mut impl Write, envelope: &Envelope, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, envelope)?;
        writeln!(out)?;
        return Ok(());
    }

    let fields = [
        ("Date", envelope.date.as_deref()),
        ("Subject", envelope.subject.as_deref()),
        ("In-Reply-To", envelope.in_reply_to.as_deref()),
        ("Message-ID", envelope.message_id.as_deref()),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            writeln!(out, "{name}: {value}")?;
        }
    }

    let lists = [
        ("From", &envelope.from),
        ("Sender", &envelope.sender),
        ("Reply-To", &envelope.reply_to),
        ("To", &envelope.to),
        ("Cc", &envelope.cc),
        ("Bcc", &envelope.bcc),
    ];
    for (name, list) in lists {
        if let Some(list) = list {
            writeln!(out, "{name}: {}", join_addresses(list))?;
        }
    }
    Ok(())
}

fn join_addresses(list: &[Address]) -> String {
    list.iter()
        .filter(|a| !a.is_group_end())
        .map(Address::display)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_output() {
        let root = mailtree_imap::parse_bodystructure(
            b"((\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 20 2)\
              (\"IMAGE\" \"PNG\" (\"NAME\" \"a.png\") NIL NIL \"BASE64\" 64) \"MIXED\")",
        )
        .unwrap();

        let mut out = Vec::new();
        tree(&mut out, &root, false).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "1 multipart/mixed\n  1.1 text/plain 20B 2L\n  1.2 image/png 64B \"a.png\" [attachment]\n"
        );
    }

    #[test]
    fn test_envelope_output() {
        let envelope = mailtree_imap::parse_envelope(
            b"(\"Mon, 7 Feb 1994 21:52:25 -0800\" \"Hi\" ((\"Ann\" NIL \"ann\" \"a.net\")) NIL NIL \
              ((NIL NIL \"bob\" \"b.net\")) NIL NIL NIL \"<1@a.net>\")",
        )
        .unwrap();

        let mut out = Vec::new();
        super::envelope(&mut out, &envelope, false).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Subject: Hi\n"));
        assert!(text.contains("From: Ann <ann@a.net>\n"));
        assert!(text.contains("To: bob@b.net\n"));
        assert!(!text.contains("Cc:"));
    }

    #[test]
    fn test_json_output() {
        let root = mailtree_imap::parse_bodystructure(
            b"(\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 20 2)",
        )
        .unwrap();

        let mut out = Vec::new();
        tree(&mut out, &root, true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["content_type"], "text/plain");
        assert_eq!(value["path"], "1");
    }
}
