//! End-to-end decoding of server responses through the public API.

#![allow(clippy::unwrap_used, clippy::unreadable_literal)]

use mailtree_imap::parser::Cursor;
use mailtree_imap::{
    Error, Params, ParserConfig, PartKind, PartPath, PathFault, PathNumbering, Parser,
    parse_bodystructure, parse_envelope, parse_fetch_response,
};

const ALTERNATIVE_WITH_ATTACHMENT: &[u8] = b"(((\"TEXT\" \"PLAIN\" (\"CHARSET\" \"UTF-8\") NIL NIL \"QUOTED-PRINTABLE\" 812 17 NIL NIL NIL NIL)\
(\"TEXT\" \"HTML\" (\"CHARSET\" \"UTF-8\") NIL NIL \"QUOTED-PRINTABLE\" 3021 60 NIL NIL NIL NIL) \"ALTERNATIVE\" (\"BOUNDARY\" \"b2\") NIL NIL NIL)\
(\"APPLICATION\" \"PDF\" (\"NAME\" \"invoice.pdf\") NIL NIL \"BASE64\" 58220 NIL (\"ATTACHMENT\" (\"FILENAME\" \"invoice.pdf\")) NIL NIL) \
\"MIXED\" (\"BOUNDARY\" \"b1\") NIL NIL NIL)";

const FORWARDED: &[u8] = b"((\"TEXT\" \"PLAIN\" (\"CHARSET\" \"US-ASCII\") NIL NIL \"7BIT\" 120 4 NIL NIL NIL NIL)\
(\"MESSAGE\" \"RFC822\" NIL NIL NIL \"7BIT\" 2204 \
(\"Tue, 1 Oct 2024 09:15:00 +0000\" \"Quarterly numbers\" ((\"Dana\" NIL \"dana\" \"corp.example\")) NIL NIL ((NIL NIL \"team\" \"corp.example\")) NIL NIL NIL \"<q3@corp.example>\") \
((\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 300 9)(\"IMAGE\" \"PNG\" (\"NAME\" \"chart.png\") NIL NIL \"BASE64\" 1500) \"MIXED\") \
48 NIL (\"INLINE\" NIL) NIL NIL) \
\"MIXED\")";

#[test]
fn test_single_text_part() {
    let root = parse_bodystructure(
        b"(\"TEXT\" \"PLAIN\" (\"CHARSET\" \"UTF-8\") NIL NIL \"7BIT\" 1152 23 NIL NIL NIL NIL)",
    )
    .unwrap();

    assert_eq!(root.content_type, "text/plain");
    assert_eq!(root.path.to_string(), "1");
    assert_eq!(root.params().unwrap().get("CHARSET"), Some("UTF-8"));
    assert_eq!(root.fields().unwrap().encoding.as_deref(), Some("7BIT"));
    assert_eq!(root.size(), Some(1152));
    assert_eq!(root.line_count(), Some(23));
    assert!(root.disposition().is_none());
}

#[test]
fn test_mixed_children_paths() {
    let root = parse_bodystructure(
        b"((\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 10 1)(\"TEXT\" \"HTML\" NIL NIL NIL \"7BIT\" 20 2) \"MIXED\")",
    )
    .unwrap();

    assert_eq!(root.content_type, "multipart/mixed");
    let paths: Vec<String> = root.children().iter().map(|c| c.path.to_string()).collect();
    assert_eq!(paths, ["1.1", "1.2"]);
}

#[test]
fn test_embedded_message_path() {
    let root = parse_bodystructure(FORWARDED).unwrap();
    let message = &root.children()[1];

    assert!(message.is_message());
    assert_eq!(message.path.to_string(), "1.2");
    let embedded = message.embedded().unwrap();
    assert_eq!(embedded.path.to_string(), "1.2.1");
    assert_eq!(
        embedded.children()[1].path.to_string(),
        "1.2.1.2"
    );

    let envelope = message.envelope().unwrap();
    assert_eq!(envelope.subject.as_deref(), Some("Quarterly numbers"));
    assert_eq!(envelope.from.as_ref().unwrap()[0].display(), "Dana <dana@corp.example>");
    assert_eq!(message.line_count(), Some(48));
    assert!(message.disposition().unwrap().is_inline());
}

#[test]
fn test_nil_and_empty_params_differ() {
    let mut nil = Cursor::new(b"NIL");
    let mut empty = Cursor::new(b"()");

    let nil = nil.read_param_pairs().unwrap();
    let empty = empty.read_param_pairs().unwrap();

    assert_eq!(nil, None);
    assert_eq!(empty, Some(Params::new()));
    assert_ne!(nil, empty);
}

#[test]
fn test_short_literal_is_an_error() {
    let err = parse_bodystructure(b"(\"TEXT\" \"PLAIN\" NIL NIL {5}\r\nab").unwrap_err();

    assert_eq!(
        err,
        Error::UnterminatedLiteral {
            offset: 24,
            declared_len: 5
        }
    );
}

#[test]
fn test_literal_keeps_exact_bytes() {
    let root = parse_bodystructure(
        b"(\"TEXT\" \"PLAIN\" NIL NIL {11}\r\nsee (NIL) \" \"7BIT\" 5 1)",
    )
    .unwrap();

    assert_eq!(
        root.fields().unwrap().description.as_deref(),
        Some("see (NIL) \"")
    );
    assert_eq!(root.size(), Some(5));
}

#[test]
fn test_resolve_nested_paths() {
    let root = parse_bodystructure(ALTERNATIVE_WITH_ATTACHMENT).unwrap();

    assert_eq!(root.resolve("").unwrap(), &root);
    assert_eq!(root.resolve("1").unwrap().content_type, "multipart/alternative");
    assert_eq!(root.resolve("1.2").unwrap().content_type, "text/html");
    assert_eq!(root.resolve("2").unwrap().filename(), Some("invoice.pdf"));
    assert_eq!(root.resolve("1.2").unwrap().path.to_string(), "1.1.2");

    let forwarded = parse_bodystructure(FORWARDED).unwrap();
    let chart = forwarded.resolve("2.1.2").unwrap();
    assert_eq!(chart.content_type, "image/png");
    assert_eq!(chart.path.to_string(), "1.2.1.2");
}

#[test]
fn test_resolve_errors() {
    let root = parse_bodystructure(ALTERNATIVE_WITH_ATTACHMENT).unwrap();

    let err = root.resolve("3").unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidPath {
            reason: PathFault::OutOfRange { index: 3, len: 2 },
            ..
        }
    ));

    let err = root.resolve("2.1").unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidPath {
            reason: PathFault::NotAddressable { .. },
            ..
        }
    ));

    for bad in ["0", "1..2", "a", "1.", "01"] {
        let err = root.resolve(bad).unwrap_err();
        assert!(
            matches!(
                err,
                Error::InvalidPath {
                    reason: PathFault::Malformed(_),
                    ..
                }
            ),
            "{bad:?} should be malformed, got {err:?}"
        );
    }
}

#[test]
fn test_find_by_label() {
    let root = parse_bodystructure(FORWARDED).unwrap();
    let label: PartPath = "1.2.1.1".parse().unwrap();

    let part = root.find(&label).unwrap();
    assert_eq!(part.content_type, "text/plain");
    assert_eq!(part.size(), Some(300));
}

#[test]
fn test_iter_and_attachments() {
    let root = parse_bodystructure(FORWARDED).unwrap();

    let types: Vec<&str> = root.iter().map(|p| p.content_type.as_str()).collect();
    assert_eq!(
        types,
        [
            "multipart/mixed",
            "text/plain",
            "message/rfc822",
            "multipart/mixed",
            "text/plain",
            "image/png",
        ]
    );

    let names: Vec<Option<&str>> = root.attachments().iter().map(|p| p.filename()).collect();
    assert_eq!(names, [Some("chart.png")]);
}

#[test]
fn test_sections_numbering() {
    let parser = Parser::new(
        ParserConfig::builder()
            .numbering(PathNumbering::Sections)
            .build(),
    );
    let root = parser.bodystructure(ALTERNATIVE_WITH_ATTACHMENT).unwrap();

    assert_eq!(root.path.to_string(), "1");
    assert_eq!(root.children()[0].path.to_string(), "1");
    assert_eq!(root.children()[0].children()[1].path.to_string(), "1.2");
    assert_eq!(root.children()[1].path.to_string(), "2");
    assert_eq!(root.resolve("1.2").unwrap().content_type, "text/html");
}

#[test]
fn test_sections_find_by_label() {
    let parser = Parser::new(
        ParserConfig::builder()
            .numbering(PathNumbering::Sections)
            .build(),
    );
    let root = parser
        .bodystructure(
            b"((\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 10 1)(\"IMAGE\" \"PNG\" NIL NIL NIL \"BASE64\" 64) \"MIXED\")",
        )
        .unwrap();

    let first: PartPath = "1".parse().unwrap();
    let second: PartPath = "2".parse().unwrap();
    assert_eq!(root.find(&first).unwrap().content_type, "text/plain");
    assert_eq!(root.find(&second).unwrap().content_type, "image/png");
}

#[test]
fn test_inline_image_with_filename_is_attachment() {
    let root = parse_bodystructure(
        b"((\"TEXT\" \"HTML\" NIL NIL NIL \"7BIT\" 400 10 NIL (\"INLINE\" NIL) NIL NIL)\
          (\"IMAGE\" \"PNG\" (\"NAME\" \"logo.png\") \"<logo>\" NIL \"BASE64\" 2048 NIL \
          (\"INLINE\" (\"FILENAME\" \"logo.png\")) NIL NIL) \"RELATED\")",
    )
    .unwrap();

    let names: Vec<Option<&str>> = root.attachments().iter().map(|p| p.filename()).collect();
    assert_eq!(names, [Some("logo.png")]);
    assert!(!root.children()[0].is_attachment());
}

fn nested_multiparts(levels: usize) -> Vec<u8> {
    let mut input = "(".repeat(levels + 1);
    input.push_str("\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 1 1)");
    input.push_str(&" \"MIXED\")".repeat(levels));
    input.into_bytes()
}

#[test]
fn test_depth_limit() {
    // The leaf sits one level below the innermost multipart.
    let root = parse_bodystructure(&nested_multiparts(199)).unwrap();
    assert_eq!(root.iter().count(), 200);

    let err = parse_bodystructure(&nested_multiparts(200)).unwrap_err();
    assert_eq!(err, Error::DepthExceeded { limit: 200 });

    let shallow = Parser::new(ParserConfig::builder().max_depth(3).build());
    assert!(shallow.bodystructure(&nested_multiparts(2)).is_ok());
    assert_eq!(
        shallow.bodystructure(&nested_multiparts(3)).unwrap_err(),
        Error::DepthExceeded { limit: 3 }
    );
}

#[test]
fn test_hostile_depth_does_not_overflow() {
    let err = parse_bodystructure(&nested_multiparts(100_000)).unwrap_err();
    assert_eq!(err, Error::DepthExceeded { limit: 200 });
}

#[test]
fn test_input_length_limit() {
    let parser = Parser::new(ParserConfig::builder().max_input_len(16).build());
    let input = b"(\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 1 1)";

    assert_eq!(
        parser.bodystructure(input).unwrap_err(),
        Error::InputTooLarge {
            len: input.len(),
            limit: 16
        }
    );
}

#[test]
fn test_unbalanced_input() {
    let err = parse_bodystructure(b"((\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 1 1) \"MIXED\"").unwrap_err();
    assert!(matches!(err, Error::UnbalancedParens { .. }));

    let err = parse_bodystructure(b"(\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 1 1))").unwrap_err();
    assert!(matches!(err, Error::UnbalancedParens { .. }));
}

#[test]
fn test_unknown_extension_data_is_skipped() {
    let root = parse_bodystructure(
        b"(\"TEXT\" \"PLAIN\" NIL NIL NIL \"7BIT\" 10 1 NIL NIL (\"en\" \"de\") \"http://x\" (\"future\" {3}\r\n)))) 42)",
    )
    .unwrap();

    let extension = root.extension();
    assert_eq!(
        extension.language.as_deref(),
        Some(&["en".to_string(), "de".to_string()][..])
    );
    assert_eq!(extension.location.as_deref(), Some("http://x"));
}

#[test]
fn test_envelope_response() {
    let envelope = parse_envelope(
        b"(ENVELOPE (\"Wed, 17 Jul 1996 02:23:25 -0700\" \"IMAP4rev1 WG mtg summary and minutes\" \
          ((\"Terry Gray\" NIL \"gray\" \"cac.washington.edu\")) \
          ((\"Terry Gray\" NIL \"gray\" \"cac.washington.edu\")) \
          ((\"Terry Gray\" NIL \"gray\" \"cac.washington.edu\")) \
          ((NIL NIL \"imap\" \"cac.washington.edu\")) \
          ((NIL NIL \"minutes\" \"CNRI.Reston.VA.US\")(\"John Klensin\" NIL \"KLENSIN\" \"MIT.EDU\")) \
          NIL NIL \"<B27397-0100000@cac.washington.edu>\"))",
    )
    .unwrap();

    assert_eq!(
        envelope.subject.as_deref(),
        Some("IMAP4rev1 WG mtg summary and minutes")
    );
    assert_eq!(envelope.to.as_ref().unwrap()[0].mailbox(), "imap@cac.washington.edu");
    let cc: Vec<String> = envelope.cc.as_ref().unwrap().iter().map(|a| a.display()).collect();
    assert_eq!(
        cc,
        ["minutes@CNRI.Reston.VA.US", "John Klensin <KLENSIN@MIT.EDU>"]
    );
    assert!(envelope.bcc.is_none());
    assert!(envelope.in_reply_to.is_none());
    assert_eq!(
        envelope.message_id.as_deref(),
        Some("<B27397-0100000@cac.washington.edu>")
    );
    assert_eq!(envelope.parsed_date().unwrap().timestamp(), 837_595_405);
}

#[test]
fn test_envelope_group_syntax() {
    let envelope = parse_envelope(
        b"(NIL NIL NIL NIL NIL ((NIL NIL \"undisclosed-recipients\" NIL)(NIL NIL NIL NIL)) NIL NIL NIL NIL)",
    )
    .unwrap();

    let to = envelope.to.unwrap();
    assert_eq!(to.len(), 2);
    assert!(to[0].is_group_start());
    assert!(to[1].is_group_end());
    assert!(envelope.date.is_none());
    assert!(envelope.from.is_none());
}

#[test]
fn test_fetch_response() {
    let mut input = b"* 12 FETCH (UID 4827 FLAGS (\\Seen) RFC822.SIZE 44827 ENVELOPE ".to_vec();
    input.extend_from_slice(
        b"(\"Tue, 1 Oct 2024 09:15:00 +0000\" \"Hello\" NIL NIL NIL NIL NIL NIL NIL NIL) BODYSTRUCTURE ",
    );
    input.extend_from_slice(ALTERNATIVE_WITH_ATTACHMENT);
    input.extend_from_slice(b")\r\n");

    let response = parse_fetch_response(&input).unwrap();

    assert_eq!(response.seq, 12);
    assert_eq!(response.uid, Some(4827));
    assert_eq!(response.size, Some(44827));
    assert_eq!(
        response.envelope.unwrap().subject.as_deref(),
        Some("Hello")
    );
    let root = response.body_structure.unwrap();
    assert!(matches!(root.kind, PartKind::Multipart { .. }));
    assert_eq!(root.attachments().len(), 1);
}

#[test]
fn test_fetch_without_structure() {
    let response = parse_fetch_response(b"* 3 FETCH (UID 9 BODY[HEADER] {4}\r\nA: b)").unwrap();

    assert_eq!(response.seq, 3);
    assert_eq!(response.uid, Some(9));
    assert!(response.body_structure.is_none());
}
