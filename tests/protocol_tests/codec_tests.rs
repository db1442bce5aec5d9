//! Codec Tests
//!
//! Tests for RESP command encoding and reply encoding/decoding.

use std::io::{BufReader, Cursor};

use bytes::Bytes;
use jsonkv::protocol::{
    decode_reply, encode_command, encode_reply, read_reply, write_command, write_reply, Command,
    Reply, ReplyKind, MAX_BULK_SIZE,
};
use jsonkv::JsonKvError;

fn tokens(parts: &[&str]) -> Vec<Bytes> {
    parts.iter().map(|p| Bytes::copy_from_slice(p.as_bytes())).collect()
}

// =============================================================================
// Command Encoding Tests
// =============================================================================

#[test]
fn test_encode_command_as_bulk_array() {
    let encoded = encode_command(&tokens(&["JSON.GET", "doc1", "."]));
    assert_eq!(encoded, b"*3\r\n$8\r\nJSON.GET\r\n$4\r\ndoc1\r\n$1\r\n.\r\n");
}

#[test]
fn test_encode_command_binary_safe() {
    let encoded = encode_command(&[Bytes::from_static(b"SET"), Bytes::from_static(b"a\r\nb")]);
    assert_eq!(encoded, b"*2\r\n$3\r\nSET\r\n$4\r\na\r\nb\r\n");
}

#[test]
fn test_command_display_and_accessors() {
    let cmd = Command::new("JSON.ARRAPPEND", ReplyKind::Integers)
        .arg("doc")
        .arg(".a")
        .args(["1", "2"]);

    assert_eq!(cmd.verb(), "JSON.ARRAPPEND");
    assert_eq!(cmd.arguments().len(), 4);
    assert_eq!(cmd.reply_kind(), ReplyKind::Integers);
    assert_eq!(cmd.to_string(), "JSON.ARRAPPEND doc .a 1 2");
}

// =============================================================================
// Reply Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_scalar_replies() {
    let cases = vec![
        Reply::ok(),
        Reply::error("ERR something broke"),
        Reply::Integer(-42),
        Reply::bulk("{\"a\":1}"),
        Reply::nil(),
        Reply::Array(None),
    ];

    for reply in cases {
        let encoded = encode_reply(&reply);
        let (decoded, consumed) = decode_reply(&encoded).unwrap();
        assert_eq!(decoded, reply);
        assert_eq!(consumed, encoded.len());
    }
}

#[test]
fn test_decode_nested_array() {
    let raw = b"*2\r\n*2\r\n$1\r\na\r\n$-1\r\n:3\r\n";
    let (reply, consumed) = decode_reply(raw).unwrap();

    assert_eq!(
        reply,
        Reply::array(vec![
            Reply::array(vec![Reply::bulk("a"), Reply::nil()]),
            Reply::Integer(3),
        ])
    );
    assert_eq!(consumed, raw.len());
}

#[test]
fn test_decode_reports_consumed_prefix() {
    let mut raw = encode_reply(&Reply::Integer(7));
    raw.extend_from_slice(b"+OK\r\n");

    let (reply, consumed) = decode_reply(&raw).unwrap();
    assert_eq!(reply, Reply::Integer(7));
    assert_eq!(consumed, 4);
}

#[test]
fn test_decode_incomplete_bulk() {
    let result = decode_reply(b"$10\r\nshort\r\n");
    assert!(matches!(result, Err(JsonKvError::Protocol(_))));
}

#[test]
fn test_decode_missing_crlf() {
    let result = decode_reply(b"+OK");
    assert!(matches!(result, Err(JsonKvError::Protocol(_))));
}

#[test]
fn test_decode_unknown_type() {
    let result = decode_reply(b"!oops\r\n");
    assert!(matches!(result, Err(JsonKvError::Protocol(_))));
}

#[test]
fn test_decode_oversized_bulk() {
    let raw = format!("${}\r\n", MAX_BULK_SIZE + 1);
    let result = decode_reply(raw.as_bytes());
    assert!(matches!(result, Err(JsonKvError::Protocol(_))));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_write_read_reply_stream() {
    let mut buffer = Vec::new();
    write_reply(&mut buffer, &Reply::ok()).unwrap();
    write_reply(&mut buffer, &Reply::array(vec![Reply::Integer(1), Reply::bulk("x")])).unwrap();

    let mut reader = BufReader::new(Cursor::new(buffer));
    assert_eq!(read_reply(&mut reader).unwrap(), Reply::ok());
    assert_eq!(
        read_reply(&mut reader).unwrap(),
        Reply::array(vec![Reply::Integer(1), Reply::bulk("x")])
    );
}

#[test]
fn test_read_reply_eof() {
    let mut reader = BufReader::new(Cursor::new(Vec::new()));
    match read_reply(&mut reader) {
        Err(JsonKvError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected EOF error, got {:?}", other),
    }
}

#[test]
fn test_write_command_matches_encoding() {
    let parts = tokens(&["PING"]);
    let mut buffer = Vec::new();
    write_command(&mut buffer, &parts).unwrap();
    assert_eq!(buffer, encode_command(&parts));
}
