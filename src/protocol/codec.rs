//! Protocol codec
//!
//! Encoding and decoding functions for the RESP2 wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌────────────┬──────────────────────────────┬─────┐
//! │ *<argc>\r\n│ $<len>\r\n<token>\r\n        │ ... │
//! └────────────┴──────────────────────────────┴─────┘
//! ```
//!
//! ### Reply Format
//! ```text
//! ┌──────────┬───────────────────┬──────────────────────┐
//! │ Type (1) │ Line ... \r\n     │ Bulk body \r\n (opt) │
//! └──────────┴───────────────────┴──────────────────────┘
//! ```

use std::io::{BufRead, Write};

use bytes::Bytes;

use crate::error::{JsonKvError, Result};
use super::Reply;

/// Maximum bulk string size (512 MB)
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

const CRLF: &[u8] = b"\r\n";

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command (verb + arguments) as an array of bulk strings
pub fn encode_command(tokens: &[Bytes]) -> Vec<u8> {
    let body_len: usize = tokens.iter().map(|t| t.len() + 16).sum();
    let mut message = Vec::with_capacity(16 + body_len);

    message.push(b'*');
    message.extend_from_slice(tokens.len().to_string().as_bytes());
    message.extend_from_slice(CRLF);

    for token in tokens {
        message.push(b'$');
        message.extend_from_slice(token.len().to_string().as_bytes());
        message.extend_from_slice(CRLF);
        message.extend_from_slice(token);
        message.extend_from_slice(CRLF);
    }

    message
}

// =============================================================================
// Reply Encoding/Decoding
// =============================================================================

/// Encode a reply to bytes
pub fn encode_reply(reply: &Reply) -> Vec<u8> {
    let mut message = Vec::new();
    encode_reply_into(reply, &mut message);
    message
}

fn encode_reply_into(reply: &Reply, out: &mut Vec<u8>) {
    match reply {
        Reply::Status(s) => {
            out.push(b'+');
            out.extend_from_slice(s.as_bytes());
            out.extend_from_slice(CRLF);
        }
        Reply::Error(e) => {
            out.push(b'-');
            out.extend_from_slice(e.as_bytes());
            out.extend_from_slice(CRLF);
        }
        Reply::Integer(n) => {
            out.push(b':');
            out.extend_from_slice(n.to_string().as_bytes());
            out.extend_from_slice(CRLF);
        }
        Reply::Bulk(None) => out.extend_from_slice(b"$-1\r\n"),
        Reply::Bulk(Some(data)) => {
            out.push(b'$');
            out.extend_from_slice(data.len().to_string().as_bytes());
            out.extend_from_slice(CRLF);
            out.extend_from_slice(data);
            out.extend_from_slice(CRLF);
        }
        Reply::Array(None) => out.extend_from_slice(b"*-1\r\n"),
        Reply::Array(Some(items)) => {
            out.push(b'*');
            out.extend_from_slice(items.len().to_string().as_bytes());
            out.extend_from_slice(CRLF);
            for item in items {
                encode_reply_into(item, out);
            }
        }
    }
}

/// Decode a reply from bytes
///
/// Returns the reply and the number of bytes consumed
pub fn decode_reply(bytes: &[u8]) -> Result<(Reply, usize)> {
    let mut pos = 0;
    let reply = decode_at(bytes, &mut pos)?;
    Ok((reply, pos))
}

fn decode_at(bytes: &[u8], pos: &mut usize) -> Result<Reply> {
    let line = take_line(bytes, pos)?;
    let (kind, rest) = line
        .split_first()
        .ok_or_else(|| JsonKvError::Protocol("Empty reply line".to_string()))?;

    match *kind {
        b'+' => Ok(Reply::Status(line_text(rest)?)),
        b'-' => Ok(Reply::Error(line_text(rest)?)),
        b':' => Ok(Reply::Integer(parse_int(rest)?)),
        b'$' => {
            let len = parse_int(rest)?;
            if len < 0 {
                return Ok(Reply::Bulk(None));
            }
            let len = checked_bulk_len(len)?;
            let end = *pos + len;
            if bytes.len() < end + CRLF.len() {
                return Err(JsonKvError::Protocol(format!(
                    "Incomplete bulk: expected {} bytes, got {}",
                    len + CRLF.len(),
                    bytes.len() - *pos
                )));
            }
            if &bytes[end..end + CRLF.len()] != CRLF {
                return Err(JsonKvError::Protocol("Bulk not terminated by CRLF".to_string()));
            }
            let data = Bytes::copy_from_slice(&bytes[*pos..end]);
            *pos = end + CRLF.len();
            Ok(Reply::Bulk(Some(data)))
        }
        b'*' => {
            let count = parse_int(rest)?;
            if count < 0 {
                return Ok(Reply::Array(None));
            }
            let mut items = Vec::with_capacity(count.min(1024) as usize);
            for _ in 0..count {
                items.push(decode_at(bytes, pos)?);
            }
            Ok(Reply::Array(Some(items)))
        }
        other => Err(JsonKvError::Protocol(format!(
            "Unknown reply type: 0x{:02x}",
            other
        ))),
    }
}

/// Take one CRLF-terminated line starting at `pos` (terminator excluded)
fn take_line<'a>(bytes: &'a [u8], pos: &mut usize) -> Result<&'a [u8]> {
    let start = *pos;
    let end = bytes[start..]
        .windows(2)
        .position(|w| w == CRLF)
        .map(|i| start + i)
        .ok_or_else(|| {
            JsonKvError::Protocol(format!(
                "Incomplete reply line: {} bytes without CRLF",
                bytes.len() - start
            ))
        })?;
    *pos = end + CRLF.len();
    Ok(&bytes[start..end])
}

fn line_text(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| JsonKvError::Protocol("Reply line is not valid UTF-8".to_string()))
}

fn parse_int(bytes: &[u8]) -> Result<i64> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            JsonKvError::Protocol(format!(
                "Invalid integer in reply: {:?}",
                String::from_utf8_lossy(bytes)
            ))
        })
}

fn checked_bulk_len(len: i64) -> Result<usize> {
    let len = len as usize;
    if len > MAX_BULK_SIZE {
        return Err(JsonKvError::Protocol(format!(
            "Bulk too large: {} bytes (max {})",
            len, MAX_BULK_SIZE
        )));
    }
    Ok(len)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete reply from a stream
///
/// Blocks until a complete reply is received or an error occurs
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Reply> {
    let line = read_line(reader)?;
    let (kind, rest) = line
        .split_first()
        .ok_or_else(|| JsonKvError::Protocol("Empty reply line".to_string()))?;

    match *kind {
        b'+' => Ok(Reply::Status(line_text(rest)?)),
        b'-' => Ok(Reply::Error(line_text(rest)?)),
        b':' => Ok(Reply::Integer(parse_int(rest)?)),
        b'$' => {
            let len = parse_int(rest)?;
            if len < 0 {
                return Ok(Reply::Bulk(None));
            }
            let len = checked_bulk_len(len)?;

            // Read body plus trailing CRLF
            let mut body = vec![0u8; len + CRLF.len()];
            reader.read_exact(&mut body)?;
            if &body[len..] != CRLF {
                return Err(JsonKvError::Protocol("Bulk not terminated by CRLF".to_string()));
            }
            body.truncate(len);
            Ok(Reply::Bulk(Some(Bytes::from(body))))
        }
        b'*' => {
            let count = parse_int(rest)?;
            if count < 0 {
                return Ok(Reply::Array(None));
            }
            let mut items = Vec::with_capacity(count.min(1024) as usize);
            for _ in 0..count {
                items.push(read_reply(reader)?);
            }
            Ok(Reply::Array(Some(items)))
        }
        other => Err(JsonKvError::Protocol(format!(
            "Unknown reply type: 0x{:02x}",
            other
        ))),
    }
}

fn read_line<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    let n = reader.read_until(b'\n', &mut line)?;
    if n == 0 {
        return Err(JsonKvError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed while reading reply",
        )));
    }
    if !line.ends_with(CRLF) {
        return Err(JsonKvError::Protocol("Reply line not terminated by CRLF".to_string()));
    }
    line.truncate(line.len() - CRLF.len());
    Ok(line)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, tokens: &[Bytes]) -> Result<()> {
    let bytes = encode_command(tokens);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Write a reply to a stream
pub fn write_reply<W: Write>(writer: &mut W, reply: &Reply) -> Result<()> {
    let bytes = encode_reply(reply);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
