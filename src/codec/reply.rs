//! Reply decoding
//!
//! Applies a command's `ReplyKind` to the raw reply, then converts the
//! decoded reply into the typed result each operation returns.

use serde_json::Value;

use crate::error::{JsonKvError, Result};
use crate::protocol::{Reply, ReplyKind};
use super::value::{decode, decode_text};

/// A decoded command result
#[derive(Debug, Clone, PartialEq)]
pub enum JsonReply {
    /// Nothing exists at the requested key or path
    Absent,

    /// Write acknowledged
    Ok,

    /// A JSON value (may itself be `null`)
    Value(Value),

    /// Integer result (lengths, counts, indexes)
    Integer(i64),

    /// Text result (type names, key names, status lines)
    Text(String),

    /// Boolean result
    Bool(bool),

    /// One entry per match, or per command in a compound write
    Array(Vec<JsonReply>),
}

impl JsonReply {
    pub fn is_absent(&self) -> bool {
        matches!(self, JsonReply::Absent)
    }

    /// The contained JSON value, if any
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            JsonReply::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Render as JSON for display (absence renders as `null`)
    pub fn to_json(&self) -> Value {
        match self {
            JsonReply::Absent => Value::Null,
            JsonReply::Ok => Value::String("OK".to_string()),
            JsonReply::Value(v) => v.clone(),
            JsonReply::Integer(n) => Value::from(*n),
            JsonReply::Text(t) => Value::String(t.clone()),
            JsonReply::Bool(b) => Value::Bool(*b),
            JsonReply::Array(items) => Value::Array(items.iter().map(JsonReply::to_json).collect()),
        }
    }
}

// =============================================================================
// Raw Reply Decoding
// =============================================================================

/// Decode a raw reply using the given strategy
///
/// Error replies become `Command` errors, except that a missing key or
/// path on a document read decodes to `Absent`.
pub fn decode_reply(kind: ReplyKind, reply: Reply) -> Result<JsonReply> {
    if let Reply::Error(message) = &reply {
        if kind != ReplyKind::Json {
            return Err(JsonKvError::Command(message.clone()));
        }
    }

    match (kind, reply) {
        (ReplyKind::Json, reply) => decode(&reply),

        (_, Reply::Bulk(None)) | (_, Reply::Array(None)) => Ok(JsonReply::Absent),

        (ReplyKind::JsonList, Reply::Array(Some(items))) => Ok(JsonReply::Array(
            items.iter().map(decode).collect::<Result<Vec<_>>>()?,
        )),

        (ReplyKind::Integers, Reply::Integer(n)) => Ok(JsonReply::Integer(n)),

        (ReplyKind::Status, Reply::Status(s)) if s == "OK" => Ok(JsonReply::Ok),
        (ReplyKind::Status, Reply::Status(s)) => Ok(JsonReply::Text(s)),

        (ReplyKind::Popped, Reply::Bulk(Some(data)))
        | (ReplyKind::Number, Reply::Bulk(Some(data))) => Ok(JsonReply::Value(decode_text(&data)?)),
        (ReplyKind::Number, Reply::Integer(n)) => Ok(JsonReply::Value(Value::from(n))),

        // Legacy key lists are normalized to the single-match form
        (ReplyKind::Keys, Reply::Array(Some(items))) => Ok(JsonReply::Array(vec![key_list(items)?])),
        (ReplyKind::KeyLists, Reply::Array(Some(matches))) => Ok(JsonReply::Array(
            matches
                .into_iter()
                .map(|item| match item {
                    Reply::Array(Some(items)) => key_list(items),
                    Reply::Bulk(None) | Reply::Array(None) => Ok(JsonReply::Absent),
                    other => Err(unexpected(ReplyKind::KeyLists, &other)),
                })
                .collect::<Result<Vec<_>>>()?,
        )),

        (ReplyKind::Keys | ReplyKind::Type, reply @ (Reply::Bulk(Some(_)) | Reply::Status(_))) => {
            Ok(JsonReply::Text(reply.as_text().unwrap_or_default()))
        }

        (ReplyKind::Toggle, Reply::Integer(n)) => Ok(JsonReply::Bool(n != 0)),
        (ReplyKind::Toggle, reply @ (Reply::Bulk(Some(_)) | Reply::Status(_))) => match reply.as_text().as_deref() {
            Some("true") => Ok(JsonReply::Bool(true)),
            Some("false") => Ok(JsonReply::Bool(false)),
            other => Err(JsonKvError::Protocol(format!(
                "expected boolean text from toggle, got {:?}",
                other
            ))),
        },

        (ReplyKind::Raw, Reply::Status(s)) => Ok(JsonReply::Text(s)),
        (ReplyKind::Raw, Reply::Integer(n)) => Ok(JsonReply::Integer(n)),
        (ReplyKind::Raw, Reply::Bulk(Some(data))) => {
            Ok(JsonReply::Text(String::from_utf8_lossy(&data).into_owned()))
        }

        // Multi-match paths reply with one entry per match
        (kind, Reply::Array(Some(items))) => Ok(JsonReply::Array(
            items
                .into_iter()
                .map(|item| decode_reply(kind, item))
                .collect::<Result<Vec<_>>>()?,
        )),

        (kind, other) => Err(unexpected(kind, &other)),
    }
}

fn key_list(items: Vec<Reply>) -> Result<JsonReply> {
    Ok(JsonReply::Array(
        items
            .into_iter()
            .map(|item| decode_reply(ReplyKind::Keys, item))
            .collect::<Result<Vec<_>>>()?,
    ))
}

fn unexpected(kind: ReplyKind, reply: &Reply) -> JsonKvError {
    JsonKvError::Protocol(format!("unexpected reply {:?} for {:?} command", reply, kind))
}

fn mismatch(expected: &str, reply: &JsonReply) -> JsonKvError {
    JsonKvError::Protocol(format!("expected {}, got {:?}", expected, reply))
}

// =============================================================================
// Typed Results
// =============================================================================

/// Conversion from a decoded reply into an operation's result type
///
/// Single-match (legacy path) replies convert to one-element vectors so
/// that both path syntaxes share a result type.
pub trait FromReply: Sized {
    fn from_reply(reply: JsonReply) -> Result<Self>;
}

impl FromReply for JsonReply {
    fn from_reply(reply: JsonReply) -> Result<Self> {
        Ok(reply)
    }
}

impl FromReply for Option<Value> {
    fn from_reply(reply: JsonReply) -> Result<Self> {
        match reply {
            JsonReply::Absent => Ok(None),
            JsonReply::Value(v) => Ok(Some(v)),
            other => Err(mismatch("a JSON value", &other)),
        }
    }
}

impl FromReply for Value {
    fn from_reply(reply: JsonReply) -> Result<Self> {
        match reply {
            JsonReply::Value(v) => Ok(v),
            JsonReply::Integer(n) => Ok(Value::from(n)),
            other => Err(mismatch("a JSON value", &other)),
        }
    }
}

/// `true` when a write was applied, `false` when a conditional write was skipped
impl FromReply for bool {
    fn from_reply(reply: JsonReply) -> Result<Self> {
        match reply {
            JsonReply::Ok => Ok(true),
            JsonReply::Absent => Ok(false),
            JsonReply::Bool(b) => Ok(b),
            JsonReply::Integer(n) => Ok(n != 0),
            other => Err(mismatch("an acknowledgement", &other)),
        }
    }
}

impl FromReply for i64 {
    fn from_reply(reply: JsonReply) -> Result<Self> {
        match reply {
            JsonReply::Integer(n) => Ok(n),
            other => Err(mismatch("an integer", &other)),
        }
    }
}

impl FromReply for String {
    fn from_reply(reply: JsonReply) -> Result<Self> {
        match reply {
            JsonReply::Text(t) => Ok(t),
            JsonReply::Ok => Ok("OK".to_string()),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl FromReply for Vec<Option<i64>> {
    fn from_reply(reply: JsonReply) -> Result<Self> {
        match reply {
            JsonReply::Integer(n) => Ok(vec![Some(n)]),
            JsonReply::Absent => Ok(vec![None]),
            JsonReply::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    JsonReply::Integer(n) => Ok(Some(n)),
                    JsonReply::Absent => Ok(None),
                    other => Err(mismatch("an integer", &other)),
                })
                .collect(),
            other => Err(mismatch("integers", &other)),
        }
    }
}

impl FromReply for Vec<Option<Value>> {
    fn from_reply(reply: JsonReply) -> Result<Self> {
        match reply {
            JsonReply::Value(v) => Ok(vec![Some(v)]),
            JsonReply::Absent => Ok(vec![None]),
            JsonReply::Array(items) => items.into_iter().map(Option::<Value>::from_reply).collect(),
            other => Err(mismatch("JSON values", &other)),
        }
    }
}

impl FromReply for Vec<Option<bool>> {
    fn from_reply(reply: JsonReply) -> Result<Self> {
        match reply {
            JsonReply::Bool(b) => Ok(vec![Some(b)]),
            JsonReply::Absent => Ok(vec![None]),
            JsonReply::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    JsonReply::Bool(b) => Ok(Some(b)),
                    JsonReply::Absent => Ok(None),
                    other => Err(mismatch("a boolean", &other)),
                })
                .collect(),
            other => Err(mismatch("booleans", &other)),
        }
    }
}

impl FromReply for Vec<String> {
    fn from_reply(reply: JsonReply) -> Result<Self> {
        match reply {
            JsonReply::Text(t) => Ok(vec![t]),
            JsonReply::Absent => Ok(Vec::new()),
            JsonReply::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        JsonReply::Text(t) => out.push(t),
                        JsonReply::Absent => {}
                        other => return Err(mismatch("text", &other)),
                    }
                }
                Ok(out)
            }
            other => Err(mismatch("text", &other)),
        }
    }
}

/// Object key lists, one entry per match
///
/// `Keys` and `KeyLists` replies both decode to a list of matches, so an
/// empty list means a `$` path matched nothing.
impl FromReply for Vec<Option<Vec<String>>> {
    fn from_reply(reply: JsonReply) -> Result<Self> {
        match reply {
            JsonReply::Absent => Ok(vec![None]),
            JsonReply::Array(matches) => matches
                .into_iter()
                .map(|item| match item {
                    JsonReply::Absent => Ok(None),
                    list @ JsonReply::Array(_) => Vec::<String>::from_reply(list).map(Some),
                    other => Err(mismatch("a key list", &other)),
                })
                .collect(),
            other => Err(mismatch("key lists", &other)),
        }
    }
}
