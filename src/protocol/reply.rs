//! Reply definitions
//!
//! Raw replies as the store sends them, before any per-command decoding.

use bytes::Bytes;

/// A raw RESP reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Status line (`+OK`, `+QUEUED`, `+PONG`)
    Status(String),

    /// Error line reported by the store
    Error(String),

    /// Integer reply
    Integer(i64),

    /// Bulk string; `None` is the nil reply
    Bulk(Option<Bytes>),

    /// Array of replies; `None` is the nil array
    Array(Option<Vec<Reply>>),
}

impl Reply {
    /// The `+OK` status reply
    pub fn ok() -> Self {
        Reply::Status("OK".to_string())
    }

    /// The nil bulk reply
    pub fn nil() -> Self {
        Reply::Bulk(None)
    }

    /// A bulk reply holding the given bytes
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Reply::Bulk(Some(data.into()))
    }

    /// An error reply
    pub fn error(message: impl Into<String>) -> Self {
        Reply::Error(message.into())
    }

    /// An array reply
    pub fn array(items: Vec<Reply>) -> Self {
        Reply::Array(Some(items))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Bulk(None) | Reply::Array(None))
    }

    /// Text content of a status or bulk reply
    pub fn as_text(&self) -> Option<String> {
        match self {
            Reply::Status(s) => Some(s.clone()),
            Reply::Bulk(Some(data)) => Some(String::from_utf8_lossy(data).into_owned()),
            _ => None,
        }
    }
}
