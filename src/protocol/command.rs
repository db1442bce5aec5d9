//! Command definitions
//!
//! A command is an ordered token list (verb first) plus the strategy used to
//! decode the store's reply to it.

use std::fmt;

use bytes::Bytes;

use crate::path::JsonPath;

/// How a command's raw reply is decoded into a `JsonReply`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Bulk JSON text; nil or a missing key/path decodes to `Absent`
    Json,

    /// Array of bulk JSON texts (one per key)
    JsonList,

    /// Integer, or array of integers / nils for multi-match paths
    Integers,

    /// `+OK` status; nil means a conditional write was skipped
    Status,

    /// Popped element(s) as JSON text
    Popped,

    /// Object key names at a legacy path (a single list)
    Keys,

    /// Object key lists at a `$` path (one list or nil per match)
    KeyLists,

    /// Type names
    Type,

    /// Toggled booleans
    Toggle,

    /// Numeric result as JSON text
    Number,

    /// Structural conversion with no JSON parsing
    Raw,
}

/// Conversion of a command argument into a wire token
pub trait IntoToken {
    fn into_token(self) -> Bytes;
}

impl IntoToken for Bytes {
    fn into_token(self) -> Bytes {
        self
    }
}

impl IntoToken for &str {
    fn into_token(self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl IntoToken for String {
    fn into_token(self) -> Bytes {
        Bytes::from(self)
    }
}

impl IntoToken for &String {
    fn into_token(self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl IntoToken for &[u8] {
    fn into_token(self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl IntoToken for Vec<u8> {
    fn into_token(self) -> Bytes {
        Bytes::from(self)
    }
}

impl IntoToken for &JsonPath {
    fn into_token(self) -> Bytes {
        self.as_str().into_token()
    }
}

impl IntoToken for JsonPath {
    fn into_token(self) -> Bytes {
        self.as_str().into_token()
    }
}

macro_rules! int_token {
    ($($ty:ty),*) => {
        $(
            impl IntoToken for $ty {
                fn into_token(self) -> Bytes {
                    Bytes::from(self.to_string())
                }
            }
        )*
    };
}

int_token!(i32, i64, u32, u64, usize);

/// A built command
///
/// Token 0 is always the verb; the remaining tokens are in wire order.
/// Arguments can only be added while the command is being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    tokens: Vec<Bytes>,
    kind: ReplyKind,
}

impl Command {
    /// Start a command with the given verb
    pub fn new(verb: &str, kind: ReplyKind) -> Self {
        Self {
            tokens: vec![verb.into_token()],
            kind,
        }
    }

    /// Append one argument
    pub fn arg(mut self, token: impl IntoToken) -> Self {
        self.tokens.push(token.into_token());
        self
    }

    /// Append each argument in order
    pub fn args<I>(mut self, tokens: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoToken,
    {
        self.tokens.extend(tokens.into_iter().map(IntoToken::into_token));
        self
    }

    /// The command verb (e.g. `JSON.SET`)
    pub fn verb(&self) -> &str {
        std::str::from_utf8(&self.tokens[0]).unwrap_or("")
    }

    /// All tokens, verb included
    pub fn tokens(&self) -> &[Bytes] {
        &self.tokens
    }

    /// Tokens after the verb
    pub fn arguments(&self) -> &[Bytes] {
        &self.tokens[1..]
    }

    /// Reply decoding strategy
    pub fn reply_kind(&self) -> ReplyKind {
        self.kind
    }

    pub fn into_tokens(self) -> Vec<Bytes> {
        self.tokens
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", String::from_utf8_lossy(token))?;
        }
        Ok(())
    }
}
