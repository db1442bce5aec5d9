//! JSON command builders
//!
//! One builder per document verb. Each resolves its path, encodes its
//! payload and validates its own argument combination before producing a
//! `Command`; nothing here touches the network.

use serde::Serialize;

use crate::codec::encode;
use crate::error::{JsonKvError, Result};
use crate::path::{resolve, JsonPath};
use crate::protocol::{Command, ReplyKind};

/// Subcommands `JSON.DEBUG` accepts
pub const DEBUG_SUBCOMMANDS: &[&str] = &["MEMORY", "HELP"];

/// Modifiers for `set`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Only write if nothing exists at the path
    pub nx: bool,

    /// Only write if something already exists at the path
    pub xx: bool,

    /// Expire the whole key after this many seconds (0 = no expiry)
    pub ttl: Option<u64>,
}

impl SetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nx(mut self) -> Self {
        self.nx = true;
        self
    }

    pub fn xx(mut self) -> Self {
        self.xx = true;
        self
    }

    pub fn ttl(mut self, seconds: u64) -> Self {
        self.ttl = Some(seconds);
        self
    }

    /// Effective expiry, if any
    pub fn expiry(&self) -> Option<u64> {
        self.ttl.filter(|secs| *secs > 0)
    }
}

fn encode_all<V: Serialize>(values: &[V]) -> Result<Vec<String>> {
    values.iter().map(|v| encode(v)).collect()
}

fn keyed(verb: &str, kind: ReplyKind, key: &str, path: Option<&str>) -> Command {
    Command::new(verb, kind).arg(key).arg(resolve(path))
}

// =============================================================================
// Documents
// =============================================================================

/// `JSON.GET key [NOESCAPE] path...` (no paths means the root)
pub fn get(key: &str, paths: &[&str], no_escape: bool) -> Command {
    let mut command = Command::new("JSON.GET", ReplyKind::Json).arg(key);
    if no_escape {
        command = command.arg("NOESCAPE");
    }
    if paths.is_empty() {
        command.arg(JsonPath::root())
    } else {
        command.args(paths.iter().map(|p| JsonPath::new(p)))
    }
}

/// `JSON.MGET key... path`
pub fn mget(keys: &[&str], path: Option<&str>) -> Result<Command> {
    if keys.is_empty() {
        return Err(JsonKvError::Argument("mget requires at least one key".to_string()));
    }
    Ok(Command::new("JSON.MGET", ReplyKind::JsonList)
        .args(keys.iter().copied())
        .arg(resolve(path)))
}

/// `JSON.SET key path value [NX|XX]`
pub fn set<V: Serialize + ?Sized>(
    key: &str,
    path: Option<&str>,
    value: &V,
    options: &SetOptions,
) -> Result<Command> {
    if options.nx && options.xx {
        return Err(JsonKvError::Argument(
            "nx and xx are mutually exclusive: use one, the other or neither - but not both"
                .to_string(),
        ));
    }

    let mut command = keyed("JSON.SET", ReplyKind::Status, key, path).arg(encode(value)?);
    if options.nx {
        command = command.arg("NX");
    } else if options.xx {
        command = command.arg("XX");
    }
    Ok(command)
}

/// `JSON.MSET (key path value)...`
pub fn mset<V: Serialize>(triplets: &[(&str, &str, V)]) -> Result<Command> {
    if triplets.is_empty() {
        return Err(JsonKvError::Argument("mset requires at least one triplet".to_string()));
    }
    let mut command = Command::new("JSON.MSET", ReplyKind::Status);
    for (key, path, value) in triplets {
        command = command.arg(*key).arg(JsonPath::new(path)).arg(encode(value)?);
    }
    Ok(command)
}

/// `JSON.MERGE key path value`
pub fn merge<V: Serialize + ?Sized>(key: &str, path: Option<&str>, value: &V) -> Result<Command> {
    Ok(keyed("JSON.MERGE", ReplyKind::Status, key, path).arg(encode(value)?))
}

/// `JSON.DEL key path`
pub fn delete(key: &str, path: Option<&str>) -> Command {
    keyed("JSON.DEL", ReplyKind::Integers, key, path)
}

/// `JSON.FORGET key path`
pub fn forget(key: &str, path: Option<&str>) -> Command {
    keyed("JSON.FORGET", ReplyKind::Integers, key, path)
}

/// `JSON.CLEAR key path`
pub fn clear(key: &str, path: Option<&str>) -> Command {
    keyed("JSON.CLEAR", ReplyKind::Integers, key, path)
}

// =============================================================================
// Arrays
// =============================================================================

/// `JSON.ARRAPPEND key path value...`
pub fn arrappend<V: Serialize>(key: &str, path: Option<&str>, values: &[V]) -> Result<Command> {
    if values.is_empty() {
        return Err(JsonKvError::Argument("arrappend requires at least one value".to_string()));
    }
    Ok(keyed("JSON.ARRAPPEND", ReplyKind::Integers, key, path).args(encode_all(values)?))
}

/// `JSON.ARRINDEX key path scalar [start [stop]]`
///
/// `stop` is only sent together with `start`.
pub fn arrindex<V: Serialize + ?Sized>(
    key: &str,
    path: Option<&str>,
    scalar: &V,
    start: Option<i64>,
    stop: Option<i64>,
) -> Result<Command> {
    let mut command = keyed("JSON.ARRINDEX", ReplyKind::Integers, key, path).arg(encode(scalar)?);
    if let Some(start) = start {
        command = command.arg(start);
        if let Some(stop) = stop {
            command = command.arg(stop);
        }
    }
    Ok(command)
}

/// `JSON.ARRINSERT key path index value...`
pub fn arrinsert<V: Serialize>(
    key: &str,
    path: Option<&str>,
    index: i64,
    values: &[V],
) -> Result<Command> {
    if values.is_empty() {
        return Err(JsonKvError::Argument("arrinsert requires at least one value".to_string()));
    }
    Ok(keyed("JSON.ARRINSERT", ReplyKind::Integers, key, path)
        .arg(index)
        .args(encode_all(values)?))
}

/// `JSON.ARRLEN key path`
pub fn arrlen(key: &str, path: Option<&str>) -> Command {
    keyed("JSON.ARRLEN", ReplyKind::Integers, key, path)
}

/// `JSON.ARRPOP key path index` (index defaults to the last element)
pub fn arrpop(key: &str, path: Option<&str>, index: Option<i64>) -> Command {
    keyed("JSON.ARRPOP", ReplyKind::Popped, key, path).arg(index.unwrap_or(-1))
}

/// `JSON.ARRTRIM key path start stop` (inclusive range)
pub fn arrtrim(key: &str, path: Option<&str>, start: i64, stop: i64) -> Command {
    keyed("JSON.ARRTRIM", ReplyKind::Integers, key, path)
        .arg(start)
        .arg(stop)
}

// =============================================================================
// Objects, Strings, Numbers
// =============================================================================

/// `JSON.OBJKEYS key path`
pub fn objkeys(key: &str, path: Option<&str>) -> Command {
    let kind = if resolve(path).is_multi() {
        ReplyKind::KeyLists
    } else {
        ReplyKind::Keys
    };
    keyed("JSON.OBJKEYS", kind, key, path)
}

/// `JSON.OBJLEN key path`
pub fn objlen(key: &str, path: Option<&str>) -> Command {
    keyed("JSON.OBJLEN", ReplyKind::Integers, key, path)
}

/// `JSON.NUMINCRBY key path number`
pub fn numincrby<N: Serialize + ?Sized>(key: &str, path: Option<&str>, number: &N) -> Result<Command> {
    Ok(keyed("JSON.NUMINCRBY", ReplyKind::Number, key, path).arg(encode(number)?))
}

/// `JSON.STRLEN key path`
pub fn strlen(key: &str, path: Option<&str>) -> Command {
    keyed("JSON.STRLEN", ReplyKind::Integers, key, path)
}

/// `JSON.STRAPPEND key path "text"`
pub fn strappend(key: &str, path: Option<&str>, value: &str) -> Result<Command> {
    Ok(keyed("JSON.STRAPPEND", ReplyKind::Integers, key, path).arg(encode(value)?))
}

/// `JSON.TOGGLE key path`
pub fn toggle(key: &str, path: Option<&str>) -> Command {
    keyed("JSON.TOGGLE", ReplyKind::Toggle, key, path)
}

// =============================================================================
// Introspection
// =============================================================================

/// `JSON.TYPE key path`
pub fn type_of(key: &str, path: Option<&str>) -> Command {
    keyed("JSON.TYPE", ReplyKind::Type, key, path)
}

/// `JSON.RESP key path`
pub fn resp(key: &str, path: Option<&str>) -> Command {
    keyed("JSON.RESP", ReplyKind::Raw, key, path)
}

/// `JSON.DEBUG MEMORY key path` or `JSON.DEBUG HELP`
pub fn debug(subcommand: &str, key: Option<&str>, path: Option<&str>) -> Result<Command> {
    if !DEBUG_SUBCOMMANDS.contains(&subcommand) {
        return Err(JsonKvError::Argument(format!(
            "invalid debug subcommand '{}': the only valid subcommands are {:?}",
            subcommand, DEBUG_SUBCOMMANDS
        )));
    }

    let command = Command::new("JSON.DEBUG", ReplyKind::Raw).arg(subcommand);
    if subcommand != "MEMORY" {
        return Ok(command);
    }
    let key = key.ok_or_else(|| JsonKvError::Argument("debug MEMORY requires a key".to_string()))?;
    Ok(command.arg(key).arg(resolve(path)))
}
