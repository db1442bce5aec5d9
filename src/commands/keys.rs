//! Generic key command builders

use crate::error::{JsonKvError, Result};
use crate::protocol::{Command, ReplyKind};

/// `EXPIRE key seconds`
pub fn expire(key: &str, seconds: u64) -> Command {
    Command::new("EXPIRE", ReplyKind::Integers).arg(key).arg(seconds)
}

/// `PERSIST key`
pub fn persist(key: &str) -> Command {
    Command::new("PERSIST", ReplyKind::Integers).arg(key)
}

/// `TTL key`
pub fn ttl(key: &str) -> Command {
    Command::new("TTL", ReplyKind::Integers).arg(key)
}

/// `EXISTS key...`
pub fn exists(keys: &[&str]) -> Result<Command> {
    if keys.is_empty() {
        return Err(JsonKvError::Argument("exists requires at least one key".to_string()));
    }
    Ok(Command::new("EXISTS", ReplyKind::Integers).args(keys.iter().copied()))
}

/// `DEL key...`
pub fn del(keys: &[&str]) -> Result<Command> {
    if keys.is_empty() {
        return Err(JsonKvError::Argument("del requires at least one key".to_string()));
    }
    Ok(Command::new("DEL", ReplyKind::Integers).args(keys.iter().copied()))
}

/// `PING`
pub fn ping() -> Command {
    Command::new("PING", ReplyKind::Status)
}
