//! Transport boundary
//!
//! The narrow interface to the store: one round trip per command, or one
//! round trip per batch.

use bytes::Bytes;

use crate::error::Result;
use crate::protocol::Reply;

/// Outcome of a batch round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchReply {
    /// One reply per submitted command, in submission order
    Replies(Vec<Reply>),

    /// The store rejected an atomic batch; no command took effect
    Aborted { index: usize, message: String },
}

/// A connection to the store
///
/// Implementations classify their own failures: connection-level problems
/// are `Transport` (or `Protocol`) errors, store-reported command failures
/// come back as `Reply::Error`.
pub trait Transport {
    /// Send one command and wait for its reply
    fn send_command(&mut self, tokens: &[Bytes]) -> Result<Reply>;

    /// Send every command in one round trip
    ///
    /// `atomic` asks the store to apply the commands as one unit.
    /// `shard_hint` is opaque routing data passed through unmodified.
    fn send_batch(
        &mut self,
        commands: &[Vec<Bytes>],
        atomic: bool,
        shard_hint: Option<&str>,
    ) -> Result<BatchReply>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send_command(&mut self, tokens: &[Bytes]) -> Result<Reply> {
        (**self).send_command(tokens)
    }

    fn send_batch(
        &mut self,
        commands: &[Vec<Bytes>],
        atomic: bool,
        shard_hint: Option<&str>,
    ) -> Result<BatchReply> {
        (**self).send_batch(commands, atomic, shard_hint)
    }
}
