//! Batch execution
//!
//! Commands are queued locally and sent in a single round trip when the
//! batch executes. Each queued operation hands back a [`Pending`] handle
//! used to claim its result afterwards.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;

use crate::codec::{decode_reply, FromReply, JsonReply};
use crate::commands::{Dispatch, JsonCommands, KeyCommands};
use crate::error::{JsonKvError, Result};
use crate::protocol::{Command, ReplyKind};
use crate::transport::{BatchReply, Transport};

// =============================================================================
// Pending Results
// =============================================================================

static NEXT_BATCH_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to the result of a queued operation
///
/// Most operations occupy one slot. A compound write (set with expiry)
/// occupies several and resolves to the list of their results. A handle
/// only resolves against the results of the batch that issued it.
pub struct Pending<T> {
    batch: u64,
    start: usize,
    len: usize,
    grouped: bool,
    _result: PhantomData<fn() -> T>,
}

impl<T> Pending<T> {
    fn single(batch: u64, index: usize) -> Self {
        Self {
            batch,
            start: index,
            len: 1,
            grouped: false,
            _result: PhantomData,
        }
    }

    fn group(batch: u64, start: usize, len: usize) -> Self {
        Self {
            batch,
            start,
            len,
            grouped: true,
            _result: PhantomData,
        }
    }

    /// Position of the operation's first command within the batch
    pub fn index(&self) -> usize {
        self.start
    }
}

impl<T> Clone for Pending<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Pending<T> {}

impl<T> fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending")
            .field("batch", &self.batch)
            .field("start", &self.start)
            .field("len", &self.len)
            .finish()
    }
}

/// Per-command results of an executed batch, in submission order
#[derive(Debug)]
pub struct BatchResults {
    batch: u64,
    slots: Vec<Option<Result<JsonReply>>>,
}

impl BatchResults {
    fn new(batch: u64, results: Vec<Result<JsonReply>>) -> Self {
        Self {
            batch,
            slots: results.into_iter().map(Some).collect(),
        }
    }

    /// Number of commands the batch carried
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Claim the typed result of a queued operation
    ///
    /// Each result can be claimed once, and only with a handle issued by
    /// the batch these results came from.
    pub fn take<T: FromReply>(&mut self, pending: Pending<T>) -> Result<T> {
        if pending.batch != self.batch {
            return Err(JsonKvError::Argument(format!(
                "result handle belongs to batch {}, not batch {}",
                pending.batch, self.batch
            )));
        }

        if !pending.grouped {
            return T::from_reply(self.take_slot(pending.start)?);
        }

        let mut items = Vec::with_capacity(pending.len);
        for index in pending.start..pending.start + pending.len {
            items.push(self.take_slot(index)?);
        }
        T::from_reply(JsonReply::Array(items))
    }

    /// Every unclaimed result in submission order
    pub fn into_results(self) -> Vec<Result<JsonReply>> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.unwrap_or_else(|| Err(already_taken(index))))
            .collect()
    }

    fn take_slot(&mut self, index: usize) -> Result<JsonReply> {
        match self.slots.get_mut(index) {
            Some(slot) => slot.take().unwrap_or_else(|| Err(already_taken(index))),
            None => Err(JsonKvError::Argument(format!(
                "no result at index {} in a batch of {}",
                index,
                self.slots.len()
            ))),
        }
    }
}

fn already_taken(index: usize) -> JsonKvError {
    JsonKvError::Argument(format!("result at index {} was already taken", index))
}

// =============================================================================
// Batch
// =============================================================================

/// Commands queued for one round trip
///
/// Borrowed from a [`Client`](crate::Client); the client is usable again
/// once the batch has executed or been dropped.
pub struct Batch<'c, T: Transport> {
    id: u64,
    transport: &'c mut T,
    commands: Vec<Command>,
    atomic: bool,
    shard_hint: Option<String>,
    raise_on_error: bool,
    no_escape: bool,
}

impl<'c, T: Transport> Batch<'c, T> {
    pub(crate) fn new(
        transport: &'c mut T,
        atomic: bool,
        shard_hint: Option<&str>,
        raise_on_error: bool,
        no_escape: bool,
    ) -> Self {
        Self {
            id: NEXT_BATCH_ID.fetch_add(1, Ordering::Relaxed),
            transport,
            commands: Vec::new(),
            atomic,
            shard_hint: shard_hint.map(str::to_string),
            raise_on_error,
            no_escape,
        }
    }

    /// Queue an already built command; returns its position
    pub fn push(&mut self, command: Command) -> usize {
        tracing::debug!("Queued command {} at position {}", command, self.commands.len());
        self.commands.push(command);
        self.commands.len() - 1
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn is_atomic(&self) -> bool {
        self.atomic
    }

    pub fn shard_hint(&self) -> Option<&str> {
        self.shard_hint.as_deref()
    }

    /// Commands queued so far
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Send every queued command using the client's raise-on-error setting
    pub fn execute(self) -> Result<BatchResults> {
        let raise_on_error = self.raise_on_error;
        self.execute_with(raise_on_error)
    }

    /// Send every queued command in one round trip
    ///
    /// An atomic batch fails as a whole with [`JsonKvError::Batch`] if any
    /// command fails. A non-atomic batch reports failures per position,
    /// unless `raise_on_error` is set, in which case the first failure is
    /// returned as a `Batch` error. A transport failure fails every
    /// operation in the batch at once.
    pub fn execute_with(self, raise_on_error: bool) -> Result<BatchResults> {
        if self.commands.is_empty() {
            return Ok(BatchResults::new(self.id, Vec::new()));
        }

        tracing::debug!(
            "Executing batch {} of {} commands (atomic={}, shard_hint={:?})",
            self.id,
            self.commands.len(),
            self.atomic,
            self.shard_hint
        );

        let (frames, kinds): (Vec<Vec<Bytes>>, Vec<ReplyKind>) = self
            .commands
            .into_iter()
            .map(|command| {
                let kind = command.reply_kind();
                (command.into_tokens(), kind)
            })
            .unzip();

        let replies = match self
            .transport
            .send_batch(&frames, self.atomic, self.shard_hint.as_deref())?
        {
            BatchReply::Replies(replies) => replies,
            BatchReply::Aborted { index, message } => {
                tracing::debug!("Batch aborted at command {}: {}", index, message);
                return Err(JsonKvError::Batch { index, message });
            }
        };

        if replies.len() != kinds.len() {
            return Err(JsonKvError::Protocol(format!(
                "batch of {} commands got {} replies",
                kinds.len(),
                replies.len()
            )));
        }

        tracing::debug!("Response from batch: {:?}", replies);

        let results: Vec<Result<JsonReply>> = kinds
            .into_iter()
            .zip(replies)
            .map(|(kind, reply)| decode_reply(kind, reply))
            .collect();

        if self.atomic || raise_on_error {
            if let Some(index) = results.iter().position(|r| r.is_err()) {
                return Err(match results.into_iter().nth(index) {
                    Some(Err(JsonKvError::Command(message))) => JsonKvError::Batch { index, message },
                    Some(Err(other)) => other,
                    _ => JsonKvError::Batch {
                        index,
                        message: "command failed".to_string(),
                    },
                });
            }
        }

        Ok(BatchResults::new(self.id, results))
    }
}

impl<'c, T: Transport> fmt::Debug for Batch<'c, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batch")
            .field("id", &self.id)
            .field("commands", &self.commands.len())
            .field("atomic", &self.atomic)
            .field("shard_hint", &self.shard_hint)
            .finish()
    }
}

impl<'c, T: Transport> Dispatch for Batch<'c, T> {
    type Output<R> = Pending<R>;

    fn dispatch<R: FromReply>(&mut self, command: Command) -> Result<Pending<R>> {
        Ok(Pending::single(self.id, self.push(command)))
    }

    fn dispatch_atomic(&mut self, commands: Vec<Command>) -> Result<Pending<JsonReply>> {
        if !self.atomic {
            return Err(JsonKvError::Argument(
                "set with expiry requires an atomic batch".to_string(),
            ));
        }
        let start = self.commands.len();
        let len = commands.len();
        for command in commands {
            self.push(command);
        }
        Ok(Pending::group(self.id, start, len))
    }
}

impl<'c, T: Transport> JsonCommands for Batch<'c, T> {
    fn no_escape(&self) -> bool {
        self.no_escape
    }
}

impl<'c, T: Transport> KeyCommands for Batch<'c, T> {}
