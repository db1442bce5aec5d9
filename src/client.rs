//! Client facade
//!
//! Runs each document or key operation immediately over its transport and
//! opens batches that queue operations for a single round trip.

use crate::codec::{decode_reply, FromReply, JsonReply};
use crate::commands::{Dispatch, JsonCommands, KeyCommands};
use crate::config::Config;
use crate::error::Result;
use crate::network::TcpTransport;
use crate::pipeline::Batch;
use crate::protocol::Command;
use crate::transport::Transport;

/// A client bound to one transport
pub struct Client<T: Transport> {
    transport: T,
    config: Config,
}

impl Client<TcpTransport> {
    /// Connect to the store at `config.addr`
    pub fn connect(config: Config) -> Result<Self> {
        let transport = TcpTransport::connect(&config)?;
        tracing::info!("Client connected to {}", transport.peer_addr());
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, config: Config) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Open a batch
    ///
    /// `shard_hint` is passed to the transport unmodified.
    pub fn pipeline(&mut self, atomic: bool, shard_hint: Option<&str>) -> Batch<'_, T> {
        Batch::new(
            &mut self.transport,
            atomic,
            shard_hint,
            self.config.raise_on_error,
            self.config.no_escape,
        )
    }

    /// Open an atomic batch
    pub fn transaction(&mut self) -> Batch<'_, T> {
        self.pipeline(true, None)
    }

    /// Open a batch whose atomicity follows `Config::transaction`
    pub fn pipeline_default(&mut self) -> Batch<'_, T> {
        let atomic = self.config.transaction;
        self.pipeline(atomic, None)
    }

    /// Send one built command and decode its reply
    pub fn execute_command(&mut self, command: Command) -> Result<JsonReply> {
        tracing::debug!("Executing command {}", command);
        let kind = command.reply_kind();
        let reply = self.transport.send_command(command.tokens())?;
        tracing::debug!("Response from command {}: {:?}", command.verb(), reply);
        decode_reply(kind, reply)
    }
}

impl<T: Transport> Dispatch for Client<T> {
    type Output<R> = R;

    fn dispatch<R: FromReply>(&mut self, command: Command) -> Result<R> {
        R::from_reply(self.execute_command(command)?)
    }

    fn dispatch_atomic(&mut self, commands: Vec<Command>) -> Result<JsonReply> {
        let mut batch = self.transaction();
        for command in commands {
            batch.push(command);
        }
        let results = batch.execute_with(true)?;
        Ok(JsonReply::Array(
            results.into_results().into_iter().collect::<Result<Vec<_>>>()?,
        ))
    }
}

impl<T: Transport> JsonCommands for Client<T> {
    fn no_escape(&self) -> bool {
        self.config.no_escape
    }
}

impl<T: Transport> KeyCommands for Client<T> {}
