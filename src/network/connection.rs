//! TCP Transport
//!
//! Speaks RESP to a remote store over a single blocking connection.

use std::io::{BufReader, BufWriter, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use bytes::Bytes;

use crate::config::Config;
use crate::error::{JsonKvError, Result};
use crate::protocol::{encode_command, read_reply, Reply};
use crate::transport::{BatchReply, Transport};

/// A RESP connection to the store
pub struct TcpTransport {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,

    /// Set once a round trip fails part way; the stream is then unusable
    broken: bool,
}

impl TcpTransport {
    /// Connect using the address and timeouts from `config`
    pub fn connect(config: &Config) -> Result<Self> {
        config.validate()?;

        let addrs = config
            .addr
            .to_socket_addrs()
            .map_err(|e| JsonKvError::Transport(format!("cannot resolve {}: {}", config.addr, e)))?;

        let mut last_err = None;
        for addr in addrs {
            let attempt = if config.connect_timeout_ms > 0 {
                TcpStream::connect_timeout(&addr, Duration::from_millis(config.connect_timeout_ms))
            } else {
                TcpStream::connect(addr)
            };
            match attempt {
                Ok(stream) => {
                    let mut transport = Self::from_stream(stream)?;
                    transport.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;
                    tracing::debug!("Connected to store at {}", transport.peer_addr);
                    return Ok(transport);
                }
                Err(e) => {
                    tracing::warn!("Connection to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(JsonKvError::Transport(match last_err {
            Some(e) => format!("cannot connect to {}: {}", config.addr, e),
            None => format!("no address found for {}", config.addr),
        }))
    }

    /// Wrap an already connected stream
    ///
    /// Sets up buffered I/O and disables Nagle's algorithm
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
            broken: false,
        })
    }

    /// Configure connection timeouts (0 leaves a direction blocking)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Whether an earlier failure left the connection unusable
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.broken {
            return Err(JsonKvError::Transport(format!(
                "connection to {} is unusable after an earlier failure",
                self.peer_addr
            )));
        }
        Ok(())
    }

    /// Run one round trip, latching the connection as broken on failure
    fn round_trip<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        self.ensure_usable()?;
        match f(self) {
            Ok(value) => Ok(value),
            Err(JsonKvError::Io(e)) => {
                self.broken = true;
                tracing::warn!("I/O failure talking to {}: {}", self.peer_addr, e);
                Err(JsonKvError::Transport(format!("{}: {}", self.peer_addr, e)))
            }
            Err(e @ JsonKvError::Protocol(_)) => {
                self.broken = true;
                tracing::warn!("Protocol failure talking to {}: {}", self.peer_addr, e);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn write_frames(&mut self, commands: &[&[Bytes]]) -> Result<()> {
        for tokens in commands {
            self.writer.write_all(&encode_command(tokens))?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn read(&mut self) -> Result<Reply> {
        let reply = read_reply(&mut self.reader)?;
        tracing::trace!("Received from {}: {:?}", self.peer_addr, reply);
        Ok(reply)
    }
}

impl Transport for TcpTransport {
    fn send_command(&mut self, tokens: &[Bytes]) -> Result<Reply> {
        self.round_trip(|conn| {
            conn.write_frames(&[tokens])?;
            conn.read()
        })
    }

    /// Atomic batches are framed with MULTI/EXEC. A command rejected while
    /// queueing aborts the transaction and is reported by index; commands
    /// that fail inside EXEC come back as per-position error replies.
    fn send_batch(
        &mut self,
        commands: &[Vec<Bytes>],
        atomic: bool,
        shard_hint: Option<&str>,
    ) -> Result<BatchReply> {
        tracing::trace!(
            "Sending batch of {} commands to {} (atomic={}, shard_hint={:?})",
            commands.len(),
            self.peer_addr,
            atomic,
            shard_hint
        );

        let multi = [Bytes::from_static(b"MULTI")];
        let exec = [Bytes::from_static(b"EXEC")];

        self.round_trip(|conn| {
            let mut frames: Vec<&[Bytes]> = Vec::with_capacity(commands.len() + 2);
            if atomic {
                frames.push(&multi);
            }
            frames.extend(commands.iter().map(Vec::as_slice));
            if atomic {
                frames.push(&exec);
            }
            conn.write_frames(&frames)?;

            if !atomic {
                let replies = (0..commands.len())
                    .map(|_| conn.read())
                    .collect::<Result<Vec<_>>>()?;
                return Ok(BatchReply::Replies(replies));
            }

            // Drain every reply even after a failure so the stream stays in sync
            let opened = conn.read()?;
            let mut rejected: Option<(usize, String)> = None;
            for index in 0..commands.len() {
                if let Reply::Error(message) = conn.read()? {
                    rejected.get_or_insert((index, message));
                }
            }
            let executed = conn.read()?;

            if let Reply::Error(message) = opened {
                return Err(JsonKvError::Command(message));
            }
            if let Some((index, message)) = rejected {
                return Ok(BatchReply::Aborted { index, message });
            }
            match executed {
                Reply::Array(Some(replies)) => Ok(BatchReply::Replies(replies)),
                Reply::Error(message) => Ok(BatchReply::Aborted { index: 0, message }),
                Reply::Array(None) => Ok(BatchReply::Aborted {
                    index: 0,
                    message: "transaction discarded by store".to_string(),
                }),
                other => Err(JsonKvError::Protocol(format!(
                    "unexpected EXEC reply: {:?}",
                    other
                ))),
            }
        })
    }
}
