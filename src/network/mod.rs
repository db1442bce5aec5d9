//! Network Module
//!
//! TCP connection to a remote store.
//!
//! ## Architecture
//! - One blocking connection per transport, buffered both ways
//! - A whole batch is written before any reply is read
//! - A failure mid round trip leaves the stream out of sync, so the
//!   connection refuses further use

mod connection;

pub use connection::TcpTransport;
