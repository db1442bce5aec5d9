//! # jsonkv
//!
//! Client-side command layer for a key-value store's JSON document module:
//! - Path-addressed reads and writes on stored JSON documents
//! - Typed decoding of store replies (absence distinct from `null`)
//! - Batches sent in one round trip, atomic or not
//! - Pluggable transports: RESP over TCP, or an in-process store
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Client / Batch  (JsonCommands, KeyCommands)     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Command (tokens + ReplyKind)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │           Command Builders  (path resolver, value codec)     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │        Transport        │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │     TCP     │          │   Memory    │
//!   │   (RESP)    │          │  (RwLock)   │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use jsonkv::{Client, Config, JsonCommands, MemoryTransport, SetOptions};
//! use serde_json::json;
//!
//! let mut client = Client::new(MemoryTransport::new(), Config::default());
//! client.set("doc1", None, &json!({"a": 1}), SetOptions::new()).unwrap();
//! assert_eq!(client.get("doc1", None).unwrap(), Some(json!({"a": 1})));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod path;
pub mod codec;
pub mod protocol;
pub mod commands;
pub mod transport;
pub mod pipeline;
pub mod client;
pub mod network;
pub mod memory;
pub mod loader;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{JsonKvError, Result};
pub use config::Config;
pub use path::{JsonPath, ROOT_PATH};
pub use codec::{JsonReply, RawDocument};
pub use commands::{Dispatch, JsonCommands, KeyCommands, SetOptions};
pub use transport::{BatchReply, Transport};
pub use pipeline::{Batch, BatchResults, Pending};
pub use client::Client;
pub use network::TcpTransport;
pub use memory::MemoryTransport;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of jsonkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
