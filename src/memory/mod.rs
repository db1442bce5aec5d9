//! Memory Module
//!
//! An in-process document store that speaks the same command set as the
//! remote store, for tests and offline use.
//!
//! ## Supported Commands
//! - Document commands: `JSON.GET`, `JSON.MGET`, `JSON.SET`, `JSON.MSET`,
//!   `JSON.MERGE`, `JSON.DEL`, `JSON.FORGET`, `JSON.CLEAR`
//! - Arrays: `JSON.ARRAPPEND`, `JSON.ARRINDEX`, `JSON.ARRINSERT`,
//!   `JSON.ARRLEN`, `JSON.ARRPOP`, `JSON.ARRTRIM`
//! - Objects, strings, numbers: `JSON.OBJKEYS`, `JSON.OBJLEN`,
//!   `JSON.STRLEN`, `JSON.STRAPPEND`, `JSON.NUMINCRBY`, `JSON.TOGGLE`
//! - Introspection: `JSON.TYPE`, `JSON.RESP`, `JSON.DEBUG`
//! - Keys: `EXPIRE`, `PERSIST`, `TTL`, `EXISTS`, `DEL`, `PING`

mod path;
mod exec;
mod store;

pub use store::{Fault, MemoryTransport, Submission};
