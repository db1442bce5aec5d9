//! Commands Module
//!
//! Command builders and the facade traits that dispatch them.
//!
//! ## Composition
//! ```text
//!   JsonCommands ──┐
//!                  ├──► Dispatch ──► Client  (Output<T> = T, one round trip)
//!   KeyCommands  ──┘             └─► Batch   (Output<T> = Pending<T>, queued)
//! ```
//! Both capabilities build the same `Command` values; only the dispatch
//! target decides whether it runs now or with the rest of a batch.

pub mod json;
pub mod keys;

use serde::Serialize;
use serde_json::Value;

use crate::codec::{decode_keys, FromReply, JsonReply, RawDocument};
use crate::error::Result;
use crate::protocol::Command;

pub use json::SetOptions;

/// Destination for built commands
pub trait Dispatch {
    /// What a caller gets back for a command whose result type is `T`
    type Output<T>;

    /// Run or queue a single command
    fn dispatch<T: FromReply>(&mut self, command: Command) -> Result<Self::Output<T>>;

    /// Run or queue commands that must apply together; the result is the
    /// list of their individual results
    fn dispatch_atomic(&mut self, commands: Vec<Command>) -> Result<Self::Output<JsonReply>>;
}

// =============================================================================
// Generic Key Commands
// =============================================================================

/// Commands that act on whole keys regardless of their type
pub trait KeyCommands: Dispatch {
    /// Set a time to live on `key`; `false` if the key does not exist
    fn expire(&mut self, key: &str, seconds: u64) -> Result<Self::Output<bool>> {
        self.dispatch(keys::expire(key, seconds))
    }

    /// Remove the time to live from `key`
    fn persist(&mut self, key: &str) -> Result<Self::Output<bool>> {
        self.dispatch(keys::persist(key))
    }

    /// Remaining seconds to live (-1 without expiry, -2 if missing)
    fn ttl(&mut self, key: &str) -> Result<Self::Output<i64>> {
        self.dispatch(keys::ttl(key))
    }

    /// Number of the given keys that exist
    fn exists(&mut self, names: &[&str]) -> Result<Self::Output<i64>> {
        self.dispatch(keys::exists(names)?)
    }

    /// Delete whole keys; returns how many were removed
    fn del_keys(&mut self, names: &[&str]) -> Result<Self::Output<i64>> {
        self.dispatch(keys::del(names)?)
    }

    fn ping(&mut self) -> Result<Self::Output<String>> {
        self.dispatch(keys::ping())
    }
}

// =============================================================================
// JSON Document Commands
// =============================================================================

/// Path-addressed document operations
///
/// Every `path` argument defaults to the document root when `None`.
pub trait JsonCommands: Dispatch {
    /// Whether `get` sends NOESCAPE
    fn no_escape(&self) -> bool {
        false
    }

    /// Value at `path`; `None` when the key or path does not exist
    fn get(&mut self, key: &str, path: Option<&str>) -> Result<Self::Output<Option<Value>>> {
        let no_escape = self.no_escape();
        let paths: Vec<&str> = path.into_iter().collect();
        self.dispatch(json::get(key, &paths, no_escape))
    }

    /// Values at several paths at once, as an object keyed by path
    fn get_paths(
        &mut self,
        key: &str,
        paths: &[&str],
        no_escape: bool,
    ) -> Result<Self::Output<Option<Value>>> {
        self.dispatch(json::get(key, paths, no_escape))
    }

    /// Value at `path` in each key (one entry per key)
    fn mget(&mut self, keys: &[&str], path: Option<&str>) -> Result<Self::Output<Vec<Option<Value>>>> {
        self.dispatch(json::mget(keys, path)?)
    }

    /// Write `value` at `path`
    ///
    /// Replies `Ok` when written and `Absent` when an NX/XX condition was
    /// not met. With a TTL the write and the expiry are sent as one atomic
    /// unit and the reply is the list of both results.
    fn set<V: Serialize + ?Sized>(
        &mut self,
        key: &str,
        path: Option<&str>,
        value: &V,
        options: SetOptions,
    ) -> Result<Self::Output<JsonReply>> {
        let command = json::set(key, path, value, &options)?;
        match options.expiry() {
            Some(seconds) => self.dispatch_atomic(vec![command, keys::expire(key, seconds)]),
            None => self.dispatch(command),
        }
    }

    /// `set` for a document whose map keys are raw bytes
    fn set_raw(
        &mut self,
        key: &str,
        path: Option<&str>,
        document: RawDocument,
        options: SetOptions,
    ) -> Result<Self::Output<JsonReply>> {
        let value = decode_keys(document)?;
        self.set(key, path, &value, options)
    }

    /// Write several `(key, path, value)` triplets in one command
    fn mset<V: Serialize>(&mut self, triplets: &[(&str, &str, V)]) -> Result<Self::Output<bool>> {
        self.dispatch(json::mset(triplets)?)
    }

    /// Merge `value` into the value at `path` (RFC 7396 merge patch)
    fn merge<V: Serialize + ?Sized>(
        &mut self,
        key: &str,
        path: Option<&str>,
        value: &V,
    ) -> Result<Self::Output<bool>> {
        self.dispatch(json::merge(key, path, value)?)
    }

    /// `merge` for a document whose map keys are raw bytes
    fn merge_raw(
        &mut self,
        key: &str,
        path: Option<&str>,
        document: RawDocument,
    ) -> Result<Self::Output<bool>> {
        let value = decode_keys(document)?;
        self.merge(key, path, &value)
    }

    /// Delete the value at `path` (the whole key at the root)
    fn delete(&mut self, key: &str, path: Option<&str>) -> Result<Self::Output<i64>> {
        self.dispatch(json::delete(key, path))
    }

    /// Alias of `delete`
    fn forget(&mut self, key: &str, path: Option<&str>) -> Result<Self::Output<i64>> {
        self.dispatch(json::forget(key, path))
    }

    /// Empty arrays and objects, zero numbers; returns how many were cleared
    fn clear(&mut self, key: &str, path: Option<&str>) -> Result<Self::Output<i64>> {
        self.dispatch(json::clear(key, path))
    }

    fn arrappend<V: Serialize>(
        &mut self,
        key: &str,
        path: Option<&str>,
        values: &[V],
    ) -> Result<Self::Output<Vec<Option<i64>>>> {
        self.dispatch(json::arrappend(key, path, values)?)
    }

    /// Position of `scalar`, searching `[start, stop)`; -1 when not found
    fn arrindex<V: Serialize + ?Sized>(
        &mut self,
        key: &str,
        path: Option<&str>,
        scalar: &V,
        start: Option<i64>,
        stop: Option<i64>,
    ) -> Result<Self::Output<Vec<Option<i64>>>> {
        self.dispatch(json::arrindex(key, path, scalar, start, stop)?)
    }

    fn arrinsert<V: Serialize>(
        &mut self,
        key: &str,
        path: Option<&str>,
        index: i64,
        values: &[V],
    ) -> Result<Self::Output<Vec<Option<i64>>>> {
        self.dispatch(json::arrinsert(key, path, index, values)?)
    }

    fn arrlen(&mut self, key: &str, path: Option<&str>) -> Result<Self::Output<Vec<Option<i64>>>> {
        self.dispatch(json::arrlen(key, path))
    }

    /// Remove and return the element at `index` (default: the last one)
    fn arrpop(
        &mut self,
        key: &str,
        path: Option<&str>,
        index: Option<i64>,
    ) -> Result<Self::Output<Vec<Option<Value>>>> {
        self.dispatch(json::arrpop(key, path, index))
    }

    /// Keep only `[start, stop]` (inclusive)
    fn arrtrim(
        &mut self,
        key: &str,
        path: Option<&str>,
        start: i64,
        stop: i64,
    ) -> Result<Self::Output<Vec<Option<i64>>>> {
        self.dispatch(json::arrtrim(key, path, start, stop))
    }

    fn type_of(&mut self, key: &str, path: Option<&str>) -> Result<Self::Output<Vec<String>>> {
        self.dispatch(json::type_of(key, path))
    }

    /// The value at `path` in the store's RESP representation
    fn resp(&mut self, key: &str, path: Option<&str>) -> Result<Self::Output<JsonReply>> {
        self.dispatch(json::resp(key, path))
    }

    fn objkeys(
        &mut self,
        key: &str,
        path: Option<&str>,
    ) -> Result<Self::Output<Vec<Option<Vec<String>>>>> {
        self.dispatch(json::objkeys(key, path))
    }

    fn objlen(&mut self, key: &str, path: Option<&str>) -> Result<Self::Output<Vec<Option<i64>>>> {
        self.dispatch(json::objlen(key, path))
    }

    /// Add `number` to the numeric value at `path`; returns the new value
    fn numincrby<N: Serialize + ?Sized>(
        &mut self,
        key: &str,
        path: Option<&str>,
        number: &N,
    ) -> Result<Self::Output<Value>> {
        self.dispatch(json::numincrby(key, path, number)?)
    }

    fn strlen(&mut self, key: &str, path: Option<&str>) -> Result<Self::Output<Vec<Option<i64>>>> {
        self.dispatch(json::strlen(key, path))
    }

    /// Append `value` to the string at `path`; returns the new length
    fn strappend(
        &mut self,
        key: &str,
        path: Option<&str>,
        value: &str,
    ) -> Result<Self::Output<Vec<Option<i64>>>> {
        self.dispatch(json::strappend(key, path, value)?)
    }

    /// Flip the boolean at `path`; returns the new value
    fn toggle(&mut self, key: &str, path: Option<&str>) -> Result<Self::Output<Vec<Option<bool>>>> {
        self.dispatch(json::toggle(key, path))
    }

    /// `MEMORY` (bytes used by the value at `path`) or `HELP`
    fn debug(
        &mut self,
        subcommand: &str,
        key: Option<&str>,
        path: Option<&str>,
    ) -> Result<Self::Output<JsonReply>> {
        self.dispatch(json::debug(subcommand, key, path)?)
    }
}
