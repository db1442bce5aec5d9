//! Codec Module
//!
//! Converts application values to the JSON text carried in command
//! arguments, and raw store replies back into decoded results.
//!
//! ## Absence
//! A read that finds nothing decodes to [`JsonReply::Absent`], which is
//! distinct from a stored JSON `null` (`JsonReply::Value(Value::Null)`).

mod value;
mod reply;

pub use value::{decode, decode_keys, decode_text, encode, RawDocument};
pub use reply::{decode_reply, FromReply, JsonReply};
