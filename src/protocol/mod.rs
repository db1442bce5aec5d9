//! Protocol Module
//!
//! Defines the commands sent to the store and the wire protocol that
//! carries them.
//!
//! ## Wire Format (RESP2)
//!
//! ### Request Format
//! Every command is an array of bulk strings, verb first:
//! ```text
//! *<argc>\r\n
//! $<len>\r\n<verb>\r\n
//! $<len>\r\n<arg>\r\n
//! ...
//! ```
//!
//! ### Reply Types
//! - `+` status line      (e.g. `+OK`)
//! - `-` error line       (e.g. `-ERR Path '.x' does not exist`)
//! - `:` integer          (e.g. `:3`)
//! - `$` bulk string      (`$-1` is nil)
//! - `*` array of replies (`*-1` is a nil array)

mod command;
mod reply;
mod codec;

pub use command::{Command, IntoToken, ReplyKind};
pub use reply::Reply;
pub use codec::{
    encode_command, decode_reply, encode_reply,
    read_reply, write_command, write_reply,
    MAX_BULK_SIZE,
};
