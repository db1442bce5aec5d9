//! Value codec
//!
//! JSON text encoding for command payloads and decoding for replies.

use serde::ser::{self, Error as _, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{JsonKvError, Result};
use crate::protocol::Reply;
use super::JsonReply;

/// Encode any serializable value as wire JSON text
///
/// Fails with `Encoding` for values JSON cannot represent (maps with
/// non-string keys, NaN or infinite floats).
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    // serde_json writes non-finite floats as `null`
    value.serialize(FiniteCheck)?;
    Ok(serde_json::to_string(value)?)
}

/// Parse wire JSON text
pub fn decode_text(bytes: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decode a reply carrying a JSON document
///
/// A nil reply, or an error reply saying the key or path does not exist,
/// decodes to `Absent`. Any other error reply is a `Command` error, and
/// text that is not valid JSON is an `Encoding` error.
pub fn decode(reply: &Reply) -> Result<JsonReply> {
    match reply {
        Reply::Bulk(Some(data)) => Ok(JsonReply::Value(decode_text(data)?)),
        Reply::Bulk(None) | Reply::Array(None) => Ok(JsonReply::Absent),
        Reply::Error(message) if reports_missing(message) => Ok(JsonReply::Absent),
        Reply::Error(message) => Err(JsonKvError::Command(message.clone())),
        other => Err(JsonKvError::Protocol(format!(
            "expected JSON text, got {:?}",
            other
        ))),
    }
}

/// Whether a store error message reports a missing key or path
pub(crate) fn reports_missing(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("does not exist")
        || lower.contains("doesn't exist")
        || lower.contains("no such key")
}

// =============================================================================
// Byte-keyed documents
// =============================================================================

/// A document tree whose map keys are raw bytes
#[derive(Debug, Clone, PartialEq)]
pub enum RawDocument {
    /// Mapping with byte-string keys, in insertion order
    Map(Vec<(Vec<u8>, RawDocument)>),

    /// Sequence of nested documents
    List(Vec<RawDocument>),

    /// Any JSON value (its own object keys are already text)
    Scalar(Value),
}

impl From<Value> for RawDocument {
    fn from(value: Value) -> Self {
        RawDocument::Scalar(value)
    }
}

/// Decode every mapping key as UTF-8 text, recursively
pub fn decode_keys(doc: RawDocument) -> Result<Value> {
    match doc {
        RawDocument::Scalar(value) => Ok(value),
        RawDocument::List(items) => Ok(Value::Array(
            items.into_iter().map(decode_keys).collect::<Result<Vec<_>>>()?,
        )),
        RawDocument::Map(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (key, value) in entries {
                let key = String::from_utf8(key).map_err(|e| {
                    JsonKvError::Encoding(format!(
                        "map key {:?} is not valid UTF-8",
                        String::from_utf8_lossy(e.as_bytes())
                    ))
                })?;
                map.insert(key, decode_keys(value)?);
            }
            Ok(Value::Object(map))
        }
    }
}

// =============================================================================
// Float Check
// =============================================================================

/// Walks a value and fails on the first NaN or infinite float
struct FiniteCheck;

type CheckResult = std::result::Result<(), serde_json::Error>;

fn check_float(value: f64) -> CheckResult {
    if value.is_finite() {
        Ok(())
    } else {
        Err(serde_json::Error::custom(format!(
            "{} cannot be represented in JSON",
            value
        )))
    }
}

impl Serializer for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> CheckResult {
        Ok(())
    }

    fn serialize_i8(self, _: i8) -> CheckResult {
        Ok(())
    }

    fn serialize_i16(self, _: i16) -> CheckResult {
        Ok(())
    }

    fn serialize_i32(self, _: i32) -> CheckResult {
        Ok(())
    }

    fn serialize_i64(self, _: i64) -> CheckResult {
        Ok(())
    }

    fn serialize_u8(self, _: u8) -> CheckResult {
        Ok(())
    }

    fn serialize_u16(self, _: u16) -> CheckResult {
        Ok(())
    }

    fn serialize_u32(self, _: u32) -> CheckResult {
        Ok(())
    }

    fn serialize_u64(self, _: u64) -> CheckResult {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> CheckResult {
        check_float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> CheckResult {
        check_float(v)
    }

    fn serialize_char(self, _: char) -> CheckResult {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> CheckResult {
        Ok(())
    }

    fn serialize_bytes(self, _: &[u8]) -> CheckResult {
        Ok(())
    }

    fn serialize_none(self) -> CheckResult {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> CheckResult {
        value.serialize(self)
    }

    fn serialize_unit(self) -> CheckResult {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> CheckResult {
        Ok(())
    }

    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> CheckResult {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> CheckResult {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> CheckResult {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> CheckResult {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> CheckResult {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> CheckResult {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> CheckResult {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> CheckResult {
        key.serialize(FiniteCheck)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> CheckResult {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _: &'static str, value: &T) -> CheckResult {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteCheck {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, _: &'static str, value: &T) -> CheckResult {
        value.serialize(FiniteCheck)
    }

    fn end(self) -> CheckResult {
        Ok(())
    }
}
