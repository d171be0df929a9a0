//! Well-known single-value wrapper messages.
//!
//! The classic `Uint64Value` / `StringValue` shapes: one field, number 1,
//! named `value`. Useful for carrying a bare scalar where record bytes are
//! expected. The field is always written, zero included, so a wrapped zero
//! survives a roundtrip as a set field; decoding tolerates the field being
//! absent and falls back to the zero value.

use std::sync::{Arc, OnceLock};

use tagwire_error::Result;
use tagwire_types::{FieldKind, Label, MessageSchema, Record, Value};

use crate::decode::{NoResolver, decode};
use crate::encode::encode;

/// Schema of a single `uint64` field named `value` at number 1.
pub fn uint64_schema() -> Arc<MessageSchema> {
    static SCHEMA: OnceLock<Arc<MessageSchema>> = OnceLock::new();
    Arc::clone(SCHEMA.get_or_init(|| {
        MessageSchema::builder("wrappers.Uint64Value")
            .field(1, "value", Label::Singular, FieldKind::Uint64)
            .build()
            .expect("wrapper schema is statically valid")
    }))
}

/// Schema of a single `string` field named `value` at number 1.
pub fn string_schema() -> Arc<MessageSchema> {
    static SCHEMA: OnceLock<Arc<MessageSchema>> = OnceLock::new();
    Arc::clone(SCHEMA.get_or_init(|| {
        MessageSchema::builder("wrappers.StringValue")
            .field(1, "value", Label::Singular, FieldKind::String)
            .build()
            .expect("wrapper schema is statically valid")
    }))
}

/// Encode a bare `u64` as `Uint64Value` bytes.
#[must_use]
pub fn encode_uint64(value: u64) -> Vec<u8> {
    let mut record = Record::new(uint64_schema());
    record
        .set(1, Value::Uint64(value))
        .expect("wrapper field 1 accepts uint64");
    encode(&record)
}

/// Decode `Uint64Value` bytes back to the bare value. A missing field
/// decodes as zero.
pub fn decode_uint64(buf: &[u8]) -> Result<u64> {
    let record = decode(&uint64_schema(), buf, &NoResolver)?;
    Ok(record.get(1).and_then(Value::as_u64).unwrap_or(0))
}

/// Encode a string as `StringValue` bytes.
#[must_use]
pub fn encode_string(value: &str) -> Vec<u8> {
    let mut record = Record::new(string_schema());
    record
        .set(1, Value::from(value))
        .expect("wrapper field 1 accepts strings");
    encode(&record)
}

/// Decode `StringValue` bytes back to the string. A missing field decodes
/// as the empty string.
pub fn decode_string(buf: &[u8]) -> Result<String> {
    let record = decode(&string_schema(), buf, &NoResolver)?;
    Ok(record
        .get(1)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_owned())
}
