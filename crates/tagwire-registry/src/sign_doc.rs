//! Legacy self-describing sign docs.
//!
//! The human-auditable JSON form of a record, keyed by the legacy name
//! registry: `{"type": <legacy name>, "value": {<field name>: ...}}`.
//! Rendering is deterministic so equal records serialize to identical
//! text: 64-bit integers are decimal strings (safe past the double
//! precision JSON consumers assume), `Fixed32` stays a plain number,
//! bytes are lowercase hex, and map keys come out sorted.

use std::sync::Arc;

use serde_json::{Map, json};
use tagwire_error::{Result, WireError};
use tagwire_types::{AnyRecord, FieldDescriptor, FieldKind, Label, MessageSchema, Record, Value};

use crate::legacy::LegacyRegistry;

/// Render a record as a tagged sign doc.
///
/// The record's type and every capability payload inside it must have a
/// registered legacy name; a missing binding fails
/// [`WireError::UnregisteredType`]. Unset fields are omitted.
pub fn to_sign_doc(registry: &LegacyRegistry, record: &Record) -> Result<serde_json::Value> {
    tagged_object(registry, record)
}

/// Parse a tagged sign doc back into a record.
///
/// Strict on shape: the document must be exactly a `{"type", "value"}`
/// object, every key under `"value"` must name a declared field, and every
/// scalar must parse under the declared kind's rendering. Shape violations
/// fail [`WireError::MalformedDocument`]; an unknown `"type"` fails
/// [`WireError::UnregisteredName`]. Capability payloads get their type
/// identifier back from the resolved schema's
/// [`type_url`](MessageSchema::type_url).
pub fn from_sign_doc(registry: &LegacyRegistry, doc: &serde_json::Value) -> Result<Record> {
    let (legacy_name, value) = split_tagged(doc)?;
    let schema = registry
        .lookup_by_name(legacy_name)
        .ok_or_else(|| WireError::UnregisteredName {
            name: legacy_name.to_owned(),
        })?;
    parse_object(registry, &schema, value)
}

fn tagged_object(registry: &LegacyRegistry, record: &Record) -> Result<serde_json::Value> {
    let type_name = record.schema().name();
    let legacy_name = registry
        .lookup_by_type(type_name)
        .ok_or_else(|| WireError::UnregisteredType {
            type_name: type_name.to_owned(),
        })?;
    Ok(json!({
        "type": legacy_name,
        "value": bare_object(registry, record)?,
    }))
}

fn bare_object(registry: &LegacyRegistry, record: &Record) -> Result<serde_json::Value> {
    let mut map = Map::new();
    for (descriptor, values) in record.iter() {
        let rendered = match descriptor.label() {
            Label::Singular => render_value(registry, &values[0])?,
            Label::Repeated => serde_json::Value::Array(
                values
                    .iter()
                    .map(|value| render_value(registry, value))
                    .collect::<Result<_>>()?,
            ),
        };
        map.insert(descriptor.name().to_owned(), rendered);
    }
    Ok(serde_json::Value::Object(map))
}

fn render_value(registry: &LegacyRegistry, value: &Value) -> Result<serde_json::Value> {
    Ok(match value {
        Value::Uint64(v) => json!(v.to_string()),
        Value::Sint64(v) => json!(v.to_string()),
        Value::Bool(b) => json!(b),
        Value::Fixed64(v) => json!(v.to_string()),
        Value::Fixed32(v) => json!(v),
        Value::Str(s) => json!(s),
        Value::Bytes(b) => json!(hex::encode(b)),
        Value::Record(nested) => bare_object(registry, nested)?,
        Value::Any(any) => tagged_object(registry, &any.record)?,
    })
}

fn split_tagged(doc: &serde_json::Value) -> Result<(&str, &serde_json::Value)> {
    let map = doc
        .as_object()
        .ok_or_else(|| WireError::malformed_document("document is not an object"))?;
    if map.len() != 2 {
        return Err(WireError::malformed_document(format!(
            "expected exactly \"type\" and \"value\", got {} keys",
            map.len()
        )));
    }
    let name = map
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| WireError::malformed_document("\"type\" is missing or not a string"))?;
    let value = map
        .get("value")
        .ok_or_else(|| WireError::malformed_document("\"value\" is missing"))?;
    Ok((name, value))
}

fn parse_object(
    registry: &LegacyRegistry,
    schema: &Arc<MessageSchema>,
    value: &serde_json::Value,
) -> Result<Record> {
    let map = value.as_object().ok_or_else(|| {
        WireError::malformed_document(format!("value for {} is not an object", schema.name()))
    })?;

    let mut record = Record::new(Arc::clone(schema));
    for (key, raw) in map {
        let descriptor = schema.field_by_name(key).ok_or_else(|| {
            WireError::malformed_document(format!(
                "{} has no field named \"{key}\"",
                schema.name()
            ))
        })?;
        match descriptor.label() {
            Label::Singular => {
                let parsed = parse_value(registry, descriptor, raw)?;
                record.set(descriptor.number().get(), parsed)?;
            }
            Label::Repeated => {
                let items = raw.as_array().ok_or_else(|| {
                    WireError::malformed_document(format!(
                        "field \"{key}\" is repeated, expected an array"
                    ))
                })?;
                for item in items {
                    let parsed = parse_value(registry, descriptor, item)?;
                    record.push(descriptor.number().get(), parsed)?;
                }
            }
        }
    }
    Ok(record)
}

fn parse_value(
    registry: &LegacyRegistry,
    descriptor: &FieldDescriptor,
    raw: &serde_json::Value,
) -> Result<Value> {
    let name = descriptor.name();
    Ok(match descriptor.kind() {
        FieldKind::Uint64 => Value::Uint64(parse_u64(name, raw)?),
        FieldKind::Sint64 => Value::Sint64(parse_i64(name, raw)?),
        FieldKind::Bool => {
            Value::Bool(raw.as_bool().ok_or_else(|| expected(name, "a bool", raw))?)
        }
        FieldKind::Fixed64 => Value::Fixed64(parse_u64(name, raw)?),
        FieldKind::Fixed32 => {
            let number = raw
                .as_u64()
                .ok_or_else(|| expected(name, "an unsigned number", raw))?;
            let number = u32::try_from(number).map_err(|_| {
                WireError::malformed_document(format!(
                    "field \"{name}\": {number} exceeds the fixed32 range"
                ))
            })?;
            Value::Fixed32(number)
        }
        FieldKind::String => Value::Str(
            raw.as_str()
                .ok_or_else(|| expected(name, "a string", raw))?
                .to_owned(),
        ),
        FieldKind::Bytes => {
            let text = raw
                .as_str()
                .ok_or_else(|| expected(name, "a hex string", raw))?;
            let bytes = hex::decode(text).map_err(|err| {
                WireError::malformed_document(format!("field \"{name}\": {err}"))
            })?;
            Value::Bytes(bytes)
        }
        FieldKind::Message(nested) => Value::Record(parse_object(registry, nested, raw)?),
        FieldKind::Capability(_) => {
            let (legacy_name, inner) = split_tagged(raw)?;
            let schema = registry.lookup_by_name(legacy_name).ok_or_else(|| {
                WireError::UnregisteredName {
                    name: legacy_name.to_owned(),
                }
            })?;
            let record = parse_object(registry, &schema, inner)?;
            Value::Any(AnyRecord::new(schema.type_url(), record))
        }
    })
}

fn parse_u64(name: &str, raw: &serde_json::Value) -> Result<u64> {
    let text = raw
        .as_str()
        .ok_or_else(|| expected(name, "a decimal string", raw))?;
    text.parse().map_err(|_| {
        WireError::malformed_document(format!("field \"{name}\": \"{text}\" is not a decimal u64"))
    })
}

fn parse_i64(name: &str, raw: &serde_json::Value) -> Result<i64> {
    let text = raw
        .as_str()
        .ok_or_else(|| expected(name, "a decimal string", raw))?;
    text.parse().map_err(|_| {
        WireError::malformed_document(format!("field \"{name}\": \"{text}\" is not a decimal i64"))
    })
}

fn expected(name: &str, what: &str, raw: &serde_json::Value) -> WireError {
    WireError::malformed_document(format!("field \"{name}\": expected {what}, got {raw}"))
}
