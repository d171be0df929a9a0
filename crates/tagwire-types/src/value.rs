//! Owned field values held by a [`Record`].

use std::fmt;

use crate::record::Record;

/// An owned value for a single field occurrence.
///
/// Every variant corresponds to exactly one [`FieldKind`](crate::FieldKind)
/// and one framing wire type. There are no floating-point variants, so
/// `Value` is fully `Eq` and round-trip assertions compare exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Unsigned 64-bit integer, varint framed.
    Uint64(u64),
    /// Signed 64-bit integer, zigzag varint framed.
    Sint64(i64),
    /// Boolean, varint framed as 0 or 1.
    Bool(bool),
    /// Unsigned 64-bit integer, eight little-endian bytes.
    Fixed64(u64),
    /// Unsigned 32-bit integer, four little-endian bytes.
    Fixed32(u32),
    /// UTF-8 string, length-delimited.
    Str(String),
    /// Raw bytes, length-delimited.
    Bytes(Vec<u8>),
    /// Nested record, length-delimited.
    Record(Record),
    /// Abstract-capability payload: identifier plus concrete record.
    Any(AnyRecord),
}

/// An abstract-capability value: the registered type identifier together
/// with the concrete record it decoded into (or will encode from).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyRecord {
    /// Identifier the concrete type is registered under.
    pub type_id: String,
    /// The concrete record.
    pub record: Record,
}

impl AnyRecord {
    /// Pair a type identifier with a concrete record.
    pub fn new(type_id: impl Into<String>, record: Record) -> Self {
        Self {
            type_id: type_id.into(),
            record,
        }
    }
}

/// Discriminant of a [`Value`], used in diagnostics and kind checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Uint64,
    Sint64,
    Bool,
    Fixed64,
    Fixed32,
    Str,
    Bytes,
    Record,
    Any,
}

impl ValueKind {
    /// Lowercase name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uint64 => "uint64",
            Self::Sint64 => "sint64",
            Self::Bool => "bool",
            Self::Fixed64 => "fixed64",
            Self::Fixed32 => "fixed32",
            Self::Str => "string",
            Self::Bytes => "bytes",
            Self::Record => "message",
            Self::Any => "capability",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// The kind of this value.
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Uint64(_) => ValueKind::Uint64,
            Self::Sint64(_) => ValueKind::Sint64,
            Self::Bool(_) => ValueKind::Bool,
            Self::Fixed64(_) => ValueKind::Fixed64,
            Self::Fixed32(_) => ValueKind::Fixed32,
            Self::Str(_) => ValueKind::Str,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::Record(_) => ValueKind::Record,
            Self::Any(_) => ValueKind::Any,
        }
    }

    /// Diagnostic description: the kind name, with message values naming
    /// their schema.
    pub fn describe(&self) -> String {
        match self {
            Self::Record(record) => format!("message {}", record.schema().name()),
            Self::Any(any) => format!("capability value \"{}\"", any.type_id),
            other => other.kind().name().to_owned(),
        }
    }

    /// Get the unsigned integer value, if this is a `Uint64`.
    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Uint64(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the signed integer value, if this is a `Sint64`.
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Sint64(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the boolean value, if this is a `Bool`.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the fixed-width 64-bit value, if this is a `Fixed64`.
    pub const fn as_fixed64(&self) -> Option<u64> {
        match self {
            Self::Fixed64(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the fixed-width 32-bit value, if this is a `Fixed32`.
    pub const fn as_fixed32(&self) -> Option<u32> {
        match self {
            Self::Fixed32(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the string value, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the raw bytes, if this is a `Bytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Get the nested record, if this is a `Record`.
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Get the capability payload, if this is an `Any`.
    pub const fn as_any(&self) -> Option<&AnyRecord> {
        match self {
            Self::Any(a) => Some(a),
            _ => None,
        }
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::Uint64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_discrimination() {
        assert_eq!(Value::Uint64(7).kind(), ValueKind::Uint64);
        assert_eq!(Value::Sint64(-7).kind(), ValueKind::Sint64);
        assert_eq!(Value::Bool(true).kind(), ValueKind::Bool);
        assert_eq!(Value::Fixed64(7).kind(), ValueKind::Fixed64);
        assert_eq!(Value::Fixed32(7).kind(), ValueKind::Fixed32);
        assert_eq!(Value::Str("x".to_owned()).kind(), ValueKind::Str);
        assert_eq!(Value::Bytes(vec![1]).kind(), ValueKind::Bytes);
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::Uint64(300).as_u64(), Some(300));
        assert_eq!(Value::Uint64(300).as_i64(), None);
        assert_eq!(Value::Sint64(-5).as_i64(), Some(-5));
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Fixed64(9).as_fixed64(), Some(9));
        assert_eq!(Value::Fixed32(9).as_fixed32(), Some(9));
        assert_eq!(Value::from("addr1").as_str(), Some("addr1"));
        assert_eq!(Value::from(vec![0xCA, 0xFE]).as_bytes(), Some(&[0xCA, 0xFE][..]));
        assert_eq!(Value::from("addr1").as_bytes(), None);
    }

    #[test]
    fn kind_names() {
        assert_eq!(ValueKind::Uint64.name(), "uint64");
        assert_eq!(ValueKind::Str.name(), "string");
        assert_eq!(ValueKind::Record.name(), "message");
        assert_eq!(ValueKind::Any.name(), "capability");
        assert_eq!(ValueKind::Bool.to_string(), "bool");
    }

    #[test]
    fn from_conversions() {
        assert_eq!(Value::from(42_u64), Value::Uint64(42));
        assert_eq!(Value::from(false), Value::Bool(false));
        assert_eq!(Value::from("s".to_owned()), Value::Str("s".to_owned()));
    }
}
