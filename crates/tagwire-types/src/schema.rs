//! Runtime message schemas.
//!
//! A schema names a message type and declares its fields: number, name,
//! cardinality, and kind. Schemas are the decode-side source of truth; the
//! encoder trusts them because records validate every mutation against
//! their schema.

use std::sync::Arc;

use tagwire_error::{Result, WireError};

use crate::value::{Value, ValueKind};
use crate::{FieldNumber, WireType};

/// Field cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// At most one occurrence; later occurrences on the wire overwrite
    /// earlier ones.
    Singular,
    /// An ordered sequence of occurrences.
    Repeated,
}

/// The declared kind of a field's values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Unsigned varint.
    Uint64,
    /// Zigzag-mapped signed varint.
    Sint64,
    /// Varint 0 or 1.
    Bool,
    /// Eight little-endian bytes.
    Fixed64,
    /// Four little-endian bytes.
    Fixed32,
    /// Length-delimited UTF-8.
    String,
    /// Length-delimited raw bytes.
    Bytes,
    /// Length-delimited nested record with a fixed schema.
    Message(Arc<MessageSchema>),
    /// Length-delimited abstract payload, resolved through the named
    /// capability at decode time.
    Capability(String),
}

impl FieldKind {
    /// The wire type framing values of this kind.
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Uint64 | Self::Sint64 | Self::Bool => WireType::Varint,
            Self::Fixed64 => WireType::Fixed64,
            Self::Fixed32 => WireType::Fixed32,
            Self::String | Self::Bytes | Self::Message(_) | Self::Capability(_) => {
                WireType::LengthDelimited
            }
        }
    }

    /// The value kind this field accepts.
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Self::Uint64 => ValueKind::Uint64,
            Self::Sint64 => ValueKind::Sint64,
            Self::Bool => ValueKind::Bool,
            Self::Fixed64 => ValueKind::Fixed64,
            Self::Fixed32 => ValueKind::Fixed32,
            Self::String => ValueKind::Str,
            Self::Bytes => ValueKind::Bytes,
            Self::Message(_) => ValueKind::Record,
            Self::Capability(_) => ValueKind::Any,
        }
    }

    /// Whether a value is acceptable for this kind. Message fields also
    /// require the value's schema to name the declared message type.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Message(schema), Value::Record(record)) => {
                record.schema().name() == schema.name()
            }
            _ => self.value_kind() == value.kind(),
        }
    }

    /// Diagnostic description: the kind name, with message fields naming
    /// their schema and capability fields their capability.
    pub fn describe(&self) -> String {
        match self {
            Self::Message(schema) => format!("message {}", schema.name()),
            Self::Capability(capability) => format!("capability {capability}"),
            other => other.value_kind().name().to_owned(),
        }
    }
}

/// A single field declaration within a [`MessageSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    number: FieldNumber,
    name: String,
    label: Label,
    kind: FieldKind,
}

impl FieldDescriptor {
    /// Create a descriptor.
    pub fn new(number: FieldNumber, name: impl Into<String>, label: Label, kind: FieldKind) -> Self {
        Self {
            number,
            name: name.into(),
            label,
            kind,
        }
    }

    /// The field number.
    #[inline]
    pub const fn number(&self) -> FieldNumber {
        self.number
    }

    /// The field name, used by the self-describing representation.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The cardinality.
    #[inline]
    pub const fn label(&self) -> Label {
        self.label
    }

    /// The declared kind.
    #[inline]
    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether this field is repeated.
    #[inline]
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }
}

/// A message type: a canonical name plus its field declarations, kept
/// sorted by field number for binary-search lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSchema {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl MessageSchema {
    /// Start building a schema with the given canonical type name.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// The canonical type name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The default registry identifier for this type: `"/" + name`.
    pub fn type_url(&self) -> String {
        format!("/{}", self.name)
    }

    /// Look up a field by number.
    pub fn field(&self, number: u32) -> Option<&FieldDescriptor> {
        self.fields
            .binary_search_by_key(&number, |f| f.number().get())
            .ok()
            .map(|i| &self.fields[i])
    }

    /// Look up a field by name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// All fields, sorted by field number.
    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

/// Builder for [`MessageSchema`]. Field declarations are collected as raw
/// numbers and validated together at [`build`](SchemaBuilder::build).
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<(u32, String, Label, FieldKind)>,
}

impl SchemaBuilder {
    /// Declare a field.
    #[must_use]
    pub fn field(mut self, number: u32, name: impl Into<String>, label: Label, kind: FieldKind) -> Self {
        self.fields.push((number, name.into(), label, kind));
        self
    }

    /// Validate the declarations and build the schema.
    ///
    /// Fails with [`WireError::EmptySchemaName`],
    /// [`WireError::InvalidFieldNumber`] (zero or above the packing limit),
    /// [`WireError::DuplicateFieldNumber`], or
    /// [`WireError::DuplicateFieldName`].
    pub fn build(self) -> Result<Arc<MessageSchema>> {
        if self.name.is_empty() {
            return Err(WireError::EmptySchemaName);
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        for (number, name, label, kind) in self.fields {
            let number = FieldNumber::new(number)
                .ok_or(WireError::InvalidFieldNumber { number })?;
            fields.push(FieldDescriptor::new(number, name, label, kind));
        }
        fields.sort_by_key(|f| f.number());

        for pair in fields.windows(2) {
            if pair[0].number() == pair[1].number() {
                return Err(WireError::DuplicateFieldNumber {
                    number: pair[0].number().get(),
                });
            }
        }
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name() == field.name()) {
                return Err(WireError::DuplicateFieldName {
                    name: field.name().to_owned(),
                });
            }
        }

        Ok(Arc::new(MessageSchema {
            name: self.name,
            fields,
        }))
    }
}
