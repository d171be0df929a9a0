use thiserror::Error;

/// Primary error type for tagwire operations.
///
/// Structured variants carry enough context to point at the offending
/// field, identifier, or document fragment without re-parsing the input.
/// Wire-decode errors are terminal: the decoder stops at the first
/// malformed byte and never guesses.
#[derive(Error, Debug)]
pub enum WireError {
    // === Wire decode errors ===
    /// A varint ran past the 10-byte limit for a 64-bit value.
    #[error("varint overflow: continuation past 10 bytes")]
    VarintOverflow,

    /// The buffer ended in the middle of a value.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// A length prefix promised more bytes than the buffer holds.
    #[error("truncated value: need {needed} bytes, {remaining} remain")]
    Truncated { needed: u64, remaining: usize },

    /// A tag with wire type 6 or 7, field number zero, or a field number
    /// above the packing limit.
    #[error("invalid tag: 0x{raw:x}")]
    InvalidTag { raw: u64 },

    /// A length prefix whose value overflows the signed 64-bit range.
    #[error("length prefix {length} overflows the signed range")]
    NegativeLength { length: u64 },

    /// An end-group marker with no matching start-group.
    #[error("unmatched end-group marker")]
    UnmatchedEndGroup,

    /// The stream's wire type disagrees with the schema's declared kind.
    #[error("wire type mismatch on field {field}: expected {expected}, found {found}")]
    WireTypeMismatch {
        field: u32,
        expected: &'static str,
        found: &'static str,
    },

    /// A string field holding bytes that are not valid UTF-8.
    #[error("field {field} contains invalid UTF-8")]
    InvalidUtf8 { field: u32 },

    /// Nested messages deeper than the decode limit.
    #[error("message nesting exceeds depth limit {limit}")]
    RecursionLimitExceeded { limit: usize },

    /// A decode failure tagged with the field number it occurred under.
    #[error("field {field}: {source}")]
    InField {
        field: u32,
        #[source]
        source: Box<WireError>,
    },

    // === Schema errors ===
    /// Field number zero or above the 2^29 - 1 packing limit.
    #[error("invalid field number: {number}")]
    InvalidFieldNumber { number: u32 },

    /// Two descriptors in one schema sharing a field number.
    #[error("duplicate field number: {number}")]
    DuplicateFieldNumber { number: u32 },

    /// Two descriptors in one schema sharing a field name.
    #[error("duplicate field name: {name}")]
    DuplicateFieldName { name: String },

    /// A schema built with an empty type name.
    #[error("schema name is empty")]
    EmptySchemaName,

    // === Record errors ===
    /// A field number the record's schema does not declare.
    #[error("message {message} has no field {number}")]
    UnknownField { message: String, number: u32 },

    /// A value whose kind does not match the field's declared kind.
    #[error("kind mismatch for field {field}: expected {expected}, got {found}")]
    KindMismatch {
        field: String,
        expected: String,
        found: String,
    },

    /// `set` called on a repeated field.
    #[error("field {field} is repeated, not singular")]
    NotSingular { field: String },

    /// `push` called on a singular field.
    #[error("field {field} is singular, not repeated")]
    NotRepeated { field: String },

    // === Registry errors ===
    /// A name or identifier that is already bound.
    #[error("duplicate registration: {key}")]
    DuplicateRegistration { key: String },

    /// Registration attempted after `seal()`.
    #[error("registry is sealed")]
    RegistrySealed,

    /// No implementation of a capability under the given identifier.
    #[error("no implementation of {capability} registered under \"{type_id}\"")]
    UnknownImplementation { capability: String, type_id: String },

    /// A legacy name with no registered type.
    #[error("no type registered under name \"{name}\"")]
    UnregisteredName { name: String },

    /// A type that was never bound to a legacy name.
    #[error("type {type_name} has no registered name")]
    UnregisteredType { type_name: String },

    // === Document errors ===
    /// A sign doc that does not follow the tagged `{"type", "value"}` shape.
    #[error("malformed sign doc: {detail}")]
    MalformedDocument { detail: String },
}

/// Coarse classification of a [`WireError`], for callers that route
/// malformed-input failures differently from registration bugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Malformed or truncated wire input.
    Wire,
    /// Invalid schema construction.
    Schema,
    /// Record mutation that violates the schema.
    Record,
    /// Registration or resolution failure.
    Registry,
    /// Malformed self-describing document.
    Document,
}

impl WireError {
    /// Classify this error.
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::VarintOverflow
            | Self::UnexpectedEnd
            | Self::Truncated { .. }
            | Self::InvalidTag { .. }
            | Self::NegativeLength { .. }
            | Self::UnmatchedEndGroup
            | Self::WireTypeMismatch { .. }
            | Self::InvalidUtf8 { .. }
            | Self::RecursionLimitExceeded { .. }
            | Self::InField { .. } => ErrorClass::Wire,
            Self::InvalidFieldNumber { .. }
            | Self::DuplicateFieldNumber { .. }
            | Self::DuplicateFieldName { .. }
            | Self::EmptySchemaName => ErrorClass::Schema,
            Self::UnknownField { .. }
            | Self::KindMismatch { .. }
            | Self::NotSingular { .. }
            | Self::NotRepeated { .. } => ErrorClass::Record,
            Self::DuplicateRegistration { .. }
            | Self::RegistrySealed
            | Self::UnknownImplementation { .. }
            | Self::UnregisteredName { .. }
            | Self::UnregisteredType { .. } => ErrorClass::Registry,
            Self::MalformedDocument { .. } => ErrorClass::Document,
        }
    }

    /// The field number this error is tagged with, if any.
    pub const fn field(&self) -> Option<u32> {
        match self {
            Self::InField { field, .. }
            | Self::WireTypeMismatch { field, .. }
            | Self::InvalidUtf8 { field } => Some(*field),
            _ => None,
        }
    }

    /// Whether this error means the input bytes themselves are bad, as
    /// opposed to a misuse of the API or registry.
    pub const fn is_malformed_input(&self) -> bool {
        matches!(self.class(), ErrorClass::Wire | ErrorClass::Document)
    }

    /// Tag an error with the field number it occurred under. Errors that
    /// already carry a field keep their original one, so nested decode
    /// failures point at the innermost offending field.
    #[must_use]
    pub fn at_field(self, field: u32) -> Self {
        if self.field().is_some() {
            return self;
        }
        Self::InField {
            field,
            source: Box::new(self),
        }
    }

    /// Create a duplicate-registration error.
    pub fn duplicate(key: impl Into<String>) -> Self {
        Self::DuplicateRegistration { key: key.into() }
    }

    /// Create an unknown-implementation error.
    pub fn unknown_implementation(
        capability: impl Into<String>,
        type_id: impl Into<String>,
    ) -> Self {
        Self::UnknownImplementation {
            capability: capability.into(),
            type_id: type_id.into(),
        }
    }

    /// Create an unknown-field error.
    pub fn unknown_field(message: impl Into<String>, number: u32) -> Self {
        Self::UnknownField {
            message: message.into(),
            number,
        }
    }

    /// Create a malformed-document error.
    pub fn malformed_document(detail: impl Into<String>) -> Self {
        Self::MalformedDocument {
            detail: detail.into(),
        }
    }
}

/// Result type alias using `WireError`.
pub type Result<T> = std::result::Result<T, WireError>;
