//! Public API facade for tagwire.
//!
//! Re-exports the member crates as one surface: wire primitives, schemas,
//! and records from `tagwire-types`; the codec from `tagwire-codec`; the
//! runtime registries and the sign-doc form from `tagwire-registry`; the
//! error type from `tagwire-error`.

pub use tagwire_codec::wrappers;
pub use tagwire_codec::{
    NoResolver, SchemaResolver, decode, encode, encode_any, encoded_size, pack_any,
    read_length_delimited, skip_value, unpack_any,
};
pub use tagwire_error::{ErrorClass, Result, WireError};
pub use tagwire_registry::{
    Dispatcher, InterfaceRegistry, LegacyRegistry, RecordBuilder, from_sign_doc, to_sign_doc,
};
pub use tagwire_types::limits;
pub use tagwire_types::{
    AnyRecord, FieldDescriptor, FieldKind, FieldNumber, Label, MessageSchema, Record,
    SchemaBuilder, Tag, Value, ValueKind, WireType,
};
