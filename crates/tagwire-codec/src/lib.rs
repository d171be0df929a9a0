//! Wire codec for tagwire records.
//!
//! [`encode`] and [`encoded_size`] turn a schema-validated [`Record`] into
//! bytes with a single exact-size allocation, filled back to front.
//! [`decode`] parses bytes under a schema with unknown-field tolerance and
//! last-wins duplicate handling. [`skip_value`] walks any wire type without
//! a schema, groups included. Capability fields resolve their concrete
//! schema through a [`SchemaResolver`], which keeps the codec free of any
//! registry dependency.
//!
//! [`Record`]: tagwire_types::Record

pub mod any;
pub mod decode;
pub mod encode;
pub mod skip;
pub mod wrappers;

pub use any::{encode_any, pack_any, unpack_any};
pub use decode::{NoResolver, SchemaResolver, decode, read_length_delimited};
pub use encode::{encode, encoded_size};
pub use skip::skip_value;
