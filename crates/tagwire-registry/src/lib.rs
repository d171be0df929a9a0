//! Runtime type registries and capability dispatch.
//!
//! Two registries built for a register-then-share lifetime: populate with
//! `&mut self` during startup, [`seal`](InterfaceRegistry::seal), then hand
//! out `Arc` clones for lock-free concurrent reads.
//!
//! [`InterfaceRegistry`] maps `(capability, type identifier)` pairs to
//! concrete schemas and plugs into the codec as its
//! [`SchemaResolver`](tagwire_codec::SchemaResolver). [`Dispatcher`] wraps
//! a sealed registry and decodes capability payloads end to end.
//! [`LegacyRegistry`] binds human-readable legacy names to types, one name
//! per type, and keys the self-describing sign-doc form
//! ([`to_sign_doc`] / [`from_sign_doc`]).

pub mod dispatch;
pub mod interface;
pub mod legacy;
pub mod sign_doc;

pub use dispatch::{Dispatcher, RecordBuilder};
pub use interface::InterfaceRegistry;
pub use legacy::LegacyRegistry;
pub use sign_doc::{from_sign_doc, to_sign_doc};
