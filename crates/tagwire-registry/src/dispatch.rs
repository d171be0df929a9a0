//! Capability-driven decoding.
//!
//! A [`Dispatcher`] sits on a sealed, shared [`InterfaceRegistry`] and
//! turns `(capability, type_id)` pairs into [`RecordBuilder`] handles. The
//! builder carries both the resolved schema and the registry, so records it
//! decodes can themselves contain capability fields.

use std::sync::Arc;

use tagwire_codec::{decode, unpack_any};
use tagwire_error::Result;
use tagwire_types::{AnyRecord, MessageSchema, Record};

use crate::interface::InterfaceRegistry;

/// Resolves capability implementations into decode-ready handles.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<InterfaceRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over a shared registry.
    #[must_use]
    pub fn new(registry: Arc<InterfaceRegistry>) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<InterfaceRegistry> {
        &self.registry
    }

    /// Resolve `capability`/`type_id` into a builder handle.
    pub fn resolve(&self, capability: &str, type_id: &str) -> Result<RecordBuilder> {
        let schema = self.registry.resolve(capability, type_id)?;
        Ok(RecordBuilder {
            schema,
            registry: Arc::clone(&self.registry),
        })
    }

    /// Decode capability wrapper bytes: unpack the type identifier, resolve
    /// it under `capability`, and decode the payload against the resolved
    /// schema.
    pub fn decode_any(&self, capability: &str, buf: &[u8]) -> Result<AnyRecord> {
        let (type_id, body) = unpack_any(buf)?;
        let builder = self.resolve(capability, &type_id)?;
        let record = builder.decode(&body)?;
        Ok(AnyRecord::new(type_id, record))
    }
}

/// Handle to one resolved implementation: build empty records of it or
/// decode payload bytes against it.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    schema: Arc<MessageSchema>,
    registry: Arc<InterfaceRegistry>,
}

impl RecordBuilder {
    /// The resolved schema.
    #[must_use]
    pub fn schema(&self) -> &Arc<MessageSchema> {
        &self.schema
    }

    /// An empty record of the resolved schema.
    #[must_use]
    pub fn empty(&self) -> Record {
        Record::new(Arc::clone(&self.schema))
    }

    /// Decode `buf` against the resolved schema. Capability fields inside
    /// resolve through the same registry this builder came from.
    pub fn decode(&self, buf: &[u8]) -> Result<Record> {
        decode(&self.schema, buf, self.registry.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use tagwire_codec::{encode, encode_any};
    use tagwire_error::WireError;
    use tagwire_types::{FieldKind, Label, Value};

    use super::*;

    fn base_nft() -> Arc<MessageSchema> {
        MessageSchema::builder("nft.BaseNFT")
            .field(1, "id", Label::Singular, FieldKind::String)
            .field(2, "owner", Label::Singular, FieldKind::String)
            .build()
            .expect("valid schema")
    }

    fn dispatcher() -> Dispatcher {
        let mut registry = InterfaceRegistry::new();
        registry
            .register_implementation("NFT", "/nft.BaseNFT", base_nft())
            .expect("register");
        registry.seal();
        Dispatcher::new(Arc::new(registry))
    }

    #[test]
    fn resolve_yields_working_builder() {
        let dispatcher = dispatcher();
        let builder = dispatcher.resolve("NFT", "/nft.BaseNFT").expect("resolve");
        assert_eq!(builder.schema().name(), "nft.BaseNFT");

        let mut record = builder.empty();
        record.set(1, Value::from("id1")).expect("set");
        let decoded = builder.decode(&encode(&record)).expect("decode");
        assert_eq!(decoded, record);
    }

    #[test]
    fn resolve_unknown_fails() {
        let dispatcher = dispatcher();
        assert!(matches!(
            dispatcher.resolve("NFT", "/nft.Missing"),
            Err(WireError::UnknownImplementation { .. })
        ));
        assert!(matches!(
            dispatcher.resolve("Auth", "/nft.BaseNFT"),
            Err(WireError::UnknownImplementation { .. })
        ));
    }

    #[test]
    fn decode_any_resolves_from_wrapper() {
        let dispatcher = dispatcher();
        let mut record = Record::new(base_nft());
        record.set(1, Value::from("id1")).expect("set");
        record.set(2, Value::from("alice")).expect("set");
        let buf = encode_any(&AnyRecord::new("/nft.BaseNFT", record.clone()));

        let any = dispatcher.decode_any("NFT", &buf).expect("decode");
        assert_eq!(any.type_id, "/nft.BaseNFT");
        assert_eq!(any.record, record);
    }

    #[test]
    fn decode_any_with_unregistered_id_fails() {
        let dispatcher = dispatcher();
        let record = Record::new(base_nft());
        let buf = encode_any(&AnyRecord::new("/nft.Missing", record));
        assert!(matches!(
            dispatcher.decode_any("NFT", &buf),
            Err(WireError::UnknownImplementation { type_id, .. }) if type_id == "/nft.Missing"
        ));
    }
}
