//! Capability implementation registry.
//!
//! A capability is an abstract slot a schema field can declare; the
//! registry binds each capability name to the concrete message schemas
//! implementing it, keyed by type identifier. Registration happens once at
//! startup with `&mut self`, then the registry is sealed and shared behind
//! an `Arc`, so lookups never take a lock.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use tagwire_codec::SchemaResolver;
use tagwire_error::{Result, WireError};
use tagwire_types::MessageSchema;

/// Registry binding capability names to their implementations.
#[derive(Debug, Default)]
pub struct InterfaceRegistry {
    capabilities: HashMap<String, HashMap<String, Arc<MessageSchema>>>,
    sealed: bool,
}

impl InterfaceRegistry {
    /// Create an empty, unsealed registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `schema` as the implementation of `capability` under
    /// `type_id`. The capability is created on first use.
    ///
    /// Fails with [`WireError::RegistrySealed`] after [`seal`](Self::seal),
    /// and with [`WireError::DuplicateRegistration`] if the
    /// `(capability, type_id)` pair is already bound, identical schema or
    /// not.
    pub fn register_implementation(
        &mut self,
        capability: impl Into<String>,
        type_id: impl Into<String>,
        schema: Arc<MessageSchema>,
    ) -> Result<()> {
        if self.sealed {
            return Err(WireError::RegistrySealed);
        }
        let capability = capability.into();
        let type_id = type_id.into();
        let implementations = self.capabilities.entry(capability.clone()).or_default();
        match implementations.entry(type_id) {
            Entry::Occupied(slot) => Err(WireError::duplicate(format!(
                "{capability}/{id}",
                id = slot.key()
            ))),
            Entry::Vacant(slot) => {
                debug!(
                    capability = %capability,
                    type_id = %slot.key(),
                    schema = %schema.name(),
                    "implementation registered"
                );
                slot.insert(schema);
                Ok(())
            }
        }
    }

    /// Seal the registry. Further registration fails; lookups are
    /// unaffected.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Whether [`seal`](Self::seal) has been called.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Look up the implementation of `capability` registered under
    /// `type_id`.
    pub fn resolve(&self, capability: &str, type_id: &str) -> Result<Arc<MessageSchema>> {
        let found = self
            .capabilities
            .get(capability)
            .and_then(|implementations| implementations.get(type_id));
        debug!(
            capability = %capability,
            type_id = %type_id,
            hit = found.is_some(),
            "capability lookup"
        );
        found
            .map(Arc::clone)
            .ok_or_else(|| WireError::unknown_implementation(capability, type_id))
    }

    /// All capability names, sorted.
    #[must_use]
    pub fn capabilities(&self) -> Vec<String> {
        let mut names: Vec<String> = self.capabilities.keys().cloned().collect();
        names.sort();
        names
    }

    /// All type identifiers registered under `capability`, sorted. Empty
    /// for an unknown capability.
    #[must_use]
    pub fn implementations(&self, capability: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .capabilities
            .get(capability)
            .map(|implementations| implementations.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }
}

impl SchemaResolver for InterfaceRegistry {
    fn resolve_schema(&self, capability: &str, type_id: &str) -> Result<Arc<MessageSchema>> {
        self.resolve(capability, type_id)
    }
}
