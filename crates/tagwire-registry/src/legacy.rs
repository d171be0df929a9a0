//! Legacy name registry.
//!
//! Sign docs identify messages by short, human-auditable legacy names
//! rather than canonical type names. The registry binds the two
//! bidirectionally: legacy name to schema for parsing documents, type name
//! to legacy name for rendering them. Both directions enforce uniqueness,
//! so a rendered document always parses back to the schema it came from.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use tagwire_error::{Result, WireError};
use tagwire_types::MessageSchema;

/// Bidirectional legacy-name binding table.
///
/// Same lifecycle as the interface registry: `&mut self` registration at
/// startup, then [`seal`](Self::seal) and share behind an `Arc`.
#[derive(Debug, Default)]
pub struct LegacyRegistry {
    by_name: HashMap<String, Arc<MessageSchema>>,
    by_type: HashMap<String, String>,
    sealed: bool,
}

impl LegacyRegistry {
    /// Create an empty, unsealed registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `legacy_name` to `schema`, in both directions.
    ///
    /// Fails with [`WireError::RegistrySealed`] after [`seal`](Self::seal).
    /// Re-binding an already-used legacy name, or registering a second
    /// legacy name for the same schema type, fails with
    /// [`WireError::DuplicateRegistration`].
    pub fn register_concrete(
        &mut self,
        legacy_name: impl Into<String>,
        schema: Arc<MessageSchema>,
    ) -> Result<()> {
        if self.sealed {
            return Err(WireError::RegistrySealed);
        }
        let legacy_name = legacy_name.into();
        if self.by_name.contains_key(&legacy_name) {
            return Err(WireError::duplicate(legacy_name));
        }
        match self.by_type.entry(schema.name().to_owned()) {
            Entry::Occupied(slot) => Err(WireError::duplicate(slot.key().clone())),
            Entry::Vacant(slot) => {
                debug!(
                    legacy_name = %legacy_name,
                    schema = %schema.name(),
                    "legacy name registered"
                );
                slot.insert(legacy_name.clone());
                self.by_name.insert(legacy_name, schema);
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

    /// The schema bound to `legacy_name`, if any.
    #[must_use]
    pub fn lookup_by_name(&self, legacy_name: &str) -> Option<Arc<MessageSchema>> {
        let found = self.by_name.get(legacy_name);
        debug!(
            legacy_name = %legacy_name,
            hit = found.is_some(),
            "legacy name lookup"
        );
        found.map(Arc::clone)
    }

    /// The legacy name bound to the schema type `type_name`, if any.
    #[must_use]
    pub fn lookup_by_type(&self, type_name: &str) -> Option<&str> {
        self.by_type.get(type_name).map(String::as_str)
    }

    /// All registered legacy names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }
}
