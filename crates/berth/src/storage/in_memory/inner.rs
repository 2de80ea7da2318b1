//! Core in-memory storage data structures.

use crate::domain::EntityKind;
use crate::domain::{Owner, OwnerId, Service, ServiceId, System, SystemId};
use crate::error::{Error, Result};
use crate::id_generation::{IdGenerator, IdGeneratorConfig};
use std::collections::HashMap;

/// Inner storage structure (not thread-safe on its own).
///
/// Wrapped in `Arc<Mutex<_>>` by the public constructor. Each entity kind
/// has its own map; the id generator is shared across kinds so its collision
/// set covers the whole catalog.
pub(crate) struct InMemoryCatalogInner {
    /// Services indexed by id
    pub(super) services: HashMap<ServiceId, Service>,

    /// Systems indexed by id
    pub(super) systems: HashMap<SystemId, System>,

    /// Owners indexed by id
    pub(super) owners: HashMap<OwnerId, Owner>,

    /// ID generator for new records
    pub(super) id_generator: IdGenerator,
}

impl InMemoryCatalogInner {
    /// Create a new empty storage instance
    pub(crate) fn new() -> Self {
        Self {
            services: HashMap::new(),
            systems: HashMap::new(),
            owners: HashMap::new(),
            id_generator: IdGenerator::new(IdGeneratorConfig { catalog_size: 0 }),
        }
    }

    /// Total record count across all kinds.
    pub(super) fn total_records(&self) -> usize {
        self.services.len() + self.systems.len() + self.owners.len()
    }

    /// Recreate the id generator when the catalog crosses a hash-length
    /// threshold.
    ///
    /// Hash length changes at 500 and 1500 records, so the O(n)
    /// re-registration only happens at those boundaries rather than on
    /// every create.
    pub(super) fn refresh_id_generator_if_needed(&mut self) {
        let current_size = self.total_records();
        let old_size = self.id_generator.catalog_size();

        let needs_update = match (old_size, current_size) {
            (0..=500, 501..) => true,
            (0..=1500, 1501..) => true,
            (501.., 0..=500) => true,
            (1501.., 0..=1500) => true,
            _ => false,
        };

        if needs_update {
            self.id_generator = IdGenerator::new(IdGeneratorConfig {
                catalog_size: current_size,
            });

            for id in self.services.keys() {
                self.id_generator.register_id(id.as_str().to_string());
            }
            for id in self.systems.keys() {
                self.id_generator.register_id(id.as_str().to_string());
            }
            for id in self.owners.keys() {
                self.id_generator.register_id(id.as_str().to_string());
            }
        }
    }

    /// Generate a new unique id for a record of the given kind
    pub(super) fn generate_id(
        &mut self,
        kind: EntityKind,
        name: &str,
        description: &str,
    ) -> Result<String> {
        self.refresh_id_generator_if_needed();

        self.id_generator
            .generate(kind, name, description)
            .map_err(|e| Error::Storage(format!("ID generation failed: {e}")))
    }
}
