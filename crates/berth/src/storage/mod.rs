//! Storage abstraction layer for the catalog.
//!
//! This module provides the core storage trait and the factory for creating
//! storage backends:
//!
//! - **In-memory**: fast, ephemeral storage backed by hash maps
//! - **JSONL**: the in-memory store wrapped with file persistence, one JSON
//!   Lines file per entity kind under the `.berth/` data directory
//!
//! The trait is async and object-safe so commands can hold a
//! `Box<dyn CatalogStorage>` without caring which backend is behind it.
//!
//! # Referential integrity
//!
//! The store deliberately does NOT enforce referential integrity. Dependency
//! edges may target the declaring service itself, ids that do not exist, or
//! form cycles; system and owner references may dangle. All of these are
//! valid stored states: `berth lint` detects them, the store never prevents
//! them. Deleting a record that others reference succeeds and simply leaves
//! those references dangling for lint to report.

use crate::domain::{
    CatalogSnapshot, Dependency, NewOwner, NewService, NewSystem, Owner, OwnerId, Service,
    ServiceFilter, ServiceId, ServiceUpdate, System, SystemId,
};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod in_memory;

/// Name of the services data file
pub const SERVICES_FILE_NAME: &str = "services.jsonl";

/// Name of the systems data file
pub const SYSTEMS_FILE_NAME: &str = "systems.jsonl";

/// Name of the owners data file
pub const OWNERS_FILE_NAME: &str = "owners.jsonl";

/// Core storage trait for catalog records.
///
/// Implementations must be `Send + Sync` to support use behind a trait
/// object in async contexts.
///
/// # Method categories
///
/// - **Service CRUD**: `create_service`, `get_service`, `update_service`,
///   `delete_service`, `list_services`
/// - **System/Owner CRUD**: the same per kind, minus updates (systems and
///   owners are simple named records; re-create to change them)
/// - **Dependency edges**: `add_dependency`, `remove_dependency`
/// - **Snapshots**: `snapshot`, the full read the graph engine and linter
///   consume
/// - **Batch**: `import_services` for discovery imports
/// - **Persistence**: `save`, `reload`
#[async_trait]
pub trait CatalogStorage: Send + Sync {
    // ========== Service CRUD ==========

    /// Create a new service with a generated id and fresh timestamps.
    ///
    /// Implementations must validate the record before storing it.
    async fn create_service(&mut self, service: NewService) -> Result<Service>;

    /// Get a service by id. Returns `None` if it does not exist.
    async fn get_service(&self, id: &ServiceId) -> Result<Option<Service>>;

    /// Update an existing service. Only fields present in `updates` change.
    async fn update_service(&mut self, id: &ServiceId, updates: ServiceUpdate) -> Result<Service>;

    /// Delete a service.
    ///
    /// Other services' dependency edges pointing at the deleted id are left
    /// in place; lint reports them as dangling.
    async fn delete_service(&mut self, id: &ServiceId) -> Result<()>;

    /// List services matching the filter, in stable creation order.
    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<Service>>;

    // ========== System CRUD ==========

    /// Create a new system with a generated id.
    async fn create_system(&mut self, system: NewSystem) -> Result<System>;

    /// Get a system by id. Returns `None` if it does not exist.
    async fn get_system(&self, id: &SystemId) -> Result<Option<System>>;

    /// Delete a system. Services referencing it keep their (now dangling)
    /// reference.
    async fn delete_system(&mut self, id: &SystemId) -> Result<()>;

    /// List all systems in stable creation order.
    async fn list_systems(&self) -> Result<Vec<System>>;

    // ========== Owner CRUD ==========

    /// Create a new owner with a generated id.
    async fn create_owner(&mut self, owner: NewOwner) -> Result<Owner>;

    /// Get an owner by id. Returns `None` if it does not exist.
    async fn get_owner(&self, id: &OwnerId) -> Result<Option<Owner>>;

    /// Delete an owner. Referencing records keep their dangling reference.
    async fn delete_owner(&mut self, id: &OwnerId) -> Result<()>;

    /// List all owners in stable creation order.
    async fn list_owners(&self) -> Result<Vec<Owner>>;

    // ========== Dependency edges ==========

    /// Append a dependency edge to a service.
    ///
    /// The DECLARING service must exist; the TARGET is taken verbatim and
    /// may be unknown, the service itself, or close a cycle. Returns the
    /// updated service.
    async fn add_dependency(&mut self, from: &ServiceId, dep: Dependency) -> Result<Service>;

    /// Remove every dependency edge from one service to a target.
    ///
    /// Returns the updated service, or an error if no such edge existed.
    async fn remove_dependency(&mut self, from: &ServiceId, to: &ServiceId) -> Result<Service>;

    // ========== Snapshots and batch ==========

    /// Export a full read-only snapshot of the catalog, in stable order.
    async fn snapshot(&self) -> Result<CatalogSnapshot>;

    /// Import pre-built service records (discovery, migrations).
    ///
    /// Records are stored verbatim; existing ids are overwritten. Returns
    /// the number of records imported.
    async fn import_services(&mut self, services: Vec<Service>) -> Result<usize>;

    // ========== Persistence ==========

    /// Persist the catalog.
    ///
    /// Takes `&self` so callers can save after read-only queries;
    /// implementations use interior mutability. A no-op for purely
    /// in-memory storage.
    async fn save(&self) -> Result<()>;

    /// Restore in-memory state from persistent storage, discarding unsaved
    /// changes. A no-op for purely in-memory storage.
    async fn reload(&mut self) -> Result<()>;
}

/// File locations for a JSONL-backed catalog.
#[derive(Debug, Clone)]
pub struct CatalogPaths {
    /// Services data file
    pub services: PathBuf,
    /// Systems data file
    pub systems: PathBuf,
    /// Owners data file
    pub owners: PathBuf,
}

impl CatalogPaths {
    /// Standard file layout inside a data directory.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            services: dir.join(SERVICES_FILE_NAME),
            systems: dir.join(SYSTEMS_FILE_NAME),
            owners: dir.join(OWNERS_FILE_NAME),
        }
    }
}

/// Storage backend configuration.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// JSONL file storage (persistent)
    Jsonl(CatalogPaths),
}

/// Wrapper that adds JSONL file persistence to an in-memory store.
///
/// `save()` writes all three record files atomically (each file on its
/// own); `reload()` rebuilds the inner store from disk.
struct JsonlBackedStorage {
    inner: Box<dyn CatalogStorage>,
    paths: CatalogPaths,
}

#[async_trait]
impl CatalogStorage for JsonlBackedStorage {
    async fn create_service(&mut self, service: NewService) -> Result<Service> {
        self.inner.create_service(service).await
    }

    async fn get_service(&self, id: &ServiceId) -> Result<Option<Service>> {
        self.inner.get_service(id).await
    }

    async fn update_service(&mut self, id: &ServiceId, updates: ServiceUpdate) -> Result<Service> {
        self.inner.update_service(id, updates).await
    }

    async fn delete_service(&mut self, id: &ServiceId) -> Result<()> {
        self.inner.delete_service(id).await
    }

    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<Service>> {
        self.inner.list_services(filter).await
    }

    async fn create_system(&mut self, system: NewSystem) -> Result<System> {
        self.inner.create_system(system).await
    }

    async fn get_system(&self, id: &SystemId) -> Result<Option<System>> {
        self.inner.get_system(id).await
    }

    async fn delete_system(&mut self, id: &SystemId) -> Result<()> {
        self.inner.delete_system(id).await
    }

    async fn list_systems(&self) -> Result<Vec<System>> {
        self.inner.list_systems().await
    }

    async fn create_owner(&mut self, owner: NewOwner) -> Result<Owner> {
        self.inner.create_owner(owner).await
    }

    async fn get_owner(&self, id: &OwnerId) -> Result<Option<Owner>> {
        self.inner.get_owner(id).await
    }

    async fn delete_owner(&mut self, id: &OwnerId) -> Result<()> {
        self.inner.delete_owner(id).await
    }

    async fn list_owners(&self) -> Result<Vec<Owner>> {
        self.inner.list_owners().await
    }

    async fn add_dependency(&mut self, from: &ServiceId, dep: Dependency) -> Result<Service> {
        self.inner.add_dependency(from, dep).await
    }

    async fn remove_dependency(&mut self, from: &ServiceId, to: &ServiceId) -> Result<Service> {
        self.inner.remove_dependency(from, to).await
    }

    async fn snapshot(&self) -> Result<CatalogSnapshot> {
        self.inner.snapshot().await
    }

    async fn import_services(&mut self, services: Vec<Service>) -> Result<usize> {
        self.inner.import_services(services).await
    }

    async fn save(&self) -> Result<()> {
        in_memory::save_catalog(self.inner.as_ref(), &self.paths).await
    }

    async fn reload(&mut self) -> Result<()> {
        let (new_storage, warnings) = in_memory::load_catalog(&self.paths).await?;
        for warning in &warnings {
            tracing::warn!(warning = %warning, "catalog reload warning");
        }
        self.inner = new_storage;
        Ok(())
    }
}

/// Create a storage instance for the given backend.
///
/// # Errors
///
/// Returns an error if a JSONL backend's existing files cannot be read.
pub async fn create_storage(backend: StorageBackend) -> Result<Box<dyn CatalogStorage>> {
    match backend {
        StorageBackend::InMemory => Ok(in_memory::new_in_memory_storage()),
        StorageBackend::Jsonl(paths) => {
            let (inner, warnings) = in_memory::load_catalog(&paths).await?;
            for warning in &warnings {
                // Log but continue: the catalog is still usable.
                tracing::warn!(warning = %warning, "catalog load warning");
            }
            Ok(Box::new(JsonlBackedStorage { inner, paths }))
        }
    }
}
