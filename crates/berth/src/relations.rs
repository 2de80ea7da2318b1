//! Single-hop relation lookups and id-or-name key resolution.
//!
//! Commands accept either a record id or a display name wherever they take a
//! catalog reference. Resolution is a fixed two-step policy: an exact id
//! match always wins, then a case-insensitive name match is tried, and a
//! name shared by several records is refused rather than guessed. Everything
//! here is a pure linear scan over a snapshot; the catalog is small enough
//! that no index is worth maintaining.

use crate::domain::{CatalogSnapshot, Owner, OwnerId, Service, System, SystemId};

/// Outcome of a two-step id-or-name resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'a, T> {
    /// The key matched exactly one record (by id, or uniquely by name).
    Found(&'a T),

    /// The key matched no id but several records share the name.
    Ambiguous(usize),

    /// Nothing matched. Callers decide what to do with the raw key.
    Unknown,
}

impl<'a, T> Resolved<'a, T> {
    /// The matched record, if the resolution was unique.
    #[must_use]
    pub fn found(self) -> Option<&'a T> {
        match self {
            Resolved::Found(record) => Some(record),
            Resolved::Ambiguous(_) | Resolved::Unknown => None,
        }
    }
}

fn resolve_by_key<'a, T>(
    items: &'a [T],
    key: &str,
    id_of: impl Fn(&T) -> &str,
    name_of: impl Fn(&T) -> &str,
) -> Resolved<'a, T> {
    // Step 1: exact id match always wins.
    if let Some(item) = items.iter().find(|item| id_of(item) == key) {
        return Resolved::Found(item);
    }

    // Step 2: case-insensitive name match, refused when ambiguous.
    let mut matches = items
        .iter()
        .filter(|item| name_of(item).eq_ignore_ascii_case(key));
    match (matches.next(), matches.count()) {
        (Some(item), 0) => Resolved::Found(item),
        (Some(_), rest) => Resolved::Ambiguous(rest + 1),
        (None, _) => Resolved::Unknown,
    }
}

/// Resolve a service by id or case-insensitive name.
#[must_use]
pub fn resolve_service<'a>(services: &'a [Service], key: &str) -> Resolved<'a, Service> {
    resolve_by_key(services, key, |s| s.id.as_str(), |s| s.name.as_str())
}

/// Resolve a system by id or case-insensitive name.
#[must_use]
pub fn resolve_system<'a>(systems: &'a [System], key: &str) -> Resolved<'a, System> {
    resolve_by_key(systems, key, |s| s.id.as_str(), |s| s.name.as_str())
}

/// Resolve an owner by id or case-insensitive name.
#[must_use]
pub fn resolve_owner<'a>(owners: &'a [Owner], key: &str) -> Resolved<'a, Owner> {
    resolve_by_key(owners, key, |o| o.id.as_str(), |o| o.name.as_str())
}

/// The owner record a service references, if it resolves.
#[must_use]
pub fn owner_of<'a>(snapshot: &'a CatalogSnapshot, service: &Service) -> Option<&'a Owner> {
    let owner_id = service.owner.as_ref()?;
    snapshot.owners.iter().find(|o| o.id == *owner_id)
}

/// The system record a service references, if it resolves.
#[must_use]
pub fn system_of<'a>(snapshot: &'a CatalogSnapshot, service: &Service) -> Option<&'a System> {
    let system_id = service.system.as_ref()?;
    snapshot.systems.iter().find(|s| s.id == *system_id)
}

/// The owner record a system references, if it resolves.
#[must_use]
pub fn owner_of_system<'a>(snapshot: &'a CatalogSnapshot, system: &System) -> Option<&'a Owner> {
    let owner_id = system.owner.as_ref()?;
    snapshot.owners.iter().find(|o| o.id == *owner_id)
}

/// All services referencing an owner, in catalog order.
#[must_use]
pub fn services_owned_by<'a>(snapshot: &'a CatalogSnapshot, owner: &OwnerId) -> Vec<&'a Service> {
    snapshot
        .services
        .iter()
        .filter(|s| s.owner.as_ref() == Some(owner))
        .collect()
}

/// All services inside a system, in catalog order.
#[must_use]
pub fn services_in_system<'a>(
    snapshot: &'a CatalogSnapshot,
    system: &SystemId,
) -> Vec<&'a Service> {
    snapshot
        .services
        .iter()
        .filter(|s| s.system.as_ref() == Some(system))
        .collect()
}
