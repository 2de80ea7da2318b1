//! Domain types for the service catalog.
//!
//! This module contains the core record types berth tracks: services,
//! systems, and owners, plus the parameter structs used to create, update,
//! and filter them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for entity names.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length for free-form descriptions.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Unique identifier for a service
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServiceId(pub String);

/// Unique identifier for a system
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SystemId(pub String);

/// Unique identifier for an owner
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

macro_rules! impl_id {
    ($name:ident) => {
        impl $name {
            /// Create a new id from anything string-like
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// View the id as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

impl_id!(ServiceId);
impl_id!(SystemId);
impl_id!(OwnerId);

/// The kind of catalog entity a value refers to.
///
/// Used by lint findings and search hits to say which record collection an
/// entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A deployable unit of software
    Service,

    /// A named grouping of related services
    System,

    /// A team or person referenced by services and systems
    Owner,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Service => write!(f, "service"),
            EntityKind::System => write!(f, "system"),
            EntityKind::Owner => write!(f, "owner"),
        }
    }
}

/// Lifecycle stage of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// Early development, no stability promises
    Experimental,

    /// Serving real traffic
    Production,

    /// Still running but scheduled for replacement
    Deprecated,

    /// Shut down, kept for record only
    Decommissioned,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Experimental => write!(f, "experimental"),
            Lifecycle::Production => write!(f, "production"),
            Lifecycle::Deprecated => write!(f, "deprecated"),
            Lifecycle::Decommissioned => write!(f, "decommissioned"),
        }
    }
}

/// A directed dependency edge from one service to another.
///
/// The target is a reference, not an ownership relation: it may point at the
/// declaring service itself or at an id with no matching record. Both are
/// valid stored states that `berth lint` surfaces.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dependency {
    /// Target service id
    pub service: ServiceId,

    /// Name of the exposed API being consumed, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,

    /// Free-text note about the relationship
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An API a service exposes to its consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Api {
    /// API name, referenced by dependents' `api` annotations
    pub name: String,

    /// What the API provides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A deployable unit of software tracked in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Unique identifier, immutable after creation
    pub id: ServiceId,

    /// Display name, mutable and not guaranteed unique
    pub name: String,

    /// What the service does
    #[serde(default)]
    pub description: String,

    /// System this service belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemId>,

    /// Owning team or person
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerId>,

    /// Lifecycle stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<Lifecycle>,

    /// Services this service depends on, in declaration order
    #[serde(default)]
    pub depends_on: Vec<Dependency>,

    /// APIs this service exposes
    #[serde(default)]
    pub apis: Vec<Api>,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// Validate record invariants that serde cannot enforce.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message if the name or description violates
    /// the catalog's constraints.
    pub fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_description(&self.description)?;
        for api in &self.apis {
            if api.name.trim().is_empty() {
                return Err("API name cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

/// A named grouping of related services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct System {
    /// Unique identifier
    pub id: SystemId,

    /// Display name
    pub name: String,

    /// What the system encompasses
    #[serde(default)]
    pub description: String,

    /// Owning team or person
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerId>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl System {
    /// Validate record invariants that serde cannot enforce.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message if the name or description violates
    /// the catalog's constraints.
    pub fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_description(&self.description)
    }
}

/// A team or person associated with services and systems
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    /// Unique identifier
    pub id: OwnerId,

    /// Display name
    pub name: String,

    /// Contact or role information
    #[serde(default)]
    pub description: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Owner {
    /// Validate record invariants that serde cannot enforce.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message if the name or description violates
    /// the catalog's constraints.
    pub fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)?;
        validate_description(&self.description)
    }
}

/// Data for creating a new service
#[derive(Debug, Clone, Default)]
pub struct NewService {
    /// Display name
    pub name: String,

    /// What the service does
    pub description: String,

    /// System reference, already resolved to an id
    pub system: Option<SystemId>,

    /// Owner reference, already resolved to an id
    pub owner: Option<OwnerId>,

    /// Lifecycle stage
    pub lifecycle: Option<Lifecycle>,

    /// Initial dependency edges
    pub depends_on: Vec<Dependency>,

    /// Exposed APIs
    pub apis: Vec<Api>,

    /// Free-form tags
    pub tags: Vec<String>,
}

/// Data for updating an existing service.
///
/// Only fields set to `Some` are applied. The double-`Option` fields
/// distinguish "leave unchanged" (`None`) from "set" (`Some(Some(_))`) and
/// "clear" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct ServiceUpdate {
    /// New display name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New system reference (None to leave, Some(None) to clear)
    pub system: Option<Option<SystemId>>,

    /// New owner reference (None to leave, Some(None) to clear)
    pub owner: Option<Option<OwnerId>>,

    /// New lifecycle stage (None to leave, Some(None) to clear)
    pub lifecycle: Option<Option<Lifecycle>>,

    /// Replacement tag set
    pub tags: Option<Vec<String>>,
}

/// Filter for listing services
#[derive(Debug, Clone, Default)]
pub struct ServiceFilter {
    /// Filter by system id
    pub system: Option<SystemId>,

    /// Filter by owner id
    pub owner: Option<OwnerId>,

    /// Filter by lifecycle stage
    pub lifecycle: Option<Lifecycle>,

    /// Filter by tag
    pub tag: Option<String>,

    /// Limit number of results
    pub limit: Option<usize>,
}

/// A full read-only view of the catalog at one point in time.
///
/// Graph and lint queries operate on snapshots rather than live storage:
/// the caller loads everything once, the query recomputes from scratch, and
/// nothing here is ever mutated.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    /// All services
    pub services: Vec<Service>,

    /// All systems
    pub systems: Vec<System>,

    /// All owners
    pub owners: Vec<Owner>,
}

/// Data for creating a new system
#[derive(Debug, Clone, Default)]
pub struct NewSystem {
    /// Display name
    pub name: String,

    /// What the system encompasses
    pub description: String,

    /// Owner reference, already resolved to an id
    pub owner: Option<OwnerId>,
}

/// Data for creating a new owner
#[derive(Debug, Clone, Default)]
pub struct NewOwner {
    /// Display name
    pub name: String,

    /// Contact or role information
    pub description: String,
}

/// Validate an entity display name.
///
/// Names must be non-empty, single-line, at most [`MAX_NAME_LENGTH`]
/// characters, and free of control characters.
///
/// # Errors
///
/// Returns a human-readable message describing the first violation found.
pub fn validate_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(format!(
            "Name cannot exceed {} characters, got {} characters",
            MAX_NAME_LENGTH,
            trimmed.len()
        ));
    }

    if trimmed.contains('\n') || trimmed.contains('\r') {
        return Err("Name cannot contain newline characters".to_string());
    }

    if let Some(pos) = trimmed.chars().position(|c| {
        let code = c as u32;
        (code < 0x20 && code != 0x09) || (0x7F..=0x9F).contains(&code)
    }) {
        return Err(format!(
            "Name contains invalid control character at position {pos}"
        ));
    }

    Ok(())
}

/// Validate a free-form description.
///
/// # Errors
///
/// Returns a human-readable message if the description exceeds
/// [`MAX_DESCRIPTION_LENGTH`].
pub fn validate_description(description: &str) -> Result<(), String> {
    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(format!(
            "Description cannot exceed {} characters, got {} characters",
            MAX_DESCRIPTION_LENGTH,
            description.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(id: &str, name: &str) -> Service {
        Service {
            id: ServiceId::new(id),
            name: name.to_string(),
            description: String::new(),
            system: None,
            owner: None,
            lifecycle: None,
            depends_on: vec![],
            apis: vec![],
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn service_id_display_and_from() {
        let id = ServiceId::new("svc-a3f8");
        assert_eq!(id.to_string(), "svc-a3f8");
        assert_eq!(ServiceId::from("svc-a3f8"), id);
        assert_eq!(ServiceId::from("svc-a3f8".to_string()), id);
    }

    #[test]
    fn lifecycle_serde_is_lowercase() {
        let json = serde_json::to_string(&Lifecycle::Production).unwrap();
        assert_eq!(json, "\"production\"");

        let parsed: Lifecycle = serde_json::from_str("\"deprecated\"").unwrap();
        assert_eq!(parsed, Lifecycle::Deprecated);
    }

    #[test]
    fn dependency_omits_empty_annotations() {
        let dep = Dependency {
            service: ServiceId::new("svc-1"),
            api: None,
            description: None,
        };
        let json = serde_json::to_string(&dep).unwrap();
        assert!(!json.contains("api"), "got: {json}");
        assert!(!json.contains("description"), "got: {json}");
    }

    #[test]
    fn service_roundtrips_through_json() {
        let mut svc = service("svc-1", "payments");
        svc.depends_on.push(Dependency {
            service: ServiceId::new("svc-2"),
            api: Some("charge".to_string()),
            description: None,
        });
        svc.tags.push("billing".to_string());

        let json = serde_json::to_string(&svc).unwrap();
        let parsed: Service = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, svc.id);
        assert_eq!(parsed.depends_on, svc.depends_on);
        assert_eq!(parsed.tags, svc.tags);
    }

    #[test]
    fn service_parses_without_optional_collections() {
        let json = r#"{
            "id": "svc-1",
            "name": "payments",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }"#;
        let parsed: Service = serde_json::from_str(json).unwrap();
        assert!(parsed.depends_on.is_empty());
        assert!(parsed.apis.is_empty());
        assert!(parsed.tags.is_empty());
        assert!(parsed.system.is_none());
    }

    #[test]
    fn validate_name_rejects_empty_and_multiline() {
        assert!(validate_name("payments").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("two\nlines").is_err());
    }

    #[test]
    fn validate_name_rejects_overlong() {
        let long = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(validate_name(&long).is_err());
    }

    #[test]
    fn validate_catches_empty_api_name() {
        let mut svc = service("svc-1", "payments");
        svc.apis.push(Api {
            name: "  ".to_string(),
            description: None,
        });
        assert!(svc.validate().is_err());
    }

    #[test]
    fn entity_kind_display_matches_serde() {
        assert_eq!(EntityKind::Service.to_string(), "service");
        assert_eq!(
            serde_json::to_string(&EntityKind::System).unwrap(),
            "\"system\""
        );
    }
}
