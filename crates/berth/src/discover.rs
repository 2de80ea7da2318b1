//! YAML manifest discovery.
//!
//! `berth discover <dir>` walks a directory tree for service manifests and
//! imports them as catalog records. A manifest is any `.yaml`/`.yml` file
//! whose top-level `kind` is `service`:
//!
//! ```yaml
//! kind: service
//! name: payments
//! description: Charges cards
//! system: billing
//! owner: platform-team
//! lifecycle: production
//! depends_on:
//!   - service: auth
//!     api: token
//! tags: [billing, critical]
//! ```
//!
//! YAML files of other kinds (CI configs and the like) are ignored; files
//! that claim to be manifests but fail to parse produce warnings rather
//! than aborting the scan. System, owner, and dependency references may be
//! given by id or by name; names are resolved against the catalog at import
//! time, and anything unresolvable is stored verbatim for `berth lint` to
//! flag.

use crate::domain::{Api, Dependency, Lifecycle, NewService, Service, ServiceId};
use crate::error::Result;
use crate::relations::{resolve_owner, resolve_service, resolve_system};
use crate::storage::CatalogStorage;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A dependency entry as written in a manifest.
///
/// The target may be a service id or a name; resolution happens at import.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestDependency {
    /// Target service, by id or name
    pub service: String,

    /// API consumed over this edge
    #[serde(default)]
    pub api: Option<String>,

    /// Free-text note on this edge
    #[serde(default)]
    pub description: Option<String>,
}

/// A service manifest parsed from a YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceManifest {
    /// Manifest kind; only `service` is recognized
    pub kind: String,

    /// Service display name
    pub name: String,

    /// What the service does
    #[serde(default)]
    pub description: String,

    /// System reference, by id or name
    #[serde(default)]
    pub system: Option<String>,

    /// Owner reference, by id or name
    #[serde(default)]
    pub owner: Option<String>,

    /// Lifecycle stage
    #[serde(default)]
    pub lifecycle: Option<Lifecycle>,

    /// Dependency edges
    #[serde(default)]
    pub depends_on: Vec<ManifestDependency>,

    /// Exposed APIs
    #[serde(default)]
    pub apis: Vec<Api>,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A file that looked like a manifest but could not be used.
#[derive(Debug, Clone)]
pub struct DiscoverWarning {
    /// The offending file
    pub path: PathBuf,

    /// What went wrong
    pub error: String,
}

impl fmt::Display for DiscoverWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

/// Result of importing a batch of manifests.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Services created, in import order
    pub created: Vec<Service>,

    /// Manifests skipped, with the reason
    pub skipped: Vec<(String, String)>,
}

/// Walk a directory tree and collect service manifests.
///
/// Files are scanned in sorted path order so repeated runs over the same
/// tree import in the same order. Non-YAML files and YAML files without a
/// `kind: service` marker are ignored silently; recognizable manifests
/// with parse or shape problems are reported as warnings.
///
/// # Errors
///
/// Returns an error only if the directory itself cannot be walked.
pub fn scan_manifests(dir: &Path) -> Result<(Vec<ServiceManifest>, Vec<DiscoverWarning>)> {
    let mut manifests = Vec::new();
    let mut warnings = Vec::new();

    let mut entries: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("yaml" | "yml")
            )
        })
        .collect();
    entries.sort();

    for path in entries {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warnings.push(DiscoverWarning {
                    path,
                    error: format!("unreadable: {e}"),
                });
                continue;
            }
        };

        // Cheap pre-check so unrelated YAML (CI configs etc.) stays silent.
        if !is_service_manifest(&content) {
            continue;
        }

        match serde_yaml::from_str::<ServiceManifest>(&content) {
            Ok(manifest) => {
                tracing::debug!(path = %path.display(), name = %manifest.name, "found manifest");
                manifests.push(manifest);
            }
            Err(e) => warnings.push(DiscoverWarning {
                path,
                error: format!("invalid manifest: {e}"),
            }),
        }
    }

    Ok((manifests, warnings))
}

/// Whether a YAML document declares `kind: service` at its top level.
fn is_service_manifest(content: &str) -> bool {
    serde_yaml::from_str::<serde_yaml::Value>(content)
        .ok()
        .and_then(|value| {
            value
                .get("kind")
                .and_then(serde_yaml::Value::as_str)
                .map(|kind| kind.eq_ignore_ascii_case("service"))
        })
        .unwrap_or(false)
}

/// Import scanned manifests into the catalog.
///
/// A manifest whose name matches an existing service (case-insensitively)
/// is skipped rather than duplicated. References are resolved by id or
/// name against the catalog plus the services created earlier in this same
/// batch, so manifests may reference each other; unresolvable references
/// are stored verbatim and left for lint.
///
/// # Errors
///
/// Returns an error if storage rejects a record (e.g. an invalid name).
pub async fn import_manifests(
    storage: &mut dyn CatalogStorage,
    manifests: Vec<ServiceManifest>,
) -> Result<ImportReport> {
    let snapshot = storage.snapshot().await?;
    let mut report = ImportReport::default();

    for manifest in manifests {
        let name_taken = snapshot
            .services
            .iter()
            .map(|s| s.name.as_str())
            .chain(report.created.iter().map(|s| s.name.as_str()))
            .any(|existing| existing.eq_ignore_ascii_case(&manifest.name));

        if name_taken {
            report
                .skipped
                .push((manifest.name, "already in catalog".to_string()));
            continue;
        }

        let system = manifest.system.as_deref().map(|key| {
            resolve_system(&snapshot.systems, key)
                .found()
                .map_or_else(|| key.into(), |s| s.id.clone())
        });
        let owner = manifest.owner.as_deref().map(|key| {
            resolve_owner(&snapshot.owners, key)
                .found()
                .map_or_else(|| key.into(), |o| o.id.clone())
        });

        let depends_on = manifest
            .depends_on
            .iter()
            .map(|dep| Dependency {
                service: resolve_dependency_target(&snapshot.services, &report.created, &dep.service),
                api: dep.api.clone(),
                description: dep.description.clone(),
            })
            .collect();

        let created = storage
            .create_service(NewService {
                name: manifest.name,
                description: manifest.description,
                system,
                owner,
                lifecycle: manifest.lifecycle,
                depends_on,
                apis: manifest.apis,
                tags: manifest.tags,
            })
            .await?;
        report.created.push(created);
    }

    Ok(report)
}

/// Resolve a dependency target against the catalog and this batch's
/// freshly created services, falling back to the raw key.
fn resolve_dependency_target(
    existing: &[Service],
    created: &[Service],
    key: &str,
) -> ServiceId {
    if let Some(service) = resolve_service(existing, key).found() {
        return service.id.clone();
    }
    if let Some(service) = created
        .iter()
        .find(|s| s.id.as_str() == key || s.name.eq_ignore_ascii_case(key))
    {
        return service.id.clone();
    }
    ServiceId::new(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::in_memory::new_in_memory_storage;
    use tempfile::TempDir;

    fn write_file(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn scan_finds_manifests_and_ignores_other_yaml() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "services/payments.yaml",
            "kind: service\nname: payments\nlifecycle: production\n",
        );
        write_file(dir.path(), "ci.yml", "jobs:\n  build:\n    steps: []\n");
        write_file(dir.path(), "notes.txt", "kind: service\nname: nope\n");

        let (manifests, warnings) = scan_manifests(dir.path()).unwrap();

        assert_eq!(manifests.len(), 1);
        assert_eq!(manifests[0].name, "payments");
        assert_eq!(manifests[0].lifecycle, Some(Lifecycle::Production));
        assert!(warnings.is_empty(), "got: {warnings:?}");
    }

    #[test]
    fn broken_manifest_is_a_warning_not_a_failure() {
        let dir = TempDir::new().unwrap();
        // Declares kind: service but the lifecycle value is not valid.
        write_file(
            dir.path(),
            "bad.yaml",
            "kind: service\nname: broken\nlifecycle: sideways\n",
        );
        write_file(dir.path(), "good.yaml", "kind: service\nname: fine\n");

        let (manifests, warnings) = scan_manifests(dir.path()).unwrap();

        assert_eq!(manifests.len(), 1);
        assert_eq!(manifests[0].name, "fine");
        assert_eq!(warnings.len(), 1);
        assert!(
            warnings[0].to_string().contains("bad.yaml"),
            "got: {}",
            warnings[0]
        );
    }

    #[test]
    fn scan_order_is_stable() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "b.yaml", "kind: service\nname: bravo\n");
        write_file(dir.path(), "a.yaml", "kind: service\nname: alpha\n");

        let (manifests, _) = scan_manifests(dir.path()).unwrap();
        let names: Vec<&str> = manifests.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "bravo"]);
    }

    #[tokio::test]
    async fn import_skips_existing_names_case_insensitively() {
        let mut storage = new_in_memory_storage();
        storage
            .create_service(NewService {
                name: "Payments".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let manifests = vec![
            ServiceManifest {
                kind: "service".to_string(),
                name: "payments".to_string(),
                description: String::new(),
                system: None,
                owner: None,
                lifecycle: None,
                depends_on: vec![],
                apis: vec![],
                tags: vec![],
            },
            ServiceManifest {
                kind: "service".to_string(),
                name: "auth".to_string(),
                description: String::new(),
                system: None,
                owner: None,
                lifecycle: None,
                depends_on: vec![],
                apis: vec![],
                tags: vec![],
            },
        ];

        let report = import_manifests(storage.as_mut(), manifests).await.unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].name, "auth");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "payments");
    }

    #[tokio::test]
    async fn import_resolves_dependency_names_within_the_batch() {
        let mut storage = new_in_memory_storage();

        let manifests = vec![
            ServiceManifest {
                kind: "service".to_string(),
                name: "auth".to_string(),
                description: String::new(),
                system: None,
                owner: None,
                lifecycle: None,
                depends_on: vec![],
                apis: vec![],
                tags: vec![],
            },
            ServiceManifest {
                kind: "service".to_string(),
                name: "gateway".to_string(),
                description: String::new(),
                system: None,
                owner: None,
                lifecycle: None,
                depends_on: vec![
                    ManifestDependency {
                        service: "auth".to_string(),
                        api: Some("token".to_string()),
                        description: None,
                    },
                    ManifestDependency {
                        service: "not-yet-known".to_string(),
                        api: None,
                        description: None,
                    },
                ],
                apis: vec![],
                tags: vec![],
            },
        ];

        let report = import_manifests(storage.as_mut(), manifests).await.unwrap();
        assert_eq!(report.created.len(), 2);

        let gateway = &report.created[1];
        let auth_id = report.created[0].id.clone();
        assert_eq!(
            gateway.depends_on[0].service, auth_id,
            "batch-local names must resolve to the created id"
        );
        assert_eq!(
            gateway.depends_on[1].service.as_str(),
            "not-yet-known",
            "unresolvable targets are stored verbatim for lint"
        );
    }
}
