//! Catalog integrity checks.
//!
//! `berth lint` runs a set of independent validation passes over a full
//! catalog snapshot and returns every problem it finds as a structured
//! [`Finding`]. The checker never fails fast: its whole purpose is to
//! surface many simultaneous problems in one pass, so anomalies become data
//! rather than errors. The caller decides what to do with the result: by
//! convention a nonzero error count maps to a failing exit code, warnings
//! never do.
//!
//! Cycle detection here is a true backtracking depth-first search with an
//! ancestor set that grows on entry and shrinks on exit. That is deliberately
//! a different algorithm from the display traversal in [`crate::graph`],
//! which only needs termination and uses a cheaper global visited set. The
//! linter needs precise cycle identification (a diamond must not be reported
//! as a cycle), so the two must not be unified.

use crate::domain::{CatalogSnapshot, EntityKind, Owner, Service, System};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The catalog is inconsistent; the overall check fails
    Error,

    /// Worth fixing, but the check still passes
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Machine-readable identifier for each check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// A service references a system id with no matching record
    OrphanedSystemRef,

    /// A service or system references an owner id with no matching record
    OrphanedOwnerRef,

    /// A service has no owner at all
    MissingOwner,

    /// A dependency targets a service id with no matching record
    DanglingDependency,

    /// Services form a dependency cycle
    CircularDependency,

    /// Multiple records of the same kind share a name
    DuplicateName,

    /// A system has no services in it
    EmptySystem,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckKind::OrphanedSystemRef => "orphaned_system_ref",
            CheckKind::OrphanedOwnerRef => "orphaned_owner_ref",
            CheckKind::MissingOwner => "missing_owner",
            CheckKind::DanglingDependency => "dangling_dependency",
            CheckKind::CircularDependency => "circular_dependency",
            CheckKind::DuplicateName => "duplicate_name",
            CheckKind::EmptySystem => "empty_system",
        };
        write!(f, "{s}")
    }
}

/// One structured integrity-check result.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// Which check produced this finding
    #[serde(rename = "type")]
    pub kind: CheckKind,

    /// Severity of the finding
    pub severity: Severity,

    /// Display name of the offending entity
    pub entity: String,

    /// Which record collection the entity belongs to
    pub entity_kind: EntityKind,

    /// Human-readable explanation
    pub message: String,

    /// Suggested command to fix the problem, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

/// Aggregated result of a full lint run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    /// All findings, in stable check-then-input order
    pub findings: Vec<Finding>,
}

impl LintReport {
    /// Number of error-severity findings.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }

    /// Number of warning-severity findings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count()
    }

    /// Whether the catalog passes: true iff there are no errors.
    /// Warnings alone never fail a check.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.error_count() == 0
    }
}

/// Run every integrity check over a catalog snapshot.
///
/// Checks are independent and composed by concatenation; the order only
/// affects output stability, never correctness.
#[must_use]
pub fn check_catalog(snapshot: &CatalogSnapshot) -> LintReport {
    let mut findings = Vec::new();
    findings.extend(check_system_refs(&snapshot.services, &snapshot.systems));
    findings.extend(check_owner_refs(
        &snapshot.services,
        &snapshot.systems,
        &snapshot.owners,
    ));
    findings.extend(check_missing_owners(&snapshot.services));
    findings.extend(check_dangling_dependencies(&snapshot.services));
    findings.extend(check_circular_dependencies(&snapshot.services));
    findings.extend(check_duplicate_names(
        &snapshot.services,
        &snapshot.systems,
        &snapshot.owners,
    ));
    findings.extend(check_empty_systems(&snapshot.services, &snapshot.systems));
    LintReport { findings }
}

/// Services whose `system` reference points at no known system.
#[must_use]
pub fn check_system_refs(services: &[Service], systems: &[System]) -> Vec<Finding> {
    let known: HashSet<&str> = systems.iter().map(|s| s.id.as_str()).collect();

    services
        .iter()
        .filter_map(|service| {
            let system = service.system.as_ref()?;
            if known.contains(system.as_str()) {
                return None;
            }
            Some(Finding {
                kind: CheckKind::OrphanedSystemRef,
                severity: Severity::Error,
                entity: service.name.clone(),
                entity_kind: EntityKind::Service,
                message: format!(
                    "service '{}' references unknown system '{}'",
                    service.name, system
                ),
                fix: Some(format!(
                    "berth service update {} --system <system>",
                    service.id
                )),
            })
        })
        .collect()
}

/// Services and systems whose `owner` reference points at no known owner.
#[must_use]
pub fn check_owner_refs(
    services: &[Service],
    systems: &[System],
    owners: &[Owner],
) -> Vec<Finding> {
    let known: HashSet<&str> = owners.iter().map(|o| o.id.as_str()).collect();
    let mut findings = Vec::new();

    for service in services {
        if let Some(owner) = &service.owner {
            if !known.contains(owner.as_str()) {
                findings.push(Finding {
                    kind: CheckKind::OrphanedOwnerRef,
                    severity: Severity::Error,
                    entity: service.name.clone(),
                    entity_kind: EntityKind::Service,
                    message: format!(
                        "service '{}' references unknown owner '{}'",
                        service.name, owner
                    ),
                    fix: Some(format!(
                        "berth service update {} --owner <owner>",
                        service.id
                    )),
                });
            }
        }
    }

    for system in systems {
        if let Some(owner) = &system.owner {
            if !known.contains(owner.as_str()) {
                findings.push(Finding {
                    kind: CheckKind::OrphanedOwnerRef,
                    severity: Severity::Error,
                    entity: system.name.clone(),
                    entity_kind: EntityKind::System,
                    message: format!(
                        "system '{}' references unknown owner '{}'",
                        system.name, owner
                    ),
                    fix: None,
                });
            }
        }
    }

    findings
}

/// Services with no owner reference at all.
#[must_use]
pub fn check_missing_owners(services: &[Service]) -> Vec<Finding> {
    services
        .iter()
        .filter(|service| service.owner.is_none())
        .map(|service| Finding {
            kind: CheckKind::MissingOwner,
            severity: Severity::Warning,
            entity: service.name.clone(),
            entity_kind: EntityKind::Service,
            message: format!("service '{}' has no owner", service.name),
            fix: Some(format!(
                "berth service update {} --owner <owner>",
                service.id
            )),
        })
        .collect()
}

/// Dependency edges whose target id has no matching service record.
#[must_use]
pub fn check_dangling_dependencies(services: &[Service]) -> Vec<Finding> {
    let known: HashSet<&str> = services.iter().map(|s| s.id.as_str()).collect();
    let mut findings = Vec::new();

    for service in services {
        for dep in &service.depends_on {
            if !known.contains(dep.service.as_str()) {
                findings.push(Finding {
                    kind: CheckKind::DanglingDependency,
                    severity: Severity::Error,
                    entity: service.name.clone(),
                    entity_kind: EntityKind::Service,
                    message: format!(
                        "service '{}' depends on unknown service '{}'",
                        service.name, dep.service
                    ),
                    fix: Some(format!("berth deps rm {} {}", service.id, dep.service)),
                });
            }
        }
    }

    findings
}

/// Dependency cycles, including self-dependencies.
///
/// For each origin service the walk descends its dependencies carrying an
/// ancestor set that starts as `{origin}`, grows on entry, and shrinks on
/// exit. An edge pointing back into the current ancestor chain confirms a
/// cycle. The same cycle is discoverable from several origins and directions,
/// so findings are deduplicated by the sorted pair of (origin id, id of the
/// node whose edge closed the cycle). The contract is detect-and-surface,
/// not an enumeration of every edge of every cycle.
#[must_use]
pub fn check_circular_dependencies(services: &[Service]) -> Vec<Finding> {
    let index: HashMap<&str, &Service> = services
        .iter()
        .map(|service| (service.id.as_str(), service))
        .collect();

    let mut reported: HashSet<(String, String)> = HashSet::new();
    let mut findings = Vec::new();

    for origin in services {
        let mut ancestors: HashSet<String> = HashSet::new();
        ancestors.insert(origin.id.as_str().to_string());
        visit_for_cycles(
            origin,
            origin,
            &index,
            &mut ancestors,
            &mut reported,
            &mut findings,
        );
    }

    findings
}

/// DFS worker for [`check_circular_dependencies`].
///
/// `current` is the node whose outgoing edges are being examined; an edge
/// into the ancestor set confirms a cycle detected at `current`.
fn visit_for_cycles(
    origin: &Service,
    current: &Service,
    index: &HashMap<&str, &Service>,
    ancestors: &mut HashSet<String>,
    reported: &mut HashSet<(String, String)>,
    findings: &mut Vec<Finding>,
) {
    for dep in &current.depends_on {
        let target = dep.service.as_str();

        if ancestors.contains(target) {
            let mut key = (
                origin.id.as_str().to_string(),
                current.id.as_str().to_string(),
            );
            if key.0 > key.1 {
                std::mem::swap(&mut key.0, &mut key.1);
            }
            if reported.insert(key) {
                findings.push(Finding {
                    kind: CheckKind::CircularDependency,
                    severity: Severity::Error,
                    entity: origin.name.clone(),
                    entity_kind: EntityKind::Service,
                    message: format!(
                        "service '{}' is part of a dependency cycle (closed at '{}')",
                        origin.name, current.name
                    ),
                    fix: None,
                });
            }
            continue;
        }

        let Some(next) = index.get(target) else {
            // Unknown target: the dangling check owns this case.
            continue;
        };

        ancestors.insert(target.to_string());
        visit_for_cycles(origin, next, index, ancestors, reported, findings);
        ancestors.remove(target);
    }
}

/// Same-kind records sharing a case-insensitive name.
///
/// Names are compared independently per kind: a service and a system may
/// legitimately share a name. One finding is produced per duplicated name
/// group, with the share count in the message.
#[must_use]
pub fn check_duplicate_names(
    services: &[Service],
    systems: &[System],
    owners: &[Owner],
) -> Vec<Finding> {
    let mut findings = Vec::new();
    findings.extend(duplicate_names(
        services.iter().map(|s| s.name.as_str()),
        EntityKind::Service,
    ));
    findings.extend(duplicate_names(
        systems.iter().map(|s| s.name.as_str()),
        EntityKind::System,
    ));
    findings.extend(duplicate_names(
        owners.iter().map(|o| o.name.as_str()),
        EntityKind::Owner,
    ));
    findings
}

fn duplicate_names<'a>(
    names: impl Iterator<Item = &'a str>,
    kind: EntityKind,
) -> Vec<Finding> {
    // First-seen order keeps output stable for a given input order.
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, (String, usize)> = HashMap::new();

    for name in names {
        let key = name.to_lowercase();
        match groups.get_mut(&key) {
            Some((_, count)) => *count += 1,
            None => {
                groups.insert(key.clone(), (name.to_string(), 1));
                order.push(key);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| {
            let (spelling, count) = groups.remove(&key)?;
            if count < 2 {
                return None;
            }
            Some(Finding {
                kind: CheckKind::DuplicateName,
                severity: Severity::Error,
                entity: spelling.clone(),
                entity_kind: kind,
                message: format!("{count} {kind}s share the name '{spelling}'"),
                fix: None,
            })
        })
        .collect()
}

/// Systems that no service references.
#[must_use]
pub fn check_empty_systems(services: &[Service], systems: &[System]) -> Vec<Finding> {
    let referenced: HashSet<&str> = services
        .iter()
        .filter_map(|s| s.system.as_ref().map(|id| id.as_str()))
        .collect();

    systems
        .iter()
        .filter(|system| !referenced.contains(system.id.as_str()))
        .map(|system| Finding {
            kind: CheckKind::EmptySystem,
            severity: Severity::Warning,
            entity: system.name.clone(),
            entity_kind: EntityKind::System,
            message: format!("system '{}' has no services", system.name),
            fix: Some(format!("berth system rm {}", system.id)),
        })
        .collect()
}
