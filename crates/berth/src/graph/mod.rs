//! Dependency graph queries over catalog snapshots.
//!
//! This module answers "what does X depend on" and "what depends on X" over
//! an in-memory snapshot of the service list. It does no I/O and never
//! mutates its input: callers load the catalog, hand in a slice, and get
//! back derived trees.
//!
//! # Cycle safety
//!
//! The catalog does not guarantee a DAG. Services may depend on themselves
//! or form cycles of any length, and dependency targets may not exist at
//! all. Traversal handles this with a global visited set threaded through
//! the recursion: the first time a service is reached its subtree is
//! expanded, and any later edge to it produces the node with no children.
//! This bounds the walk at one expansion per distinct id and guarantees
//! termination regardless of graph shape.
//!
//! The same rule means a service reachable through two different parents
//! (a diamond) only shows its subtree under whichever parent the walk
//! reaches first; under the other it appears as a childless stub. That is a
//! display-fidelity trade-off, not a bug: `lint`'s cycle detection uses a
//! separate ancestor-tracking walk (see [`crate::lint`]) and is not subject
//! to it. The two algorithms are intentionally distinct and should stay so.
//!
//! # Tolerant lookups
//!
//! An unknown service id is not an error here. [`walk_down`] returns an
//! empty forest and [`resolve_deps`] echoes the id back as the display
//! name; the command layer already resolves ids against the store and
//! produces its own not-found diagnostics.

use crate::domain::Service;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Default traversal depth for dependency queries.
///
/// Deep enough to show transitive chains without flooding the terminal on
/// densely connected catalogs. The depth cap also bounds the amount of work
/// a single query can do, independent of the visited-set guarantee.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Minimal identification of a service in query output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceRef {
    /// Service id
    pub id: String,
    /// Display name (falls back to the id for unknown services)
    pub name: String,
}

/// One node in a rendered dependency tree.
///
/// `api` and `description` annotate the edge that produced this node, not
/// the node itself: the same service reached over two different edges can
/// carry different annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepNode {
    /// Target service id
    pub id: String,
    /// Display name, or the raw id if the target is not in the catalog
    pub name: String,
    /// API consumed over this edge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    /// Free-text note on this edge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// This node's own dependencies (or dependents, for upward walks)
    pub children: Vec<DepNode>,
}

/// Which direction of the dependency relation to traverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Walk the reverse relation: who depends on this service
    Up,
    /// Walk the forward relation: what this service depends on
    Down,
}

/// Combined result of a dependency query in both directions.
#[derive(Debug, Clone, Serialize)]
pub struct DepsReport {
    /// The queried service
    pub service: ServiceRef,
    /// Services that depend on the queried service
    pub dependents: Vec<DepNode>,
    /// Services the queried service depends on
    pub dependencies: Vec<DepNode>,
}

/// An incoming dependency edge recorded in the reverse index.
#[derive(Debug, Clone)]
pub struct ReverseEdge<'a> {
    /// The service declaring the dependency
    pub from: &'a Service,
    /// API consumed over this edge
    pub api: Option<&'a str>,
    /// Free-text note on this edge
    pub description: Option<&'a str>,
}

/// Services indexed by id for O(1) lookups during traversal.
pub type ServiceIndex<'a> = HashMap<&'a str, &'a Service>;

/// Incoming edges indexed by target service id.
///
/// Services with no dependents have no entry at all; callers must treat a
/// missing key as zero dependents rather than an error.
pub type ReverseIndex<'a> = HashMap<&'a str, Vec<ReverseEdge<'a>>>;

/// Build the id-to-service index used by the traversals.
#[must_use]
pub fn build_service_index(services: &[Service]) -> ServiceIndex<'_> {
    services
        .iter()
        .map(|service| (service.id.as_str(), service))
        .collect()
}

/// Build the reverse dependency index.
///
/// For every service S and every dependency D in its list, records that
/// D's target is depended upon by S, carrying D's edge annotations forward
/// verbatim. Runs in O(services × average dependency count).
#[must_use]
pub fn build_reverse_index(services: &[Service]) -> ReverseIndex<'_> {
    let mut reverse: ReverseIndex<'_> = HashMap::new();
    for service in services {
        for dep in &service.depends_on {
            reverse
                .entry(dep.service.as_str())
                .or_default()
                .push(ReverseEdge {
                    from: service,
                    api: dep.api.as_deref(),
                    description: dep.description.as_deref(),
                });
        }
    }
    reverse
}

/// Walk the forward dependency relation from a service.
///
/// Returns the forest of the service's dependencies, each node expanded
/// recursively up to `max_depth` levels (direct dependencies are depth 1).
/// Nodes at exactly `max_depth`, and nodes whose target was already visited
/// earlier in this walk, have empty children. A `max_depth` of 0 or an
/// unknown root id yields an empty forest.
#[must_use]
pub fn walk_down(service_id: &str, index: &ServiceIndex<'_>, max_depth: usize) -> Vec<DepNode> {
    let mut visited = HashSet::new();
    walk_down_from(service_id, index, max_depth, &mut visited)
}

/// Recursive worker for [`walk_down`].
///
/// The visited set is shared across siblings and descendants of one
/// top-level invocation and is threaded as an explicit parameter so the
/// function stays a pure mapping from its arguments.
fn walk_down_from(
    service_id: &str,
    index: &ServiceIndex<'_>,
    depth: usize,
    visited: &mut HashSet<String>,
) -> Vec<DepNode> {
    if depth == 0 {
        return Vec::new();
    }
    if !visited.insert(service_id.to_string()) {
        return Vec::new();
    }
    let Some(service) = index.get(service_id) else {
        return Vec::new();
    };

    service
        .depends_on
        .iter()
        .map(|dep| DepNode {
            id: dep.service.as_str().to_string(),
            name: display_name(index, dep.service.as_str()),
            api: dep.api.clone(),
            description: dep.description.clone(),
            children: walk_down_from(dep.service.as_str(), index, depth - 1, visited),
        })
        .collect()
}

/// Walk the reverse dependency relation from a service.
///
/// Symmetric to [`walk_down`] over the reverse index, with the same depth
/// and visited-set truncation rules. A service absent from the reverse
/// index has zero dependents.
#[must_use]
pub fn walk_up(
    service_id: &str,
    reverse: &ReverseIndex<'_>,
    max_depth: usize,
) -> Vec<DepNode> {
    let mut visited = HashSet::new();
    walk_up_from(service_id, reverse, max_depth, &mut visited)
}

fn walk_up_from(
    service_id: &str,
    reverse: &ReverseIndex<'_>,
    depth: usize,
    visited: &mut HashSet<String>,
) -> Vec<DepNode> {
    if depth == 0 {
        return Vec::new();
    }
    if !visited.insert(service_id.to_string()) {
        return Vec::new();
    }
    let Some(edges) = reverse.get(service_id) else {
        return Vec::new();
    };

    edges
        .iter()
        .map(|edge| DepNode {
            id: edge.from.id.as_str().to_string(),
            name: edge.from.name.clone(),
            api: edge.api.map(str::to_string),
            description: edge.description.map(str::to_string),
            children: walk_up_from(edge.from.id.as_str(), reverse, depth - 1, visited),
        })
        .collect()
}

/// Find services with no dependency edges in either direction.
///
/// A service is an orphan iff its own dependency list is empty and no other
/// service's dependency list references it. Runs in O(services + edges).
#[must_use]
pub fn find_orphans(services: &[Service]) -> Vec<ServiceRef> {
    let mut referenced: HashSet<&str> = HashSet::new();
    for service in services {
        for dep in &service.depends_on {
            referenced.insert(dep.service.as_str());
        }
    }

    services
        .iter()
        .filter(|service| {
            service.depends_on.is_empty() && !referenced.contains(service.id.as_str())
        })
        .map(|service| ServiceRef {
            id: service.id.as_str().to_string(),
            name: service.name.clone(),
        })
        .collect()
}

/// Answer a dependency query in one or both directions.
///
/// `direction` of [`Direction::Up`] suppresses the dependency walk,
/// [`Direction::Down`] suppresses the dependent walk, and `None` computes
/// both. An unknown service id produces the report shape with the id echoed
/// as the name and both lists empty; it is never an error, so the command
/// layer can decide for itself how to diagnose a missing record.
#[must_use]
pub fn resolve_deps(
    service_id: &str,
    services: &[Service],
    max_depth: usize,
    direction: Option<Direction>,
) -> DepsReport {
    let index = build_service_index(services);

    let service = index.get(service_id).map_or_else(
        || ServiceRef {
            id: service_id.to_string(),
            name: service_id.to_string(),
        },
        |s| ServiceRef {
            id: s.id.as_str().to_string(),
            name: s.name.clone(),
        },
    );

    let dependencies = match direction {
        Some(Direction::Up) => Vec::new(),
        _ => walk_down(service_id, &index, max_depth),
    };

    let dependents = match direction {
        Some(Direction::Down) => Vec::new(),
        _ => {
            let reverse = build_reverse_index(services);
            walk_up(service_id, &reverse, max_depth)
        }
    };

    DepsReport {
        service,
        dependents,
        dependencies,
    }
}

/// Resolve a display name, falling back to the raw id for targets the
/// catalog does not know about.
fn display_name(index: &ServiceIndex<'_>, service_id: &str) -> String {
    index
        .get(service_id)
        .map_or_else(|| service_id.to_string(), |s| s.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dependency, ServiceId};
    use chrono::Utc;

    fn service(id: &str, deps: &[&str]) -> Service {
        service_named(id, id, deps)
    }

    fn service_named(id: &str, name: &str, deps: &[&str]) -> Service {
        Service {
            id: ServiceId::new(id),
            name: name.to_string(),
            description: String::new(),
            system: None,
            owner: None,
            lifecycle: None,
            depends_on: deps
                .iter()
                .map(|target| Dependency {
                    service: ServiceId::new(*target),
                    api: None,
                    description: None,
                })
                .collect(),
            apis: vec![],
            tags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn max_node_depth(nodes: &[DepNode]) -> usize {
        nodes
            .iter()
            .map(|node| 1 + max_node_depth(&node.children))
            .max()
            .unwrap_or(0)
    }

    // ========== Reverse index ==========

    #[test]
    fn reverse_index_preserves_edge_annotations() {
        let mut gateway = service("gateway", &[]);
        gateway.depends_on.push(Dependency {
            service: ServiceId::new("payments"),
            api: Some("charge".to_string()),
            description: Some("checkout flow".to_string()),
        });
        let services = vec![gateway, service("payments", &[])];

        let reverse = build_reverse_index(&services);
        let edges = reverse.get("payments").expect("payments has a dependent");
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].from.id.as_str(), "gateway");
        assert_eq!(edges[0].api, Some("charge"));
        assert_eq!(edges[0].description, Some("checkout flow"));
    }

    #[test]
    fn reverse_index_has_no_entry_for_services_without_dependents() {
        let services = vec![service("a", &["b"]), service("b", &[])];
        let reverse = build_reverse_index(&services);

        assert!(reverse.contains_key("b"));
        assert!(
            !reverse.contains_key("a"),
            "absence means zero dependents, not an empty list"
        );
    }

    #[test]
    fn reverse_index_records_edges_to_unknown_targets() {
        let services = vec![service("a", &["ghost"])];
        let reverse = build_reverse_index(&services);
        assert_eq!(reverse.get("ghost").map(Vec::len), Some(1));
    }

    // ========== Downward traversal ==========

    #[test]
    fn walk_down_depth_one_truncates_grandchildren() {
        let services = vec![
            service("gateway", &["payments"]),
            service("payments", &["stripe-webhook", "auth"]),
            service("stripe-webhook", &[]),
            service("auth", &[]),
        ];
        let index = build_service_index(&services);

        let forest = walk_down("gateway", &index, 1);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].name, "payments");
        assert!(
            forest[0].children.is_empty(),
            "depth 1 must not expand payments' own dependencies"
        );
    }

    #[test]
    fn walk_down_depth_two_expands_grandchildren() {
        let services = vec![
            service("gateway", &["payments"]),
            service("payments", &["stripe-webhook", "auth"]),
            service("stripe-webhook", &[]),
            service("auth", &[]),
        ];
        let index = build_service_index(&services);

        let forest = walk_down("gateway", &index, 2);
        let payments = &forest[0];
        let names: Vec<&str> = payments.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["stripe-webhook", "auth"]);
    }

    #[test]
    fn walk_down_never_exceeds_max_depth() {
        let services = vec![
            service("a", &["b"]),
            service("b", &["c"]),
            service("c", &["d"]),
            service("d", &["e"]),
            service("e", &[]),
        ];
        let index = build_service_index(&services);

        for depth in 0..5 {
            let forest = walk_down("a", &index, depth);
            assert!(
                max_node_depth(&forest) <= depth,
                "depth {depth} produced nodes deeper than the bound"
            );
        }
    }

    #[test]
    fn walk_down_depth_zero_returns_empty_forest() {
        let services = vec![service("a", &["b"]), service("b", &[])];
        let index = build_service_index(&services);
        assert!(walk_down("a", &index, 0).is_empty());
    }

    #[test]
    fn walk_down_unknown_root_returns_empty_forest() {
        let services = vec![service("a", &["b"]), service("b", &[])];
        let index = build_service_index(&services);
        assert!(walk_down("nope", &index, 5).is_empty());
    }

    #[test]
    fn walk_down_dangling_target_still_produces_a_node() {
        let services = vec![service("checkout", &["ghost-service"])];
        let index = build_service_index(&services);

        let forest = walk_down("checkout", &index, 3);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, "ghost-service");
        assert_eq!(
            forest[0].name, "ghost-service",
            "unresolved targets fall back to the raw id"
        );
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn walk_down_terminates_on_self_loop() {
        let services = vec![service("a", &["a"])];
        let index = build_service_index(&services);

        let forest = walk_down("a", &index, 10);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, "a");
        assert!(
            forest[0].children.is_empty(),
            "a self-loop node must appear once, without re-expansion"
        );
    }

    #[test]
    fn walk_down_terminates_on_two_cycle() {
        let services = vec![service("a", &["b"]), service("b", &["a"])];
        let index = build_service_index(&services);

        let forest = walk_down("a", &index, 10);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, "b");
        // The cycle back to "a" shows up as a childless stub under "b".
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].id, "a");
        assert!(forest[0].children[0].children.is_empty());
    }

    #[test]
    fn walk_down_terminates_on_long_cycle_with_generous_depth() {
        let services = vec![
            service("a", &["b"]),
            service("b", &["c"]),
            service("c", &["a"]),
        ];
        let index = build_service_index(&services);

        let forest = walk_down("a", &index, 10);
        assert_eq!(max_node_depth(&forest), 3, "a → b → c → a(stub)");
    }

    #[test]
    fn walk_down_diamond_expands_under_first_parent_only() {
        let services = vec![
            service("a", &["b", "c"]),
            service("b", &["d"]),
            service("c", &["d"]),
            service("d", &["e"]),
            service("e", &[]),
        ];
        let index = build_service_index(&services);

        let forest = walk_down("a", &index, 10);
        let b = forest.iter().find(|n| n.id == "b").expect("b present");
        let c = forest.iter().find(|n| n.id == "c").expect("c present");

        let d_under_b = &b.children[0];
        assert_eq!(d_under_b.id, "d");
        assert_eq!(d_under_b.children.len(), 1, "first discovery expands d");

        let d_under_c = &c.children[0];
        assert_eq!(d_under_c.id, "d");
        assert!(
            d_under_c.children.is_empty(),
            "later edges to d show a childless stub"
        );
    }

    #[test]
    fn walk_down_edge_annotations_ride_on_the_edge() {
        let mut a = service("a", &[]);
        a.depends_on.push(Dependency {
            service: ServiceId::new("b"),
            api: Some("v2".to_string()),
            description: None,
        });
        let services = vec![a, service_named("b", "billing", &[])];
        let index = build_service_index(&services);

        let forest = walk_down("a", &index, 2);
        assert_eq!(forest[0].name, "billing");
        assert_eq!(forest[0].api.as_deref(), Some("v2"));
    }

    // ========== Upward traversal ==========

    #[test]
    fn walk_up_finds_transitive_dependents() {
        let services = vec![
            service("gateway", &["payments"]),
            service("payments", &["auth"]),
            service("auth", &[]),
        ];
        let reverse = build_reverse_index(&services);

        let forest = walk_up("auth", &reverse, 5);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, "payments");
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].id, "gateway");
    }

    #[test]
    fn walk_up_no_dependents_returns_empty_forest() {
        let services = vec![service("a", &["b"]), service("b", &[])];
        let reverse = build_reverse_index(&services);
        assert!(walk_up("a", &reverse, 5).is_empty());
    }

    #[test]
    fn walk_up_terminates_on_cycle() {
        let services = vec![service("a", &["b"]), service("b", &["a"])];
        let reverse = build_reverse_index(&services);

        let forest = walk_up("a", &reverse, 10);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, "b");
        assert_eq!(forest[0].children.len(), 1);
        assert!(forest[0].children[0].children.is_empty());
    }

    #[test]
    fn walk_up_respects_depth_bound() {
        let services = vec![
            service("top", &["mid"]),
            service("mid", &["leaf"]),
            service("leaf", &[]),
        ];
        let reverse = build_reverse_index(&services);

        let forest = walk_up("leaf", &reverse, 1);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, "mid");
        assert!(forest[0].children.is_empty());
    }

    // ========== Orphans ==========

    #[test]
    fn find_orphans_returns_only_fully_disconnected_services() {
        let services = vec![
            service("a", &["b"]),
            service("b", &[]),
            service("c", &[]),
        ];
        let orphans = find_orphans(&services);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].id, "c");
    }

    #[test]
    fn find_orphans_self_loop_is_not_an_orphan() {
        let services = vec![service("a", &["a"]), service("b", &[])];
        let orphans = find_orphans(&services);
        let ids: Vec<&str> = orphans.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn find_orphans_empty_catalog() {
        assert!(find_orphans(&[]).is_empty());
    }

    // ========== Combined query ==========

    #[test]
    fn resolve_deps_direction_up_suppresses_dependencies() {
        let services = vec![service("a", &["b"]), service("b", &[])];
        let report = resolve_deps("b", &services, 3, Some(Direction::Up));
        assert!(report.dependencies.is_empty());
        assert_eq!(report.dependents.len(), 1);
        assert_eq!(report.dependents[0].id, "a");
    }

    #[test]
    fn resolve_deps_direction_down_suppresses_dependents() {
        let services = vec![service("a", &["b"]), service("b", &[])];
        let report = resolve_deps("a", &services, 3, Some(Direction::Down));
        assert!(report.dependents.is_empty());
        assert_eq!(report.dependencies.len(), 1);
        assert_eq!(report.dependencies[0].id, "b");
    }

    #[test]
    fn resolve_deps_no_direction_computes_both() {
        let services = vec![
            service("a", &["b"]),
            service("b", &["c"]),
            service("c", &[]),
        ];
        let report = resolve_deps("b", &services, 3, None);
        assert_eq!(report.dependencies.len(), 1);
        assert_eq!(report.dependencies[0].id, "c");
        assert_eq!(report.dependents.len(), 1);
        assert_eq!(report.dependents[0].id, "a");
    }

    #[test]
    fn resolve_deps_unknown_id_echoes_id_as_name() {
        let services = vec![service("a", &[])];
        let report = resolve_deps("ghost", &services, 3, None);
        assert_eq!(report.service.id, "ghost");
        assert_eq!(report.service.name, "ghost");
        assert!(report.dependencies.is_empty());
        assert!(report.dependents.is_empty());
    }

    #[test]
    fn resolve_deps_end_to_end_depth_scenario() {
        let services = vec![
            service("gateway", &["payments"]),
            service("payments", &["stripe-webhook", "auth"]),
            service("stripe-webhook", &[]),
            service("auth", &[]),
        ];

        let shallow = resolve_deps("gateway", &services, 1, Some(Direction::Down));
        assert_eq!(shallow.dependencies.len(), 1);
        assert_eq!(shallow.dependencies[0].name, "payments");
        assert!(shallow.dependencies[0].children.is_empty());

        let deep = resolve_deps("gateway", &services, 2, Some(Direction::Down));
        let payments = &deep.dependencies[0];
        let names: Vec<&str> = payments.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["stripe-webhook", "auth"]);
    }

    #[test]
    fn dep_node_json_omits_empty_annotations() {
        let node = DepNode {
            id: "a".to_string(),
            name: "a".to_string(),
            api: None,
            description: None,
            children: vec![],
        };
        let json = serde_json::to_string(&node).unwrap();
        assert!(!json.contains("\"api\""), "got: {json}");
        assert!(json.contains("\"children\":[]"), "got: {json}");
    }
}
