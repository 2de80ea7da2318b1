//! Text search across the catalog.
//!
//! A case-insensitive substring scan over every record's name, id, tags,
//! and description. Matches are ranked by which field hit: names beat tags,
//! tags beat ids, ids beat descriptions. The scan runs over the in-memory
//! snapshot on every invocation; catalogs are small and the CLI reloads
//! them per command anyway, so there is no persisted index to invalidate.

use crate::domain::{CatalogSnapshot, EntityKind};
use serde::Serialize;

const SCORE_NAME_EXACT: u32 = 10;
const SCORE_NAME: u32 = 8;
const SCORE_TAG: u32 = 4;
const SCORE_ID: u32 = 2;
const SCORE_DESCRIPTION: u32 = 1;

/// One search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Which record collection the hit belongs to
    pub kind: EntityKind,

    /// Record id
    pub id: String,

    /// Record display name
    pub name: String,

    /// Ranking score (higher is better)
    pub score: u32,

    /// The strongest field that matched: `name`, `tag`, `id`, or `description`
    pub matched: &'static str,
}

/// Search the catalog for records matching a query.
///
/// The query is matched case-insensitively as a substring. Results are
/// sorted by descending score, then by name, then by id for stability.
/// An empty or whitespace-only query matches nothing.
#[must_use]
pub fn search(snapshot: &CatalogSnapshot, query: &str) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits = Vec::new();

    for service in &snapshot.services {
        if let Some(hit) = score_record(
            EntityKind::Service,
            service.id.as_str(),
            &service.name,
            &service.description,
            &service.tags,
            &needle,
        ) {
            hits.push(hit);
        }
    }

    for system in &snapshot.systems {
        if let Some(hit) = score_record(
            EntityKind::System,
            system.id.as_str(),
            &system.name,
            &system.description,
            &[],
            &needle,
        ) {
            hits.push(hit);
        }
    }

    for owner in &snapshot.owners {
        if let Some(hit) = score_record(
            EntityKind::Owner,
            owner.id.as_str(),
            &owner.name,
            &owner.description,
            &[],
            &needle,
        ) {
            hits.push(hit);
        }
    }

    hits.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
    hits
}

fn score_record(
    kind: EntityKind,
    id: &str,
    name: &str,
    description: &str,
    tags: &[String],
    needle: &str,
) -> Option<SearchHit> {
    let name_lower = name.to_lowercase();

    let mut score = 0;
    let mut matched = "";

    if name_lower == *needle {
        score += SCORE_NAME_EXACT;
        matched = "name";
    } else if name_lower.contains(needle) {
        score += SCORE_NAME;
        matched = "name";
    }

    if tags.iter().any(|tag| tag.to_lowercase().contains(needle)) {
        score += SCORE_TAG;
        if matched.is_empty() {
            matched = "tag";
        }
    }

    if id.to_lowercase().contains(needle) {
        score += SCORE_ID;
        if matched.is_empty() {
            matched = "id";
        }
    }

    if description.to_lowercase().contains(needle) {
        score += SCORE_DESCRIPTION;
        if matched.is_empty() {
            matched = "description";
        }
    }

    if score == 0 {
        return None;
    }

    Some(SearchHit {
        kind,
        id: id.to_string(),
        name: name.to_string(),
        score,
        matched,
    })
}
