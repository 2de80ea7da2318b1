//! JSONL persistence for the in-memory catalog.
//!
//! Each entity kind lives in its own JSON Lines file. Loading is resilient:
//! malformed lines and records that fail validation are skipped with a
//! warning while everything else loads. Dependency edges are kept exactly
//! as written, dangling targets, self-loops, and cycles included, because
//! they are catalog states the linter reports on, not corruption.

use super::inner::InMemoryCatalogInner;
use crate::domain::{Owner, Service, System};
use crate::error::Result;
use crate::storage::{CatalogPaths, CatalogStorage};
use berth_jsonl::{read_jsonl_resilient, write_jsonl_atomic, Warning as JsonlWarning};
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A non-fatal problem encountered while loading catalog files.
#[derive(Debug, Clone)]
pub enum LoadWarning {
    /// A line could not be parsed as a record and was skipped.
    MalformedRecord {
        /// File the line came from
        file: String,
        /// 1-based line number
        line_number: usize,
        /// Parse error description
        error: String,
    },

    /// A record parsed but failed validation and was skipped.
    InvalidRecord {
        /// File the record came from
        file: String,
        /// The record's id
        id: String,
        /// Validation error description
        error: String,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::MalformedRecord {
                file,
                line_number,
                error,
            } => write!(f, "{file}:{line_number}: skipped malformed record: {error}"),
            LoadWarning::InvalidRecord { file, id, error } => {
                write!(f, "{file}: skipped invalid record '{id}': {error}")
            }
        }
    }
}

/// Read one kind's file, tolerating a missing file (first run) and
/// converting low-level warnings.
async fn load_records<T: DeserializeOwned>(
    path: &Path,
    warnings: &mut Vec<LoadWarning>,
) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    let (records, jsonl_warnings) = read_jsonl_resilient::<T, _>(path).await.map_err(|e| match e {
        berth_jsonl::Error::Io(io_err) => crate::error::Error::Io(io_err),
        berth_jsonl::Error::Json(json_err) => crate::error::Error::Json(json_err),
    })?;

    for warning in jsonl_warnings {
        let (line_number, error) = match warning {
            JsonlWarning::MalformedJson { line_number, error } => (line_number, error),
            JsonlWarning::SkippedLine {
                line_number,
                reason,
            } => (line_number, reason),
        };
        warnings.push(LoadWarning::MalformedRecord {
            file: file_name.clone(),
            line_number,
            error,
        });
    }

    Ok(records)
}

/// Load a catalog from its JSONL files.
///
/// Missing files are treated as empty collections so a freshly initialized
/// repository loads cleanly. Records failing validation are skipped with a
/// warning. Dependency edges are never dropped or rewritten.
///
/// # Errors
///
/// Returns an error only if an existing file cannot be read.
pub async fn load_catalog(
    paths: &CatalogPaths,
) -> Result<(Box<dyn CatalogStorage>, Vec<LoadWarning>)> {
    let mut warnings = Vec::new();

    let services: Vec<Service> = load_records(&paths.services, &mut warnings).await?;
    let systems: Vec<System> = load_records(&paths.systems, &mut warnings).await?;
    let owners: Vec<Owner> = load_records(&paths.owners, &mut warnings).await?;

    let mut inner = InMemoryCatalogInner::new();

    for service in services {
        if let Err(error) = service.validate() {
            warnings.push(LoadWarning::InvalidRecord {
                file: crate::storage::SERVICES_FILE_NAME.to_string(),
                id: service.id.as_str().to_string(),
                error,
            });
            continue;
        }
        inner.id_generator.register_id(service.id.as_str().to_string());
        inner.services.insert(service.id.clone(), service);
    }

    for system in systems {
        if let Err(error) = system.validate() {
            warnings.push(LoadWarning::InvalidRecord {
                file: crate::storage::SYSTEMS_FILE_NAME.to_string(),
                id: system.id.as_str().to_string(),
                error,
            });
            continue;
        }
        inner.id_generator.register_id(system.id.as_str().to_string());
        inner.systems.insert(system.id.clone(), system);
    }

    for owner in owners {
        if let Err(error) = owner.validate() {
            warnings.push(LoadWarning::InvalidRecord {
                file: crate::storage::OWNERS_FILE_NAME.to_string(),
                id: owner.id.as_str().to_string(),
                error,
            });
            continue;
        }
        inner.id_generator.register_id(owner.id.as_str().to_string());
        inner.owners.insert(owner.id.clone(), owner);
    }

    inner.refresh_id_generator_if_needed();

    Ok((Box::new(Arc::new(Mutex::new(inner))), warnings))
}

/// Save a catalog to its JSONL files.
///
/// Each file is written atomically on its own (temp file + rename). Records
/// are written in snapshot order (creation time, then id) so repeated saves
/// of an unchanged catalog produce identical files.
///
/// # Errors
///
/// Returns an error if any of the three files cannot be written.
pub async fn save_catalog(storage: &dyn CatalogStorage, paths: &CatalogPaths) -> Result<()> {
    let snapshot = storage.snapshot().await?;

    write_jsonl_atomic(&paths.services, &snapshot.services)
        .await
        .map_err(jsonl_error)?;
    write_jsonl_atomic(&paths.systems, &snapshot.systems)
        .await
        .map_err(jsonl_error)?;
    write_jsonl_atomic(&paths.owners, &snapshot.owners)
        .await
        .map_err(jsonl_error)?;

    tracing::debug!(
        services = snapshot.services.len(),
        systems = snapshot.systems.len(),
        owners = snapshot.owners.len(),
        "saved catalog"
    );
    Ok(())
}

fn jsonl_error(e: berth_jsonl::Error) -> crate::error::Error {
    match e {
        berth_jsonl::Error::Io(io_err) => crate::error::Error::Io(io_err),
        berth_jsonl::Error::Json(json_err) => crate::error::Error::Json(json_err),
    }
}
