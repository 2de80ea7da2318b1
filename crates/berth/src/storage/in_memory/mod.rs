//! In-memory storage backend.
//!
//! All records live in hash maps keyed by id; lookups are O(1) and listing
//! sorts by creation time for stable output. The backend is ephemeral on its
//! own and gains persistence through the JSONL load/save functions in this
//! module, which the `JsonlBackedStorage` wrapper calls.
//!
//! # What is (not) enforced
//!
//! Record-level validation (names, description lengths) happens on create
//! and update. Cross-record integrity (dependency targets, system/owner
//! references, cycles) is intentionally NOT enforced anywhere in storage:
//! those are catalog states `berth lint` reports on, and dropping or
//! rejecting them here would hide exactly the problems the linter exists to
//! find. Load keeps every edge it can parse, no matter where it points.
//!
//! # Thread safety
//!
//! The store is wrapped in `Arc<tokio::sync::Mutex<_>>`; every trait method
//! takes the lock for its duration.

mod inner;
mod jsonl;
mod trait_impl;

use crate::storage::CatalogStorage;
use inner::InMemoryCatalogInner;
use std::sync::Arc;
use tokio::sync::Mutex;

pub use jsonl::{load_catalog, save_catalog, LoadWarning};

/// Thread-safe in-memory storage handle.
pub(crate) type InMemoryStorage = Arc<Mutex<InMemoryCatalogInner>>;

/// Create a new, empty in-memory storage instance.
#[must_use]
pub fn new_in_memory_storage() -> Box<dyn CatalogStorage> {
    Box::new(Arc::new(Mutex::new(InMemoryCatalogInner::new())))
}
