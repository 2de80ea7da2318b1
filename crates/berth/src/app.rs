//! Application context for CLI command execution.
//!
//! The [`App`] struct locates the repository, loads configuration, and owns
//! the storage backend for the duration of one command.

use crate::commands::init::{find_berth_root, BerthConfig, BERTH_DIR_NAME, CONFIG_FILE_NAME};
use crate::domain::CatalogSnapshot;
use crate::error::{Error, Result};
use crate::storage::{create_storage, CatalogStorage};
use std::path::{Path, PathBuf};

/// Application context for CLI operations.
///
/// Storage is loaded from the berth directory on creation; every command
/// works against a fresh catalog.
pub struct App {
    /// The storage backend (trait object for polymorphism)
    storage: Box<dyn CatalogStorage>,

    /// Path to the berth directory (.berth)
    berth_dir: PathBuf,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("berth_dir", &self.berth_dir)
            .field("storage", &"<dyn CatalogStorage>")
            .finish()
    }
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree for a `.berth/` directory, loads the
    /// configuration, and initializes storage.
    ///
    /// # Errors
    ///
    /// Returns an error if no berth repository is found, or configuration or
    /// storage loading fails.
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_berth_root(working_dir).ok_or(Error::NotInitialized)?;

        let berth_dir = root_dir.join(BERTH_DIR_NAME);
        let config_path = berth_dir.join(CONFIG_FILE_NAME);

        let config = BerthConfig::load(&config_path).await?;

        let backend = config.to_backend(&root_dir)?;
        let storage = create_storage(backend).await?;

        Ok(Self { storage, berth_dir })
    }

    /// Get a mutable reference to the storage.
    pub fn storage_mut(&mut self) -> &mut dyn CatalogStorage {
        self.storage.as_mut()
    }

    /// Get an immutable reference to the storage.
    #[must_use]
    pub fn storage(&self) -> &dyn CatalogStorage {
        self.storage.as_ref()
    }

    /// Get the path to the berth directory.
    #[must_use]
    pub fn berth_dir(&self) -> &Path {
        &self.berth_dir
    }

    /// Load a full catalog snapshot.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub async fn snapshot(&self) -> Result<CatalogSnapshot> {
        self.storage.snapshot().await
    }

    /// Save storage state to persistent storage.
    ///
    /// Called after any mutating operation.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub async fn save(&self) -> Result<()> {
        self.storage.save().await
    }
}
