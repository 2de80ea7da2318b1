//! Implementation of the `init` command.
//!
//! Initializes a new berth repository: a `.berth/` directory holding the
//! configuration file and one empty JSONL data file per entity kind.

use crate::error::{Error, Result};
use crate::storage::{
    CatalogPaths, StorageBackend, OWNERS_FILE_NAME, SERVICES_FILE_NAME, SYSTEMS_FILE_NAME,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the berth directory
pub const BERTH_DIR_NAME: &str = ".berth";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the gitignore file within .berth
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Maximum directory depth to traverse when searching for the berth root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Configuration file structure for berth
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BerthConfig {
    /// Storage configuration
    pub storage: StorageConfig,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Storage backend type ("jsonl" or "memory")
    pub backend: String,

    /// Directory holding the data files, relative to the repository root
    #[serde(rename = "data-dir")]
    pub data_dir: String,
}

impl BerthConfig {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Resolve the configured backend against the repository root.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown backend names.
    pub fn to_backend(&self, root_dir: &Path) -> Result<StorageBackend> {
        match self.storage.backend.as_str() {
            "jsonl" => Ok(StorageBackend::Jsonl(CatalogPaths::in_dir(
                &root_dir.join(&self.storage.data_dir),
            ))),
            "memory" => Ok(StorageBackend::InMemory),
            other => Err(Error::Config(format!("Unknown storage backend '{other}'"))),
        }
    }
}

impl Default for BerthConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                backend: "jsonl".to_string(),
                data_dir: BERTH_DIR_NAME.to_string(),
            },
        }
    }
}

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created berth directory
    pub berth_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Paths to the created data files
    pub data_files: Vec<PathBuf>,
    /// Path to the created gitignore file
    pub gitignore_file: PathBuf,
}

/// Initialize a new berth repository in the given directory.
///
/// Creates `.berth/` with a default `config.yaml` and empty
/// `services.jsonl`, `systems.jsonl`, and `owners.jsonl` files.
///
/// # Errors
///
/// Returns an error if the `.berth/` directory already exists or a file
/// system operation fails.
pub async fn init(base_dir: &Path) -> Result<InitResult> {
    let berth_dir = base_dir.join(BERTH_DIR_NAME);

    if berth_dir.exists() {
        return Err(Error::Config(format!(
            "Berth is already initialized in this directory. Found existing '{BERTH_DIR_NAME}'"
        )));
    }

    fs::create_dir_all(&berth_dir).await?;

    let config_file = berth_dir.join(CONFIG_FILE_NAME);
    let config = BerthConfig::default();
    config.save(&config_file).await?;

    let mut data_files = Vec::new();
    for file_name in [SERVICES_FILE_NAME, SYSTEMS_FILE_NAME, OWNERS_FILE_NAME] {
        let data_file = berth_dir.join(file_name);
        fs::write(&data_file, "").await?;
        data_files.push(data_file);
    }

    let gitignore_file = berth_dir.join(GITIGNORE_FILE_NAME);
    let gitignore_content = "\
# Berth metadata files that should not be tracked
# The *.jsonl data files should be tracked for collaboration
*.jsonl.tmp
";
    fs::write(&gitignore_file, gitignore_content).await?;

    Ok(InitResult {
        berth_dir,
        config_file,
        data_files,
        gitignore_file,
    })
}

/// Check if a directory has been initialized with berth.
#[must_use]
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(BERTH_DIR_NAME).exists()
}

/// Find the berth root directory by searching up the directory tree.
///
/// Starts from the given directory and traverses parents until a `.berth/`
/// directory is found, the filesystem root is reached, or the maximum
/// traversal depth is exceeded.
#[must_use]
pub fn find_berth_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if is_initialized(&current) {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH {
            return None;
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn init_creates_directory_layout() {
        let temp_dir = TempDir::new().unwrap();

        let result = init(temp_dir.path()).await.unwrap();

        assert!(result.berth_dir.ends_with(BERTH_DIR_NAME));
        assert!(result.config_file.exists());
        assert_eq!(result.data_files.len(), 3);
        for file in &result.data_files {
            assert!(file.exists(), "missing data file: {}", file.display());
        }
        assert!(result.gitignore_file.exists());
    }

    #[tokio::test]
    async fn init_refuses_to_run_twice() {
        let temp_dir = TempDir::new().unwrap();

        init(temp_dir.path()).await.unwrap();
        let second = init(temp_dir.path()).await;

        assert!(second.is_err());
        assert!(second
            .unwrap_err()
            .to_string()
            .contains("already initialized"));
    }

    #[tokio::test]
    async fn config_roundtrips_through_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);

        let config = BerthConfig::default();
        config.save(&path).await.unwrap();
        let loaded = BerthConfig::load(&path).await.unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.storage.backend, "jsonl");
    }

    #[tokio::test]
    async fn unknown_backend_is_a_config_error() {
        let config = BerthConfig {
            storage: StorageConfig {
                backend: "postgres".to_string(),
                data_dir: BERTH_DIR_NAME.to_string(),
            },
        };
        let result = config.to_backend(Path::new("/tmp"));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn find_root_walks_up_from_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path()).await.unwrap();

        let sub_dir = temp_dir.path().join("src").join("deep");
        std::fs::create_dir_all(&sub_dir).unwrap();

        let root = find_berth_root(&sub_dir).expect("root should be found");
        // TempDir paths may contain symlinks on some platforms; compare the tail.
        assert!(root.join(BERTH_DIR_NAME).exists());
    }

    #[test]
    fn find_root_returns_none_outside_a_repository() {
        let temp_dir = TempDir::new().unwrap();
        assert!(find_berth_root(temp_dir.path()).is_none());
    }
}
