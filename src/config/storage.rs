//! StorageConfig: backend selection, location, and durability of the entity store.

use crate::error::NamespaceError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which [`EntityStore`](crate::store::EntityStore) backs the namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Sled,
    Memory,
}

/// When an insert is considered durable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Durability {
    /// Flush to disk before `insert` returns
    Immediate,
    /// Rely on the backend's background flush; callers use `flush()` explicitly
    Deferred,
}

/// Whether identifiers survive a restart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// Keep rows and the id counter across opens
    Persistent,
    /// Wipe the store on open; ids restart after the root
    ResetOnOpen,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Sled
}

fn default_durability() -> Durability {
    Durability::Immediate
}

fn default_ids() -> IdPolicy {
    IdPolicy::Persistent
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,

    /// Sled database directory; None means the platform data directory
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_durability")]
    pub durability: Durability,

    #[serde(default = "default_ids")]
    pub ids: IdPolicy,

    /// Sled page cache size in bytes
    #[serde(default)]
    pub cache_capacity: Option<u64>,
}

impl StorageConfig {
    /// Resolve the on-disk location of the sled database.
    pub fn resolve_path(&self) -> Result<PathBuf, NamespaceError> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let project_dirs = directories::ProjectDirs::from("", "treefs", "treefs").ok_or_else(|| {
            NamespaceError::ConfigError(
                "Could not determine platform data directory for the store".to_string(),
            )
        })?;
        Ok(project_dirs.data_dir().join("store"))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
            durability: default_durability(),
            ids: default_ids(),
            cache_capacity: None,
        }
    }
}
