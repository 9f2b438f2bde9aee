//! Configuration
//!
//! Layered configuration for the namespace: built-in defaults, an optional
//! TOML file, then `TREEFS_*` environment variables.

pub mod loader;
pub mod storage;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

pub use loader::ConfigLoader;
pub use storage::{Durability, IdPolicy, StorageBackend, StorageConfig};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreefsConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}
