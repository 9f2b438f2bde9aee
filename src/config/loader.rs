//! ConfigLoader: composes file and environment sources into a TreefsConfig.

use super::TreefsConfig;
use crate::error::NamespaceError;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use std::path::Path;

/// Configuration loader.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from environment variables only.
    pub fn load() -> Result<TreefsConfig, ConfigError> {
        Self::finish(Config::builder())
    }

    /// Load configuration from a TOML file with environment overlay.
    /// Precedence: defaults (lowest) -> file -> environment (highest).
    pub fn load_from_file(path: &Path) -> Result<TreefsConfig, ConfigError> {
        let builder = Config::builder().add_source(File::from(path).format(FileFormat::Toml));
        Self::finish(builder)
    }

    /// Write `config` as TOML so it can be edited and loaded back.
    pub fn write_file(path: &Path, config: &TreefsConfig) -> Result<(), NamespaceError> {
        let rendered = toml::to_string_pretty(config).map_err(|e| {
            NamespaceError::ConfigError(format!("Failed to render config: {}", e))
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                NamespaceError::ConfigError(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        std::fs::write(path, rendered).map_err(|e| {
            NamespaceError::ConfigError(format!(
                "Failed to write config {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Environment overlay uses the TREEFS_ prefix and __ between nested keys,
    /// e.g. `TREEFS_STORAGE__BACKEND=memory`.
    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<TreefsConfig, ConfigError> {
        let builder = builder.add_source(
            Environment::with_prefix("TREEFS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        builder.build()?.try_deserialize()
    }
}
