use std::sync::Arc;

use tempfile::TempDir;
use treefs::config::{StorageBackend, TreefsConfig};
use treefs::store::SledEntityStore;
use treefs::FileSystem;

/// Namespace over a sled database inside `temp`.
pub fn sled_fs(temp: &TempDir) -> FileSystem {
    FileSystem::open(&sled_config(temp)).unwrap()
}

pub fn sled_config(temp: &TempDir) -> TreefsConfig {
    let mut config = TreefsConfig::default();
    config.storage.backend = StorageBackend::Sled;
    config.storage.path = Some(temp.path().join("store"));
    config
}

/// Both backends, so every scenario runs against each.
pub fn backends() -> Vec<(&'static str, FileSystem)> {
    vec![
        ("memory", FileSystem::in_memory()),
        (
            "sled",
            FileSystem::with_store(Arc::new(SledEntityStore::temporary().unwrap())),
        ),
    ]
}
