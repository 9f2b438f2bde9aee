//! Namespace engine
//!
//! [`FileSystem`] is the public surface: create directories and files by
//! path, list directories, and look entities up by id. It holds no state of
//! its own beyond a handle to the entity store.

use crate::config::{StorageBackend, TreefsConfig};
use crate::entity::{DirEntry, Entity, EntityKind, NewEntity};
use crate::error::{NamespaceError, NamespaceResult, StorageError};
use crate::path::{NamespacePath, Resolver};
use crate::store::{EntityStore, MemoryEntityStore, SledEntityStore};
use crate::types::EntityId;
use std::sync::Arc;

/// Path-addressed namespace over an [`EntityStore`].
///
/// Cloning is cheap and clones share the same store.
#[derive(Clone)]
pub struct FileSystem {
    store: Arc<dyn EntityStore>,
}

impl FileSystem {
    /// Open the namespace described by `config`.
    pub fn open(config: &TreefsConfig) -> NamespaceResult<Self> {
        let store: Arc<dyn EntityStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryEntityStore::new()),
            StorageBackend::Sled => {
                let path = config.storage.resolve_path()?;
                Arc::new(SledEntityStore::open(&path, &config.storage)?)
            }
        };
        Ok(Self::with_store(store))
    }

    /// A namespace that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryEntityStore::new()))
    }

    /// Wrap an already-opened store; stores create their root on construction.
    pub fn with_store(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Create a directory. Every ancestor must already exist.
    pub fn create_directory(&self, path: &str) -> NamespaceResult<EntityId> {
        self.create(path, EntityKind::Directory, None)
    }

    /// Create a file carrying `content`. Every ancestor must already exist.
    pub fn create_file(&self, path: &str, content: impl AsRef<[u8]>) -> NamespaceResult<EntityId> {
        self.create(path, EntityKind::File, Some(content.as_ref().to_vec()))
    }

    fn create(
        &self,
        raw: &str,
        kind: EntityKind,
        content: Option<Vec<u8>>,
    ) -> NamespaceResult<EntityId> {
        let path = NamespacePath::parse(raw)?;
        let (parent, name) = Resolver::new(self.store.as_ref()).resolve_parent(&path)?;

        // Fast path; the store re-checks atomically inside insert.
        if self
            .store
            .get_by_parent_and_name(parent.id, &name)?
            .is_some()
        {
            return Err(NamespaceError::AlreadyExists(path.to_string()));
        }

        let entity = NewEntity::new(parent.id, name, kind, content)?;
        let id = self
            .store
            .insert(entity)
            .map_err(|e| insert_error(e, &path))?;
        tracing::debug!(path = %path, id, kind = ?kind, "Created entity");
        Ok(id)
    }

    /// List the children of a directory, ordered by name.
    pub fn list(&self, path: &str) -> NamespaceResult<Vec<DirEntry>> {
        let path = NamespacePath::parse(path)?;
        let entity = Resolver::new(self.store.as_ref()).resolve(&path)?;
        if !entity.is_directory() {
            return Err(NamespaceError::NotADirectory(path.to_string()));
        }
        let entries: Vec<DirEntry> = self
            .store
            .get_children(entity.id)?
            .iter()
            .map(Entity::descriptor)
            .collect();
        tracing::debug!(path = %path, count = entries.len(), "Listed directory");
        Ok(entries)
    }

    /// Direct id lookup, bypassing path resolution.
    pub fn get_by_id(&self, id: EntityId) -> NamespaceResult<Entity> {
        self.store
            .get_by_id(id)?
            .ok_or(NamespaceError::NotFound(id))
    }

    /// Resolve `path` to its entity.
    pub fn stat(&self, path: &str) -> NamespaceResult<Entity> {
        let path = NamespacePath::parse(path)?;
        Resolver::new(self.store.as_ref()).resolve(&path)
    }

    /// Whether `path` names an entity. Malformed paths and paths through
    /// files are errors, not `false`.
    pub fn exists(&self, path: &str) -> NamespaceResult<bool> {
        match self.stat(path) {
            Ok(_) => Ok(true),
            Err(NamespaceError::PathNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Content of the file at `path`.
    pub fn read_file(&self, path: &str) -> NamespaceResult<Vec<u8>> {
        let entity = self.stat(path)?;
        match entity.kind {
            EntityKind::Directory => Err(NamespaceError::IsADirectory(
                NamespacePath::parse(path)?.to_string(),
            )),
            EntityKind::File => Ok(entity.content.unwrap_or_default()),
        }
    }

    /// The namespace is append-only.
    pub fn remove(&self, _path: &str) -> NamespaceResult<()> {
        Err(NamespaceError::Unsupported("remove"))
    }

    /// Overwriting file content is not supported.
    pub fn write_file(&self, _path: &str, _content: impl AsRef<[u8]>) -> NamespaceResult<()> {
        Err(NamespaceError::Unsupported("write_file"))
    }

    pub fn rename(&self, _from: &str, _to: &str) -> NamespaceResult<()> {
        Err(NamespaceError::Unsupported("rename"))
    }

    /// Force buffered writes to disk (see `Durability::Deferred`).
    pub fn flush(&self) -> NamespaceResult<()> {
        Ok(self.store.flush()?)
    }

    /// Number of entities in the namespace, root included.
    pub fn entity_count(&self) -> NamespaceResult<usize> {
        Ok(self.store.entity_count()?)
    }
}

/// Map gateway failures from an insert onto the path that was requested.
fn insert_error(err: StorageError, path: &NamespacePath) -> NamespaceError {
    match err {
        StorageError::DuplicateSibling { .. } => NamespaceError::AlreadyExists(path.to_string()),
        StorageError::NotDurable { id, reason } => NamespaceError::NotDurable {
            path: path.to_string(),
            id,
            reason,
        },
        StorageError::ParentNotDirectory(_) => NamespaceError::NotADirectory(
            path.parent().unwrap_or_else(NamespacePath::root).to_string(),
        ),
        StorageError::ParentNotFound(_) => NamespaceError::PathNotFound {
            path: path.to_string(),
            segment: path
                .parent()
                .and_then(|p| p.basename().map(str::to_string))
                .unwrap_or_default(),
        },
        other => other.into(),
    }
}
