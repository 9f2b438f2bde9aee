//! Path resolution
//!
//! Walks a [`NamespacePath`] from the root with one indexed
//! `(parent_id, name)` lookup per segment.

use super::NamespacePath;
use crate::entity::Entity;
use crate::error::{NamespaceError, NamespaceResult};
use crate::store::EntityStore;
use crate::types::ROOT_ID;

pub struct Resolver<'a> {
    store: &'a dyn EntityStore,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self { store }
    }

    pub fn root(&self) -> NamespaceResult<Entity> {
        self.store
            .get_by_id(ROOT_ID)?
            .ok_or(NamespaceError::NotFound(ROOT_ID))
    }

    /// Resolve every segment of `path` to the entity it names.
    pub fn resolve(&self, path: &NamespacePath) -> NamespaceResult<Entity> {
        self.walk(path, path.depth())
    }

    /// Resolve all but the last segment, for creation.
    ///
    /// Returns the parent directory and the final segment name. The root has
    /// no parent and is reported as already existing.
    pub fn resolve_parent(&self, path: &NamespacePath) -> NamespaceResult<(Entity, String)> {
        let Some(name) = path.basename() else {
            return Err(NamespaceError::AlreadyExists(path.to_string()));
        };
        let parent = self.walk(path, path.depth() - 1)?;
        if !parent.is_directory() {
            return Err(NamespaceError::NotADirectory(
                path.prefix_string(path.depth() - 1),
            ));
        }
        Ok((parent, name.to_string()))
    }

    /// Follow the first `len` segments. An intermediate file fails with
    /// `NotADirectory` as soon as another segment must be looked up below it.
    fn walk(&self, path: &NamespacePath, len: usize) -> NamespaceResult<Entity> {
        let mut current = self.root()?;
        for (index, segment) in path.segments()[..len].iter().enumerate() {
            if !current.is_directory() {
                return Err(NamespaceError::NotADirectory(path.prefix_string(index)));
            }
            current = match self.store.get_by_parent_and_name(current.id, segment)? {
                Some(entity) => entity,
                None => {
                    tracing::debug!(path = %path, segment = %segment, "Path segment not found");
                    return Err(NamespaceError::PathNotFound {
                        path: path.to_string(),
                        segment: segment.clone(),
                    });
                }
            };
        }
        Ok(current)
    }
}
