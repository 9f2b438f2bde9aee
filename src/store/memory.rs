//! In-process entity store
//!
//! Holds the id table and a per-parent name index behind one read-write
//! lock. Inserts take the write lock for the whole check-and-insert;
//! lookups share the read lock.

use crate::entity::{Entity, NewEntity};
use crate::error::{StorageError, StorageResult};
use crate::store::EntityStore;
use crate::types::{EntityId, ROOT_ID};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

struct Tables {
    entities: HashMap<EntityId, Entity>,
    /// parent id -> (name -> child id); names kept sorted for listing
    children: HashMap<EntityId, BTreeMap<String, EntityId>>,
    next_id: EntityId,
}

pub struct MemoryEntityStore {
    tables: RwLock<Tables>,
}

impl MemoryEntityStore {
    /// Create a store holding only the root.
    pub fn new() -> Self {
        let mut entities = HashMap::new();
        entities.insert(ROOT_ID, Entity::root(Utc::now()));
        Self {
            tables: RwLock::new(Tables {
                entities,
                children: HashMap::new(),
                next_id: ROOT_ID + 1,
            }),
        }
    }
}

impl Default for MemoryEntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore for MemoryEntityStore {
    fn insert(&self, entity: NewEntity) -> StorageResult<EntityId> {
        let mut tables = self.tables.write();
        let parent_id = entity.parent_id();

        match tables.entities.get(&parent_id) {
            None => return Err(StorageError::ParentNotFound(parent_id)),
            Some(parent) if !parent.is_directory() => {
                return Err(StorageError::ParentNotDirectory(parent_id))
            }
            Some(_) => {}
        }

        let taken = tables
            .children
            .get(&parent_id)
            .is_some_and(|siblings| siblings.contains_key(entity.name()));
        if taken {
            return Err(StorageError::DuplicateSibling {
                parent_id,
                name: entity.name().to_string(),
            });
        }

        let id = tables.next_id;
        tables.next_id += 1;
        tables
            .children
            .entry(parent_id)
            .or_default()
            .insert(entity.name().to_string(), id);
        tables
            .entities
            .insert(id, entity.into_entity(id, Utc::now()));

        tracing::debug!(id, parent_id, "Inserted entity");
        Ok(id)
    }

    fn get_by_id(&self, id: EntityId) -> StorageResult<Option<Entity>> {
        Ok(self.tables.read().entities.get(&id).cloned())
    }

    fn get_children(&self, parent_id: EntityId) -> StorageResult<Vec<Entity>> {
        let tables = self.tables.read();
        let Some(siblings) = tables.children.get(&parent_id) else {
            return Ok(Vec::new());
        };
        let mut result = Vec::with_capacity(siblings.len());
        for child_id in siblings.values() {
            let child = tables.entities.get(child_id).ok_or_else(|| {
                StorageError::Corrupt(format!(
                    "child index references missing entity {}",
                    child_id
                ))
            })?;
            result.push(child.clone());
        }
        Ok(result)
    }

    fn get_by_parent_and_name(
        &self,
        parent_id: EntityId,
        name: &str,
    ) -> StorageResult<Option<Entity>> {
        let tables = self.tables.read();
        let Some(child_id) = tables
            .children
            .get(&parent_id)
            .and_then(|siblings| siblings.get(name))
        else {
            return Ok(None);
        };
        Ok(tables.entities.get(child_id).cloned())
    }

    fn flush(&self) -> StorageResult<()> {
        Ok(())
    }

    fn entity_count(&self) -> StorageResult<usize> {
        Ok(self.tables.read().entities.len())
    }
}
