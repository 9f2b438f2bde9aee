//! Sled-backed entity store
//!
//! Three trees share one database:
//! - `entities`: big-endian id -> bincode [`Entity`]
//! - `children`: big-endian parent id ++ name bytes -> big-endian child id
//! - `meta`: `next_id` -> big-endian id counter, plus a reset marker
//!
//! Every insert runs as a single transaction across all three trees. The id
//! counter only moves forward: reopening never hands out an id at or below
//! the highest stored entity.

use crate::config::{Durability, IdPolicy, StorageConfig};
use crate::entity::{Entity, NewEntity};
use crate::error::{StorageError, StorageResult};
use crate::store::{child_key, decode_id, id_key, EntityStore};
use crate::types::{EntityId, ROOT_ID};
use chrono::Utc;
use sled::transaction::{abort, ConflictableTransactionError, TransactionError};
use sled::Transactional;
use std::path::Path;

const ENTITIES_TREE: &str = "entities";
const CHILDREN_TREE: &str = "children";
const META_TREE: &str = "meta";
const NEXT_ID_KEY: &[u8] = b"next_id";
const RESET_PENDING_KEY: &[u8] = b"reset_pending";

pub struct SledEntityStore {
    db: sled::Db,
    entities: sled::Tree,
    children: sled::Tree,
    meta: sled::Tree,
    durability: Durability,
}

impl SledEntityStore {
    /// Open (or create) a store at `path` and make sure the root exists.
    pub fn open(path: &Path, config: &StorageConfig) -> StorageResult<Self> {
        let mut sled_config = sled::Config::new().path(path);
        if let Some(capacity) = config.cache_capacity {
            sled_config = sled_config.cache_capacity(capacity);
        }
        let db = sled_config.open()?;
        let store = Self::from_db(db, config.durability)?;

        // A reset interrupted by a crash is finished whatever the policy.
        if config.ids == IdPolicy::ResetOnOpen || store.meta.contains_key(RESET_PENDING_KEY)? {
            store.clear()?;
        }
        store.ensure_root()?;

        tracing::info!(
            path = %path.display(),
            entities = store.entities.len(),
            ids = ?config.ids,
            "Opened sled entity store"
        );
        Ok(store)
    }

    /// Open a throwaway store that is deleted when dropped.
    pub fn temporary() -> StorageResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        let store = Self::from_db(db, Durability::Deferred)?;
        store.ensure_root()?;
        Ok(store)
    }

    fn from_db(db: sled::Db, durability: Durability) -> StorageResult<Self> {
        let entities = db.open_tree(ENTITIES_TREE)?;
        let children = db.open_tree(CHILDREN_TREE)?;
        let meta = db.open_tree(META_TREE)?;
        Ok(Self {
            db,
            entities,
            children,
            meta,
            durability,
        })
    }

    /// Wipe every tree. The marker is written and flushed first and removed
    /// last, so a crash midway leaves a store that the next open resets again.
    fn clear(&self) -> StorageResult<()> {
        self.meta.insert(RESET_PENDING_KEY, &b"1"[..])?;
        self.db.flush()?;
        self.entities.clear()?;
        self.children.clear()?;
        self.meta.clear()?;
        self.db.flush()?;
        tracing::debug!("Cleared entity store for a fresh id session");
        Ok(())
    }

    /// Create the root if missing and make sure the id counter sits above
    /// every stored entity.
    fn ensure_root(&self) -> StorageResult<()> {
        let root = Entity::root(Utc::now());
        let floor = self.next_id_floor()?;

        let repaired = (&self.entities, &self.meta)
            .transaction(|(entities, meta)| {
                let mut repaired = false;
                match entities.get(id_key(ROOT_ID))? {
                    Some(existing) => {
                        let existing =
                            decode_entity(&existing).map_err(ConflictableTransactionError::Abort)?;
                        if !existing.is_directory() {
                            return abort(StorageError::Corrupt(
                                "root entity is not a directory".to_string(),
                            ));
                        }
                    }
                    None => {
                        let encoded =
                            encode_entity(&root).map_err(ConflictableTransactionError::Abort)?;
                        entities.insert(&id_key(ROOT_ID)[..], encoded)?;
                        repaired = true;
                    }
                }

                let stored = match meta.get(NEXT_ID_KEY)? {
                    Some(bytes) => match decode_id(&bytes) {
                        Some(id) => Some(id),
                        None => {
                            return abort(StorageError::Corrupt(
                                "malformed id counter".to_string(),
                            ))
                        }
                    },
                    None => None,
                };
                let next = stored.unwrap_or(floor).max(floor);
                if stored != Some(next) {
                    meta.insert(NEXT_ID_KEY, &id_key(next)[..])?;
                    repaired = true;
                }
                Ok(repaired)
            })
            .map_err(from_transaction_error)?;

        if repaired {
            self.db.flush()?;
            tracing::debug!(floor, "Initialized root entity and id counter");
        }
        Ok(())
    }

    /// Lowest id that no stored entity uses.
    fn next_id_floor(&self) -> StorageResult<EntityId> {
        let highest = match self.entities.last()? {
            Some((key, _)) => decode_id(&key).ok_or_else(|| {
                StorageError::Corrupt(format!("malformed entity key {:?}", key))
            })?,
            None => ROOT_ID,
        };
        Ok(highest.max(ROOT_ID) + 1)
    }

    fn load(&self, id: EntityId) -> StorageResult<Option<Entity>> {
        match self.entities.get(id_key(id))? {
            Some(bytes) => Ok(Some(decode_entity(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl EntityStore for SledEntityStore {
    fn insert(&self, entity: NewEntity) -> StorageResult<EntityId> {
        let created_at = Utc::now();
        let parent_id = entity.parent_id();
        let key = child_key(parent_id, entity.name());

        let id = (&self.entities, &self.children, &self.meta)
            .transaction(|(entities, children, meta)| {
                let parent = match entities.get(id_key(parent_id))? {
                    Some(bytes) => {
                        decode_entity(&bytes).map_err(ConflictableTransactionError::Abort)?
                    }
                    None => return abort(StorageError::ParentNotFound(parent_id)),
                };
                if !parent.is_directory() {
                    return abort(StorageError::ParentNotDirectory(parent_id));
                }
                if children.get(&key)?.is_some() {
                    return abort(StorageError::DuplicateSibling {
                        parent_id,
                        name: entity.name().to_string(),
                    });
                }

                let id = match meta.get(NEXT_ID_KEY)? {
                    Some(bytes) => match decode_id(&bytes) {
                        Some(id) => id,
                        None => {
                            return abort(StorageError::Corrupt(
                                "malformed id counter".to_string(),
                            ))
                        }
                    },
                    None => {
                        return abort(StorageError::Corrupt("missing id counter".to_string()))
                    }
                };

                let row = entity.clone().into_entity(id, created_at);
                let encoded = encode_entity(&row).map_err(ConflictableTransactionError::Abort)?;
                entities.insert(&id_key(id)[..], encoded)?;
                children.insert(key.as_slice(), &id_key(id)[..])?;
                meta.insert(NEXT_ID_KEY, &id_key(id + 1)[..])?;
                Ok(id)
            })
            .map_err(from_transaction_error)?;

        tracing::debug!(id, parent_id, name = entity.name(), "Inserted entity");
        if self.durability == Durability::Immediate {
            return committed(id, self.db.flush());
        }
        Ok(id)
    }

    fn get_by_id(&self, id: EntityId) -> StorageResult<Option<Entity>> {
        self.load(id)
    }

    fn get_children(&self, parent_id: EntityId) -> StorageResult<Vec<Entity>> {
        let mut result = Vec::new();
        for item in self.children.scan_prefix(id_key(parent_id)) {
            let (key, value) = item?;
            let child_id = decode_id(&value).ok_or_else(|| {
                StorageError::Corrupt(format!("malformed child index value for key {:?}", key))
            })?;
            let child = self.load(child_id)?.ok_or_else(|| {
                StorageError::Corrupt(format!(
                    "child index references missing entity {}",
                    child_id
                ))
            })?;
            result.push(child);
        }
        Ok(result)
    }

    fn get_by_parent_and_name(
        &self,
        parent_id: EntityId,
        name: &str,
    ) -> StorageResult<Option<Entity>> {
        let Some(value) = self.children.get(child_key(parent_id, name))? else {
            return Ok(None);
        };
        let child_id = decode_id(&value).ok_or_else(|| {
            StorageError::Corrupt(format!("malformed child index value for '{}'", name))
        })?;
        match self.load(child_id)? {
            Some(entity) => Ok(Some(entity)),
            None => Err(StorageError::Corrupt(format!(
                "child index references missing entity {}",
                child_id
            ))),
        }
    }

    fn flush(&self) -> StorageResult<()> {
        self.db.flush()?;
        Ok(())
    }

    fn entity_count(&self) -> StorageResult<usize> {
        Ok(self.entities.len())
    }
}

fn encode_entity(entity: &Entity) -> StorageResult<Vec<u8>> {
    Ok(bincode::serialize(entity)?)
}

fn decode_entity(bytes: &[u8]) -> StorageResult<Entity> {
    Ok(bincode::deserialize(bytes)?)
}

/// Outcome of an insert whose transaction already committed as `id`.
fn committed(id: EntityId, flushed: sled::Result<usize>) -> StorageResult<EntityId> {
    match flushed {
        Ok(_) => Ok(id),
        Err(err) => {
            tracing::warn!(id, error = %err, "Inserted entity could not be flushed");
            Err(StorageError::NotDurable {
                id,
                reason: err.to_string(),
            })
        }
    }
}

fn from_transaction_error(err: TransactionError<StorageError>) -> StorageError {
    match err {
        TransactionError::Abort(err) => err,
        TransactionError::Storage(err) => err.into(),
    }
}
