//! Entity Store
//!
//! Persistence gateway for namespace entities. Provides indexed lookup by id
//! and by `(parent_id, name)`, and owns identifier assignment.

pub mod memory;
pub mod persistence;

use crate::entity::{Entity, NewEntity};
use crate::error::StorageResult;
use crate::types::EntityId;

pub use memory::MemoryEntityStore;
pub use persistence::SledEntityStore;

/// Entity store interface
///
/// Implementations must make `insert` atomic with its parent and sibling
/// checks, and must keep `get_by_id` and `get_by_parent_and_name` independent
/// of the total number of stored entities.
pub trait EntityStore: Send + Sync {
    /// Assign the next id, store the row and its child index entry.
    fn insert(&self, entity: NewEntity) -> StorageResult<EntityId>;

    fn get_by_id(&self, id: EntityId) -> StorageResult<Option<Entity>>;

    /// Children of `parent_id`, ordered by name bytes.
    fn get_children(&self, parent_id: EntityId) -> StorageResult<Vec<Entity>>;

    fn get_by_parent_and_name(
        &self,
        parent_id: EntityId,
        name: &str,
    ) -> StorageResult<Option<Entity>>;

    /// Force any buffered writes to durable storage.
    fn flush(&self) -> StorageResult<()>;

    /// Number of stored entities, root included.
    fn entity_count(&self) -> StorageResult<usize>;
}

/// Big-endian id key so byte order matches numeric order
pub(crate) fn id_key(id: EntityId) -> [u8; 8] {
    id.to_be_bytes()
}

/// Child index key: parent id prefix followed by the raw name bytes
pub(crate) fn child_key(parent_id: EntityId, name: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(8 + name.len());
    key.extend_from_slice(&parent_id.to_be_bytes());
    key.extend_from_slice(name.as_bytes());
    key
}

pub(crate) fn decode_id(bytes: &[u8]) -> Option<EntityId> {
    let raw: [u8; 8] = bytes.try_into().ok()?;
    Some(EntityId::from_be_bytes(raw))
}
