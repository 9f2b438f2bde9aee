//! Core identifier types for the namespace.

/// EntityId: integer handle of a namespace node, assigned by the entity store
pub type EntityId = u64;

/// Reserved identifier of the namespace root directory
pub const ROOT_ID: EntityId = 1;

/// Parent sentinel carried by the root; never assigned to a real entity
pub const NO_PARENT: EntityId = 0;
