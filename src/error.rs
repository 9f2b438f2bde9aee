//! Error types for the entity store and the namespace engine.

use crate::types::EntityId;
use thiserror::Error;

/// Errors raised by an [`EntityStore`](crate::store::EntityStore) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("an entity named '{name}' already exists under parent {parent_id}")]
    DuplicateSibling { parent_id: EntityId, name: String },

    #[error("parent entity {0} does not exist")]
    ParentNotFound(EntityId),

    #[error("parent entity {0} is not a directory")]
    ParentNotDirectory(EntityId),

    /// Transient I/O failure of the backing store; callers may retry.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The insert committed as entity `id` but the flush to disk failed.
    #[error("entity {id} was stored but could not be flushed: {reason}")]
    NotDurable { id: EntityId, reason: String },
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        match err {
            sled::Error::Io(io) => StorageError::Unavailable(io.to_string()),
            corrupt @ sled::Error::Corruption { .. } => StorageError::Corrupt(corrupt.to_string()),
            other => StorageError::Backend(other.to_string()),
        }
    }
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Corrupt(err.to_string())
    }
}

/// Invalid combination of fields when constructing an entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    #[error("entity name cannot be empty")]
    EmptyName,

    #[error("entity name '{0}' is reserved")]
    ReservedName(String),

    #[error("entity name '{0}' contains a path delimiter or NUL byte")]
    IllegalCharacter(String),

    #[error("directory '{0}' cannot carry content")]
    DirectoryWithContent(String),
}

/// Errors returned by the public [`FileSystem`](crate::filesystem::FileSystem) surface.
#[derive(Debug, Error)]
pub enum NamespaceError {
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("path not found: '{segment}' does not exist in '{path}'")]
    PathNotFound { path: String, segment: String },

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("is a directory: {0}")]
    IsADirectory(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("entity {0} not found")]
    NotFound(EntityId),

    #[error("invalid entity: {0}")]
    InvalidEntity(#[from] EntityError),

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Transient storage failure; safe to retry with backoff.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The entity exists under `id`; only the flush failed. Retrying the
    /// create reports `AlreadyExists`; retry `FileSystem::flush` instead.
    #[error("{path} was created as entity {id} but is not yet durable: {reason}")]
    NotDurable {
        path: String,
        id: EntityId,
        reason: String,
    },

    #[error("storage error: {0}")]
    Storage(StorageError),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl NamespaceError {
    /// Whether a caller may reasonably retry the failed operation.
    pub fn is_transient(&self) -> bool {
        matches!(self, NamespaceError::StorageUnavailable(_))
    }
}

impl From<StorageError> for NamespaceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(msg) => NamespaceError::StorageUnavailable(msg),
            other => NamespaceError::Storage(other),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
pub type NamespaceResult<T> = Result<T, NamespaceError>;
