//! Treefs: Path-Addressable Hierarchical Namespace
//!
//! Directories and files addressed by slash-delimited absolute paths, stored
//! as a flat entity table keyed by integer ids and indexed by
//! `(parent_id, name)`.

pub mod config;
pub mod entity;
pub mod error;
pub mod filesystem;
pub mod logging;
pub mod path;
pub mod store;
pub mod types;

pub use entity::{DirEntry, Entity, EntityKind, NewEntity};
pub use error::{NamespaceError, NamespaceResult, StorageError};
pub use filesystem::FileSystem;
pub use types::{EntityId, NO_PARENT, ROOT_ID};
