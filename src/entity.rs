//! Entity model
//!
//! The persisted representation of a namespace node. Entities reference their
//! parent by id; directories never embed a child list.

use crate::error::EntityError;
use crate::types::{EntityId, NO_PARENT, ROOT_ID};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Node kind enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Directory,
    File,
}

impl EntityKind {
    pub fn is_directory(self) -> bool {
        self == EntityKind::Directory
    }

    pub fn is_file(self) -> bool {
        self == EntityKind::File
    }
}

/// Entity: a stored directory or file row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub parent_id: EntityId,
    pub name: String,
    pub kind: EntityKind,
    /// File bytes; `None` for directories, possibly empty for files
    pub content: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
}

impl Entity {
    /// The namespace root row.
    pub fn root(created_at: DateTime<Utc>) -> Self {
        Entity {
            id: ROOT_ID,
            parent_id: NO_PARENT,
            name: String::new(),
            kind: EntityKind::Directory,
            content: None,
            created_at,
        }
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    pub fn is_directory(&self) -> bool {
        self.kind.is_directory()
    }

    /// Listing descriptor for this entity
    pub fn descriptor(&self) -> DirEntry {
        DirEntry {
            name: self.name.clone(),
            kind: self.kind,
            id: self.id,
        }
    }
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntityKind,
    pub id: EntityId,
}

/// An entity that has been validated but not yet assigned an id.
///
/// Fields are private so every instance has passed [`NewEntity::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntity {
    parent_id: EntityId,
    name: String,
    kind: EntityKind,
    content: Option<Vec<u8>>,
}

impl NewEntity {
    /// Validate the name and the kind/content pairing.
    ///
    /// The name is stored in NFC form, matching the segments produced by
    /// path parsing.
    ///
    /// A file without content is stored with empty content. A directory
    /// carrying content is rejected.
    pub fn new(
        parent_id: EntityId,
        name: impl Into<String>,
        kind: EntityKind,
        content: Option<Vec<u8>>,
    ) -> Result<Self, EntityError> {
        let name: String = name.into();
        let name: String = name.as_str().nfc().collect();
        validate_name(&name)?;

        let content = match kind {
            EntityKind::Directory => {
                if content.is_some() {
                    return Err(EntityError::DirectoryWithContent(name));
                }
                None
            }
            EntityKind::File => Some(content.unwrap_or_default()),
        };

        Ok(NewEntity {
            parent_id,
            name,
            kind,
            content,
        })
    }

    pub fn directory(parent_id: EntityId, name: impl Into<String>) -> Result<Self, EntityError> {
        Self::new(parent_id, name, EntityKind::Directory, None)
    }

    pub fn file(
        parent_id: EntityId,
        name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Result<Self, EntityError> {
        Self::new(parent_id, name, EntityKind::File, Some(content.into()))
    }

    pub fn parent_id(&self) -> EntityId {
        self.parent_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Materialize the stored row once the store has assigned an id.
    pub fn into_entity(self, id: EntityId, created_at: DateTime<Utc>) -> Entity {
        Entity {
            id,
            parent_id: self.parent_id,
            name: self.name,
            kind: self.kind,
            content: self.content,
            created_at,
        }
    }
}

fn validate_name(name: &str) -> Result<(), EntityError> {
    if name.is_empty() {
        return Err(EntityError::EmptyName);
    }
    if name == "." || name == ".." {
        return Err(EntityError::ReservedName(name.to_string()));
    }
    if name.contains('/') || name.contains('\0') {
        return Err(EntityError::IllegalCharacter(name.to_string()));
    }
    Ok(())
}
