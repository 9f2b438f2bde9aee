use tempfile::TempDir;
use treefs::config::{Durability, IdPolicy};
use treefs::{EntityKind, FileSystem, ROOT_ID};

use super::support::{sled_config, sled_fs};

#[test]
fn namespace_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let (dir, file) = {
        let fs = sled_fs(&temp);
        let dir = fs.create_directory("/persist").unwrap();
        let file = fs.create_file("/persist/note.txt", "kept").unwrap();
        (dir, file)
    };

    let fs = sled_fs(&temp);
    assert_eq!(fs.stat("/persist").unwrap().id, dir);
    assert_eq!(fs.read_file("/persist/note.txt").unwrap(), b"kept".to_vec());
    assert_eq!(fs.get_by_id(file).unwrap().kind, EntityKind::File);

    let next = fs.create_directory("/later").unwrap();
    assert!(next > file, "ids are never reused across sessions");
}

#[test]
fn reset_policy_restarts_session() {
    let temp = TempDir::new().unwrap();
    {
        let fs = sled_fs(&temp);
        fs.create_directory("/old").unwrap();
    }

    let mut config = sled_config(&temp);
    config.storage.ids = IdPolicy::ResetOnOpen;
    let fs = FileSystem::open(&config).unwrap();
    assert!(!fs.exists("/old").unwrap());
    assert_eq!(fs.entity_count().unwrap(), 1);
    assert_eq!(fs.create_directory("/fresh").unwrap(), ROOT_ID + 1);
}

#[test]
fn deferred_durability_with_explicit_flush() {
    let temp = TempDir::new().unwrap();
    let mut config = sled_config(&temp);
    config.storage.durability = Durability::Deferred;
    {
        let fs = FileSystem::open(&config).unwrap();
        fs.create_directory("/buffered").unwrap();
        fs.flush().unwrap();
    }

    let fs = FileSystem::open(&config).unwrap();
    assert!(fs.exists("/buffered").unwrap());
}
