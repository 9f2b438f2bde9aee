use std::collections::HashSet;

use proptest::prelude::*;
use treefs::{EntityKind, FileSystem, NamespaceError};

fn segment() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,12}"
}

proptest! {
    #[test]
    fn created_directory_appears_in_parent_listing(
        ancestors in prop::collection::vec(segment(), 0..5),
        leaf in segment(),
    ) {
        let fs = FileSystem::in_memory();
        let mut parent = String::new();
        for name in &ancestors {
            parent.push('/');
            parent.push_str(name);
            fs.create_directory(&parent).unwrap();
        }
        let path = format!("{parent}/{leaf}");
        let listing_path = if parent.is_empty() { "/".to_string() } else { parent.clone() };

        let id = fs.create_directory(&path).unwrap();
        let entry = fs
            .list(&listing_path)
            .unwrap()
            .into_iter()
            .find(|e| e.name == leaf)
            .unwrap();
        prop_assert_eq!(entry.kind, EntityKind::Directory);
        prop_assert_eq!(entry.id, id);

        let row = fs.get_by_id(id).unwrap();
        prop_assert_eq!(row.name, leaf);
        prop_assert_eq!(row.parent_id, fs.stat(&listing_path).unwrap().id);
    }

    #[test]
    fn second_create_is_already_exists(name in segment(), as_file in any::<bool>()) {
        let fs = FileSystem::in_memory();
        let path = format!("/{name}");
        fs.create_file(&path, "original").unwrap();
        let count = fs.entity_count().unwrap();

        let err = if as_file {
            fs.create_file(&path, "other").unwrap_err()
        } else {
            fs.create_directory(&path).unwrap_err()
        };
        prop_assert!(matches!(err, NamespaceError::AlreadyExists(_)));
        prop_assert_eq!(fs.entity_count().unwrap(), count);
        prop_assert_eq!(fs.read_file(&path).unwrap(), b"original".to_vec());
    }

    #[test]
    fn paths_through_files_are_not_a_directory(
        file in segment(),
        rest in prop::collection::vec(segment(), 1..4),
    ) {
        let fs = FileSystem::in_memory();
        fs.create_directory("/a").unwrap();
        fs.create_file(&format!("/a/{file}"), "x").unwrap();
        let path = format!("/a/{file}/{}", rest.join("/"));

        prop_assert!(matches!(fs.list(&path), Err(NamespaceError::NotADirectory(_))));
        prop_assert!(matches!(fs.stat(&path), Err(NamespaceError::NotADirectory(_))));
        prop_assert!(matches!(fs.create_directory(&path), Err(NamespaceError::NotADirectory(_))));
    }

    #[test]
    fn listing_returns_each_child_once(names in prop::collection::hash_set(segment(), 0..40)) {
        let fs = FileSystem::in_memory();
        fs.create_directory("/p").unwrap();
        for name in &names {
            fs.create_file(&format!("/p/{name}"), name.as_bytes()).unwrap();
        }

        let entries = fs.list("/p").unwrap();
        prop_assert_eq!(entries.len(), names.len());
        let listed: HashSet<String> = entries.into_iter().map(|e| e.name).collect();
        prop_assert_eq!(listed, names);
    }
}
