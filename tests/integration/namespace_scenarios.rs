use std::collections::HashSet;

use treefs::{EntityKind, NamespaceError, ROOT_ID};

use super::support::backends;

#[test]
fn nested_directories_and_file_listing() {
    for (backend, fs) in backends() {
        fs.create_directory("/docs").unwrap();
        let sub = fs.create_directory("/docs/sub").unwrap();
        let file = fs.create_file("/docs/sub/a.txt", "hello").unwrap();

        let entries = fs.list("/docs/sub").unwrap();
        assert_eq!(entries.len(), 1, "{backend}");
        assert_eq!(entries[0].name, "a.txt");
        assert_eq!(entries[0].kind, EntityKind::File);
        assert_eq!(entries[0].id, file);

        let row = fs.get_by_id(file).unwrap();
        assert_eq!(row.parent_id, sub);
        assert_eq!(row.content.as_deref(), Some(&b"hello"[..]));
    }
}

#[test]
fn missing_ancestor_is_path_not_found() {
    for (backend, fs) in backends() {
        let err = fs.create_directory("/missing/child").unwrap_err();
        match err {
            NamespaceError::PathNotFound { segment, .. } => assert_eq!(segment, "missing", "{backend}"),
            other => panic!("{backend}: unexpected error {other:?}"),
        }
        assert_eq!(fs.entity_count().unwrap(), 1, "{backend}");
    }
}

#[test]
fn duplicate_create_leaves_state_unchanged() {
    for (backend, fs) in backends() {
        fs.create_directory("/dup").unwrap();
        let file = fs.create_file("/dup/f.txt", "first").unwrap();
        let before = fs.entity_count().unwrap();

        assert!(matches!(
            fs.create_file("/dup/f.txt", "second").unwrap_err(),
            NamespaceError::AlreadyExists(_)
        ));
        assert!(matches!(
            fs.create_directory("/dup/f.txt").unwrap_err(),
            NamespaceError::AlreadyExists(_)
        ));
        assert!(matches!(
            fs.create_directory("/dup").unwrap_err(),
            NamespaceError::AlreadyExists(_)
        ));

        assert_eq!(fs.entity_count().unwrap(), before, "{backend}");
        assert_eq!(fs.read_file("/dup/f.txt").unwrap(), b"first".to_vec());
        assert_eq!(fs.list("/dup").unwrap().len(), 1);
        assert_eq!(fs.stat("/dup/f.txt").unwrap().id, file);
    }
}

#[test]
fn creating_below_a_file_is_not_a_directory() {
    for (backend, fs) in backends() {
        fs.create_directory("/a").unwrap();
        fs.create_file("/a/file.txt", "x").unwrap();

        for attempt in [
            fs.create_directory("/a/file.txt/b"),
            fs.create_file("/a/file.txt/b", "y"),
            fs.create_directory("/a/file.txt/b/c"),
        ] {
            assert!(
                matches!(attempt, Err(NamespaceError::NotADirectory(_))),
                "{backend}: {attempt:?}"
            );
        }
        assert!(matches!(
            fs.list("/a/file.txt/b"),
            Err(NamespaceError::NotADirectory(_))
        ));
    }
}

#[test]
fn list_sizes_zero_one_thousand() {
    for (backend, fs) in backends() {
        fs.create_directory("/empty").unwrap();
        assert!(fs.list("/empty").unwrap().is_empty(), "{backend}");

        fs.create_directory("/one").unwrap();
        fs.create_directory("/one/only").unwrap();
        assert_eq!(fs.list("/one").unwrap().len(), 1);

        fs.create_directory("/d").unwrap();
        let mut ids = HashSet::new();
        for i in 0..1000 {
            ids.insert(fs.create_directory(&format!("/d/dir_{i}")).unwrap());
        }
        assert_eq!(ids.len(), 1000);

        let entries = fs.list("/d").unwrap();
        assert_eq!(entries.len(), 1000, "{backend}");
        let names: HashSet<_> = entries.iter().map(|e| e.name.clone()).collect();
        assert_eq!(names.len(), 1000);
        assert!(entries.iter().all(|e| e.kind == EntityKind::Directory));

        let sorted = entries.windows(2).all(|w| w[0].name < w[1].name);
        assert!(sorted, "{backend}: listing should be ordered by name");
    }
}

#[test]
fn ten_level_nesting() {
    for (backend, fs) in backends() {
        let mut path = String::from("/deep");
        fs.create_directory(&path).unwrap();
        for level in 1..=10 {
            path.push_str(&format!("/level{level}"));
            fs.create_directory(&path).unwrap();
        }
        let file_path = format!("{path}/deepfile.txt");
        let id = fs.create_file(&file_path, "File at level 10").unwrap();

        let row = fs.stat(&file_path).unwrap();
        assert_eq!(row.id, id, "{backend}");
        assert_eq!(fs.read_file(&file_path).unwrap(), b"File at level 10".to_vec());
        assert_eq!(fs.list(&path).unwrap()[0].name, "deepfile.txt");
    }
}

#[test]
fn root_lookup_is_stable() {
    for (backend, fs) in backends() {
        fs.create_directory("/x").unwrap();
        for _ in 0..1000 {
            let root = fs.get_by_id(ROOT_ID).unwrap();
            assert!(root.is_root(), "{backend}");
            assert_eq!(root.kind, EntityKind::Directory);
        }
        assert_eq!(fs.list("/").unwrap().len(), 1);
    }
}

#[test]
fn invalid_paths_rejected() {
    for (backend, fs) in backends() {
        for raw in ["relative", "a/b", "/a/../b", "/./a"] {
            assert!(
                matches!(fs.create_directory(raw), Err(NamespaceError::InvalidPath { .. })),
                "{backend}: {raw}"
            );
        }
        assert_eq!(fs.entity_count().unwrap(), 1);
    }
}

#[test]
fn trailing_delimiter_normalized() {
    for (backend, fs) in backends() {
        let id = fs.create_directory("/trail/").unwrap();
        assert_eq!(fs.stat("/trail").unwrap().id, id, "{backend}");
        assert_eq!(fs.stat("//trail//").unwrap().id, id);
        assert!(fs.list("/trail/").unwrap().is_empty());
    }
}
