// CLASSIFICATION: COMMUNITY
// Filename: storage_io.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-07-27

//! Byte-level I/O against a registered storage server.

mod common;

use std::fs;

use combfs::proto::storage::StorageError;
use combfs::Path;
use common::{local_root, start_naming, start_storage};

fn path(text: &str) -> Path {
    Path::parse(text).unwrap()
}

#[test]
fn reads_are_bounds_checked() {
    let naming = start_naming();
    let root = local_root(&[]);
    fs::write(root.path().join("data"), [0u8; 10]).unwrap();
    let _storage = start_storage(root.path(), &naming);

    let stub = naming.service.get_storage(&path("/data")).unwrap();
    assert_eq!(stub.size(&path("/data")).unwrap(), 10);
    assert_eq!(stub.read(&path("/data"), 0, 10).unwrap().len(), 10);

    assert!(matches!(
        stub.read(&path("/data"), 0, 11),
        Err(StorageError::OutOfRange(_))
    ));
    assert!(matches!(
        stub.read(&path("/data"), -1, 1),
        Err(StorageError::OutOfRange(_))
    ));
    assert!(matches!(
        stub.read(&path("/data"), 0, -1),
        Err(StorageError::OutOfRange(_))
    ));
}

#[test]
fn writes_replace_extend_and_read_back() {
    let naming = start_naming();
    let root = local_root(&["data"]);
    let _storage = start_storage(root.path(), &naming);

    let stub = naming.service.get_storage(&path("/data")).unwrap();
    stub.write(&path("/data"), 0, vec![1, 2, 3]).unwrap();
    assert_eq!(stub.size(&path("/data")).unwrap(), 3);

    stub.write(&path("/data"), 3, vec![4, 5]).unwrap();
    assert_eq!(stub.size(&path("/data")).unwrap(), 5);
    assert_eq!(stub.read(&path("/data"), 0, 5).unwrap(), vec![1, 2, 3, 4, 5]);

    assert!(matches!(
        stub.write(&path("/data"), -1, vec![0]),
        Err(StorageError::OutOfRange(_))
    ));
}

#[test]
fn io_against_directories_and_missing_files_is_not_found() {
    let naming = start_naming();
    let root = local_root(&["d/inner"]);
    let _storage = start_storage(root.path(), &naming);

    let stub = naming.service.get_storage(&path("/d/inner")).unwrap();
    assert!(matches!(
        stub.size(&path("/d")),
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        stub.size(&path("/ghost")),
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        stub.write(&path("/ghost"), 0, vec![1]),
        Err(StorageError::NotFound(_))
    ));
}

#[test]
fn created_files_are_immediately_writable() {
    let naming = start_naming();
    let root = local_root(&[]);
    let _storage = start_storage(root.path(), &naming);

    naming.service.create_directory(&path("/logs")).unwrap();
    assert!(naming.service.create_file(&path("/logs/today")).unwrap());

    let stub = naming.service.get_storage(&path("/logs/today")).unwrap();
    assert_eq!(stub.size(&path("/logs/today")).unwrap(), 0);
    stub.write(&path("/logs/today"), 0, b"entry".to_vec()).unwrap();
    assert_eq!(
        stub.read(&path("/logs/today"), 0, 5).unwrap(),
        b"entry".to_vec()
    );
}
