// CLASSIFICATION: COMMUNITY
// Filename: namespace_ops.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-07-27

//! Client-facing namespace operations end to end.

mod common;

use combfs::proto::naming::NamingError;
use combfs::rmi::RmiError;
use combfs::Path;
use common::{local_root, start_naming, start_storage};

fn path(text: &str) -> Path {
    Path::parse(text).unwrap()
}

#[test]
fn create_file_requires_an_existing_parent() {
    let naming = start_naming();
    let root = local_root(&[]);
    let storage = start_storage(root.path(), &naming);

    assert!(matches!(
        naming.service.create_file(&path("/x/y")),
        Err(NamingError::NotFound(_))
    ));

    assert!(naming.service.create_directory(&path("/x")).unwrap());
    assert!(naming.service.create_file(&path("/x/y")).unwrap());
    assert_eq!(
        naming.service.get_storage(&path("/x/y")).unwrap(),
        storage.storage_stub().unwrap()
    );
    // The file materialized on the storage server's disk.
    assert!(root.path().join("x/y").is_file());
}

#[test]
fn create_file_is_idempotent_in_the_negative() {
    let naming = start_naming();
    let root = local_root(&["a"]);
    let _storage = start_storage(root.path(), &naming);

    assert!(!naming.service.create_file(&path("/a")).unwrap());
    assert_eq!(naming.service.list(&Path::root()).unwrap(), vec!["a"]);
}

#[test]
fn create_file_without_storage_servers_is_a_transport_error() {
    let naming = start_naming();

    let result = naming.service.create_file(&path("/orphan"));
    assert!(matches!(
        result,
        Err(NamingError::Rmi(RmiError::Upstream(_)))
    ));
}

#[test]
fn create_directory_collisions_return_false() {
    let naming = start_naming();
    assert!(naming.service.create_directory(&path("/d")).unwrap());
    assert!(!naming.service.create_directory(&path("/d")).unwrap());
    assert!(matches!(
        naming.service.create_directory(&path("/missing/child")),
        Err(NamingError::NotFound(_))
    ));
}

#[test]
fn delete_removes_the_subtree_everywhere() {
    let naming = start_naming();
    let root = local_root(&["a", "b/c", "b/d"]);
    let _storage = start_storage(root.path(), &naming);

    assert!(naming.service.delete(&path("/b")).unwrap());

    assert!(matches!(
        naming.service.is_directory(&path("/b")),
        Err(NamingError::NotFound(_))
    ));
    assert!(matches!(
        naming.service.is_directory(&path("/b/c")),
        Err(NamingError::NotFound(_))
    ));
    assert_eq!(naming.service.list(&Path::root()).unwrap(), vec!["a"]);
    // The storage server's on-disk subtree is gone too.
    assert!(!root.path().join("b").exists());
}

#[test]
fn the_root_cannot_be_deleted() {
    let naming = start_naming();
    assert!(!naming.service.delete(&Path::root()).unwrap());
    assert!(naming.service.is_directory(&Path::root()).unwrap());
}

#[test]
fn missing_nodes_surface_not_found() {
    let naming = start_naming();
    assert!(matches!(
        naming.service.is_directory(&path("/nowhere")),
        Err(NamingError::NotFound(_))
    ));
    assert!(matches!(
        naming.service.delete(&path("/nowhere")),
        Err(NamingError::NotFound(_))
    ));
    assert!(matches!(
        naming.service.get_storage(&path("/nowhere")),
        Err(NamingError::NotFound(_))
    ));
}

#[test]
fn listing_a_file_is_not_found() {
    let naming = start_naming();
    let root = local_root(&["plain"]);
    let _storage = start_storage(root.path(), &naming);

    assert!(matches!(
        naming.service.list(&path("/plain")),
        Err(NamingError::NotFound(_))
    ));
    // Directories, conversely, have no storage handle.
    assert!(matches!(
        naming.service.get_storage(&Path::root()),
        Err(NamingError::NotFound(_))
    ));
}
