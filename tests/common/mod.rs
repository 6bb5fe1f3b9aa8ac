// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-07-27

//! Shared fixtures for the CombFS integration tests.

#![allow(dead_code)]

use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path as FsPath;

use combfs::naming::NamingServer;
use combfs::proto::naming::{NamingService, Registration};
use combfs::rmi::Stub;
use combfs::storage::StorageServer;
use tempfile::TempDir;

pub const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A running naming server plus bootstrap stubs for both of its interfaces.
pub struct TestNaming {
    pub server: NamingServer,
    pub service: Stub<NamingService>,
    pub registration: Stub<Registration>,
}

/// Start a naming server on system-chosen ports.
pub fn start_naming() -> TestNaming {
    init_logging();
    let mut server = NamingServer::with_ports(0, 0);
    server.start().expect("start naming server");
    let service = Stub::new(server.service_addr().expect("service address"));
    let registration = Stub::new(server.registration_addr().expect("registration address"));
    TestNaming {
        server,
        service,
        registration,
    }
}

/// Populate a fresh local root with empty files at the given relative paths.
pub fn local_root(files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().expect("create storage root");
    for file in files {
        let target = dir.path().join(file);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).expect("create parent directories");
        }
        fs::write(&target, b"").expect("create file");
    }
    dir
}

/// Start a storage server over `root`, registered with `naming`.
pub fn start_storage(root: &FsPath, naming: &TestNaming) -> StorageServer {
    let mut server = StorageServer::new(root);
    server
        .start(LOCALHOST, &naming.registration)
        .expect("start storage server");
    server
}
