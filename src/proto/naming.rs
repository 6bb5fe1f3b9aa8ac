// CLASSIFICATION: COMMUNITY
// Filename: naming.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-07-12

//! The two remote interfaces exposed by the naming server.
//!
//! Clients speak `NamingService`; storage servers announce themselves over
//! `Registration`. Both live at well-known ports so that stubs can be built
//! from nothing but a hostname.

use comb_wire::{FaultKind, Path, RemoteFault};
use serde::{Deserialize, Serialize};

use super::storage::{StorageAccess, StorageControl, StorageError};
use super::unexpected_reply;
use crate::rmi::{RemoteInterface, RmiError, Stub};

/// Client-facing interface of the naming server.
#[derive(Debug)]
pub enum NamingService {}

impl RemoteInterface for NamingService {
    const NAME: &'static str = "naming.service";
    type Request = ServiceRequest;
    type Reply = ServiceReply;
}

/// Storage-server-facing registration interface of the naming server.
#[derive(Debug)]
pub enum Registration {}

impl RemoteInterface for Registration {
    const NAME: &'static str = "naming.registration";
    type Request = RegisterRequest;
    type Reply = RegisterReply;
}

/// Client service requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceRequest {
    /// Whether the node at `path` is a directory.
    IsDirectory {
        /// Node to classify.
        path: Path,
    },
    /// Child names of the directory at `path`.
    List {
        /// Directory to list.
        path: Path,
    },
    /// Create an empty file on some registered storage server.
    CreateFile {
        /// File to create.
        path: Path,
    },
    /// Create a directory node in the namespace.
    CreateDirectory {
        /// Directory to create.
        path: Path,
    },
    /// Delete the node at `path`, recursively for directories.
    Delete {
        /// Node to delete.
        path: Path,
    },
    /// The storage handle serving the file at `path`.
    GetStorage {
        /// File to locate.
        path: Path,
    },
}

/// Client service replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceReply {
    /// Whether the node is a directory.
    IsDirectory(bool),
    /// Child names, one component each.
    List(Vec<String>),
    /// Whether a file or directory was created.
    Created(bool),
    /// Whether the node was deleted.
    Deleted(bool),
    /// Storage handle bound to the file.
    Storage(Stub<StorageAccess>),
}

/// Registration requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegisterRequest {
    /// Announce a storage server and the files it already holds.
    Register {
        /// Byte-I/O handle of the joining server.
        storage: Stub<StorageAccess>,
        /// Command handle of the joining server.
        command: Stub<StorageControl>,
        /// Paths of the files present under the server's local root.
        files: Vec<Path>,
    },
}

/// Registration replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegisterReply {
    /// Paths the joining server must delete locally because an incumbent
    /// already serves them.
    ToDelete(Vec<Path>),
}

/// Failures of naming-server operations, local or remote.
#[derive(Debug, thiserror::Error)]
pub enum NamingError {
    /// The path does not resolve, or resolves to the wrong kind of node.
    #[error("not found: {0}")]
    NotFound(String),
    /// One of the presented handles is already in the registry.
    #[error("already registered: {0}")]
    AlreadyRegistered(String),
    /// A remote fault that maps onto none of the variants above.
    #[error(transparent)]
    Fault(RemoteFault),
    /// The invocation layer failed.
    #[error(transparent)]
    Rmi(#[from] RmiError),
}

impl From<RemoteFault> for NamingError {
    fn from(fault: RemoteFault) -> Self {
        match fault.kind {
            FaultKind::NotFound => Self::NotFound(fault.message),
            FaultKind::AlreadyRegistered => Self::AlreadyRegistered(fault.message),
            _ => Self::Fault(fault),
        }
    }
}

impl From<NamingError> for RemoteFault {
    fn from(err: NamingError) -> Self {
        match err {
            NamingError::NotFound(message) => RemoteFault::not_found(message),
            NamingError::AlreadyRegistered(message) => {
                RemoteFault::new(FaultKind::AlreadyRegistered, message)
            }
            NamingError::Fault(fault) => fault,
            NamingError::Rmi(err) => RemoteFault::transport(err.to_string()),
        }
    }
}

impl From<StorageError> for NamingError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Rmi(err) => Self::Rmi(err),
            other => Self::Fault(other.into()),
        }
    }
}

impl Stub<NamingService> {
    /// Whether the node at `path` is a directory.
    pub fn is_directory(&self, path: &Path) -> Result<bool, NamingError> {
        let request = ServiceRequest::IsDirectory { path: path.clone() };
        match self.call(&request)?.map_err(NamingError::from)? {
            ServiceReply::IsDirectory(dir) => Ok(dir),
            other => Err(unexpected_reply(NamingService::NAME, &other).into()),
        }
    }

    /// Child names of the directory at `path`.
    pub fn list(&self, path: &Path) -> Result<Vec<String>, NamingError> {
        let request = ServiceRequest::List { path: path.clone() };
        match self.call(&request)?.map_err(NamingError::from)? {
            ServiceReply::List(names) => Ok(names),
            other => Err(unexpected_reply(NamingService::NAME, &other).into()),
        }
    }

    /// Create an empty file at `path` on some registered storage server.
    pub fn create_file(&self, path: &Path) -> Result<bool, NamingError> {
        let request = ServiceRequest::CreateFile { path: path.clone() };
        match self.call(&request)?.map_err(NamingError::from)? {
            ServiceReply::Created(created) => Ok(created),
            other => Err(unexpected_reply(NamingService::NAME, &other).into()),
        }
    }

    /// Create a directory node at `path`.
    pub fn create_directory(&self, path: &Path) -> Result<bool, NamingError> {
        let request = ServiceRequest::CreateDirectory { path: path.clone() };
        match self.call(&request)?.map_err(NamingError::from)? {
            ServiceReply::Created(created) => Ok(created),
            other => Err(unexpected_reply(NamingService::NAME, &other).into()),
        }
    }

    /// Delete the node at `path`, recursively for directories.
    pub fn delete(&self, path: &Path) -> Result<bool, NamingError> {
        let request = ServiceRequest::Delete { path: path.clone() };
        match self.call(&request)?.map_err(NamingError::from)? {
            ServiceReply::Deleted(deleted) => Ok(deleted),
            other => Err(unexpected_reply(NamingService::NAME, &other).into()),
        }
    }

    /// The storage handle serving the file at `path`.
    pub fn get_storage(&self, path: &Path) -> Result<Stub<StorageAccess>, NamingError> {
        let request = ServiceRequest::GetStorage { path: path.clone() };
        match self.call(&request)?.map_err(NamingError::from)? {
            ServiceReply::Storage(stub) => Ok(stub),
            other => Err(unexpected_reply(NamingService::NAME, &other).into()),
        }
    }
}

impl Stub<Registration> {
    /// Announce a storage server, returning the paths it must delete
    /// locally.
    pub fn register(
        &self,
        storage: Stub<StorageAccess>,
        command: Stub<StorageControl>,
        files: Vec<Path>,
    ) -> Result<Vec<Path>, NamingError> {
        let request = RegisterRequest::Register {
            storage,
            command,
            files,
        };
        match self.call(&request)?.map_err(NamingError::from)? {
            RegisterReply::ToDelete(paths) => Ok(paths),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faults_map_onto_domain_errors() {
        let err = NamingError::from(RemoteFault::not_found("no node"));
        assert!(matches!(err, NamingError::NotFound(_)));

        let err = NamingError::from(RemoteFault::new(FaultKind::AlreadyRegistered, "dup"));
        assert!(matches!(err, NamingError::AlreadyRegistered(_)));
    }

    #[test]
    fn register_request_carries_stubs() {
        let storage = Stub::<StorageAccess>::new(([10, 0, 0, 2], 4000).into());
        let command = Stub::<StorageControl>::new(([10, 0, 0, 2], 4001).into());
        let request = RegisterRequest::Register {
            storage,
            command,
            files: vec![Path::parse("/a").unwrap()],
        };
        let bytes = rmp_serde::to_vec(&request).unwrap();
        let back: RegisterRequest = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(back, request);
    }
}
