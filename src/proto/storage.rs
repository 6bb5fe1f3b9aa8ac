// CLASSIFICATION: COMMUNITY
// Filename: storage.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-07-12

//! The two remote interfaces exposed by every storage server.
//!
//! `StorageAccess` carries bulk byte I/O; `StorageControl` carries the
//! mutation commands the naming server issues on behalf of clients. Offsets
//! and lengths travel as signed integers so that out-of-range arguments are
//! representable and rejected by the server rather than mangled by the
//! codec.

use comb_wire::{FaultKind, Path, RemoteFault};
use serde::{Deserialize, Serialize};

use super::unexpected_reply;
use crate::rmi::{RemoteInterface, RmiError, Stub};

/// Bulk byte-I/O interface of a storage server.
#[derive(Debug)]
pub enum StorageAccess {}

impl RemoteInterface for StorageAccess {
    const NAME: &'static str = "storage.access";
    type Request = AccessRequest;
    type Reply = AccessReply;
}

/// Mutation-command interface of a storage server.
#[derive(Debug)]
pub enum StorageControl {}

impl RemoteInterface for StorageControl {
    const NAME: &'static str = "storage.control";
    type Request = ControlRequest;
    type Reply = ControlReply;
}

/// Byte-I/O requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessRequest {
    /// Length in bytes of the file at `path`.
    Size {
        /// File to measure.
        path: Path,
    },
    /// Read `length` bytes starting at `offset`.
    Read {
        /// File to read.
        path: Path,
        /// Starting byte offset; negative values are out of range.
        offset: i64,
        /// Number of bytes requested; negative values are out of range.
        length: i64,
    },
    /// Write `data` starting at `offset`.
    Write {
        /// File to write.
        path: Path,
        /// Starting byte offset; negative values are out of range.
        offset: i64,
        /// Bytes to write.
        data: Vec<u8>,
    },
}

/// Byte-I/O replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessReply {
    /// File length in bytes.
    Size(u64),
    /// Bytes read.
    Read(Vec<u8>),
    /// Write completed.
    Written,
}

/// Mutation requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlRequest {
    /// Create an empty file, making parent directories as needed.
    Create {
        /// File to create.
        path: Path,
    },
    /// Recursively delete a file or directory subtree.
    Delete {
        /// Subtree root to remove.
        path: Path,
    },
}

/// Mutation replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlReply {
    /// Whether the file was created.
    Created(bool),
    /// Whether anything was deleted.
    Deleted(bool),
}

/// Failures of storage-server operations, local or remote.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The path does not refer to an existing file.
    #[error("not found: {0}")]
    NotFound(String),
    /// Byte-range arguments fall outside the file.
    #[error("out of range: {0}")]
    OutOfRange(String),
    /// Local disk I/O failed.
    #[error("i/o failure: {0}")]
    Io(String),
    /// A remote fault that maps onto none of the variants above.
    #[error(transparent)]
    Fault(RemoteFault),
    /// The invocation layer failed.
    #[error(transparent)]
    Rmi(#[from] RmiError),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<StorageError> for RemoteFault {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(message) => RemoteFault::not_found(message),
            StorageError::OutOfRange(message) => RemoteFault::out_of_range(message),
            StorageError::Io(message) => RemoteFault::new(FaultKind::Io, message),
            StorageError::Fault(fault) => fault,
            StorageError::Rmi(err) => RemoteFault::transport(err.to_string()),
        }
    }
}

impl From<RemoteFault> for StorageError {
    fn from(fault: RemoteFault) -> Self {
        match fault.kind {
            FaultKind::NotFound => Self::NotFound(fault.message),
            FaultKind::OutOfRange => Self::OutOfRange(fault.message),
            FaultKind::Io => Self::Io(fault.message),
            _ => Self::Fault(fault),
        }
    }
}

impl Stub<StorageAccess> {
    /// Length in bytes of the file at `path`.
    pub fn size(&self, path: &Path) -> Result<u64, StorageError> {
        let request = AccessRequest::Size { path: path.clone() };
        match self.call(&request)?.map_err(StorageError::from)? {
            AccessReply::Size(len) => Ok(len),
            other => Err(unexpected_reply(StorageAccess::NAME, &other).into()),
        }
    }

    /// Read `length` bytes starting at `offset`.
    pub fn read(&self, path: &Path, offset: i64, length: i64) -> Result<Vec<u8>, StorageError> {
        let request = AccessRequest::Read {
            path: path.clone(),
            offset,
            length,
        };
        match self.call(&request)?.map_err(StorageError::from)? {
            AccessReply::Read(data) => Ok(data),
            other => Err(unexpected_reply(StorageAccess::NAME, &other).into()),
        }
    }

    /// Write `data` starting at `offset`.
    pub fn write(&self, path: &Path, offset: i64, data: Vec<u8>) -> Result<(), StorageError> {
        let request = AccessRequest::Write {
            path: path.clone(),
            offset,
            data,
        };
        match self.call(&request)?.map_err(StorageError::from)? {
            AccessReply::Written => Ok(()),
            other => Err(unexpected_reply(StorageAccess::NAME, &other).into()),
        }
    }
}

impl Stub<StorageControl> {
    /// Create an empty file, making parent directories as needed.
    pub fn create(&self, path: &Path) -> Result<bool, StorageError> {
        let request = ControlRequest::Create { path: path.clone() };
        match self.call(&request)?.map_err(StorageError::from)? {
            ControlReply::Created(created) => Ok(created),
            other => Err(unexpected_reply(StorageControl::NAME, &other).into()),
        }
    }

    /// Recursively delete the subtree rooted at `path`.
    pub fn delete(&self, path: &Path) -> Result<bool, StorageError> {
        let request = ControlRequest::Delete { path: path.clone() };
        match self.call(&request)?.map_err(StorageError::from)? {
            ControlReply::Deleted(deleted) => Ok(deleted),
            other => Err(unexpected_reply(StorageControl::NAME, &other).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faults_map_onto_domain_errors() {
        let err = StorageError::from(RemoteFault::not_found("gone"));
        assert!(matches!(err, StorageError::NotFound(_)));

        let err = StorageError::from(RemoteFault::out_of_range("offset -1"));
        assert!(matches!(err, StorageError::OutOfRange(_)));

        let err = StorageError::from(RemoteFault::new(FaultKind::AlreadyRegistered, "x"));
        assert!(matches!(err, StorageError::Fault(_)));
    }

    #[test]
    fn domain_errors_map_back_onto_faults() {
        let fault = RemoteFault::from(StorageError::OutOfRange("length -5".into()));
        assert_eq!(fault.kind, FaultKind::OutOfRange);
        let fault = RemoteFault::from(StorageError::Io("disk full".into()));
        assert_eq!(fault.kind, FaultKind::Io);
    }

    #[test]
    fn requests_round_trip() {
        let request = AccessRequest::Read {
            path: Path::parse("/a/b").unwrap(),
            offset: 0,
            length: 16,
        };
        let bytes = rmp_serde::to_vec(&request).unwrap();
        let back: AccessRequest = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(back, request);
    }
}
