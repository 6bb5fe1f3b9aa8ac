// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.4
// Author: Lukas Bower
// Date Modified: 2026-07-26

//! The storage server.
//!
//! A storage server exposes the files under one local directory. It answers
//! byte-level reads and writes on the access interface and create/delete
//! commands on the control interface, and at startup registers both of its
//! own stubs with the naming server, deleting whichever local files an
//! incumbent already serves.

use std::fs;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path as FsPath, PathBuf};
use std::sync::{Arc, Mutex};

use comb_wire::{Path, RemoteFault};
use log::{info, warn};

use crate::proto::naming::{NamingError, Registration};
use crate::proto::storage::{
    AccessReply, AccessRequest, ControlReply, ControlRequest, StorageAccess, StorageControl,
    StorageError,
};
use crate::rmi::{Dispatch, Skeleton, Stub};

/// The on-disk view of the namespace under one local root.
///
/// All methods assume the caller holds the server's coarse lock; the store
/// itself performs no locking.
struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    fn resolve(&self, path: &Path) -> PathBuf {
        path.resolve(&self.root)
    }

    fn file_meta(&self, path: &Path) -> Result<fs::Metadata, StorageError> {
        let target = self.resolve(path);
        let meta = fs::metadata(&target)
            .map_err(|_| StorageError::NotFound(format!("no file at {path}")))?;
        if meta.is_dir() {
            return Err(StorageError::NotFound(format!("{path} is a directory")));
        }
        Ok(meta)
    }

    fn size(&self, path: &Path) -> Result<u64, StorageError> {
        Ok(self.file_meta(path)?.len())
    }

    fn read(&self, path: &Path, offset: i64, length: i64) -> Result<Vec<u8>, StorageError> {
        let meta = self.file_meta(path)?;
        if offset < 0 || length < 0 {
            return Err(StorageError::OutOfRange(format!(
                "negative range ({offset}, {length}) for {path}"
            )));
        }
        let end = (offset as u64)
            .checked_add(length as u64)
            .filter(|end| *end <= meta.len())
            .ok_or_else(|| {
                StorageError::OutOfRange(format!(
                    "range ({offset}, {length}) exceeds {} bytes of {path}",
                    meta.len()
                ))
            })?;
        let contents = fs::read(self.resolve(path))?;
        Ok(contents[offset as usize..end as usize].to_vec())
    }

    /// Write `data` at `offset`. Offset zero replaces the file outright;
    /// otherwise the prefix up to `offset` survives (zero-filled past the
    /// old end) and the file afterwards is exactly `offset + data.len()`
    /// bytes long.
    fn write(&self, path: &Path, offset: i64, data: &[u8]) -> Result<(), StorageError> {
        self.file_meta(path)?;
        if offset < 0 {
            return Err(StorageError::OutOfRange(format!(
                "negative offset {offset} for {path}"
            )));
        }
        let target = self.resolve(path);
        if offset == 0 {
            fs::write(&target, data)?;
            return Ok(());
        }
        let offset = offset as usize;
        let existing = fs::read(&target)?;
        let mut contents = vec![0u8; offset + data.len()];
        let keep = existing.len().min(offset);
        contents[..keep].copy_from_slice(&existing[..keep]);
        contents[offset..].copy_from_slice(data);
        fs::write(&target, &contents)?;
        Ok(())
    }

    fn create(&self, path: &Path) -> Result<bool, StorageError> {
        if path.is_root() {
            return Ok(false);
        }
        let target = self.resolve(path);
        if target.exists() {
            return Ok(false);
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::File::create(&target)?;
        Ok(true)
    }

    fn delete(&self, path: &Path) -> Result<bool, StorageError> {
        if path.is_root() {
            return Ok(false);
        }
        let target = self.resolve(path);
        let meta = match fs::symlink_metadata(&target) {
            Ok(meta) => meta,
            Err(_) => return Ok(false),
        };
        if meta.is_dir() {
            fs::remove_dir_all(&target)?;
        } else {
            fs::remove_file(&target)?;
        }
        Ok(true)
    }

    /// Remove directories left empty below the root, deepest first.
    fn prune_empty_dirs(&self) -> io::Result<()> {
        prune_below(&self.root)?;
        Ok(())
    }
}

fn prune_below(dir: &FsPath) -> io::Result<bool> {
    let mut occupied = false;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            let child = entry.path();
            if prune_below(&child)? {
                occupied = true;
            } else {
                fs::remove_dir(&child)?;
            }
        } else {
            occupied = true;
        }
    }
    Ok(occupied)
}

/// Server object behind both storage skeletons.
///
/// One coarse mutex serializes every remote operation, making each read,
/// write, create, and delete atomic with respect to the others.
pub struct StorageCore {
    store: Mutex<DiskStore>,
}

impl StorageCore {
    fn locked(&self) -> Result<std::sync::MutexGuard<'_, DiskStore>, StorageError> {
        self.store
            .lock()
            .map_err(|_| StorageError::Io("storage lock poisoned".into()))
    }
}

impl Dispatch<StorageAccess> for StorageCore {
    fn dispatch(&self, request: AccessRequest) -> Result<AccessReply, RemoteFault> {
        let store = self.locked().map_err(RemoteFault::from)?;
        match request {
            AccessRequest::Size { path } => store
                .size(&path)
                .map(AccessReply::Size)
                .map_err(Into::into),
            AccessRequest::Read {
                path,
                offset,
                length,
            } => store
                .read(&path, offset, length)
                .map(AccessReply::Read)
                .map_err(Into::into),
            AccessRequest::Write { path, offset, data } => store
                .write(&path, offset, &data)
                .map(|()| AccessReply::Written)
                .map_err(Into::into),
        }
    }
}

impl Dispatch<StorageControl> for StorageCore {
    fn dispatch(&self, request: ControlRequest) -> Result<ControlReply, RemoteFault> {
        let store = self.locked().map_err(RemoteFault::from)?;
        match request {
            ControlRequest::Create { path } => store
                .create(&path)
                .map(ControlReply::Created)
                .map_err(Into::into),
            ControlRequest::Delete { path } => store
                .delete(&path)
                .map(ControlReply::Deleted)
                .map_err(Into::into),
        }
    }
}

/// A storage server hosting one local directory subtree.
pub struct StorageServer {
    core: Arc<StorageCore>,
    root: PathBuf,
    access: Skeleton<StorageAccess>,
    control: Skeleton<StorageControl>,
    storage_stub: Option<Stub<StorageAccess>>,
    command_stub: Option<Stub<StorageControl>>,
    on_stopped: Option<Box<dyn FnOnce() + Send>>,
}

impl StorageServer {
    /// Create a storage server over `root`. Nothing is validated or bound
    /// until `start`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let core = Arc::new(StorageCore {
            store: Mutex::new(DiskStore { root: root.clone() }),
        });
        let access = Skeleton::new(core.clone() as Arc<dyn Dispatch<StorageAccess>>);
        let control = Skeleton::new(core.clone() as Arc<dyn Dispatch<StorageControl>>);
        Self {
            core,
            root,
            access,
            control,
            storage_stub: None,
            command_stub: None,
            on_stopped: None,
        }
    }

    /// Install a callback invoked once when the server stops.
    pub fn on_stopped(&mut self, hook: Box<dyn FnOnce() + Send>) {
        self.on_stopped = Some(hook);
    }

    /// Start the server and register it with the naming server.
    ///
    /// `host` is the externally-routable address of this machine; both
    /// skeletons bind to it so the stubs shipped to the naming server are
    /// reachable from outside. Files the naming server already knows are
    /// deleted locally, and directories left empty are pruned.
    pub fn start(
        &mut self,
        host: IpAddr,
        naming: &Stub<Registration>,
    ) -> Result<(), StorageError> {
        let meta = fs::metadata(&self.root).map_err(|_| {
            StorageError::NotFound(format!("storage root {} does not exist", self.root.display()))
        })?;
        if !meta.is_dir() {
            return Err(StorageError::NotFound(format!(
                "storage root {} is not a directory",
                self.root.display()
            )));
        }

        self.access.set_host(host)?;
        self.control.set_host(host)?;
        self.access.start()?;
        self.control.start()?;

        let storage_stub = Stub::from_skeleton(&self.access)?;
        let command_stub = Stub::from_skeleton(&self.control)?;
        let files = Path::scan(&self.root)?;
        let announced = files.len();

        let ceded = naming
            .register(storage_stub, command_stub, files)
            .map_err(|err| match err {
                NamingError::Rmi(err) => StorageError::Rmi(err),
                other => StorageError::Fault(other.into()),
            })?;

        {
            let store = self.core.locked()?;
            for path in &ceded {
                if !store.delete(path)? {
                    warn!("ceded path {path} was already missing locally");
                }
            }
            store.prune_empty_dirs()?;
        }

        self.storage_stub = Some(storage_stub);
        self.command_stub = Some(command_stub);
        info!(
            "storage server on {} registered: {announced} files announced, {} ceded",
            self.root.display(),
            ceded.len()
        );
        Ok(())
    }

    /// Stop both skeletons. In-flight operations drain; the server cannot be
    /// restarted.
    pub fn stop(&mut self) {
        self.access.stop();
        self.control.stop();
        if let Some(hook) = self.on_stopped.take() {
            hook();
        }
        info!("storage server on {} stopped", self.root.display());
    }

    /// The byte-I/O stub created at startup.
    pub fn storage_stub(&self) -> Option<Stub<StorageAccess>> {
        self.storage_stub
    }

    /// The command stub created at startup.
    pub fn command_stub(&self) -> Option<Stub<StorageControl>> {
        self.command_stub
    }

    /// Address of the byte-I/O listener once running.
    pub fn access_addr(&self) -> Option<SocketAddr> {
        self.access.local_addr()
    }
}
