// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.4
// Author: Lukas Bower
// Date Modified: 2026-07-26

//! The naming server.
//!
//! One naming server anchors a CombFS deployment. It owns the directory
//! tree, remembers which storage server holds each file, and mediates every
//! namespace mutation. Storage servers join through the registration
//! interface, ceding any path an incumbent already serves; clients operate
//! on the namespace through the service interface.

mod tree;

pub use tree::DirectoryTree;

use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, RwLock};

use comb_wire::{Path, RemoteFault};
use log::{info, warn};

use crate::proto::naming::{
    NamingError, NamingService, RegisterReply, RegisterRequest, Registration, ServiceReply,
    ServiceRequest,
};
use crate::proto::storage::{StorageAccess, StorageControl};
use crate::rmi::{Dispatch, RmiError, Skeleton, Stub};

struct NamingState {
    tree: DirectoryTree,
    registry: Vec<(Stub<StorageAccess>, Stub<StorageControl>)>,
}

/// Shared server object behind both naming-server skeletons.
///
/// The tree and registry sit under one reader-writer lock: probes and
/// lookups take the shared side, mutations and registration take the
/// exclusive side.
pub struct NamingCore {
    state: RwLock<NamingState>,
}

impl NamingCore {
    fn new() -> Self {
        Self {
            state: RwLock::new(NamingState {
                tree: DirectoryTree::new(),
                registry: Vec::new(),
            }),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, NamingState>, NamingError> {
        self.state
            .read()
            .map_err(|_| NamingError::Fault(RemoteFault::transport("namespace lock poisoned")))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, NamingState>, NamingError> {
        self.state
            .write()
            .map_err(|_| NamingError::Fault(RemoteFault::transport("namespace lock poisoned")))
    }

    fn is_directory(&self, path: &Path) -> Result<bool, NamingError> {
        self.read()?
            .tree
            .is_directory(path)
            .ok_or_else(|| NamingError::NotFound(format!("no node at {path}")))
    }

    fn list(&self, path: &Path) -> Result<Vec<String>, NamingError> {
        self.read()?
            .tree
            .list(path)
            .ok_or_else(|| NamingError::NotFound(format!("no directory at {path}")))
    }

    fn create_file(&self, path: &Path) -> Result<bool, NamingError> {
        let mut state = self.write()?;
        if !state.tree.parent_exists(path) {
            return Err(NamingError::NotFound(format!(
                "parent directory of {path} does not exist"
            )));
        }
        if state.tree.path_exists(path) {
            return Ok(false);
        }
        let (storage, command) = state
            .registry
            .first()
            .copied()
            .ok_or_else(|| NamingError::Rmi(RmiError::Upstream("no storage server registered".into())))?;
        if !command.create(path).map_err(NamingError::from)? {
            warn!("storage server {command} reports {path} already on disk");
        }
        state.tree.insert_file(path, storage, command);
        Ok(true)
    }

    fn create_directory(&self, path: &Path) -> Result<bool, NamingError> {
        let mut state = self.write()?;
        if !state.tree.parent_exists(path) {
            return Err(NamingError::NotFound(format!(
                "parent directory of {path} does not exist"
            )));
        }
        if state.tree.path_exists(path) {
            return Ok(false);
        }
        Ok(state.tree.insert_directory(path))
    }

    /// Delete a node. The bound storage servers act first; the namespace
    /// entry goes away only once every remote delete has succeeded, so a
    /// transport failure leaves the tree consistent with storage and the
    /// caller sees `false`.
    fn delete(&self, path: &Path) -> Result<bool, NamingError> {
        let mut state = self.write()?;
        if !state.tree.path_exists(path) {
            return Err(NamingError::NotFound(format!("no node at {path}")));
        }
        if path.is_root() {
            return Ok(false);
        }
        for command in state.tree.commands_under(path) {
            match command.delete(path) {
                Ok(true) => {}
                Ok(false) => warn!("storage server {command} had nothing at {path}"),
                Err(err) => {
                    warn!("delete of {path} on {command} failed, namespace unchanged: {err}");
                    return Ok(false);
                }
            }
        }
        state.tree.remove(path);
        Ok(true)
    }

    fn get_storage(&self, path: &Path) -> Result<Stub<StorageAccess>, NamingError> {
        let state = self.read()?;
        match state.tree.is_directory(path) {
            None => Err(NamingError::NotFound(format!("no node at {path}"))),
            Some(true) => Err(NamingError::NotFound(format!(
                "{path} is a directory and has no storage handle"
            ))),
            Some(false) => state
                .tree
                .storage_for(path)
                .ok_or_else(|| NamingError::NotFound(format!("no binding for {path}"))),
        }
    }

    /// Admit a storage server. Paths the namespace already knows are
    /// returned for local deletion on the registrant; the rest are bound to
    /// the new handles. Registration is irreversible.
    fn register(
        &self,
        storage: Stub<StorageAccess>,
        command: Stub<StorageControl>,
        files: Vec<Path>,
    ) -> Result<Vec<Path>, NamingError> {
        let mut state = self.write()?;
        if state
            .registry
            .iter()
            .any(|(s, c)| *s == storage || *c == command)
        {
            return Err(NamingError::AlreadyRegistered(format!(
                "{storage} / {command}"
            )));
        }
        let to_delete: Vec<Path> = files
            .iter()
            .filter(|path| !path.is_root() && state.tree.path_exists(path))
            .cloned()
            .collect();
        for path in &files {
            if path.is_root() || to_delete.contains(path) {
                continue;
            }
            if !state.tree.insert_file(path, storage, command) {
                warn!("registration of {path} refused: parent chain crosses a file");
            }
        }
        state.registry.push((storage, command));
        info!(
            "registered {storage}: {} files accepted, {} ceded",
            files.len() - to_delete.len(),
            to_delete.len()
        );
        Ok(to_delete)
    }
}

impl Dispatch<NamingService> for NamingCore {
    fn dispatch(&self, request: ServiceRequest) -> Result<ServiceReply, RemoteFault> {
        match request {
            ServiceRequest::IsDirectory { path } => self
                .is_directory(&path)
                .map(ServiceReply::IsDirectory)
                .map_err(Into::into),
            ServiceRequest::List { path } => {
                self.list(&path).map(ServiceReply::List).map_err(Into::into)
            }
            ServiceRequest::CreateFile { path } => self
                .create_file(&path)
                .map(ServiceReply::Created)
                .map_err(Into::into),
            ServiceRequest::CreateDirectory { path } => self
                .create_directory(&path)
                .map(ServiceReply::Created)
                .map_err(Into::into),
            ServiceRequest::Delete { path } => self
                .delete(&path)
                .map(ServiceReply::Deleted)
                .map_err(Into::into),
            ServiceRequest::GetStorage { path } => self
                .get_storage(&path)
                .map(ServiceReply::Storage)
                .map_err(Into::into),
        }
    }
}

impl Dispatch<Registration> for NamingCore {
    fn dispatch(&self, request: RegisterRequest) -> Result<RegisterReply, RemoteFault> {
        match request {
            RegisterRequest::Register {
                storage,
                command,
                files,
            } => self
                .register(storage, command, files)
                .map(RegisterReply::ToDelete)
                .map_err(Into::into),
        }
    }
}

/// The naming server: one [`NamingCore`] behind two skeletons.
pub struct NamingServer {
    service: Skeleton<NamingService>,
    registration: Skeleton<Registration>,
    on_stopped: Option<Box<dyn FnOnce() + Send>>,
}

impl NamingServer {
    /// Create a naming server on the well-known ports. Not started.
    pub fn new() -> Self {
        Self::with_ports(
            comb_wire::NAMING_SERVICE_PORT,
            comb_wire::NAMING_REGISTRATION_PORT,
        )
    }

    /// Create a naming server on explicit ports, for tests and
    /// multi-instance deployments. Not started.
    pub fn with_ports(service_port: u16, registration_port: u16) -> Self {
        let core = Arc::new(NamingCore::new());
        let service = Skeleton::with_address(
            core.clone() as Arc<dyn Dispatch<NamingService>>,
            SocketAddr::from(([127, 0, 0, 1], service_port)),
        );
        let registration = Skeleton::with_address(
            core as Arc<dyn Dispatch<Registration>>,
            SocketAddr::from(([127, 0, 0, 1], registration_port)),
        );
        Self {
            service,
            registration,
            on_stopped: None,
        }
    }

    /// Install a callback invoked once when the server stops.
    pub fn on_stopped(&mut self, hook: Box<dyn FnOnce() + Send>) {
        self.on_stopped = Some(hook);
    }

    /// Rebind both listeners to a different host. Only legal before `start`.
    pub fn set_host(&mut self, host: IpAddr) -> Result<(), RmiError> {
        self.service.set_host(host)?;
        self.registration.set_host(host)
    }

    /// Start both skeletons. If the registration listener fails to come up,
    /// the service listener is torn down again.
    pub fn start(&mut self) -> Result<(), RmiError> {
        self.service.start()?;
        if let Err(err) = self.registration.start() {
            self.service.stop();
            return Err(err);
        }
        info!(
            "naming server up: service {:?}, registration {:?}",
            self.service.local_addr(),
            self.registration.local_addr()
        );
        Ok(())
    }

    /// Stop both skeletons. In-flight calls drain; the server cannot be
    /// restarted.
    pub fn stop(&mut self) {
        self.service.stop();
        self.registration.stop();
        if let Some(hook) = self.on_stopped.take() {
            hook();
        }
        info!("naming server stopped");
    }

    /// Address of the client service listener once running.
    pub fn service_addr(&self) -> Option<SocketAddr> {
        self.service.local_addr()
    }

    /// Address of the registration listener once running.
    pub fn registration_addr(&self) -> Option<SocketAddr> {
        self.registration.local_addr()
    }
}

impl Default for NamingServer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stubs(port: u16) -> (Stub<StorageAccess>, Stub<StorageControl>) {
        (
            Stub::new(([127, 0, 0, 1], port).into()),
            Stub::new(([127, 0, 0, 1], port + 1).into()),
        )
    }

    fn path(text: &str) -> Path {
        Path::parse(text).unwrap()
    }

    #[test]
    fn register_returns_the_paths_an_incumbent_serves() {
        let core = NamingCore::new();
        let (s1, c1) = stubs(4000);
        let (s2, c2) = stubs(5000);

        let ceded = core
            .register(s1, c1, vec![path("/a"), path("/b/c")])
            .unwrap();
        assert!(ceded.is_empty());

        let ceded = core.register(s2, c2, vec![path("/a"), path("/e")]).unwrap();
        assert_eq!(ceded, vec![path("/a")]);

        // The incumbent keeps its binding; the newcomer gets the rest.
        assert_eq!(core.get_storage(&path("/a")).unwrap(), s1);
        assert_eq!(core.get_storage(&path("/e")).unwrap(), s2);
    }

    #[test]
    fn duplicate_handles_are_rejected() {
        let core = NamingCore::new();
        let (s1, c1) = stubs(4000);
        core.register(s1, c1, Vec::new()).unwrap();
        assert!(matches!(
            core.register(s1, c1, Vec::new()),
            Err(NamingError::AlreadyRegistered(_))
        ));
    }

    #[test]
    fn root_is_never_inserted_by_registration() {
        let core = NamingCore::new();
        let (s1, c1) = stubs(4000);
        let ceded = core.register(s1, c1, vec![Path::root()]).unwrap();
        assert!(ceded.is_empty());
        assert_eq!(core.list(&Path::root()).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn create_directory_requires_an_existing_parent() {
        let core = NamingCore::new();
        assert!(matches!(
            core.create_directory(&path("/x/y")),
            Err(NamingError::NotFound(_))
        ));
        assert!(core.create_directory(&path("/x")).unwrap());
        assert!(core.create_directory(&path("/x/y")).unwrap());
        assert!(!core.create_directory(&path("/x")).unwrap());
    }

    #[test]
    fn create_file_without_storage_is_a_transport_failure() {
        let core = NamingCore::new();
        assert!(matches!(
            core.create_file(&path("/a")),
            Err(NamingError::Rmi(RmiError::Upstream(_)))
        ));
    }

    #[test]
    fn get_storage_refuses_directories() {
        let core = NamingCore::new();
        core.create_directory(&path("/d")).unwrap();
        assert!(matches!(
            core.get_storage(&path("/d")),
            Err(NamingError::NotFound(_))
        ));
        assert!(matches!(
            core.get_storage(&path("/missing")),
            Err(NamingError::NotFound(_))
        ));
    }
}
