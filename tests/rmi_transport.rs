// CLASSIFICATION: COMMUNITY
// Filename: rmi_transport.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-07-28

//! Behavior of the invocation runtime itself: lifecycle, transparency, and
//! the transport/application error split.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use comb_wire::{FaultKind, RemoteFault};
use combfs::proto::naming::NamingError;
use combfs::proto::storage::StorageError;
use combfs::rmi::{Dispatch, RemoteInterface, RmiError, Skeleton, SkeletonHooks, Stub};
use combfs::Path;
use common::{init_logging, local_root, start_naming, start_storage};
use serde::{Deserialize, Serialize};

/// Minimal interface exercising the runtime without the filesystem on top.
#[derive(Debug)]
enum Echo {}

impl RemoteInterface for Echo {
    const NAME: &'static str = "test.echo";
    type Request = EchoRequest;
    type Reply = EchoReply;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum EchoRequest {
    Ping(String),
    Fail(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum EchoReply {
    Pong(String),
}

struct EchoServer;

impl Dispatch<Echo> for EchoServer {
    fn dispatch(&self, request: EchoRequest) -> Result<EchoReply, RemoteFault> {
        match request {
            EchoRequest::Ping(text) => Ok(EchoReply::Pong(text)),
            EchoRequest::Fail(message) => Err(RemoteFault::new(FaultKind::Invalid, message)),
        }
    }
}

#[derive(Default)]
struct CountingHooks {
    stopped: AtomicUsize,
}

impl SkeletonHooks for CountingHooks {
    fn stopped(&self, _cause: Option<&RmiError>) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn calls_are_transparent_for_results_and_failures() {
    init_logging();
    let mut skeleton = Skeleton::<Echo>::new(Arc::new(EchoServer));
    skeleton.start().unwrap();
    let stub = Stub::from_skeleton(&skeleton).unwrap();

    let reply = stub.call(&EchoRequest::Ping("comb".into())).unwrap().unwrap();
    assert!(matches!(reply, EchoReply::Pong(text) if text == "comb"));

    let fault = stub
        .call(&EchoRequest::Fail("bad input".into()))
        .unwrap()
        .unwrap_err();
    assert_eq!(fault.kind, FaultKind::Invalid);
    assert_eq!(fault.message, "bad input");

    skeleton.stop();
}

#[test]
fn connections_carry_sequential_calls() {
    init_logging();
    let mut skeleton = Skeleton::<Echo>::new(Arc::new(EchoServer));
    skeleton.start().unwrap();
    let stub = Stub::from_skeleton(&skeleton).unwrap();

    for n in 0..16 {
        let text = format!("message {n}");
        let EchoReply::Pong(back) = stub.call(&EchoRequest::Ping(text.clone())).unwrap().unwrap();
        assert_eq!(back, text);
    }
    skeleton.stop();
}

#[test]
fn lifecycle_is_terminal() {
    init_logging();
    let mut skeleton = Skeleton::<Echo>::new(Arc::new(EchoServer));

    // A stub cannot be made for an unstarted skeleton.
    assert!(matches!(
        Stub::from_skeleton(&skeleton),
        Err(RmiError::InvalidState(_))
    ));

    skeleton.start().unwrap();
    assert!(matches!(
        skeleton.start(),
        Err(RmiError::InvalidState(_))
    ));

    skeleton.stop();
    assert!(matches!(
        skeleton.start(),
        Err(RmiError::InvalidState(_))
    ));
}

#[test]
fn stopped_hook_fires_exactly_once() {
    init_logging();
    let hooks = Arc::new(CountingHooks::default());
    let mut skeleton = Skeleton::<Echo>::new(Arc::new(EchoServer));
    skeleton.set_hooks(hooks.clone()).unwrap();

    skeleton.start().unwrap();
    skeleton.stop();
    skeleton.stop();
    assert_eq!(hooks.stopped.load(Ordering::SeqCst), 1);
}

#[test]
fn stopped_listener_refuses_new_connections() {
    init_logging();
    let mut skeleton = Skeleton::<Echo>::new(Arc::new(EchoServer));
    skeleton.start().unwrap();
    let stub = Stub::from_skeleton(&skeleton).unwrap();

    // A stopped listener refuses new connections but the address stays known.
    let addr = stub.address();
    skeleton.stop();
    let result = stub.call(&EchoRequest::Ping("late".into()));
    assert!(
        matches!(&result, Err(RmiError::Connect { .. })),
        "{result:?} from {addr}"
    );
}

#[test]
fn hostname_stubs_require_an_assigned_port() {
    init_logging();
    let skeleton = Skeleton::<Echo>::new(Arc::new(EchoServer));
    assert!(matches!(
        Stub::with_hostname(&skeleton, "127.0.0.1"),
        Err(RmiError::InvalidState(_))
    ));

    let mut skeleton = Skeleton::<Echo>::new(Arc::new(EchoServer));
    skeleton.start().unwrap();
    let stub = Stub::with_hostname(&skeleton, "127.0.0.1").unwrap();
    let EchoReply::Pong(back) = stub.call(&EchoRequest::Ping("via host".into())).unwrap().unwrap();
    assert_eq!(back, "via host");
    skeleton.stop();
}

#[test]
fn stubs_for_one_skeleton_are_interchangeable() {
    init_logging();
    let mut skeleton = Skeleton::<Echo>::new(Arc::new(EchoServer));
    skeleton.start().unwrap();

    let first = Stub::from_skeleton(&skeleton).unwrap();
    let second = Stub::from_skeleton(&skeleton).unwrap();
    assert_eq!(first, second);

    // And a serde round trip preserves identity.
    let bytes = rmp_serde::to_vec(&first).unwrap();
    let back: Stub<Echo> = rmp_serde::from_slice(&bytes).unwrap();
    assert_eq!(back, first);
    skeleton.stop();
}

#[test]
fn unreachable_storage_is_a_transport_error_not_not_found() {
    let naming = start_naming();
    let root = local_root(&["held/file"]);
    let mut storage = start_storage(root.path(), &naming);

    let path = Path::parse("/held/file").unwrap();
    let stub = naming.service.get_storage(&path).unwrap();
    storage.stop();

    // Direct byte I/O fails in the transport layer, distinctly from a
    // missing file.
    let result = stub.size(&path);
    assert!(
        matches!(&result, Err(StorageError::Rmi(RmiError::Connect { .. }))),
        "{result:?}"
    );

    // A namespace delete that must reach the dead server reports false and
    // keeps the binding.
    assert!(!naming.service.delete(&path).unwrap());
    assert!(naming.service.get_storage(&path).is_ok());

    // Placement on the dead server surfaces as an upstream transport
    // failure too.
    let result = naming.service.create_file(&Path::parse("/fresh").unwrap());
    assert!(
        matches!(&result, Err(NamingError::Rmi(RmiError::Upstream(_)))),
        "{result:?}"
    );
}
