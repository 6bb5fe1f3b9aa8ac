// CLASSIFICATION: COMMUNITY
// Filename: skeleton.rs v0.4
// Author: Lukas Bower
// Date Modified: 2026-07-25

//! Server-side endpoint of the remote-invocation runtime.

use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use comb_wire::{CallFrame, RemoteFault, ReplyFrame, WireError};
use log::{debug, error, info, warn};

use super::{Dispatch, RemoteInterface, RmiError};

/// Overridable reactions to skeleton lifecycle events.
///
/// The defaults log through the `log` facade; a custom implementation can be
/// installed with [`Skeleton::set_hooks`] before `start`.
pub trait SkeletonHooks: Send + Sync + 'static {
    /// Invoked exactly once when the listener exits. `None` means a clean
    /// stop; `Some` carries the failure that terminated it prematurely.
    fn stopped(&self, _cause: Option<&RmiError>) {}

    /// Invoked when the listener fails to accept a connection. Return `true`
    /// to keep listening, `false` to shut the skeleton down.
    fn listen_error(&self, error: &RmiError) -> bool {
        error!("listener failure: {error}");
        false
    }

    /// Invoked when a service worker fails to decode a call, dispatch it, or
    /// write the reply. The worker's connection is closed afterwards.
    fn service_error(&self, error: &RmiError) {
        warn!("service worker failure: {error}");
    }
}

/// Hook implementation carrying the default logging behavior.
struct LogHooks;

impl SkeletonHooks for LogHooks {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unstarted,
    Running,
    Stopped,
}

/// A multithreaded TCP server answering calls on remote interface `I`.
///
/// The lifecycle is `Unstarted -> Running -> Stopped` and terminal: a stopped
/// skeleton cannot be restarted. One listener thread accepts connections;
/// each accepted connection is served by its own worker thread until the
/// peer closes it.
pub struct Skeleton<I: RemoteInterface> {
    server: Arc<dyn Dispatch<I>>,
    hooks: Arc<dyn SkeletonHooks>,
    address: SocketAddr,
    bound: Option<SocketAddr>,
    state: State,
    shutdown: Arc<AtomicBool>,
    listener: Option<thread::JoinHandle<()>>,
}

impl<I: RemoteInterface> Skeleton<I> {
    /// Create a skeleton on the loopback interface with a system-chosen
    /// port. The port is resolved when `start` binds the listener.
    pub fn new(server: Arc<dyn Dispatch<I>>) -> Self {
        Self::with_address(server, SocketAddr::from(([127, 0, 0, 1], 0)))
    }

    /// Create a skeleton with an explicit listen address.
    pub fn with_address(server: Arc<dyn Dispatch<I>>, address: SocketAddr) -> Self {
        Self {
            server,
            hooks: Arc::new(LogHooks),
            address,
            bound: None,
            state: State::Unstarted,
            shutdown: Arc::new(AtomicBool::new(false)),
            listener: None,
        }
    }

    /// Replace the lifecycle hooks. Only legal before `start`.
    pub fn set_hooks(&mut self, hooks: Arc<dyn SkeletonHooks>) -> Result<(), RmiError> {
        if self.state != State::Unstarted {
            return Err(RmiError::InvalidState("hooks must be set before start"));
        }
        self.hooks = hooks;
        Ok(())
    }

    /// Rebind the listen address to a different host, keeping the configured
    /// port. Only legal before `start`.
    pub fn set_host(&mut self, host: IpAddr) -> Result<(), RmiError> {
        if self.state != State::Unstarted {
            return Err(RmiError::InvalidState("address is fixed once started"));
        }
        self.address.set_ip(host);
        Ok(())
    }

    /// The resolved listen address, available once the skeleton has started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.bound
    }

    /// The port this skeleton is reachable on: the bound port once running,
    /// or the explicitly configured port before that. `None` while an
    /// anonymous skeleton has not yet been started.
    pub fn port(&self) -> Option<u16> {
        match self.bound {
            Some(addr) => Some(addr.port()),
            None if self.address.port() != 0 => Some(self.address.port()),
            None => None,
        }
    }

    /// Whether the skeleton is currently accepting connections.
    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// Bind the listening socket and spawn the listener thread.
    ///
    /// Returns immediately. Fails if the socket cannot be bound or if the
    /// skeleton is not in its initial state.
    pub fn start(&mut self) -> Result<(), RmiError> {
        if self.state != State::Unstarted {
            return Err(RmiError::InvalidState("skeleton was already started"));
        }
        let listener = TcpListener::bind(self.address).map_err(|source| RmiError::Bind {
            addr: self.address,
            source,
        })?;
        let bound = listener.local_addr().map_err(|source| RmiError::Bind {
            addr: self.address,
            source,
        })?;
        self.bound = Some(bound);
        self.shutdown.store(false, Ordering::SeqCst);

        let server = Arc::clone(&self.server);
        let hooks = Arc::clone(&self.hooks);
        let shutdown = Arc::clone(&self.shutdown);
        self.listener = Some(thread::spawn(move || {
            listen_loop::<I>(listener, server, hooks, shutdown);
        }));
        self.state = State::Running;
        info!("{} skeleton listening on {bound}", I::NAME);
        Ok(())
    }

    /// Close the listening socket and wait for the listener thread.
    ///
    /// Workers already serving connections drain on their own. The skeleton
    /// ends in its terminal state regardless of where it started from.
    pub fn stop(&mut self) {
        if self.state == State::Running {
            self.shutdown.store(true, Ordering::SeqCst);
            if let Some(addr) = self.bound {
                // Wake the blocking accept so the listener observes the flag.
                let _ = TcpStream::connect(addr);
            }
            if let Some(handle) = self.listener.take() {
                let _ = handle.join();
            }
            info!("{} skeleton stopped", I::NAME);
        }
        self.state = State::Stopped;
    }
}

impl<I: RemoteInterface> Drop for Skeleton<I> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn listen_loop<I: RemoteInterface>(
    listener: TcpListener,
    server: Arc<dyn Dispatch<I>>,
    hooks: Arc<dyn SkeletonHooks>,
    shutdown: Arc<AtomicBool>,
) {
    let cause = loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                if shutdown.load(Ordering::SeqCst) {
                    break None;
                }
                debug!("{}: connection from {peer}", I::NAME);
                let server = Arc::clone(&server);
                let hooks = Arc::clone(&hooks);
                thread::spawn(move || serve_connection::<I>(stream, server, hooks));
            }
            Err(err) => {
                if shutdown.load(Ordering::SeqCst) {
                    break None;
                }
                let err = RmiError::Accept(err);
                if hooks.listen_error(&err) {
                    continue;
                }
                break Some(err);
            }
        }
    };
    hooks.stopped(cause.as_ref());
}

/// Serve one connection: decode, dispatch, reply, repeat until the peer
/// closes. Any worker-level failure is reported through the service-error
/// hook and ends the connection.
fn serve_connection<I: RemoteInterface>(
    mut stream: TcpStream,
    server: Arc<dyn Dispatch<I>>,
    hooks: Arc<dyn SkeletonHooks>,
) {
    loop {
        let payload = match comb_wire::read_frame(&mut stream) {
            Ok(payload) => payload,
            Err(WireError::Closed) => return,
            Err(WireError::Io(err)) if err.kind() == ErrorKind::ConnectionReset => return,
            Err(err) => {
                hooks.service_error(&RmiError::Wire(err));
                return;
            }
        };
        let call: CallFrame = match comb_wire::decode(&payload) {
            Ok(call) => call,
            Err(err) => {
                hooks.service_error(&RmiError::Wire(err));
                return;
            }
        };
        if call.interface != I::NAME {
            hooks.service_error(&RmiError::Protocol(format!(
                "call for interface {:?} reached a {} skeleton",
                call.interface,
                I::NAME
            )));
            return;
        }
        let request: I::Request = match comb_wire::decode(&call.body) {
            Ok(request) => request,
            Err(err) => {
                hooks.service_error(&RmiError::Wire(err));
                return;
            }
        };
        let outcome: Result<Vec<u8>, RemoteFault> = match server.dispatch(request) {
            Ok(reply) => match comb_wire::encode(&reply) {
                Ok(bytes) => Ok(bytes),
                Err(err) => {
                    hooks.service_error(&RmiError::Wire(err));
                    return;
                }
            },
            Err(fault) => Err(fault),
        };
        let reply = ReplyFrame { result: outcome };
        let bytes = match comb_wire::encode(&reply) {
            Ok(bytes) => bytes,
            Err(err) => {
                hooks.service_error(&RmiError::Wire(err));
                return;
            }
        };
        if let Err(err) = comb_wire::write_frame(&mut stream, &bytes) {
            hooks.service_error(&RmiError::Wire(err));
            return;
        }
    }
}
