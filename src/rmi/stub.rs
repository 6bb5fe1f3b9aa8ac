// CLASSIFICATION: COMMUNITY
// Filename: stub.rs v0.4
// Author: Lukas Bower
// Date Modified: 2026-07-25

//! Client-side proxy of the remote-invocation runtime.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::net::{IpAddr, SocketAddr, TcpStream, ToSocketAddrs};

use comb_wire::{CallFrame, FaultKind, RemoteFault, ReplyFrame};
use serde::{Deserialize, Serialize};

use super::{RemoteInterface, RmiError, Skeleton};

/// A proxy for remote interface `I` bound to a network address.
///
/// Stubs are values: two stubs are equal exactly when they target the same
/// interface and the same address, and they serialize as just the address
/// (the interface identity lives in the type). A stub holds no live socket;
/// every call opens a fresh connection, so stubs can be shipped inside other
/// remote calls and reused indefinitely.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Stub<I: RemoteInterface> {
    address: SocketAddr,
    #[serde(skip)]
    _interface: PhantomData<fn() -> I>,
}

impl<I: RemoteInterface> Stub<I> {
    /// Create a stub from a raw address.
    ///
    /// Used to bootstrap clients that already know where the server is, for
    /// example from the naming server's well-known ports.
    pub fn new(address: SocketAddr) -> Self {
        Self {
            address,
            _interface: PhantomData,
        }
    }

    /// Create a stub for a running skeleton, inheriting its address.
    ///
    /// The skeleton must be running, and a connection probe to its address
    /// must succeed.
    pub fn from_skeleton(skeleton: &Skeleton<I>) -> Result<Self, RmiError> {
        if !skeleton.is_running() {
            return Err(RmiError::InvalidState("skeleton is not running"));
        }
        let address = skeleton
            .local_addr()
            .ok_or(RmiError::InvalidState("skeleton has no bound address"))?;
        TcpStream::connect(address)
            .map_err(|source| RmiError::Connect { addr: address, source })?;
        Ok(Self::new(address))
    }

    /// Create a stub from a skeleton's port and an externally-routable
    /// hostname that overrides the skeleton's own.
    ///
    /// For use when the skeleton binds a host that is not reachable from the
    /// outside (private networks, NAT). The skeleton must have an assigned
    /// port.
    pub fn with_hostname(skeleton: &Skeleton<I>, hostname: &str) -> Result<Self, RmiError> {
        let port = skeleton
            .port()
            .ok_or(RmiError::InvalidState("skeleton has no assigned port"))?;
        let address = resolve(hostname, port)?;
        Ok(Self::new(address))
    }

    /// The remote address this stub targets.
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Ship one call to the remote skeleton and await the reply.
    ///
    /// The outer `Result` is the transport layer: connection, framing, and
    /// protocol failures. The inner `Result` is the application layer: the
    /// decoded reply, or the fault the server object raised. A
    /// transport-kind fault reported by the far side is folded into the
    /// outer layer as [`RmiError::Upstream`].
    pub fn call(&self, request: &I::Request) -> Result<Result<I::Reply, RemoteFault>, RmiError> {
        let mut stream = TcpStream::connect(self.address).map_err(|source| RmiError::Connect {
            addr: self.address,
            source,
        })?;
        let call = CallFrame {
            interface: I::NAME.to_owned(),
            body: comb_wire::encode(request)?,
        };
        comb_wire::write_frame(&mut stream, &comb_wire::encode(&call)?)?;
        let reply: ReplyFrame = comb_wire::decode(&comb_wire::read_frame(&mut stream)?)?;
        match reply.result {
            Ok(bytes) => Ok(Ok(comb_wire::decode(&bytes)?)),
            Err(fault) if fault.kind == FaultKind::Transport => {
                Err(RmiError::Upstream(fault.message))
            }
            Err(fault) => Ok(Err(fault)),
        }
    }
}

fn resolve(hostname: &str, port: u16) -> Result<SocketAddr, RmiError> {
    if let Ok(ip) = hostname.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }
    (hostname, port)
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(|| RmiError::Resolve(hostname.to_owned()))
}

impl<I: RemoteInterface> Clone for Stub<I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: RemoteInterface> Copy for Stub<I> {}

impl<I: RemoteInterface> PartialEq for Stub<I> {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl<I: RemoteInterface> Eq for Stub<I> {}

impl<I: RemoteInterface> Hash for Stub<I> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        I::NAME.hash(state);
        self.address.hash(state);
    }
}

impl<I: RemoteInterface> fmt::Debug for Stub<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stub<{}>({})", I::NAME, self.address)
    }
}

impl<I: RemoteInterface> fmt::Display for Stub<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", I::NAME, self.address)
    }
}
