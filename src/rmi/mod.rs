// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-07-25

//! Remote-invocation runtime.
//!
//! A [`Skeleton`] is the server side: a multithreaded TCP listener that
//! decodes call frames and dispatches them to a server object. A [`Stub`] is
//! the client side: a serializable value that ships calls to a bound address
//! and rebuilds the result locally.
//!
//! A remote interface is a marker type implementing [`RemoteInterface`],
//! pairing a request enum with a reply enum. The rule that every remote
//! method must be able to fail with a transport error is a type-level fact
//! here: server objects plug in through [`Dispatch`], whose only signature is
//! fallible, and every client method returns a `Result` whose error type
//! embeds [`RmiError`]. An interface without a transport-error channel cannot
//! be expressed.

mod skeleton;
mod stub;

pub use skeleton::{Skeleton, SkeletonHooks};
pub use stub::Stub;

use std::fmt;
use std::io;
use std::net::SocketAddr;

use comb_wire::{RemoteFault, WireError};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A remote interface: a stable name plus its request and reply enums.
///
/// Implementors are uninhabited marker types; the interface identity lives in
/// the type, the method identity in the request enum variant.
pub trait RemoteInterface: Send + Sync + 'static {
    /// Stable interface name carried in every call frame.
    const NAME: &'static str;
    /// Request enum: one variant per method.
    type Request: Serialize + DeserializeOwned + fmt::Debug + Send + 'static;
    /// Reply enum: one variant per method result.
    type Reply: Serialize + DeserializeOwned + fmt::Debug + Send + 'static;
}

/// A server object able to answer calls on interface `I`.
///
/// Application failures are returned as [`RemoteFault`] values; they travel
/// to the caller inside the reply frame and are rebuilt there.
pub trait Dispatch<I: RemoteInterface>: Send + Sync + 'static {
    /// Handle one decoded request.
    fn dispatch(&self, request: I::Request) -> Result<I::Reply, RemoteFault>;
}

/// Failures of the invocation layer itself.
///
/// These are distinct by type from application failures: a remote `NotFound`
/// arrives as a domain error, never as an `RmiError`.
#[derive(Debug, thiserror::Error)]
pub enum RmiError {
    /// The listening socket could not be created or bound.
    #[error("bind {addr}: {source}")]
    Bind {
        /// Address the skeleton attempted to bind.
        addr: SocketAddr,
        /// Underlying socket failure.
        source: io::Error,
    },
    /// A connection to the remote endpoint could not be established.
    #[error("connect {addr}: {source}")]
    Connect {
        /// Address the stub attempted to reach.
        addr: SocketAddr,
        /// Underlying socket failure.
        source: io::Error,
    },
    /// Accepting an incoming connection failed.
    #[error("accept: {0}")]
    Accept(io::Error),
    /// The hostname did not resolve to any address.
    #[error("no address resolved for {0:?}")]
    Resolve(String),
    /// Framing, encoding, or decoding failed.
    #[error(transparent)]
    Wire(#[from] WireError),
    /// The peer violated the call/reply protocol.
    #[error("protocol violation: {0}")]
    Protocol(String),
    /// The operation is not legal in the current lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    /// The far side reported a transport failure of its own, for example an
    /// unreachable downstream server.
    #[error("remote transport failure: {0}")]
    Upstream(String),
}
