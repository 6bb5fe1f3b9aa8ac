// CLASSIFICATION: COMMUNITY
// Filename: fault.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-06-21

//! Remote-fault descriptors.
//!
//! When a dispatched call fails on the server, the failure travels back to
//! the client as a [`RemoteFault`]: a coarse kind plus a human-readable
//! message, enough for the client to rebuild an equivalent error locally.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse classification of a remote failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultKind {
    /// The target does not exist or is of the wrong kind.
    NotFound,
    /// Byte-range arguments fall outside the file.
    OutOfRange,
    /// The storage server's handles are already known to the naming server.
    AlreadyRegistered,
    /// Malformed or unacceptable input.
    Invalid,
    /// Local I/O failed on the server.
    Io,
    /// The far side reports a failure of the invocation layer itself, for
    /// example an unreachable downstream server. Clients surface this as a
    /// transport error, not an application failure.
    Transport,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotFound => "not found",
            Self::OutOfRange => "out of range",
            Self::AlreadyRegistered => "already registered",
            Self::Invalid => "invalid",
            Self::Io => "i/o",
            Self::Transport => "transport",
        };
        f.write_str(label)
    }
}

/// A serializable description of a failure raised by a remote server object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RemoteFault {
    /// Failure classification.
    pub kind: FaultKind,
    /// Human-readable detail.
    pub message: String,
}

impl RemoteFault {
    /// Construct a fault of the given kind.
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a [`FaultKind::NotFound`] fault.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FaultKind::NotFound, message)
    }

    /// Shorthand for a [`FaultKind::OutOfRange`] fault.
    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(FaultKind::OutOfRange, message)
    }

    /// Shorthand for a [`FaultKind::Transport`] fault.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FaultKind::Transport, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_kind_and_message() {
        let fault = RemoteFault::not_found("no node at /a/b");
        assert_eq!(fault.to_string(), "not found: no node at /a/b");
    }

    #[test]
    fn round_trips_through_messagepack() {
        let fault = RemoteFault::new(FaultKind::AlreadyRegistered, "handle known");
        let bytes = rmp_serde::to_vec(&fault).unwrap();
        let back: RemoteFault = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(back, fault);
    }
}
