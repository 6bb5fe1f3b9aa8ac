// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-07-12

//! Remote interface definitions shared by clients and servers.
//!
//! Each interface pairs a request enum (one variant per method) with a reply
//! enum, plus typed call methods on the matching [`Stub`](crate::rmi::Stub)
//! that translate the two-layer call result into a domain error.

pub mod naming;
pub mod storage;

use crate::rmi::RmiError;

/// Build the protocol error raised when a server answers a method with the
/// wrong reply variant.
pub(crate) fn unexpected_reply(interface: &str, reply: &dyn std::fmt::Debug) -> RmiError {
    RmiError::Protocol(format!("{interface} answered with unexpected reply {reply:?}"))
}
