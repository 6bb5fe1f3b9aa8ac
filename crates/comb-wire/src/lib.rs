// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-07-18

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Wire-level building blocks shared by every CombFS component.
//!
//! This crate owns the pieces both ends of a connection must agree on: the
//! [`Path`] value type, the length-prefixed MessagePack frame codec, the
//! call/reply envelopes, and the [`RemoteFault`] descriptors used to carry
//! application failures back to callers.

mod fault;
mod frame;
mod path;

pub use fault::{FaultKind, RemoteFault};
pub use frame::{
    decode, encode, read_frame, write_frame, CallFrame, ReplyFrame, WireError, LEN_PREFIX_BYTES,
    MAX_FRAME_LEN,
};
pub use path::{Path, PathError};

/// Well-known TCP port of the naming server's client service listener.
pub const NAMING_SERVICE_PORT: u16 = 31610;
/// Well-known TCP port of the naming server's registration listener.
pub const NAMING_REGISTRATION_PORT: u16 = 31611;
