// CLASSIFICATION: COMMUNITY
// Filename: frame.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-07-18

//! Length-prefixed MessagePack framing and the call/reply envelopes.
//!
//! Every message on a CombFS connection is one frame: a 4-byte little-endian
//! payload length followed by that many bytes of MessagePack. Within a
//! connection the exchange is strictly serial: one call frame, one reply
//! frame, then the next call.

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::fault::RemoteFault;

/// Size of the frame length prefix.
pub const LEN_PREFIX_BYTES: usize = 4;

/// Hard upper bound on a frame payload. Anything larger is a protocol
/// violation, not a request to allocate.
pub const MAX_FRAME_LEN: usize = 8 * 1024 * 1024;

/// Errors raised while framing, encoding, or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Socket-level read or write failure.
    #[error("i/o failure on the wire: {0}")]
    Io(#[from] std::io::Error),
    /// Declared or requested frame length exceeds [`MAX_FRAME_LEN`].
    #[error("frame length {0} exceeds the {MAX_FRAME_LEN}-byte limit")]
    FrameTooLarge(usize),
    /// The peer closed the connection mid-frame.
    #[error("connection closed before a complete frame arrived")]
    Truncated,
    /// The peer closed the connection cleanly between frames.
    #[error("connection closed")]
    Closed,
    /// MessagePack encoding failed.
    #[error("encode failure: {0}")]
    Encode(String),
    /// MessagePack decoding failed.
    #[error("decode failure: {0}")]
    Decode(String),
}

/// Encode a value to MessagePack bytes.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, WireError> {
    rmp_serde::to_vec(value).map_err(|err| WireError::Encode(err.to_string()))
}

/// Decode a value from MessagePack bytes.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, WireError> {
    rmp_serde::from_slice(bytes).map_err(|err| WireError::Decode(err.to_string()))
}

/// Write one length-prefixed frame.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), WireError> {
    if payload.len() > MAX_FRAME_LEN {
        return Err(WireError::FrameTooLarge(payload.len()));
    }
    writer.write_all(&(payload.len() as u32).to_le_bytes())?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

/// Read one length-prefixed frame.
///
/// A clean close before any prefix byte yields [`WireError::Closed`]; a close
/// anywhere after the first byte yields [`WireError::Truncated`].
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>, WireError> {
    let mut prefix = [0u8; LEN_PREFIX_BYTES];
    let mut filled = 0;
    while filled < LEN_PREFIX_BYTES {
        match reader.read(&mut prefix[filled..])? {
            0 if filled == 0 => return Err(WireError::Closed),
            0 => return Err(WireError::Truncated),
            n => filled += n,
        }
    }
    let len = u32::from_le_bytes(prefix) as usize;
    if len > MAX_FRAME_LEN {
        return Err(WireError::FrameTooLarge(len));
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).map_err(|err| {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            WireError::Truncated
        } else {
            WireError::Io(err)
        }
    })?;
    Ok(payload)
}

/// One remote call: the target interface plus the encoded request.
///
/// The request body is the MessagePack encoding of the interface's request
/// enum; the enum variant is the method identity and the variant fields are
/// the argument tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFrame {
    /// Stable name of the remote interface the call targets.
    pub interface: String,
    /// Encoded request enum.
    pub body: Vec<u8>,
}

/// The reply to one call: either an encoded reply enum or a remote fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyFrame {
    /// Outcome of the dispatched call.
    pub result: Result<Vec<u8>, RemoteFault>,
}
