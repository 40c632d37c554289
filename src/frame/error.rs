//! Error types for item encoding and frame decoding.

use std::io;

use thiserror::Error;

use crate::payload::MarshalError;

/// Errors raised while turning a notification into an item.
///
/// Every variant is fatal to the connection that produced it: the item is
/// dropped and the connection is flushed and closed.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The device token is not valid hex.
    #[error("device token is not valid hex")]
    InvalidToken(#[from] hex::FromHexError),
    /// The device token decoded to the wrong number of bytes.
    #[error("device token is {len} bytes; expected {expected}", expected = super::TOKEN_LEN)]
    InvalidTokenLength {
        /// Decoded token length.
        len: usize,
    },
    /// The payload could not be marshaled.
    #[error("failed to marshal payload")]
    Marshal(#[from] MarshalError),
    /// The payload implementation returned more bytes than it was allowed.
    #[error("marshaled payload is {len} bytes; at most {max} allowed")]
    PayloadTooLarge {
        /// Size of the body returned by the payload.
        len: usize,
        /// Configured maximum.
        max: usize,
    },
}

/// Errors raised while parsing frames or items.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The frame type byte is not the item-list command.
    #[error("unexpected frame type {0}")]
    UnknownFrameType(u8),
    /// The declared frame length exceeds the decoder's limit.
    #[error("frame of {len} bytes exceeds limit of {max}")]
    FrameTooLarge {
        /// Declared frame length including the header.
        len: usize,
        /// Decoder limit.
        max: usize,
    },
    /// An item declared a length too short to hold its fixed fields.
    #[error("item length {0} is shorter than the fixed item fields")]
    ItemTooShort(u16),
    /// Fewer bytes remain than an item header or body requires.
    #[error("item truncated: needed {needed} bytes, {available} available")]
    Truncated {
        /// Bytes the item requires.
        needed: usize,
        /// Bytes actually present.
        available: usize,
    },
    /// Transport error surfaced through a codec.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}
