//! Wire format of the binary notification interface.
//!
//! Notifications travel inside command-2 frames:
//!
//! ```text
//! frame := type(1) = 2 | length(4) | item*
//! item  := local_id(1) | item_length(2) | token(32) | payload | id(4) | expiry(4) | priority(1)
//! ```
//!
//! All integers are big-endian. [`encode_item`] produces one item,
//! [`FrameBuffer`] batches items into frames, and [`FrameDecoder`] parses
//! frames back for verification and test peers.

mod batch;
mod decoder;
mod error;
mod item;

use std::num::NonZeroU32;

pub use batch::FrameBuffer;
pub use decoder::{DecodedFrame, FrameDecoder};
use derive_more::{Display, Into};
pub use error::{DecodeError, EncodeError};
pub use item::{DecodedItem, EncodedItem, Priority, decode_item, encode_item};

/// Frame type byte identifying the item-list command.
pub const FRAME_TYPE: u8 = 2;
/// Size of the frame header: type byte and 32-bit length.
pub const FRAME_HEADER_LEN: usize = 5;
/// Size of the per-item header: local id byte and 16-bit item length.
pub const ITEM_HEADER_LEN: usize = 3;
/// Size of a raw device token.
pub const TOKEN_LEN: usize = 32;
/// Bytes of an item body that are not payload: token, id, expiry, priority.
pub const ITEM_FIXED_LEN: usize = TOKEN_LEN + 4 + 4 + 1;
/// Default maximum frame size including the header.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 65_535;
/// Default maximum size of a marshaled payload body.
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 256;

/// Connection-scoped identifier carried by every item and echoed back in
/// error responses.
///
/// Zero is reserved on the wire to mean "no particular notification", so
/// identifiers are never zero.
///
/// # Examples
///
/// ```
/// use pushframe::NotificationId;
///
/// assert!(NotificationId::new(0).is_none());
/// let id = NotificationId::new(7).expect("non-zero id");
/// assert_eq!(id.get(), 7);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Into)]
#[display("{_0}")]
pub struct NotificationId(NonZeroU32);

impl NotificationId {
    /// The first identifier handed out on a connection.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Wrap a raw identifier, returning `None` for the reserved value zero.
    #[must_use]
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// Return the raw identifier.
    #[must_use]
    pub const fn get(self) -> u32 { self.0.get() }

    /// The identifier following this one, wrapping past `u32::MAX` to 1.
    #[must_use]
    pub const fn next(self) -> Self {
        match self.0.checked_add(1) {
            Some(id) => Self(id),
            None => Self::FIRST,
        }
    }
}

impl From<NotificationId> for u32 {
    fn from(id: NotificationId) -> Self { id.get() }
}

/// Length of the smallest possible item: empty payload.
#[must_use]
pub const fn min_item_len() -> usize { ITEM_HEADER_LEN + ITEM_FIXED_LEN }
