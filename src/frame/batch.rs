//! Accumulation of items into outbound frames.

use bytes::{BufMut, BytesMut};

use super::{EncodedItem, FRAME_HEADER_LEN, FRAME_TYPE};

/// The frame currently being filled for a connection.
///
/// A header is written when the first item arrives in an empty buffer. Each
/// item is stamped with a local id counting up from zero within its frame.
/// The buffer never grows past `max_frame_size`; callers ask
/// [`needs_flush_before`](Self::needs_flush_before) and take the pending
/// frame with [`take_frame`](Self::take_frame) when the next item would not
/// fit.
///
/// # Examples
///
/// ```
/// use pushframe::{
///     Notification,
///     NotificationId,
///     frame::{FrameBuffer, encode_item},
/// };
///
/// let mut frame = FrameBuffer::new(65_535);
/// let n = Notification::new("11".repeat(32), "{}");
/// let item = encode_item(&n, NotificationId::FIRST, 256).expect("encodes");
/// assert!(!frame.needs_flush_before(&item));
/// assert_eq!(frame.push(&item), 0);
/// let bytes = frame.take_frame().expect("frame pending");
/// assert_eq!(bytes[0], 2);
/// assert!(frame.is_empty());
/// ```
#[derive(Debug)]
pub struct FrameBuffer {
    buf: BytesMut,
    next_local_id: u8,
    max_frame_size: usize,
}

impl FrameBuffer {
    /// Create an empty buffer bounded to `max_frame_size` bytes including
    /// the frame header.
    #[must_use]
    pub fn new(max_frame_size: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(max_frame_size),
            next_local_id: 0,
            max_frame_size,
        }
    }

    /// Return `true` when no frame has been started.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.buf.is_empty() }

    /// Bytes currently buffered, header included.
    #[must_use]
    pub fn len(&self) -> usize { self.buf.len() }

    /// Maximum size of a frame including its header.
    #[must_use]
    pub fn max_frame_size(&self) -> usize { self.max_frame_size }

    /// Return `true` if `item` would not fit in an empty frame.
    #[must_use]
    pub fn exceeds_frame(&self, item: &EncodedItem) -> bool {
        FRAME_HEADER_LEN + item.len() > self.max_frame_size
    }

    /// Return `true` if the pending frame must be flushed before `item` can
    /// be appended.
    #[must_use]
    pub fn needs_flush_before(&self, item: &EncodedItem) -> bool {
        !self.buf.is_empty() && self.buf.len() + item.len() > self.max_frame_size
    }

    /// Append `item`, starting a new frame if none is pending, and return the
    /// local id it was stamped with.
    ///
    /// Callers must flush first when [`needs_flush_before`](Self::needs_flush_before)
    /// reports `true`.
    pub fn push(&mut self, item: &EncodedItem) -> u8 {
        if self.buf.is_empty() {
            self.buf.put_u8(FRAME_TYPE);
            self.buf.put_u32(0);
            self.next_local_id = 0;
        } else {
            self.next_local_id = self.next_local_id.wrapping_add(1);
        }
        debug_assert!(
            self.buf.len() + item.len() <= self.max_frame_size,
            "item appended past the frame limit"
        );
        let local_id = self.next_local_id;
        self.buf.put_u8(local_id);
        self.buf.put_slice(item.after_local_id());
        local_id
    }

    /// Finish the pending frame and hand it out, leaving the buffer empty.
    ///
    /// Returns `None` when nothing is pending or only a header was written.
    pub fn take_frame(&mut self) -> Option<BytesMut> {
        if self.buf.len() <= FRAME_HEADER_LEN {
            return None;
        }
        // ConnectionConfig keeps max_frame_size within u32.
        let body_len = u32::try_from(self.buf.len() - FRAME_HEADER_LEN).unwrap_or(u32::MAX);
        self.buf[1..FRAME_HEADER_LEN].copy_from_slice(&body_len.to_be_bytes());
        Some(self.buf.split())
    }
}
