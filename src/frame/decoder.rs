//! `tokio_util` decoder for command-2 frames.

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

use super::{
    DEFAULT_MAX_FRAME_SIZE,
    DecodeError,
    DecodedItem,
    FRAME_HEADER_LEN,
    FRAME_TYPE,
    decode_item,
};

/// A whole frame parsed back into its items.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Items in the order they were written.
    pub items: Vec<DecodedItem>,
}

/// Decoder turning a byte stream of frames into [`DecodedFrame`]s.
///
/// Used by peers and tests to inspect exactly what a connection wrote.
///
/// # Examples
///
/// ```
/// use bytes::BytesMut;
/// use pushframe::{
///     Notification,
///     NotificationId,
///     frame::{FrameBuffer, FrameDecoder, encode_item},
/// };
/// use tokio_util::codec::Decoder;
///
/// let n = Notification::new("aa".repeat(32), "{}");
/// let item = encode_item(&n, NotificationId::FIRST, 256).expect("encodes");
/// let mut frame = FrameBuffer::new(1_024);
/// frame.push(&item);
/// let mut wire = frame.take_frame().expect("frame pending");
///
/// let decoded = FrameDecoder::default()
///     .decode(&mut wire)
///     .expect("valid frame")
///     .expect("complete frame");
/// assert_eq!(decoded.items.len(), 1);
/// assert_eq!(decoded.items[0].notification_id, 1);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FrameDecoder {
    max_frame_size: usize,
}

impl FrameDecoder {
    /// Create a decoder rejecting frames larger than `max_frame_size` bytes
    /// including the header.
    #[must_use]
    pub fn new(max_frame_size: usize) -> Self { Self { max_frame_size } }
}

impl Default for FrameDecoder {
    fn default() -> Self { Self::new(DEFAULT_MAX_FRAME_SIZE) }
}

impl Decoder for FrameDecoder {
    type Item = DecodedFrame;
    type Error = DecodeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < FRAME_HEADER_LEN {
            return Ok(None);
        }
        if src[0] != FRAME_TYPE {
            return Err(DecodeError::UnknownFrameType(src[0]));
        }
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&src[1..FRAME_HEADER_LEN]);
        let body_len = usize::try_from(u32::from_be_bytes(len_bytes)).unwrap_or(usize::MAX);
        let frame_len = FRAME_HEADER_LEN.saturating_add(body_len);
        if frame_len > self.max_frame_size {
            return Err(DecodeError::FrameTooLarge {
                len: frame_len,
                max: self.max_frame_size,
            });
        }
        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        let mut frame = src.split_to(frame_len).freeze();
        frame.advance(FRAME_HEADER_LEN);
        let mut items = Vec::new();
        while frame.has_remaining() {
            items.push(decode_item(&mut frame)?);
        }
        Ok(Some(DecodedFrame { items }))
    }
}
