//! Encoding and decoding of single notification items.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{
    DecodeError,
    EncodeError,
    ITEM_FIXED_LEN,
    ITEM_HEADER_LEN,
    NotificationId,
    TOKEN_LEN,
};
use crate::payload::Payload;

/// Delivery priority understood by the peer.
///
/// # Examples
///
/// ```
/// use pushframe::Priority;
///
/// assert_eq!(Priority::from_raw(10), Priority::Immediate);
/// assert_eq!(Priority::from_raw(7), Priority::Conserve);
/// assert_eq!(Priority::from_raw(7).as_u8(), 5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Priority {
    /// Deliver at a time that conserves power on the device.
    Conserve = 5,
    /// Deliver immediately.
    Immediate = 10,
}

impl Priority {
    /// Map a raw priority to one the peer accepts; anything other than 10
    /// becomes [`Priority::Conserve`].
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            10 => Self::Immediate,
            _ => Self::Conserve,
        }
    }

    /// Wire value of the priority.
    #[must_use]
    pub const fn as_u8(self) -> u8 { self as u8 }
}

/// One encoded item whose local id byte has not yet been assigned.
///
/// Produced by [`encode_item`] and consumed by
/// [`FrameBuffer::push`](super::FrameBuffer::push), which stamps the local
/// id when the item is placed into a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedItem {
    bytes: Bytes,
}

impl EncodedItem {
    /// Total encoded length including the item header.
    #[must_use]
    pub fn len(&self) -> usize { self.bytes.len() }

    /// Always `false`; an item holds at least its fixed fields.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Bytes following the local id: item length, token, payload and trailer.
    pub(super) fn after_local_id(&self) -> &[u8] { &self.bytes[1..] }

    /// Raw encoded bytes with a zero local id.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }
}

/// Encode `payload` as an item tagged with `id`.
///
/// The payload body is limited to `max_payload` bytes and the priority is
/// normalised with [`Priority::from_raw`].
///
/// # Errors
///
/// Returns [`EncodeError`] if the token is not 32 bytes of hex, the payload
/// fails to marshal, or the marshaled body exceeds `max_payload`.
///
/// # Examples
///
/// ```
/// use pushframe::{
///     Notification,
///     NotificationId,
///     frame::{decode_item, encode_item},
/// };
///
/// let n = Notification::new("0f".repeat(32), "{}").with_priority(3);
/// let id = NotificationId::new(9).expect("non-zero id");
/// let item = encode_item(&n, id, 256).expect("encodes");
/// let mut bytes = bytes::Bytes::copy_from_slice(item.as_bytes());
/// let decoded = decode_item(&mut bytes).expect("decodes");
/// assert_eq!(decoded.notification_id, 9);
/// assert_eq!(decoded.priority, 5);
/// ```
pub fn encode_item<P>(
    payload: &P,
    id: NotificationId,
    max_payload: usize,
) -> Result<EncodedItem, EncodeError>
where
    P: Payload + ?Sized,
{
    let token = decode_token(payload.token())?;
    let body = payload.marshal(max_payload)?;
    if body.len() > max_payload {
        return Err(EncodeError::PayloadTooLarge {
            len: body.len(),
            max: max_payload,
        });
    }

    let item_len = ITEM_FIXED_LEN + body.len();
    let item_len_field = u16::try_from(item_len).map_err(|_| EncodeError::PayloadTooLarge {
        len: body.len(),
        max: usize::from(u16::MAX) - ITEM_FIXED_LEN,
    })?;

    let mut buf = BytesMut::with_capacity(ITEM_HEADER_LEN + item_len);
    buf.put_u8(0);
    buf.put_u16(item_len_field);
    buf.put_slice(&token);
    buf.put_slice(&body);
    buf.put_u32(id.get());
    buf.put_u32(payload.expiration());
    buf.put_u8(Priority::from_raw(payload.priority()).as_u8());
    Ok(EncodedItem { bytes: buf.freeze() })
}

fn decode_token(hex_token: &str) -> Result<[u8; TOKEN_LEN], EncodeError> {
    let raw = hex::decode(hex_token)?;
    <[u8; TOKEN_LEN]>::try_from(raw.as_slice())
        .map_err(|_| EncodeError::InvalidTokenLength { len: raw.len() })
}

/// An item parsed back from the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedItem {
    /// Position of the item within its frame.
    pub local_id: u8,
    /// Raw device token.
    pub token: [u8; TOKEN_LEN],
    /// Marshaled payload body.
    pub payload: Bytes,
    /// Connection-scoped notification id.
    pub notification_id: u32,
    /// Expiry in UNIX epoch seconds.
    pub expiration: u32,
    /// Priority byte as sent.
    pub priority: u8,
}

impl DecodedItem {
    /// Device token as lowercase hex.
    #[must_use]
    pub fn token_hex(&self) -> String { hex::encode(self.token) }
}

/// Parse one item from the front of `src`, advancing past it.
///
/// # Errors
///
/// Returns [`DecodeError::Truncated`] if `src` ends before the item does and
/// [`DecodeError::ItemTooShort`] if the declared length cannot hold the fixed
/// fields.
pub fn decode_item(src: &mut Bytes) -> Result<DecodedItem, DecodeError> {
    if src.len() < ITEM_HEADER_LEN {
        return Err(DecodeError::Truncated {
            needed: ITEM_HEADER_LEN,
            available: src.len(),
        });
    }
    let local_id = src.get_u8();
    let item_len = src.get_u16();
    let body_len = usize::from(item_len);
    if body_len < ITEM_FIXED_LEN {
        return Err(DecodeError::ItemTooShort(item_len));
    }
    if src.len() < body_len {
        return Err(DecodeError::Truncated {
            needed: body_len,
            available: src.len(),
        });
    }

    let mut body = src.split_to(body_len);
    let mut token = [0u8; TOKEN_LEN];
    body.copy_to_slice(&mut token);
    let payload = body.split_to(body_len - ITEM_FIXED_LEN);
    Ok(DecodedItem {
        local_id,
        token,
        payload,
        notification_id: body.get_u32(),
        expiration: body.get_u32(),
        priority: body.get_u8(),
    })
}
