//! The notification payload seam.
//!
//! Building alert bodies is not this crate's concern. A connection only needs
//! each notification's device token, priority and expiry, plus a way to turn
//! it into body bytes no longer than the configured limit. [`Payload`]
//! captures that contract; [`Notification`] implements it over a body the
//! caller has already marshaled.

use bytes::Bytes;
use thiserror::Error;

/// Errors raised while producing the body bytes of a notification.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MarshalError {
    /// The marshaled body does not fit in the allowed size.
    #[error("payload body is {len} bytes; at most {max} allowed")]
    TooLarge {
        /// Size of the body that was produced.
        len: usize,
        /// Maximum size accepted by the connection.
        max: usize,
    },
    /// The payload could not be marshaled at all.
    #[error("failed to marshal payload body")]
    Invalid(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A notification that can be submitted to a [`Connection`](crate::Connection).
///
/// Implementors are moved into the connection on submission and handed back
/// in the [`CloseResult`](crate::CloseResult) if they were never confirmed,
/// so callers can resend them on a fresh connection.
pub trait Payload: Send + 'static {
    /// Device token as a hex string of 32 bytes.
    fn token(&self) -> &str;

    /// Requested delivery priority. Values other than 5 and 10 are sent as 5.
    fn priority(&self) -> u8;

    /// Expiry as UNIX epoch seconds. Zero asks the peer not to store the
    /// notification.
    fn expiration(&self) -> u32;

    /// Produce the body bytes, no longer than `max_len`.
    ///
    /// # Errors
    ///
    /// Returns [`MarshalError`] if the body cannot be produced or exceeds
    /// `max_len`.
    fn marshal(&self, max_len: usize) -> Result<Bytes, MarshalError>;
}

/// A notification with a pre-marshaled body.
///
/// # Examples
///
/// ```
/// use pushframe::{Notification, Payload};
///
/// let n = Notification::new("ab".repeat(32), r#"{"aps":{}}"#)
///     .with_priority(10)
///     .with_expiration(1_700_000_000);
/// assert_eq!(n.priority(), 10);
/// assert!(n.marshal(256).is_ok());
/// assert!(n.marshal(4).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    token: String,
    body: Bytes,
    priority: u8,
    expiration: u32,
}

impl Notification {
    /// Create a notification for `token` carrying `body`, sent immediately
    /// (priority 10) and never stored by the peer.
    pub fn new(token: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            token: token.into(),
            body: body.into(),
            priority: 10,
            expiration: 0,
        }
    }

    /// Set the delivery priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Set the expiry in UNIX epoch seconds.
    #[must_use]
    pub fn with_expiration(mut self, expiration: u32) -> Self {
        self.expiration = expiration;
        self
    }

    /// Body bytes as supplied.
    #[must_use]
    pub fn body(&self) -> &Bytes { &self.body }
}

impl Payload for Notification {
    fn token(&self) -> &str { &self.token }

    fn priority(&self) -> u8 { self.priority }

    fn expiration(&self) -> u32 { self.expiration }

    fn marshal(&self, max_len: usize) -> Result<Bytes, MarshalError> {
        if self.body.len() > max_len {
            return Err(MarshalError::TooLarge {
                len: self.body.len(),
                max: max_len,
            });
        }
        Ok(self.body.clone())
    }
}
