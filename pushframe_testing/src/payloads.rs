//! Notifications for tests.

use bytes::Bytes;
use pushframe::{MarshalError, Notification, Payload};

/// A 64-character hex device token unique to `n`.
#[must_use]
pub fn token(n: u32) -> String { format!("{n:064x}") }

/// A notification for device `n` whose body names `n`.
#[must_use]
pub fn notification(n: u32) -> Notification {
    Notification::new(token(n), format!(r#"{{"n":{n}}}"#))
}

/// A payload whose body can never be produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unmarshallable {
    token: String,
}

impl Unmarshallable {
    /// Create a payload for device `n`.
    #[must_use]
    pub fn new(n: u32) -> Self { Self { token: token(n) } }
}

impl Payload for Unmarshallable {
    fn token(&self) -> &str { &self.token }

    fn priority(&self) -> u8 { 10 }

    fn expiration(&self) -> u32 { 0 }

    fn marshal(&self, _max_len: usize) -> Result<Bytes, MarshalError> {
        Err(MarshalError::Invalid("body refused".into()))
    }
}
