//! Error responses sent by the peer and the terminal event they produce.
//!
//! The peer answers only on failure, with a six-byte response:
//!
//! ```text
//! command(1) = 8 | status(1) | notification_id(4)
//! ```
//!
//! after which it closes the connection. Local read failures are folded into
//! the same [`ErrorEvent`] shape using [`ErrorCode::Shutdown`] and no
//! notification id, so a connection always ends with exactly one event.

use std::fmt;

use crate::frame::NotificationId;

/// Size of an error response on the wire.
pub const ERROR_RESPONSE_LEN: usize = 6;
/// Command byte the peer uses for error responses.
pub const ERROR_RESPONSE_COMMAND: u8 = 8;

/// Status codes the peer reports in error responses.
///
/// # Examples
///
/// ```
/// use pushframe::ErrorCode;
///
/// assert_eq!(ErrorCode::from_u8(8), ErrorCode::InvalidToken);
/// assert_eq!(ErrorCode::from_u8(9), ErrorCode::Unknown);
/// assert_eq!(ErrorCode::Shutdown.as_str(), "SHUTDOWN");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    /// No errors encountered.
    NoErrors = 0,
    /// The peer failed while processing the notification.
    ProcessingError = 1,
    /// The item carried no device token.
    MissingDeviceToken = 2,
    /// The item carried no topic.
    MissingTopic = 3,
    /// The item carried no payload.
    MissingPayload = 4,
    /// The device token has the wrong size.
    InvalidTokenSize = 5,
    /// The topic has the wrong size.
    InvalidTopicSize = 6,
    /// The payload exceeds the peer's limit.
    InvalidPayloadSize = 7,
    /// The device token is not valid for this peer.
    InvalidToken = 8,
    /// The connection is shutting down; also used for local transport
    /// failures.
    Shutdown = 10,
    /// Any status not listed above.
    Unknown = 255,
}

impl ErrorCode {
    /// Map a raw status byte, folding unlisted values into
    /// [`ErrorCode::Unknown`].
    #[must_use]
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::NoErrors,
            1 => Self::ProcessingError,
            2 => Self::MissingDeviceToken,
            3 => Self::MissingTopic,
            4 => Self::MissingPayload,
            5 => Self::InvalidTokenSize,
            6 => Self::InvalidTopicSize,
            7 => Self::InvalidPayloadSize,
            8 => Self::InvalidToken,
            10 => Self::Shutdown,
            _ => Self::Unknown,
        }
    }

    /// Wire value of the code.
    #[must_use]
    pub const fn as_u8(self) -> u8 { self as u8 }

    /// Protocol name of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoErrors => "NO_ERRORS",
            Self::ProcessingError => "PROCESSING_ERROR",
            Self::MissingDeviceToken => "MISSING_DEVICE_TOKEN",
            Self::MissingTopic => "MISSING_TOPIC",
            Self::MissingPayload => "MISSING_PAYLOAD",
            Self::InvalidTokenSize => "INVALID_TOKEN_SIZE",
            Self::InvalidTopicSize => "INVALID_TOPIC_SIZE",
            Self::InvalidPayloadSize => "INVALID_PAYLOAD_SIZE",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Shutdown => "SHUTDOWN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// The single event that ends a connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorEvent {
    /// Normalised status code.
    pub code: ErrorCode,
    /// Human-readable description: the code name for peer responses, the
    /// failure text for local errors.
    pub description: String,
    /// Notification the peer blamed, if any.
    pub notification_id: Option<NotificationId>,
}

impl ErrorEvent {
    /// Build an event from a six-byte peer error response.
    ///
    /// The command byte is not checked; the peer sends nothing else on this
    /// stream.
    ///
    /// # Examples
    ///
    /// ```
    /// use pushframe::{ErrorCode, ErrorEvent};
    ///
    /// let event = ErrorEvent::from_response([8, 8, 0, 0, 0, 2]);
    /// assert_eq!(event.code, ErrorCode::InvalidToken);
    /// assert_eq!(event.notification_id.map(|id| id.get()), Some(2));
    /// ```
    #[must_use]
    pub fn from_response(response: [u8; ERROR_RESPONSE_LEN]) -> Self {
        let code = ErrorCode::from_u8(response[1]);
        let id = u32::from_be_bytes([response[2], response[3], response[4], response[5]]);
        Self {
            code,
            description: code.as_str().to_owned(),
            notification_id: NotificationId::new(id),
        }
    }

    /// Build the synthetic event used when the transport fails or is closed
    /// locally.
    #[must_use]
    pub fn shutdown(reason: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Shutdown,
            description: reason.into(),
            notification_id: None,
        }
    }

    /// Return `true` if no particular notification was blamed.
    #[must_use]
    pub fn is_uncorrelated(&self) -> bool { self.notification_id.is_none() }
}

impl fmt::Display for ErrorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.notification_id {
            Some(id) => write!(f, "{} ({}) for notification {id}", self.code, self.description),
            None => write!(f, "{} ({})", self.code, self.description),
        }
    }
}
