//! Errors returned to callers submitting notifications.

use std::fmt;

/// A submission was refused because the connection is no longer accepting
/// notifications.
///
/// The rejected payload is handed back so it can be sent elsewhere.
pub enum SubmitError<P> {
    /// The connection has ended or is ending.
    Closed(P),
}

impl<P> SubmitError<P> {
    /// Recover the payload that was not submitted.
    pub fn into_inner(self) -> P {
        match self {
            Self::Closed(payload) => payload,
        }
    }
}

impl<P> fmt::Debug for SubmitError<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

impl<P> fmt::Display for SubmitError<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed(_) => f.write_str("connection closed; notification not submitted"),
        }
    }
}

impl<P> std::error::Error for SubmitError<P> {}
