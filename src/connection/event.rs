//! Single-slot hand-off of the terminal error event.

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

use crate::status::ErrorEvent;

/// Sending side of the terminal event slot.
///
/// The detector and the flush path may both fail; whichever offers first
/// wins. Later offers are dropped without blocking.
#[derive(Clone, Debug)]
pub(super) struct ErrorSlot(mpsc::Sender<ErrorEvent>);

impl ErrorSlot {
    pub(super) fn channel() -> (Self, mpsc::Receiver<ErrorEvent>) {
        let (tx, rx) = mpsc::channel(1);
        (Self(tx), rx)
    }

    /// Offer `event`, returning `true` if it was accepted.
    pub(super) fn offer(&self, event: ErrorEvent) -> bool {
        match self.0.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event) | TrySendError::Closed(event)) => {
                debug!(code = %event.code, "terminal event already recorded; dropping");
                false
            }
        }
    }
}
