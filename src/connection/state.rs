//! Orchestrator lifecycle state.

use std::fmt;

/// Run state of a connection's orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum RunState {
    /// Accepting submissions and flushing on timers.
    Active,
    /// The terminal event arrived; the close report is being built.
    Closing,
    /// The close report was delivered and the notification channel closed.
    Closed,
}

impl RunState {
    /// Move to `next`, which must not go backwards.
    pub(super) fn advance(&mut self, next: Self) {
        debug_assert!(next.rank() > self.rank(), "{self} cannot move to {next}");
        *self = next;
    }

    fn rank(self) -> u8 {
        match self {
            Self::Active => 0,
            Self::Closing => 1,
            Self::Closed => 2,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Closing => "closing",
            Self::Closed => "closed",
        })
    }
}
