//! Connection identifiers and the active-connection gauge.

use std::sync::atomic::{AtomicU64, Ordering};

use derive_more::{Display, From};

/// Global gauge tracking live connections.
static ACTIVE_CONNECTIONS: AtomicU64 = AtomicU64::new(0);
/// Source of process-unique connection identifiers.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier assigned to each connection for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, From)]
#[display("conn-{_0}")]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub(super) fn next() -> Self { Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed)) }

    /// Return the inner `u64` representation.
    #[must_use]
    pub fn as_u64(self) -> u64 { self.0 }
}

/// RAII guard counting a connection as active until its orchestrator exits.
pub(super) struct ActiveConnection;

impl ActiveConnection {
    pub(super) fn new() -> Self {
        ACTIVE_CONNECTIONS.fetch_add(1, Ordering::Relaxed);
        crate::metrics::inc_connections();
        Self
    }
}

impl Drop for ActiveConnection {
    fn drop(&mut self) {
        ACTIVE_CONNECTIONS.fetch_sub(1, Ordering::Relaxed);
        crate::metrics::dec_connections();
    }
}

/// Return the number of connections whose orchestrator is still running.
#[must_use]
pub fn active_connection_count() -> u64 { ACTIVE_CONNECTIONS.load(Ordering::Relaxed) }
