//! Metric helpers for `pushframe`.
//!
//! This module defines metric names and simple helper functions wrapping
//! the [`metrics`](https://docs.rs/metrics) crate. With the `metrics`
//! feature disabled every helper compiles to a no-op.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

use crate::status::ErrorCode;

/// Name of the gauge tracking active connections.
pub const CONNECTIONS_ACTIVE: &str = "pushframe_connections_active";
/// Name of the counter tracking frames written to the transport.
pub const FRAMES_FLUSHED: &str = "pushframe_frames_flushed_total";
/// Name of the counter tracking bytes written to the transport.
pub const BYTES_FLUSHED: &str = "pushframe_bytes_flushed_total";
/// Name of the counter tracking accepted submissions.
pub const NOTIFICATIONS_SUBMITTED: &str = "pushframe_notifications_submitted_total";
/// Name of the counter tracking terminal connection errors, labelled by code.
pub const CONNECTION_ERRORS: &str = "pushframe_connection_errors_total";

/// Increment the active connections gauge.
pub fn inc_connections() {
    #[cfg(feature = "metrics")]
    gauge!(CONNECTIONS_ACTIVE).increment(1.0);
}

/// Decrement the active connections gauge.
pub fn dec_connections() {
    #[cfg(feature = "metrics")]
    gauge!(CONNECTIONS_ACTIVE).decrement(1.0);
}

/// Record one frame of `bytes` length written to the transport.
pub fn inc_frames_flushed(bytes: usize) {
    #[cfg(feature = "metrics")]
    {
        counter!(FRAMES_FLUSHED).increment(1);
        counter!(BYTES_FLUSHED).increment(bytes as u64);
    }
    #[cfg(not(feature = "metrics"))]
    let _ = bytes;
}

/// Record a submission accepted by the orchestrator.
pub fn inc_submitted() {
    #[cfg(feature = "metrics")]
    counter!(NOTIFICATIONS_SUBMITTED).increment(1);
}

/// Record the terminal event of a connection.
pub fn inc_connection_errors(code: ErrorCode) {
    #[cfg(feature = "metrics")]
    counter!(CONNECTION_ERRORS, "code" => code.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = code;
}
