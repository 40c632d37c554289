//! Outbound half of a connection: the pending frame and the write side of
//! the transport, guarded together so frames never interleave on the wire.

use std::{pin::Pin, sync::Arc};

use log::{info, warn};
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::Mutex,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::{ConnectionId, event::ErrorSlot};
use crate::{
    frame::{EncodedItem, FrameBuffer},
    metrics,
    status::ErrorEvent,
};

/// Type-erased write half of the transport.
pub(super) type BoxedWriter = Pin<Box<dyn AsyncWrite + Send>>;

/// Outbound state shared by the orchestrator and [`Connection::disconnect`](super::Connection::disconnect).
pub(super) type SharedOutbound = Arc<Mutex<Outbound>>;

/// The pending frame plus the means to write and close the transport.
///
/// Every method requires `&mut self`, so callers must hold the connection's
/// outbound lock; that lock is what keeps flushes from overlapping.
pub(super) struct Outbound {
    connection_id: ConnectionId,
    frame: FrameBuffer,
    writer: Option<BoxedWriter>,
    closer: CancellationToken,
    errors: ErrorSlot,
}

impl Outbound {
    pub(super) fn new(
        connection_id: ConnectionId,
        max_frame_size: usize,
        writer: BoxedWriter,
        closer: CancellationToken,
        errors: ErrorSlot,
    ) -> Self {
        Self {
            connection_id,
            frame: FrameBuffer::new(max_frame_size),
            writer: Some(writer),
            closer,
            errors,
        }
    }

    pub(super) fn into_shared(self) -> SharedOutbound { Arc::new(Mutex::new(self)) }

    /// Return `true` once the transport has been closed locally.
    pub(super) fn is_closed(&self) -> bool { self.writer.is_none() }

    /// Offer a terminal event on behalf of the outbound path.
    pub(super) fn report(&self, event: ErrorEvent) -> bool { self.errors.offer(event) }

    /// Append `item` to the pending frame, flushing first if it would not
    /// fit, and return the local id it was given.
    pub(super) async fn append(&mut self, item: &EncodedItem) -> u8 {
        if self.frame.needs_flush_before(item) {
            trace!(connection = %self.connection_id, "frame full; flushing before append");
            self.flush().await;
        }
        self.frame.push(item)
    }

    /// Write the pending frame, if any, to the transport.
    ///
    /// The buffer is emptied whether or not the write succeeds. A failed
    /// write closes the transport without retrying; the notifications it
    /// carried stay in the replay history and are reported as unsent.
    pub(super) async fn flush(&mut self) {
        let Some(frame) = self.frame.take_frame() else {
            return;
        };
        let Some(writer) = self.writer.as_mut() else {
            debug!(
                connection = %self.connection_id,
                bytes = frame.len(),
                "transport closed; discarding pending frame"
            );
            return;
        };

        let result = match writer.write_all(&frame).await {
            Ok(()) => writer.flush().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                debug!(connection = %self.connection_id, bytes = frame.len(), "frame flushed");
                metrics::inc_frames_flushed(frame.len());
            }
            Err(e) => {
                warn!(
                    "frame write failed: connection={}, bytes={}, error={e}",
                    self.connection_id,
                    frame.len()
                );
                self.errors
                    .offer(ErrorEvent::shutdown(format!("write failed: {e}")));
                self.close().await;
            }
        }
    }

    /// Close the transport: stop the detector's read and shut down the
    /// write half. Idempotent.
    pub(super) async fn close(&mut self) {
        self.closer.cancel();
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.shutdown().await {
                debug!(connection = %self.connection_id, error = %e, "transport shutdown failed");
            }
            info!("transport closed: connection={}", self.connection_id);
        }
    }

    /// Flush whatever is pending, then close the transport.
    pub(super) async fn flush_and_close(&mut self) {
        self.flush().await;
        self.close().await;
    }
}
