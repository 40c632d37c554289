//! Connection facade and the tasks that drive it.
//!
//! [`Connection::new`] splits the transport and spawns two tasks on a
//! [`TaskTracker`]:
//!
//! - the orchestrator, which assigns ids, records replay history, batches
//!   encoded items into frames and writes them;
//! - the error detector, which waits for the peer's single error response
//!   or for the transport to end.
//!
//! Both converge on a single-shot error slot. Whichever event lands first
//! becomes the connection's terminal event; the orchestrator resolves it
//! against the replay history and publishes one [`CloseResult`].

mod builder;
mod counter;
mod detector;
mod error;
mod event;
mod orchestrator;
mod outbound;
mod state;

pub use builder::ConnectionBuilder;
pub use counter::{ConnectionId, active_connection_count};
pub use error::SubmitError;
use log::info;
use orchestrator::Orchestrator;
use outbound::{Outbound, SharedOutbound};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::mpsc,
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    config::{ConfigError, ConnectionConfig},
    payload::Payload,
    replay::CloseResult,
};

/// Clonable handle for submitting notifications to a [`Connection`].
///
/// Submissions apply backpressure: `submit` waits until the orchestrator is
/// ready to take the next payload.
pub struct SubmitHandle<P> {
    tx: mpsc::Sender<P>,
}

impl<P> Clone for SubmitHandle<P> {
    fn clone(&self) -> Self { Self { tx: self.tx.clone() } }
}

impl<P: Payload> SubmitHandle<P> {
    /// Hand `payload` to the connection.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Closed`] carrying the payload once the
    /// connection has stopped accepting submissions.
    pub async fn submit(&self, payload: P) -> Result<(), SubmitError<P>> {
        self.tx
            .send(payload)
            .await
            .map_err(|e| SubmitError::Closed(e.0))
    }

    /// Return `true` once the connection no longer accepts submissions.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.tx.is_closed() }
}

/// A live connection to a push gateway.
///
/// Dropping the connection without calling [`disconnect`](Self::disconnect)
/// still shuts it down once every [`SubmitHandle`] is gone: pending items
/// are flushed and the transport is closed.
pub struct Connection<P> {
    id: ConnectionId,
    handle: SubmitHandle<P>,
    close_rx: mpsc::Receiver<CloseResult<P>>,
    outbound: SharedOutbound,
    tracker: TaskTracker,
}

impl<P: Payload> Connection<P> {
    /// Start a connection over `transport` with default settings and a replay
    /// history of `replay_capacity` notifications.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroReplayCapacity`] if `replay_capacity` is
    /// zero.
    pub fn new<T>(transport: T, replay_capacity: usize) -> Result<Self, ConfigError>
    where
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        ConnectionBuilder::new()
            .replay_capacity(replay_capacity)
            .build(transport)
    }

    /// Return a builder for custom settings.
    #[must_use]
    pub fn builder() -> ConnectionBuilder { ConnectionBuilder::new() }

    pub(crate) fn start<T>(config: ConnectionConfig, transport: T) -> Self
    where
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        let id = ConnectionId::next();
        let (reader, writer) = tokio::io::split(transport);
        let (errors, errors_rx) = event::ErrorSlot::channel();
        let closer = CancellationToken::new();
        let (submit_tx, submit_rx) = mpsc::channel(1);
        let (close_tx, close_rx) = mpsc::channel(1);

        let outbound = Outbound::new(
            id,
            config.max_frame_size,
            Box::pin(writer),
            closer.clone(),
            errors.clone(),
        )
        .into_shared();
        let orchestrator = Orchestrator::new(
            id,
            &config,
            submit_rx,
            errors_rx,
            close_tx,
            outbound.clone(),
        );

        let tracker = TaskTracker::new();
        tracker.spawn(orchestrator.run());
        tracker.spawn(detector::run(id, reader, closer, errors));
        tracker.close();

        info!(
            "connection opened: connection={id}, replay_capacity={}, max_frame_size={}",
            config.replay_capacity, config.max_frame_size
        );
        Self {
            id,
            handle: SubmitHandle { tx: submit_tx },
            close_rx,
            outbound,
            tracker,
        }
    }

    /// Identifier used for this connection in logs.
    #[must_use]
    pub fn id(&self) -> ConnectionId { self.id }

    /// Return a clonable handle for submitting from other tasks.
    #[must_use]
    pub fn handle(&self) -> SubmitHandle<P> { self.handle.clone() }

    /// Hand `payload` to the connection.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Closed`] carrying the payload once the
    /// connection has stopped accepting submissions.
    pub async fn submit(&self, payload: P) -> Result<(), SubmitError<P>> {
        self.handle.submit(payload).await
    }

    /// Channel on which the single [`CloseResult`] is delivered.
    ///
    /// The channel yields exactly one value and then reports closed.
    pub fn close_notifications(&mut self) -> &mut mpsc::Receiver<CloseResult<P>> {
        &mut self.close_rx
    }

    /// Give up the connection, keeping only its close channel.
    ///
    /// Dropping the connection's own handle lets the orchestrator shut down
    /// once no cloned [`SubmitHandle`] remains.
    #[must_use]
    pub fn into_close_notifications(self) -> mpsc::Receiver<CloseResult<P>> { self.close_rx }

    /// Write any pending frame and close the transport.
    ///
    /// Safe to call repeatedly. The close is observed by the error detector,
    /// so a [`CloseResult`] still follows on
    /// [`close_notifications`](Self::close_notifications).
    pub async fn disconnect(&self) {
        info!("disconnect requested: connection={}", self.id);
        let mut outbound = self.outbound.lock().await;
        if outbound.is_closed() {
            return;
        }
        outbound.flush_and_close().await;
    }

    /// Wait for both connection tasks to finish and return the close report,
    /// unless it was already received through
    /// [`close_notifications`](Self::close_notifications).
    ///
    /// The connection ends after [`disconnect`](Self::disconnect), after a
    /// peer error, or once the last [`SubmitHandle`] is dropped.
    pub async fn join(self) -> Option<CloseResult<P>> {
        let Self {
            tracker,
            handle,
            mut close_rx,
            ..
        } = self;
        drop(handle);
        tracker.wait().await;
        close_rx.try_recv().ok()
    }
}
