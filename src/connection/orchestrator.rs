//! Event loop tying submissions, flush timers and the terminal event
//! together.
//!
//! The loop polls three sources with a `tokio::select!`:
//!
//! - the terminal error event, checked first so nothing more is written once
//!   the connection has failed;
//! - the flush timer, a single sleep re-armed to the coalescing delay after
//!   every submission and to the flush interval after every flush;
//! - new submissions, which are given an id, recorded for replay, encoded and
//!   appended to the pending frame.
//!
//! Once the terminal event arrives the replay history is resolved into a
//! [`CloseResult`] and delivered exactly once.

use std::time::Duration;

use log::{info, warn};
use tokio::{
    sync::mpsc,
    time::{Instant, sleep},
};
use tracing::trace;

use super::{
    ConnectionId,
    counter::ActiveConnection,
    outbound::SharedOutbound,
    state::RunState,
};
use crate::{
    config::ConnectionConfig,
    frame::encode_item,
    metrics,
    payload::Payload,
    replay::{CloseResult, IdGenerator, IdentifiedPayload, ReplayBuffer},
    status::ErrorEvent,
};

/// What woke the loop.
enum Event<P> {
    Failed(ErrorEvent),
    Timer,
    Submitted(P),
    SubmittersGone,
}

pub(super) struct Orchestrator<P> {
    connection_id: ConnectionId,
    flush_interval: Duration,
    coalesce_delay: Duration,
    max_payload_size: usize,
    submissions: mpsc::Receiver<P>,
    errors: mpsc::Receiver<ErrorEvent>,
    close_tx: mpsc::Sender<CloseResult<P>>,
    outbound: SharedOutbound,
    ids: IdGenerator,
    replay: ReplayBuffer<P>,
    state: RunState,
    accepting: bool,
}

impl<P: Payload> Orchestrator<P> {
    pub(super) fn new(
        connection_id: ConnectionId,
        config: &ConnectionConfig,
        submissions: mpsc::Receiver<P>,
        errors: mpsc::Receiver<ErrorEvent>,
        close_tx: mpsc::Sender<CloseResult<P>>,
        outbound: SharedOutbound,
    ) -> Self {
        Self {
            connection_id,
            flush_interval: config.flush_interval,
            coalesce_delay: config.coalesce_delay,
            max_payload_size: config.max_payload_size,
            submissions,
            errors,
            close_tx,
            outbound,
            ids: IdGenerator::new(),
            replay: ReplayBuffer::new(config.replay_capacity),
            state: RunState::Active,
            accepting: true,
        }
    }

    /// Drive the connection until its terminal event, then deliver the close
    /// report.
    pub(super) async fn run(mut self) {
        let _active = ActiveConnection::new();
        let timer = sleep(self.flush_interval);
        tokio::pin!(timer);

        let error = loop {
            let event = tokio::select! {
                biased;

                event = self.errors.recv() => Event::Failed(
                    event.unwrap_or_else(|| ErrorEvent::shutdown("error channel closed")),
                ),
                () = &mut timer => Event::Timer,
                submission = self.submissions.recv(), if self.accepting => match submission {
                    Some(payload) => Event::Submitted(payload),
                    None => Event::SubmittersGone,
                },
            };

            match event {
                Event::Failed(error) => break error,
                Event::Timer => {
                    self.outbound.lock().await.flush().await;
                    timer.as_mut().reset(Instant::now() + self.flush_interval);
                }
                Event::Submitted(payload) => {
                    self.accept(payload).await;
                    timer.as_mut().reset(Instant::now() + self.coalesce_delay);
                }
                Event::SubmittersGone => {
                    info!(
                        "all submitters dropped; closing: connection={}",
                        self.connection_id
                    );
                    self.accepting = false;
                    self.outbound.lock().await.flush_and_close().await;
                    timer.as_mut().reset(Instant::now() + self.flush_interval);
                }
            }
        };

        self.finish(error).await;
    }

    /// Record and encode one submission, then append it to the pending frame.
    ///
    /// The payload enters the replay history before encoding, so one that
    /// fails to encode is still reported when the connection closes.
    async fn accept(&mut self, payload: P) {
        let id = self.ids.next_id();
        let encoded = encode_item(&payload, id, self.max_payload_size);
        if let Some(evicted) = self.replay.record(IdentifiedPayload::new(id, payload)) {
            trace!(
                connection = %self.connection_id,
                evicted = %evicted.id,
                "replay history full; oldest entry evicted"
            );
        }
        metrics::inc_submitted();

        let mut outbound = self.outbound.lock().await;
        match encoded {
            Ok(item) => {
                let local_id = outbound.append(&item).await;
                trace!(connection = %self.connection_id, %id, local_id, "notification buffered");
            }
            Err(e) => {
                warn!(
                    "notification failed to encode; disconnecting: connection={}, id={id}, error={e}",
                    self.connection_id
                );
                outbound.report(ErrorEvent::shutdown(format!(
                    "notification {id} failed to encode: {e}"
                )));
                outbound.flush_and_close().await;
            }
        }
    }

    /// Resolve the replay history against `error` and deliver the result.
    async fn finish(mut self, error: ErrorEvent) {
        self.state.advance(RunState::Closing);
        metrics::inc_connection_errors(error.code);
        self.submissions.close();
        // Pending items are not written after a terminal event; they are
        // reported as unsent below.
        self.outbound.lock().await.close().await;

        let mut result = self.replay.resolve(error);
        // Handed off but never picked up; nothing was written for these.
        while let Ok(payload) = self.submissions.try_recv() {
            result.unsent_payloads.push(payload);
        }
        info!(
            "connection closing: connection={}, error={}, unsent={}, error_payload={}, overflow={}",
            self.connection_id,
            result.error,
            result.unsent_payloads.len(),
            result.error_payload.is_some(),
            result.unsent_buffer_overflow
        );

        if self.close_tx.send(result).await.is_err() {
            trace!(connection = %self.connection_id, "close report dropped; receiver gone");
        }
        drop(self.close_tx);
        self.state.advance(RunState::Closed);
        info!("connection {}: connection={}", self.state, self.connection_id);
    }
}
