//! Builder for configuring a [`Connection`].

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

use super::Connection;
use crate::{
    config::{ConfigError, ConnectionConfig},
    payload::Payload,
};

/// Builder for [`Connection`].
///
/// Starts from [`ConnectionConfig::default`]; every setter overrides one
/// field. The settings are validated when [`build`](Self::build) is called.
///
/// # Examples
///
/// ```rust,no_run
/// use std::time::Duration;
///
/// use pushframe::{Connection, ConnectionBuilder, Notification};
/// use tokio::net::TcpStream;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let stream = TcpStream::connect("127.0.0.1:2195").await?;
/// let conn: Connection<Notification> = ConnectionBuilder::new()
///     .replay_capacity(500)
///     .coalesce_delay(Duration::from_millis(5))
///     .build(stream)?;
/// # drop(conn);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ConnectionBuilder {
    config: ConnectionConfig,
}

impl ConnectionBuilder {
    /// Create a builder populated with the default settings.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Replace every setting with `config`.
    #[must_use]
    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Number of recent notifications kept for replay.
    #[must_use]
    pub fn replay_capacity(mut self, capacity: usize) -> Self {
        self.config.replay_capacity = capacity;
        self
    }

    /// Upper bound on the size of one written frame, header included.
    #[must_use]
    pub fn max_frame_size(mut self, size: usize) -> Self {
        self.config.max_frame_size = size;
        self
    }

    /// Upper bound on one marshalled payload.
    #[must_use]
    pub fn max_payload_size(mut self, size: usize) -> Self {
        self.config.max_payload_size = size;
        self
    }

    /// Idle period after which a pending frame is written regardless.
    #[must_use]
    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.config.flush_interval = interval;
        self
    }

    /// Quiet period after a submission before the pending frame is written.
    #[must_use]
    pub fn coalesce_delay(mut self, delay: Duration) -> Self {
        self.config.coalesce_delay = delay;
        self
    }

    /// Settings accumulated so far.
    #[must_use]
    pub fn settings(&self) -> &ConnectionConfig { &self.config }

    /// Validate the settings and start a connection over `transport`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the settings are inconsistent.
    pub fn build<P, T>(self, transport: T) -> Result<Connection<P>, ConfigError>
    where
        P: Payload,
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        let config = self.config.validate()?;
        Ok(Connection::start(config, transport))
    }
}
