#![doc(html_root_url = "https://docs.rs/pushframe/latest")]
//! Public API for the `pushframe` library.
//!
//! This crate drives the legacy binary push-notification interface over an
//! already-established duplex stream. Notifications are encoded into items,
//! batched into command-2 frames and written by a per-connection task, while
//! a second task waits for the single error response the peer may send
//! before hanging up. When the connection ends, the caller receives a
//! [`CloseResult`] naming the notification that failed and every
//! notification that is safe to resend.
//!
//! ```no_run
//! use pushframe::{Connection, Notification};
//! use tokio::net::TcpStream;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let stream = TcpStream::connect("127.0.0.1:2195").await?;
//! let mut conn = Connection::new(stream, 1_000)?;
//! let token = "00".repeat(32);
//! conn.submit(Notification::new(token, r#"{"aps":{"alert":"hi"}}"#))
//!     .await?;
//! conn.disconnect().await;
//! if let Some(close) = conn.close_notifications().recv().await {
//!     println!("resend {} notifications", close.unsent_payloads.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod frame;
pub mod metrics;
pub mod payload;
pub mod replay;
pub mod status;

pub use config::{ConfigError, ConnectionConfig};
pub use connection::{Connection, ConnectionBuilder, ConnectionId, SubmitError, SubmitHandle};
pub use frame::{EncodeError, NotificationId, Priority};
pub use payload::{MarshalError, Notification, Payload};
pub use replay::CloseResult;
pub use status::{ErrorCode, ErrorEvent};
