//! Utilities for exercising a [`pushframe::Connection`] against an
//! in-memory peer during tests.
//!
//! [`connected_pair`] returns a transport for the connection and a
//! [`TestPeer`] that decodes the frames it writes and can answer with an
//! error response, the way a push gateway would.
//!
//! ```rust
//! use pushframe::Connection;
//! use pushframe_testing::{connected_pair, notification};
//!
//! # async fn example() {
//! let (transport, mut peer) = connected_pair();
//! let conn = Connection::new(transport, 16).unwrap();
//! conn.submit(notification(1)).await.unwrap();
//! let frame = peer.next_frame().await.unwrap();
//! assert_eq!(frame.items.len(), 1);
//! # }
//! ```

pub mod logging;
pub mod payloads;
pub mod peer;

pub use logging::{LoggerHandle, logger};
pub use payloads::{Unmarshallable, notification, token};
pub use peer::{BrokenTransport, TestPeer, connected_pair, connected_pair_with_capacity};
