//! Background listener for the peer's error response.

use log::{info, warn};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{ConnectionId, event::ErrorSlot};
use crate::status::{ERROR_RESPONSE_COMMAND, ERROR_RESPONSE_LEN, ErrorEvent};

/// Wait for the peer's error response, a read failure, or a local close,
/// and offer the resulting event.
///
/// The read half is dropped on return, which together with the outbound
/// path dropping the write half releases the transport.
pub(super) async fn run<R>(
    connection_id: ConnectionId,
    mut reader: R,
    closer: CancellationToken,
    errors: ErrorSlot,
) where
    R: AsyncRead + Unpin,
{
    let mut response = [0u8; ERROR_RESPONSE_LEN];
    let event = tokio::select! {
        biased;

        read = reader.read_exact(&mut response) => match read {
            Ok(_) => {
                if response[0] != ERROR_RESPONSE_COMMAND {
                    debug!(
                        connection = %connection_id,
                        command = response[0],
                        "unexpected command byte in error response"
                    );
                }
                let event = ErrorEvent::from_response(response);
                warn!("peer reported error: connection={connection_id}, error={event}");
                event
            }
            Err(e) => {
                info!("transport read ended: connection={connection_id}, error={e}");
                ErrorEvent::shutdown(e.to_string())
            }
        },
        () = closer.cancelled() => ErrorEvent::shutdown("transport closed locally"),
    };
    errors.offer(event);
}
