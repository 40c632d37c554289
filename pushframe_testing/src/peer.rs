//! In-memory stand-in for the push gateway.

use std::{
    io,
    pin::Pin,
    task::{Context, Poll},
};

use futures::StreamExt;
use pushframe::{
    ErrorCode,
    frame::{DecodedFrame, FrameDecoder},
};
use tokio::io::{
    AsyncRead,
    AsyncWriteExt,
    DuplexStream,
    ReadBuf,
    ReadHalf,
    WriteHalf,
    duplex,
};
use tokio_util::codec::FramedRead;

const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Create a transport for a connection and the peer at its other end.
#[must_use]
pub fn connected_pair() -> (DuplexStream, TestPeer) { connected_pair_with_capacity(DEFAULT_CAPACITY) }

/// Like [`connected_pair`] with an explicit in-flight buffer size.
#[must_use]
pub fn connected_pair_with_capacity(capacity: usize) -> (DuplexStream, TestPeer) {
    let (client, server) = duplex(capacity);
    (client, TestPeer::new(server))
}

/// Gateway end of an in-memory transport.
///
/// Reads decode command-2 frames; [`reject`](Self::reject) answers with the
/// six-byte error response.
pub struct TestPeer {
    frames: FramedRead<ReadHalf<DuplexStream>, FrameDecoder>,
    writer: WriteHalf<DuplexStream>,
}

impl TestPeer {
    /// Wrap the gateway side of a duplex stream.
    #[must_use]
    pub fn new(stream: DuplexStream) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            frames: FramedRead::new(reader, FrameDecoder::default()),
            writer,
        }
    }

    /// Wait for the next frame, or `None` once the connection has closed
    /// its side.
    ///
    /// # Panics
    ///
    /// Panics if the bytes on the wire are not a valid frame.
    pub async fn next_frame(&mut self) -> Option<DecodedFrame> {
        self.frames
            .next()
            .await
            .map(|frame| frame.expect("connection wrote a malformed frame"))
    }

    /// Collect every frame until the connection closes its side.
    pub async fn frames_until_closed(&mut self) -> Vec<DecodedFrame> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame().await {
            frames.push(frame);
        }
        frames
    }

    /// Send an error response naming `notification_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection has already released the stream.
    pub async fn reject(&mut self, code: ErrorCode, notification_id: u32) -> io::Result<()> {
        let mut response = [8u8, code.as_u8(), 0, 0, 0, 0];
        response[2..].copy_from_slice(&notification_id.to_be_bytes());
        self.writer.write_all(&response).await?;
        self.writer.flush().await
    }

    /// Close the gateway side so the connection's next read fails.
    pub async fn hang_up(mut self) {
        let _ = self.writer.shutdown().await;
        drop(self);
    }
}

/// A transport whose writes always fail and whose reads never complete.
#[derive(Debug, Default)]
pub struct BrokenTransport;

impl AsyncRead for BrokenTransport {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Pending
    }
}

impl tokio::io::AsyncWrite for BrokenTransport {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<Result<usize, io::Error>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone")))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}
