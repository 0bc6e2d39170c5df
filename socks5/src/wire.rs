use bytes::BytesMut;
use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Result, SocksError};
use crate::protocol::CHUNK_SIZE;

/// Read exactly one chunk from the stream.
///
/// Handshake and request messages are expected to arrive whole in a single
/// read. Nothing is reassembled across reads: a message split over several
/// TCP segments is seen truncated, and bytes pipelined after a message in the
/// same segment are dropped along with the chunk.
pub async fn read_chunk<S>(stream: &mut S) -> Result<BytesMut>
where
    S: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
    let n = stream.read_buf(&mut buf).await?;
    if n == 0 {
        return Err(SocksError::ConnectionClosed);
    }
    Ok(buf)
}

/// End our side of the stream. Failures are irrelevant at this point.
pub async fn close<S>(stream: &mut S)
where
    S: AsyncWrite + Unpin,
{
    if let Err(e) = stream.shutdown().await {
        debug!("shutdown failed: {}", e);
    }
}
