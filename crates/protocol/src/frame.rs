//! Length-prefixed framing
//!
//! Every binary channel (RPC and pub/sub) carries discrete messages framed
//! the same way:
//!
//! ```text
//! ┌──────────────┬─────────────────────────────────────┐
//! │ 4 bytes      │ N bytes                             │
//! │ length (BE)  │ UTF-8 payload                       │
//! └──────────────┴─────────────────────────────────────┘
//! ```
//!
//! A read that ends cleanly between frames is a normal disconnect
//! (`Ok(None)`); EOF inside the prefix or the payload is a protocol fault
//! fatal to that connection. No maximum frame size is enforced.

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ProtocolError, Result};

/// Length prefix size (4 bytes, big-endian u32)
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Read one frame from the stream
///
/// Returns `Ok(None)` when the peer closed the connection at a frame
/// boundary. Loops over partial reads until the declared payload length is
/// satisfied.
///
/// # Errors
///
/// - `ShortRead` if EOF arrives inside the length prefix
/// - `IncompleteFrame` if EOF arrives inside the payload
pub async fn read_frame<R>(stream: &mut R) -> Result<Option<Bytes>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    let got = read_until_full(stream, &mut prefix).await?;
    if got == 0 {
        return Ok(None);
    }
    if got < LENGTH_PREFIX_SIZE {
        return Err(ProtocolError::ShortRead { got });
    }

    let expected = u32::from_be_bytes(prefix) as usize;
    let mut payload = BytesMut::zeroed(expected);
    let got = read_until_full(stream, &mut payload).await?;
    if got < expected {
        return Err(ProtocolError::IncompleteFrame { expected, got });
    }

    Ok(Some(payload.freeze()))
}

/// Write one frame to the stream
///
/// Prefix and payload go out in a single write so a frame is never split
/// across an await point on the send side.
pub async fn write_frame<W>(stream: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(payload);
    stream.write_all(&buf).await?;
    Ok(())
}

/// Fill `buf` from the stream, stopping early only at EOF
///
/// Returns the number of bytes actually read.
async fn read_until_full<R>(stream: &mut R, buf: &mut [u8]) -> Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = stream.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;
