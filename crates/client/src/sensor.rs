//! Sensor client
//!
//! Pushes `UPDATE <lot> <delta>` lines and waits for the `ACK` that means
//! the delta landed on the server's work queue (not that it was applied).

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::error::{ClientError, Result};

/// Client stub for the sensor ingest channel
pub struct SensorClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl SensorClient {
    /// Connect to the sensor listener
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (read_half, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer,
        })
    }

    /// Send one occupancy delta and wait for its `ACK`
    pub async fn send(&mut self, lot_id: &str, delta: i64) -> Result<()> {
        self.writer
            .write_all(format!("UPDATE {lot_id} {delta}\n").as_bytes())
            .await?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Err(ClientError::ConnectionClosed);
        }
        if line.trim() != "ACK" {
            return Err(ClientError::UnexpectedReply(line.trim().to_string()));
        }
        Ok(())
    }
}
