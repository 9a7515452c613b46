//! Sensor ingest listener
//!
//! Line-delimited `UPDATE <lot> <delta>` commands. Every line is answered
//! `ACK` - including unknown lots and unparseable input - because sensors
//! have no use for validation failures. The only thing that can slow a
//! sensor down is the bounded update queue filling up, at which point the
//! enqueue (and therefore the `ACK`) waits.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lotd_ingest::{SensorUpdate, UpdateSender};

use crate::error::{Result, ServerError};

/// The sensor ingest listener
pub struct SensorServer {
    addr: String,
    updates: UpdateSender,
}

impl SensorServer {
    /// Create a listener for `addr`
    pub fn new(addr: impl Into<String>, updates: UpdateSender) -> Self {
        Self {
            addr: addr.into(),
            updates,
        }
    }

    /// Accept connections until cancelled
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let listener = TcpListener::bind(&self.addr)
            .await
            .map_err(|e| ServerError::Bind {
                address: self.addr.clone(),
                source: e,
            })?;

        info!(address = %self.addr, "sensor ingest listening");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let updates = self.updates.clone();
                        tokio::spawn(async move {
                            debug!(peer = %peer, "sensor connected");
                            if let Err(e) = handle_connection(stream, updates).await
                                && !e.is_disconnect()
                            {
                                debug!(peer = %peer, error = %e, "sensor connection error");
                            }
                            debug!(peer = %peer, "sensor disconnected");
                        });
                    }
                    Err(e) => warn!(error = %e, "accept error"),
                }
            }
        }

        info!("sensor ingest stopped");
        Ok(())
    }
}

async fn handle_connection(stream: TcpStream, updates: UpdateSender) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match SensorUpdate::parse(line) {
            Some(update) => {
                // Blocks while the queue is full; the ACK below is the
                // acknowledgment of enqueue, not of application
                if updates.send(update).await.is_err() {
                    return Err(ServerError::UpdateQueueClosed);
                }
            }
            None => warn!(line = %line, "malformed sensor update"),
        }

        write_half.write_all(b"ACK\n").await?;
    }

    Ok(())
}
