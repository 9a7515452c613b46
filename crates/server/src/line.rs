//! Line protocol listener
//!
//! Newline-terminated ASCII commands from interactive clients. Each accepted
//! connection gets its own task running a synchronous read-dispatch-write
//! loop, so per-connection request ordering is free. Malformed input answers
//! with `ERROR: ...` and keeps the connection; only I/O faults close it.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lotd_protocol::Command;
use lotd_store::{LotStore, ReserveOutcome, StoreError};

use crate::error::{Result, ServerError};

/// The interactive query listener
pub struct LineServer {
    addr: String,
    store: Arc<LotStore>,
}

impl LineServer {
    /// Create a listener for `addr` (e.g. `"127.0.0.1:5000"`)
    pub fn new(addr: impl Into<String>, store: Arc<LotStore>) -> Self {
        Self {
            addr: addr.into(),
            store,
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

        info!(address = %self.addr, "line protocol listening");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let store = Arc::clone(&self.store);
                        tokio::spawn(async move {
                            debug!(peer = %peer, "line client connected");
                            if let Err(e) = handle_connection(stream, store).await
                                && !e.is_disconnect()
                            {
                                debug!(peer = %peer, error = %e, "line connection error");
                            }
                            debug!(peer = %peer, "line client disconnected");
                        });
                    }
                    Err(e) => warn!(error = %e, "accept error"),
                }
            }
        }

        info!("line protocol stopped");
        Ok(())
    }
}

async fn handle_connection(stream: TcpStream, store: Arc<LotStore>) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut response = respond(&store, line);
        response.push('\n');
        write_half.write_all(response.as_bytes()).await?;
    }

    Ok(())
}

/// Map one command line to its response line
pub fn respond(store: &LotStore, line: &str) -> String {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(e) => return format!("ERROR: {e}"),
    };

    match command {
        Command::Ping => "PONG".to_string(),
        Command::Lots => match serde_json::to_string(&store.list_snapshots()) {
            Ok(json) => json,
            Err(e) => format!("ERROR: {e}"),
        },
        Command::Avail { lot_id } => match store.snapshot(&lot_id) {
            Ok(snapshot) => snapshot.free.to_string(),
            Err(StoreError::UnknownLot(_)) => "ERROR: Unknown lot".to_string(),
        },
        Command::Reserve { lot_id, plate } => match store.reserve(&lot_id, &plate) {
            Ok(ReserveOutcome::Reserved) => "OK".to_string(),
            Ok(ReserveOutcome::Full) => "FULL".to_string(),
            Ok(ReserveOutcome::Exists) => "EXISTS".to_string(),
            Err(StoreError::UnknownLot(_)) => "ERROR: Unknown lot".to_string(),
        },
        Command::Cancel { lot_id, plate } => match store.cancel(&lot_id, &plate) {
            Ok(true) => "OK".to_string(),
            Ok(false) => "NOT_FOUND".to_string(),
            Err(StoreError::UnknownLot(_)) => "ERROR: Unknown lot".to_string(),
        },
    }
}

#[cfg(test)]
#[path = "line_test.rs"]
mod tests;
