//! Sensor ingest pipeline settings

use serde::Deserialize;

/// Update pipeline configuration
///
/// Sensor deltas are acknowledged immediately and queued for a fixed pool of
/// workers; the queue is bounded so a burst eventually pushes back on the
/// sensor connection rather than growing memory.
///
/// # Example
///
/// ```toml
/// [ingest]
/// workers = 3
/// queue_size = 1024
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Number of update workers
    /// Default: 3
    pub workers: usize,

    /// Capacity of the shared update queue
    /// Default: 1024
    pub queue_size: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            workers: 3,
            queue_size: 1024,
        }
    }
}
