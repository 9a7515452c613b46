//! lotd update pipeline
//!
//! Decouples sensor ingestion from state mutation: the sensor listener
//! acknowledges each line as soon as it lands on the shared bounded queue,
//! and a fixed worker pool applies the deltas to the lot store.

mod pipeline;
mod update;

pub use pipeline::{DEFAULT_QUEUE_SIZE, DEFAULT_WORKERS, UpdatePipeline, UpdateSender};
pub use update::SensorUpdate;
