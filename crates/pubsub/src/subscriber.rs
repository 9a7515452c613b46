//! Subscription state
//!
//! Each connected subscriber gets a `Subscription`: a unique id, the lot it
//! watches, a bounded event queue, and a cancellation token that ends its
//! delivery loop when the registration goes away.

use tokio_util::sync::CancellationToken;

use lotd_protocol::Event;

use crate::queue::{Enqueue, EventQueue};

/// One registered subscriber
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    lot_id: String,
    queue: EventQueue,
    closed: CancellationToken,
}

impl Subscription {
    pub(crate) fn new(id: u64, lot_id: impl Into<String>, queue_capacity: usize) -> Self {
        Self {
            id,
            lot_id: lot_id.into(),
            queue: EventQueue::new(queue_capacity),
            closed: CancellationToken::new(),
        }
    }

    /// The subscription id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The lot this subscription watches
    pub fn lot_id(&self) -> &str {
        &self.lot_id
    }

    /// Enqueue an event for delivery; never blocks
    pub(crate) fn enqueue(&self, event: Event) -> Enqueue {
        self.queue.push(event)
    }

    /// Mark the subscription closed, waking its delivery loop
    pub(crate) fn close(&self) {
        self.closed.cancel();
    }

    /// Whether the subscription has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Number of events waiting for delivery
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Await the next event, or `None` once the subscription is closed
    ///
    /// Events come out in the order they were enqueued; whatever was still
    /// queued when the subscription closed is discarded.
    pub async fn next_event(&self) -> Option<Event> {
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => None,
            event = self.queue.pop() => Some(event),
        }
    }
}

#[cfg(test)]
#[path = "subscriber_test.rs"]
mod tests;
