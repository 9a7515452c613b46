//! Bounded per-subscriber event queue with drop-oldest overflow
//!
//! Publish runs on a mutation path and must never block on a slow
//! subscriber, so enqueueing is a short lock-push-unlock; when the queue is
//! full the oldest queued event is discarded to make room. Stale parking
//! availability has no value to anyone - the freshest count always gets in.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;

use lotd_protocol::Event;

/// What happened to an enqueued event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    /// Event queued normally
    Queued,
    /// Queue was full; the oldest event was discarded to make room
    DroppedOldest,
}

/// FIFO queue of pending events for one subscriber
#[derive(Debug)]
pub struct EventQueue {
    capacity: usize,
    items: Mutex<VecDeque<Event>>,
    notify: Notify,
}

impl EventQueue {
    /// Create a queue holding at most `capacity` events
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            notify: Notify::new(),
        }
    }

    /// Enqueue an event; never blocks
    pub fn push(&self, event: Event) -> Enqueue {
        let outcome = {
            let mut items = self.items.lock();
            if items.len() >= self.capacity {
                items.pop_front();
                items.push_back(event);
                Enqueue::DroppedOldest
            } else {
                items.push_back(event);
                Enqueue::Queued
            }
        };
        self.notify.notify_one();
        outcome
    }

    /// Dequeue the oldest event if one is waiting
    pub fn try_pop(&self) -> Option<Event> {
        self.items.lock().pop_front()
    }

    /// Await the next event in FIFO order
    pub async fn pop(&self) -> Event {
        loop {
            if let Some(event) = self.try_pop() {
                return event;
            }
            self.notify.notified().await;
        }
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Maximum number of queued events
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
#[path = "queue_test.rs"]
mod tests;
