//! Subscriber registry and fan-out
//!
//! The registry maps lot id to the subscribers watching it. Registration
//! takes the registry lock briefly; publishing snapshots the subscriber set
//! under a read lock and enqueues outside it, so a slow subscriber can never
//! stall a mutator, a publisher, or another subscriber.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use lotd_protocol::Event;
use lotd_store::{ChangeListener, LotStore};

use crate::error::{PubSubError, Result};
use crate::queue::Enqueue;
use crate::subscriber::Subscription;

/// Default per-subscriber queue capacity
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 100;

/// The lot -> subscriber-set registry and its fan-out path
pub struct SubscriptionEngine {
    store: Arc<LotStore>,
    max_queue_size: usize,
    next_id: AtomicU64,
    by_lot: RwLock<HashMap<String, Vec<Arc<Subscription>>>>,
}

impl SubscriptionEngine {
    /// Create an engine validating lot ids against `store`
    pub fn new(store: Arc<LotStore>, max_queue_size: usize) -> Self {
        Self {
            store,
            max_queue_size,
            next_id: AtomicU64::new(1),
            by_lot: RwLock::new(HashMap::new()),
        }
    }

    /// Register a subscriber for `lot_id`'s free-count changes
    ///
    /// # Errors
    ///
    /// `UnknownLot` if the lot is not configured; nothing is registered.
    pub fn subscribe(&self, lot_id: &str) -> Result<Arc<Subscription>> {
        if !self.store.contains(lot_id) {
            return Err(PubSubError::UnknownLot(lot_id.to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let subscription = Arc::new(Subscription::new(id, lot_id, self.max_queue_size));

        self.by_lot
            .write()
            .entry(lot_id.to_string())
            .or_default()
            .push(Arc::clone(&subscription));

        info!(subscription_id = id, lot_id = %lot_id, "subscriber registered");
        Ok(subscription)
    }

    /// Remove a subscription; `true` if it existed
    ///
    /// Closing the subscription wakes its delivery loop, which exits and
    /// discards anything still queued.
    pub fn unsubscribe(&self, id: u64) -> bool {
        let removed = {
            let mut by_lot = self.by_lot.write();
            let mut removed = None;
            for subscriptions in by_lot.values_mut() {
                if let Some(position) = subscriptions.iter().position(|s| s.id() == id) {
                    removed = Some(subscriptions.remove(position));
                    break;
                }
            }
            removed
        };

        match removed {
            Some(subscription) => {
                subscription.close();
                info!(
                    subscription_id = id,
                    lot_id = %subscription.lot_id(),
                    "subscriber removed"
                );
                true
            }
            None => false,
        }
    }

    /// Fan a free-count change out to every subscriber of `lot_id`
    ///
    /// Never blocks: a full subscriber queue drops its oldest event to admit
    /// the new one.
    pub fn publish(&self, lot_id: &str, free: u32) {
        let subscriptions = {
            let by_lot = self.by_lot.read();
            match by_lot.get(lot_id) {
                Some(subs) if !subs.is_empty() => subs.clone(),
                _ => return,
            }
        };

        let event = Event::new(lot_id, free);
        for subscription in &subscriptions {
            if subscription.enqueue(event.clone()) == Enqueue::DroppedOldest {
                warn!(
                    subscription_id = subscription.id(),
                    lot_id = %lot_id,
                    "subscriber queue full, dropped oldest event"
                );
            }
        }
        debug!(lot_id = %lot_id, free, subscribers = subscriptions.len(), "event published");
    }

    /// Number of registered subscribers across all lots
    pub fn subscriber_count(&self) -> usize {
        self.by_lot.read().values().map(Vec::len).sum()
    }

    /// Number of subscribers watching one lot
    pub fn subscribers_for(&self, lot_id: &str) -> usize {
        self.by_lot.read().get(lot_id).map_or(0, Vec::len)
    }
}

impl ChangeListener for SubscriptionEngine {
    fn free_changed(&self, lot_id: &str, free: u32) {
        self.publish(lot_id, free);
    }
}

impl std::fmt::Debug for SubscriptionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionEngine")
            .field("subscribers", &self.subscriber_count())
            .field("max_queue_size", &self.max_queue_size)
            .finish()
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
