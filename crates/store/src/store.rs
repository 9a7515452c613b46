//! The lot table
//!
//! The table itself is immutable after startup - lots are never added or
//! removed while the process runs - so lookups need no lock; all mutation
//! happens inside each lot's own mutex. Every mutating path in the system is
//! routed through these operations; nothing else may touch lot fields.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::warn;

use crate::error::{Result, StoreError};
use crate::listener::ChangeListener;
use crate::lot::{FreeChange, Lot, LotSnapshot, ReserveOutcome};

/// In-memory table of lot state
pub struct LotStore {
    lots: Vec<Arc<Lot>>,
    index: HashMap<String, usize>,
    reservation_timeout: Duration,
    listener: RwLock<Option<Arc<dyn ChangeListener>>>,
}

impl LotStore {
    /// Build the table; iteration order of `lots` is preserved for
    /// [`LotStore::list_snapshots`]
    pub fn new(lots: Vec<Lot>, reservation_timeout: Duration) -> Self {
        let lots: Vec<Arc<Lot>> = lots.into_iter().map(Arc::new).collect();
        let index = lots
            .iter()
            .enumerate()
            .map(|(position, lot)| (lot.id().to_string(), position))
            .collect();
        Self {
            lots,
            index,
            reservation_timeout,
            listener: RwLock::new(None),
        }
    }

    /// Register the observer notified whenever a lot's free count changes
    ///
    /// Covers every mutating path: reservations, cancellations, sensor
    /// deltas, and expiry-driven changes observed on a read.
    pub fn set_listener(&self, listener: Arc<dyn ChangeListener>) {
        *self.listener.write() = Some(listener);
    }

    /// Whether `lot_id` is configured
    pub fn contains(&self, lot_id: &str) -> bool {
        self.index.contains_key(lot_id)
    }

    /// Number of configured lots
    pub fn len(&self) -> usize {
        self.lots.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// The configured reservation lifetime
    pub fn reservation_timeout(&self) -> Duration {
        self.reservation_timeout
    }

    fn lot(&self, lot_id: &str) -> Result<&Arc<Lot>> {
        self.index
            .get(lot_id)
            .map(|&position| &self.lots[position])
            .ok_or_else(|| StoreError::UnknownLot(lot_id.to_string()))
    }

    fn notify(&self, lot_id: &str, change: FreeChange) {
        if !change.changed() {
            return;
        }
        let listener = self.listener.read().clone();
        if let Some(listener) = listener {
            listener.free_changed(lot_id, change.after);
        }
    }

    /// Consistent snapshot of one lot, sweeping its expired reservations
    /// first
    pub fn snapshot(&self, lot_id: &str) -> Result<LotSnapshot> {
        let lot = self.lot(lot_id)?;
        let (snapshot, change) = lot.snapshot(Instant::now());
        self.notify(lot_id, change);
        Ok(snapshot)
    }

    /// Snapshots of every lot, in configuration order
    pub fn list_snapshots(&self) -> Vec<LotSnapshot> {
        self.lots
            .iter()
            .map(|lot| {
                let (snapshot, change) = lot.snapshot(Instant::now());
                self.notify(lot.id(), change);
                snapshot
            })
            .collect()
    }

    /// Attempt to reserve a spot for `plate` in `lot_id`
    pub fn reserve(&self, lot_id: &str, plate: &str) -> Result<ReserveOutcome> {
        let lot = self.lot(lot_id)?;
        let (outcome, change) = lot.reserve(plate, Instant::now(), self.reservation_timeout);
        self.notify(lot_id, change);
        Ok(outcome)
    }

    /// Cancel `plate`'s reservation in `lot_id`; `true` if one was active
    pub fn cancel(&self, lot_id: &str, plate: &str) -> Result<bool> {
        let lot = self.lot(lot_id)?;
        let (removed, change) = lot.cancel(plate, Instant::now());
        self.notify(lot_id, change);
        Ok(removed)
    }

    /// Apply a sensor delta, returning the free count before and after
    ///
    /// An unknown lot is logged and acknowledged as a no-op (`None`) - the
    /// sensor channel never sees validation failures.
    pub fn apply_sensor_delta(&self, lot_id: &str, delta: i64) -> Option<(u32, u32)> {
        let Ok(lot) = self.lot(lot_id) else {
            warn!(lot_id = %lot_id, delta, "sensor update for unknown lot");
            return None;
        };
        let change = lot.apply_delta(delta, Instant::now());
        self.notify(lot_id, change);
        Some((change.before, change.after))
    }
}

impl std::fmt::Debug for LotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LotStore")
            .field("lots", &self.lots.len())
            .field("reservation_timeout", &self.reservation_timeout)
            .finish()
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
