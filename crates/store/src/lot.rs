//! Per-lot occupancy and reservation state
//!
//! Each `Lot` guards its mutable state with its own mutex, so operations on
//! different lots never contend. Expired reservations are swept lazily: the
//! sweep is a private step of every public operation, executed while that
//! operation already holds the lock - it is never an independently locking
//! call.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

/// A reservation held by one plate
#[derive(Debug, Clone, Copy)]
pub struct Reservation {
    /// When the reservation was created
    pub created_at: Instant,
    /// When lazy expiry removes it
    pub expires_at: Instant,
}

impl Reservation {
    fn new(now: Instant, timeout: Duration) -> Self {
        Self {
            created_at: now,
            expires_at: now + timeout,
        }
    }

    /// Whether the reservation has expired as of `now`
    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// Outcome of a reservation attempt
///
/// `Full` and `Exists` are expected steady-state results, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// A spot was reserved
    Reserved,
    /// No free spots in the lot
    Full,
    /// The plate already holds an active reservation in this lot
    Exists,
}

/// Consistent view of one lot, taken under its lock
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LotSnapshot {
    /// Lot id
    pub id: String,
    /// Total spots
    pub capacity: u32,
    /// Sensor-reported occupancy
    pub occupied: u32,
    /// capacity - occupied - active reservations
    pub free: u32,
}

/// Free count before and after an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeChange {
    /// Free count on entry, before the expiry sweep
    pub before: u32,
    /// Free count on exit
    pub after: u32,
}

impl FreeChange {
    /// Whether the operation changed the observable free count
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

#[derive(Debug)]
struct LotState {
    occupied: u32,
    reservations: HashMap<String, Reservation>,
}

/// A parking lot with its own exclusive lock
#[derive(Debug)]
pub struct Lot {
    id: String,
    capacity: u32,
    state: Mutex<LotState>,
}

impl Lot {
    /// Create a lot; initial occupancy is clamped to capacity
    pub fn new(id: impl Into<String>, capacity: u32, occupied: u32) -> Self {
        Self {
            id: id.into(),
            capacity,
            state: Mutex::new(LotState {
                occupied: occupied.min(capacity),
                reservations: HashMap::new(),
            }),
        }
    }

    /// The lot id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Total spots (fixed for the life of the process)
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Free count for the given state
    ///
    /// Saturating on both subtractions: occupancy is clamped to capacity
    /// elsewhere, and reservations admitted while spots were free can
    /// momentarily exceed what a later sensor report leaves available.
    fn free_of(&self, state: &LotState) -> u32 {
        self.capacity
            .saturating_sub(state.occupied)
            .saturating_sub(state.reservations.len() as u32)
    }

    /// Remove expired reservations
    ///
    /// Private step of every public operation; the caller already holds the
    /// lock.
    fn sweep(&self, state: &mut LotState, now: Instant) {
        state.reservations.retain(|plate, reservation| {
            if reservation.is_expired(now) {
                info!(lot_id = %self.id, plate = %plate, "reservation expired");
                false
            } else {
                true
            }
        });
    }

    /// Consistent snapshot, sweeping expired reservations first
    pub fn snapshot(&self, now: Instant) -> (LotSnapshot, FreeChange) {
        let mut state = self.state.lock();
        let before = self.free_of(&state);
        self.sweep(&mut state, now);
        let after = self.free_of(&state);
        (
            LotSnapshot {
                id: self.id.clone(),
                capacity: self.capacity,
                occupied: state.occupied,
                free: after,
            },
            FreeChange { before, after },
        )
    }

    /// Attempt to reserve a spot for `plate`
    ///
    /// The check-then-insert runs entirely under the lot lock, so two
    /// concurrent attempts can never both observe the same free count and
    /// both succeed.
    pub fn reserve(
        &self,
        plate: &str,
        now: Instant,
        timeout: Duration,
    ) -> (ReserveOutcome, FreeChange) {
        let mut state = self.state.lock();
        let before = self.free_of(&state);
        self.sweep(&mut state, now);

        if state.reservations.contains_key(plate) {
            let after = self.free_of(&state);
            return (ReserveOutcome::Exists, FreeChange { before, after });
        }

        if self.free_of(&state) == 0 {
            let after = self.free_of(&state);
            return (ReserveOutcome::Full, FreeChange { before, after });
        }

        state
            .reservations
            .insert(plate.to_string(), Reservation::new(now, timeout));
        let after = self.free_of(&state);
        info!(lot_id = %self.id, plate = %plate, free = after, "reservation created");
        (ReserveOutcome::Reserved, FreeChange { before, after })
    }

    /// Cancel `plate`'s reservation; `true` if one was active
    pub fn cancel(&self, plate: &str, now: Instant) -> (bool, FreeChange) {
        let mut state = self.state.lock();
        let before = self.free_of(&state);
        self.sweep(&mut state, now);

        let removed = state.reservations.remove(plate).is_some();
        let after = self.free_of(&state);
        if removed {
            info!(lot_id = %self.id, plate = %plate, free = after, "reservation cancelled");
        }
        (removed, FreeChange { before, after })
    }

    /// Apply a sensor delta; occupancy is clamped to `[0, capacity]`
    pub fn apply_delta(&self, delta: i64, now: Instant) -> FreeChange {
        let mut state = self.state.lock();
        let before = self.free_of(&state);
        self.sweep(&mut state, now);

        state.occupied = (i64::from(state.occupied) + delta).clamp(0, i64::from(self.capacity)) as u32;
        let after = self.free_of(&state);
        info!(
            lot_id = %self.id,
            delta,
            occupied = state.occupied,
            free = after,
            "occupancy updated"
        );
        FreeChange { before, after }
    }

    /// Number of active reservations (sweeps first)
    pub fn reservation_count(&self, now: Instant) -> usize {
        let mut state = self.state.lock();
        self.sweep(&mut state, now);
        state.reservations.len()
    }
}

#[cfg(test)]
#[path = "lot_test.rs"]
mod tests;
