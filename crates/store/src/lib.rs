//! lotd lot store
//!
//! The concurrent heart of the system: an in-memory table of per-lot
//! occupancy and reservations, one exclusive lock per lot, lazy expiry of
//! reservations, and a change-listener hook that lets mutations fan out
//! free-count events without the store knowing who is listening.
//!
//! Every path that mutates lot state - reservations from the dispatchers,
//! deltas from the sensor workers, expiry observed by reads - goes through
//! [`LotStore`]; no other component reads or writes lot fields directly.

mod error;
mod listener;
mod lot;
mod store;

pub use error::{Result, StoreError};
pub use listener::ChangeListener;
pub use lot::{FreeChange, Lot, LotSnapshot, Reservation, ReserveOutcome};
pub use store::LotStore;
