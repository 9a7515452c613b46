//! Free-count change notification
//!
//! The store never blocks a mutation on downstream consumers: whoever cares
//! about free-count changes registers a `ChangeListener`, and the store calls
//! it after the lot lock has been released. Implementations must not block.

/// Observer for free-count changes
pub trait ChangeListener: Send + Sync {
    /// A lot's free count changed; the lot lock is no longer held
    fn free_changed(&self, lot_id: &str, free: u32);
}
