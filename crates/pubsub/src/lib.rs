//! lotd subscription engine
//!
//! Push notification for free-count changes:
//!
//! - [`SubscriptionEngine`] - the lot -> subscriber-set registry and the
//!   publish fan-out invoked (via the store's change listener) by every
//!   mutation that moves a free count
//! - [`Subscription`] - one subscriber's id, bounded event queue, and
//!   delivery handle
//! - [`EventQueue`] - the drop-oldest queue that keeps publish non-blocking
//!
//! Ownership: the engine owns each subscriber's queue; only a publish may
//! enqueue, and only that subscriber's delivery loop may dequeue.

mod engine;
mod error;
mod queue;
mod subscriber;

pub use engine::{DEFAULT_MAX_QUEUE_SIZE, SubscriptionEngine};
pub use error::{PubSubError, Result};
pub use queue::{Enqueue, EventQueue};
pub use subscriber::Subscription;
