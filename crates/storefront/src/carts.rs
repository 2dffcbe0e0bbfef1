//! Per-profile cart stores.
//!
//! Every browser profile gets its own [`CartStore`], all sharing one durable
//! slot backend under distinct keys. Each store sits behind an async mutex, so
//! mutations for one profile run one at a time and in arrival order while
//! different profiles proceed independently.
//!
//! Open stores live in a bounded `moka` cache. A store idle for longer than
//! the idle timeout, or pushed out by the capacity bound, is dropped from
//! memory. Stores write through on every mutation, so an evicted cart reopens
//! from its slot unchanged. A request still holding an evicted store finishes
//! against it; its write lands in the slot and is picked up on the next open.

use std::sync::Arc;
use std::time::Duration;

use inkwell_cart::{CartStore, DurableSlot};
use moka::notification::RemovalCause;
use moka::sync::Cache;
use tracing::debug;
use uuid::Uuid;

/// Default bound on carts held in memory.
pub const DEFAULT_CAPACITY: u64 = 10_000;

/// Default idle time before a cart is dropped from memory.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// A shared, lockable cart.
pub type SharedCart = Arc<tokio::sync::Mutex<CartStore>>;

/// Lazily opened cart stores keyed by profile.
pub struct CartRegistry {
    slot: Arc<dyn DurableSlot>,
    carts: Cache<Uuid, SharedCart>,
}

impl CartRegistry {
    /// Create a registry persisting into `slot` with the default limits.
    #[must_use]
    pub fn new(slot: Arc<dyn DurableSlot>) -> Self {
        Self::with_limits(slot, DEFAULT_CAPACITY, DEFAULT_IDLE_TIMEOUT)
    }

    /// Create a registry holding at most `capacity` carts, each dropped after
    /// `idle` without access.
    #[must_use]
    pub fn with_limits(slot: Arc<dyn DurableSlot>, capacity: u64, idle: Duration) -> Self {
        let carts = Cache::builder()
            .max_capacity(capacity)
            .time_to_idle(idle)
            .eviction_listener(|profile: Arc<Uuid>, _cart, cause: RemovalCause| {
                debug!(profile = %profile, ?cause, "Dropped cart from memory");
            })
            .build();
        Self { slot, carts }
    }

    /// Slot key holding the cart of `profile`.
    #[must_use]
    pub fn slot_key(profile: Uuid) -> String {
        format!("cart-{}", profile.as_hyphenated())
    }

    /// The cart of `profile`, opened from the slot on first use or after
    /// eviction.
    pub fn cart(&self, profile: Uuid) -> SharedCart {
        self.carts.get_with(profile, || {
            debug!(%profile, "Opening cart for profile");
            let store = CartStore::open(Arc::clone(&self.slot), Self::slot_key(profile));
            Arc::new(tokio::sync::Mutex::new(store))
        })
    }

    /// Number of carts currently held in memory.
    #[must_use]
    pub fn open_carts(&self) -> u64 {
        self.carts.run_pending_tasks();
        self.carts.entry_count()
    }
}

impl std::fmt::Debug for CartRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartRegistry")
            .field("open_carts", &self.carts.entry_count())
            .finish_non_exhaustive()
    }
}
