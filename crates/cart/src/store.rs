//! Write-through cart store.
//!
//! [`CartStore`] is the only sanctioned mutation surface for a cart. It holds
//! the authoritative [`CartState`] in memory and, after every mutation,
//! serializes the whole state and overwrites the durable slot. Storage is a
//! mirror of the store, not a second source of truth.
//!
//! # Failure Policy
//!
//! - Missing or corrupt slot at load: replaced by the empty default, logged at `warn`.
//! - Failed write: the in-memory mutation stands and [`WriteOutcome::Unsynced`] is returned.
//! - Invalid input: rejected with [`CartError`] before anything changes.

use std::sync::Arc;

use inkwell_core::{CartEntry, CartState, ProductId, Quantity, UserId};
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::slot::DurableSlot;

/// Slot key used when a single cart owns the slot.
pub const DEFAULT_SLOT_KEY: &str = "cart";

/// Whether a mutation reached durable storage.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The slot now matches the in-memory state.
    Synced,
    /// The slot write failed; the cart works for this session only.
    Unsynced(String),
}

impl WriteOutcome {
    /// Whether the write reached storage.
    #[must_use]
    pub const fn is_synced(&self) -> bool {
        matches!(self, Self::Synced)
    }

    /// A user-facing warning, if the write failed.
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        match self {
            Self::Synced => None,
            Self::Unsynced(reason) => Some(format!(
                "Your cart could not be saved and will be lost on restart ({reason})"
            )),
        }
    }
}

/// How the slot looked when it was read.
enum Loaded {
    Present(CartState),
    Absent,
    Corrupt(String),
}

/// The cart for one browser profile, mirrored into a durable slot.
pub struct CartStore {
    slot: Arc<dyn DurableSlot>,
    key: String,
    state: CartState,
    last_write: WriteOutcome,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("state", &self.state)
            .field("last_write", &self.last_write)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Open the cart stored under `key`, bootstrapping the slot if needed.
    ///
    /// If the slot is absent or does not hold a valid cart, the store starts
    /// empty and writes that default back so the slot is always well-formed
    /// after startup. No error is surfaced for a bad slot; a failed bootstrap
    /// write is kept in [`last_write`](Self::last_write).
    pub fn open(slot: Arc<dyn DurableSlot>, key: impl Into<String>) -> Self {
        let mut store = Self {
            slot,
            key: key.into(),
            state: CartState::default(),
            last_write: WriteOutcome::Synced,
        };
        // Recorded in last_write.
        let _ = store.sync_from_slot();
        store
    }

    /// Re-read the slot and replace the in-memory state.
    ///
    /// Picks up writes made by another process sharing the slot. A missing or
    /// corrupt slot resets the cart to empty, as on [`open`](Self::open).
    pub fn reload(&mut self) -> WriteOutcome {
        self.sync_from_slot()
    }

    fn sync_from_slot(&mut self) -> WriteOutcome {
        match self.read_slot() {
            Loaded::Present(state) => {
                debug!(
                    key = %self.key,
                    entries = state.len(),
                    "Loaded cart from slot"
                );
                self.state = state;
                self.last_write = WriteOutcome::Synced;
                WriteOutcome::Synced
            }
            Loaded::Absent => {
                debug!(key = %self.key, "No stored cart, bootstrapping empty cart");
                self.state = CartState::default();
                self.persist()
            }
            Loaded::Corrupt(reason) => {
                warn!(key = %self.key, reason = %reason, "Stored cart is corrupt, resetting");
                self.state = CartState::default();
                self.persist()
            }
        }
    }

    fn read_slot(&self) -> Loaded {
        match self.slot.get(&self.key) {
            Ok(Some(json)) => match CartState::from_json(&json) {
                Ok(state) => Loaded::Present(state),
                Err(e) => Loaded::Corrupt(e.to_string()),
            },
            Ok(None) => Loaded::Absent,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read cart slot");
                Loaded::Absent
            }
        }
    }

    fn persist(&mut self) -> WriteOutcome {
        let outcome = self.write_slot();
        self.last_write = outcome.clone();
        outcome
    }

    fn write_slot(&self) -> WriteOutcome {
        let json = match self.state.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to serialize cart");
                return WriteOutcome::Unsynced(e.to_string());
            }
        };

        match self.slot.set(&self.key, &json) {
            Ok(()) => WriteOutcome::Synced,
            Err(e) => {
                warn!(
                    key = %self.key,
                    error = %e,
                    "Failed to persist cart, continuing in memory"
                );
                WriteOutcome::Unsynced(e.to_string())
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Attach the logged-in owner. Entries are untouched.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn set_user_id(&mut self, user_id: UserId) -> WriteOutcome {
        self.state.set_user_id(user_id);
        self.persist()
    }

    /// Add units of a product. Repeated adds accumulate into one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged quantity would overflow. Nothing is
    /// written in that case.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn add_to_cart(
        &mut self,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<WriteOutcome> {
        let total = self.state.add(product_id, quantity)?;
        debug!(total = %total, "Added to cart");
        Ok(self.persist())
    }

    /// Remove a product's entry. Removing an absent product is a no-op.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> WriteOutcome {
        let removed = self.state.remove(product_id);
        debug!(removed, "Removed from cart");
        self.persist()
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not in the cart. Nothing is written
    /// in that case.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<WriteOutcome> {
        let previous = self.state.set_quantity(product_id, quantity)?;
        debug!(previous = %previous, "Updated cart quantity");
        Ok(self.persist())
    }

    /// Remove every entry. The owner is kept.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn clear_cart(&mut self) -> WriteOutcome {
        self.state.clear();
        self.persist()
    }

    /// Forget the owner and every entry.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn reset(&mut self) -> WriteOutcome {
        self.state = CartState::default();
        self.persist()
    }

    // =========================================================================
    // Projections
    // =========================================================================

    /// Outcome of the most recent slot write, including the bootstrap write
    /// made by [`open`](Self::open).
    ///
    /// Lets read-only callers tell the user the cart is not being saved.
    #[must_use]
    pub const fn last_write(&self) -> &WriteOutcome {
        &self.last_write
    }

    /// Slot key this store writes to.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The full cart state.
    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        self.state.entries()
    }

    /// The owner of the cart, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        self.state.user_id()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.state.total_quantity()
    }

    /// Quantity held for a product.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> Option<Quantity> {
        self.state.quantity_of(product_id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::slot::{FileSlot, MemorySlot, SlotError};

    fn pid(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    fn qty(n: i64) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn pairs(store: &CartStore) -> Vec<(String, u32)> {
        store
            .entries()
            .iter()
            .map(|e| (e.product_id.to_string(), e.quantity.get()))
            .collect()
    }

    fn stored(slot: &dyn DurableSlot) -> CartState {
        CartState::from_json(&slot.get(DEFAULT_SLOT_KEY).unwrap().unwrap()).unwrap()
    }

    /// Slot whose writes can be switched off.
    #[derive(Default)]
    struct FlakySlot {
        inner: MemorySlot,
        failing: AtomicBool,
    }

    impl DurableSlot for FlakySlot {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, SlotError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> std::result::Result<(), SlotError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(SlotError::Io {
                    key: key.to_owned(),
                    source: std::io::Error::other("quota exceeded"),
                });
            }
            self.inner.set(key, value)
        }

        fn delete(&self, key: &str) -> std::result::Result<bool, SlotError> {
            self.inner.delete(key)
        }
    }

    #[test]
    fn test_open_bootstraps_missing_slot() {
        let slot = Arc::new(MemorySlot::new());
        let store = CartStore::open(slot.clone(), DEFAULT_SLOT_KEY);

        assert!(store.is_empty());
        assert!(store.user_id().is_none());
        assert_eq!(
            slot.get(DEFAULT_SLOT_KEY).unwrap().as_deref(),
            Some(r#"{"userId":null,"products":[]}"#)
        );
    }

    #[test]
    fn test_open_replaces_invalid_json() {
        let slot = Arc::new(MemorySlot::with_value(DEFAULT_SLOT_KEY, "{oops"));
        let store = CartStore::open(slot.clone(), DEFAULT_SLOT_KEY);

        assert!(store.is_empty());
        assert!(store.user_id().is_none());
        assert_eq!(stored(slot.as_ref()), CartState::default());
    }

    #[test]
    fn test_open_replaces_invariant_violations() {
        let slot = Arc::new(MemorySlot::with_value(
            DEFAULT_SLOT_KEY,
            r#"{"userId":"u1","products":[{"productId":"p1","quantity":0}]}"#,
        ));
        let store = CartStore::open(slot, DEFAULT_SLOT_KEY);
        assert!(store.is_empty());
        assert!(store.user_id().is_none());
    }

    #[test]
    fn test_open_loads_existing_cart() {
        let slot = Arc::new(MemorySlot::with_value(
            DEFAULT_SLOT_KEY,
            r#"{"userId":"u1","products":[{"productId":"p1","quantity":4}]}"#,
        ));
        let store = CartStore::open(slot, DEFAULT_SLOT_KEY);

        assert_eq!(store.user_id().map(UserId::as_str), Some("u1"));
        assert_eq!(pairs(&store), [("p1".to_owned(), 4)]);
    }

    #[test]
    fn test_cart_scenario() {
        let slot = Arc::new(MemorySlot::new());
        let mut store = CartStore::open(slot.clone(), DEFAULT_SLOT_KEY);

        assert!(store.add_to_cart(pid("p1"), qty(2)).unwrap().is_synced());
        assert_eq!(pairs(&store), [("p1".to_owned(), 2)]);

        let _ = store.add_to_cart(pid("p1"), qty(3)).unwrap();
        assert_eq!(pairs(&store), [("p1".to_owned(), 5)]);

        let _ = store.add_to_cart(pid("p2"), qty(1)).unwrap();
        assert_eq!(pairs(&store), [("p1".to_owned(), 5), ("p2".to_owned(), 1)]);
        assert_eq!(store.total_quantity(), 6);

        let _ = store.remove_from_cart(&pid("p1"));
        assert_eq!(pairs(&store), [("p2".to_owned(), 1)]);

        let _ = store.clear_cart();
        assert!(store.entries().is_empty());

        // Durable copy follows every step
        assert_eq!(stored(slot.as_ref()), *store.state());
    }

    #[test]
    fn test_every_mutation_writes_through() {
        let slot = Arc::new(MemorySlot::new());
        let mut store = CartStore::open(slot.clone(), DEFAULT_SLOT_KEY);

        let _ = store.set_user_id(UserId::parse("u9").unwrap());
        assert_eq!(stored(slot.as_ref()), *store.state());

        let _ = store.add_to_cart(pid("p1"), qty(1)).unwrap();
        assert_eq!(stored(slot.as_ref()), *store.state());

        let _ = store.update_quantity(&pid("p1"), qty(8)).unwrap();
        assert_eq!(stored(slot.as_ref()), *store.state());

        let _ = store.remove_from_cart(&pid("p1"));
        assert_eq!(stored(slot.as_ref()), *store.state());
    }

    #[test]
    fn test_update_quantity_sets_not_adds() {
        let mut store = CartStore::open(Arc::new(MemorySlot::new()), DEFAULT_SLOT_KEY);
        let _ = store.add_to_cart(pid("p1"), qty(5)).unwrap();

        let _ = store.update_quantity(&pid("p1"), qty(2)).unwrap();
        assert_eq!(store.quantity_of(&pid("p1")), Some(qty(2)));

        let _ = store.update_quantity(&pid("p1"), qty(2)).unwrap();
        assert_eq!(store.quantity_of(&pid("p1")), Some(qty(2)));
    }

    #[test]
    fn test_update_unknown_product_is_rejected_without_write() {
        let slot = Arc::new(MemorySlot::new());
        let mut store = CartStore::open(slot.clone(), DEFAULT_SLOT_KEY);
        slot.set(DEFAULT_SLOT_KEY, "sentinel").unwrap();

        let err = store.update_quantity(&pid("ghost"), qty(1)).unwrap_err();
        assert_eq!(err.missing_product(), Some(&pid("ghost")));
        assert_eq!(slot.get(DEFAULT_SLOT_KEY).unwrap().as_deref(), Some("sentinel"));
    }

    #[test]
    fn test_remove_twice_is_noop() {
        let mut store = CartStore::open(Arc::new(MemorySlot::new()), DEFAULT_SLOT_KEY);
        let _ = store.add_to_cart(pid("p1"), qty(1)).unwrap();
        let _ = store.add_to_cart(pid("p2"), qty(1)).unwrap();

        let _ = store.remove_from_cart(&pid("p1"));
        let after_first = store.state().clone();
        let _ = store.remove_from_cart(&pid("p1"));

        assert_eq!(*store.state(), after_first);
        assert!(store.quantity_of(&pid("p1")).is_none());
    }

    #[test]
    fn test_clear_is_idempotent_and_keeps_user() {
        let mut store = CartStore::open(Arc::new(MemorySlot::new()), DEFAULT_SLOT_KEY);
        let _ = store.set_user_id(UserId::parse("u1").unwrap());
        let _ = store.add_to_cart(pid("p1"), qty(3)).unwrap();

        let _ = store.clear_cart();
        let _ = store.clear_cart();

        assert!(store.is_empty());
        assert_eq!(store.user_id().map(UserId::as_str), Some("u1"));
    }

    #[test]
    fn test_reset_forgets_user() {
        let mut store = CartStore::open(Arc::new(MemorySlot::new()), DEFAULT_SLOT_KEY);
        let _ = store.set_user_id(UserId::parse("u1").unwrap());
        let _ = store.add_to_cart(pid("p1"), qty(3)).unwrap();

        let _ = store.reset();
        assert_eq!(*store.state(), CartState::default());
    }

    #[test]
    fn test_set_user_id_keeps_entries() {
        let mut store = CartStore::open(Arc::new(MemorySlot::new()), DEFAULT_SLOT_KEY);
        let _ = store.add_to_cart(pid("p1"), qty(3)).unwrap();
        let _ = store.set_user_id(UserId::parse("u2").unwrap());

        assert_eq!(pairs(&store), [("p1".to_owned(), 3)]);
        assert_eq!(store.user_id().map(UserId::as_str), Some("u2"));
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let slot = Arc::new(FlakySlot::default());
        let mut store = CartStore::open(slot.clone(), DEFAULT_SLOT_KEY);
        slot.failing.store(true, Ordering::SeqCst);

        let outcome = store.add_to_cart(pid("p1"), qty(2)).unwrap();
        assert!(!outcome.is_synced());
        assert!(outcome.warning().unwrap().contains("quota exceeded"));
        assert_eq!(store.quantity_of(&pid("p1")), Some(qty(2)));

        // The slot still holds the bootstrap value
        assert_eq!(stored(slot.as_ref()), CartState::default());
    }

    #[test]
    fn test_failed_bootstrap_write_is_reported() {
        let slot = Arc::new(FlakySlot::default());
        slot.failing.store(true, Ordering::SeqCst);
        let store = CartStore::open(slot.clone(), DEFAULT_SLOT_KEY);

        assert!(store.is_empty());
        assert!(!store.last_write().is_synced());
        assert!(store.last_write().warning().unwrap().contains("quota exceeded"));
        assert!(slot.get(DEFAULT_SLOT_KEY).unwrap().is_none());
    }

    #[test]
    fn test_last_write_tracks_latest_mutation() {
        let slot = Arc::new(FlakySlot::default());
        slot.failing.store(true, Ordering::SeqCst);
        let mut store = CartStore::open(slot.clone(), DEFAULT_SLOT_KEY);

        slot.failing.store(false, Ordering::SeqCst);
        assert!(store.add_to_cart(pid("p1"), qty(1)).unwrap().is_synced());
        assert!(store.last_write().is_synced());

        slot.failing.store(true, Ordering::SeqCst);
        assert!(!store.clear_cart().is_synced());
        assert!(!store.last_write().is_synced());
    }

    #[test]
    fn test_reload_picks_up_external_writes() {
        let slot = Arc::new(MemorySlot::new());
        let mut first = CartStore::open(slot.clone(), DEFAULT_SLOT_KEY);
        let mut second = CartStore::open(slot.clone(), DEFAULT_SLOT_KEY);

        let _ = second.add_to_cart(pid("p1"), qty(1)).unwrap();
        assert!(first.is_empty());

        assert!(first.reload().is_synced());
        assert_eq!(pairs(&first), [("p1".to_owned(), 1)]);
    }

    #[test]
    fn test_last_writer_wins_between_stores() {
        let slot = Arc::new(MemorySlot::new());
        let mut first = CartStore::open(slot.clone(), DEFAULT_SLOT_KEY);
        let mut second = CartStore::open(slot.clone(), DEFAULT_SLOT_KEY);

        let _ = first.add_to_cart(pid("p1"), qty(1)).unwrap();
        let _ = second.add_to_cart(pid("p2"), qty(1)).unwrap();

        let durable = stored(slot.as_ref());
        assert!(durable.quantity_of(&pid("p1")).is_none());
        assert_eq!(durable.quantity_of(&pid("p2")), Some(qty(1)));
    }

    #[test]
    fn test_file_backed_cart_survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let mut store = CartStore::open(Arc::new(FileSlot::new(tmp.path())), "cart-alice");
            let _ = store.set_user_id(UserId::parse("alice").unwrap());
            let _ = store.add_to_cart(pid("notebook-a5"), qty(2)).unwrap();
        }

        let store = CartStore::open(Arc::new(FileSlot::new(tmp.path())), "cart-alice");
        assert_eq!(store.user_id().map(UserId::as_str), Some("alice"));
        assert_eq!(pairs(&store), [("notebook-a5".to_owned(), 2)]);
    }

    #[test]
    fn test_invalid_key_degrades_to_memory_only() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = CartStore::open(Arc::new(FileSlot::new(tmp.path())), "../escape");

        let outcome = store.add_to_cart(pid("p1"), qty(1)).unwrap();
        assert!(!outcome.is_synced());
        assert_eq!(store.total_quantity(), 1);
    }
}
