//! Cart state and its durable wire format.
//!
//! A [`CartState`] is the full cart for one browser profile: an optional owner
//! and an ordered list of [`CartEntry`] values keyed by product. The state
//! enforces its own invariants (positive quantities, no duplicate products), so
//! any value of this type, including one decoded from storage, is well-formed.
//!
//! # Wire Format
//!
//! ```json
//! { "userId": "u-42", "products": [ { "productId": "p1", "quantity": 2 } ] }
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{ProductId, Quantity, UserId};

/// Errors from cart state mutations and decoding.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartStateError {
    /// The same product appears in more than one entry.
    #[error("duplicate cart entry for product {0}")]
    DuplicateProduct(ProductId),
    /// Merging quantities would exceed the maximum.
    #[error("quantity for product {0} would exceed {max}", max = u32::MAX)]
    QuantityOverflow(ProductId),
    /// The product is not in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),
}

/// One distinct product held in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    /// Product identifier, unique within a cart.
    pub product_id: ProductId,
    /// Number of units desired.
    pub quantity: Quantity,
}

impl CartEntry {
    /// Create a new entry.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// The complete cart for one browser profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawCartState")]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    user_id: Option<UserId>,
    #[serde(rename = "products")]
    entries: Vec<CartEntry>,
}

/// Unvalidated shape used while decoding.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCartState {
    #[serde(default)]
    user_id: Option<UserId>,
    products: Vec<CartEntry>,
}

impl TryFrom<RawCartState> for CartState {
    type Error = CartStateError;

    fn try_from(raw: RawCartState) -> Result<Self, Self::Error> {
        Self::new(raw.user_id, raw.products)
    }
}

impl CartState {
    /// Build a state from parts, rejecting duplicate product entries.
    ///
    /// # Errors
    ///
    /// Returns [`CartStateError::DuplicateProduct`] if two entries share a product.
    pub fn new(user_id: Option<UserId>, entries: Vec<CartEntry>) -> Result<Self, CartStateError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(&entry.product_id) {
                return Err(CartStateError::DuplicateProduct(entry.product_id.clone()));
            }
        }
        Ok(Self { user_id, entries })
    }

    /// Decode a state from its durable JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON, has the wrong shape, or
    /// violates a cart invariant.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Encode the state as durable JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    // =========================================================================
    // Projections
    // =========================================================================

    /// The owner of the cart, if someone is logged in.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Total number of units across all entries.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| u64::from(entry.quantity.get()))
            .sum()
    }

    /// Quantity held for a product, if it is in the cart.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> Option<Quantity> {
        self.find(product_id).map(|entry| entry.quantity)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, product_id: &ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|e| &e.product_id == product_id)
    }

    fn find_mut(&mut self, product_id: &ProductId) -> Option<&mut CartEntry> {
        self.entries.iter_mut().find(|e| &e.product_id == product_id)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Attach an owner. Entries are untouched.
    pub fn set_user_id(&mut self, user_id: UserId) {
        self.user_id = Some(user_id);
    }

    /// Add units of a product, merging into an existing entry.
    ///
    /// Returns the resulting quantity for the product.
    ///
    /// # Errors
    ///
    /// Returns [`CartStateError::QuantityOverflow`] if the merged quantity would
    /// not fit; the state is left unchanged.
    pub fn add(
        &mut self,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<Quantity, CartStateError> {
        if let Some(entry) = self.find_mut(&product_id) {
            let merged = entry
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| CartStateError::QuantityOverflow(product_id.clone()))?;
            entry.quantity = merged;
            return Ok(merged);
        }
        self.entries.push(CartEntry::new(product_id, quantity));
        Ok(quantity)
    }

    /// Remove a product's entry. Returns whether an entry was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.product_id != product_id);
        self.entries.len() != before
    }

    /// Overwrite the quantity of an existing entry.
    ///
    /// Returns the previous quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartStateError::NotInCart`] if the product has no entry.
    pub fn set_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<Quantity, CartStateError> {
        let entry = self
            .find_mut(product_id)
            .ok_or_else(|| CartStateError::NotInCart(product_id.clone()))?;
        Ok(std::mem::replace(&mut entry.quantity, quantity))
    }

    /// Remove all entries, keeping the owner.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pid(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    fn qty(n: i64) -> Quantity {
        Quantity::new(n).unwrap()
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut state = CartState::default();
        state.add(pid("p1"), qty(2)).unwrap();
        state.add(pid("p1"), qty(3)).unwrap();
        state.add(pid("p1"), qty(1)).unwrap();

        assert_eq!(state.len(), 1);
        assert_eq!(state.quantity_of(&pid("p1")), Some(qty(6)));
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut state = CartState::default();
        state.add(pid("b"), qty(1)).unwrap();
        state.add(pid("a"), qty(1)).unwrap();
        state.add(pid("b"), qty(1)).unwrap();

        let ids: Vec<&str> = state.entries().iter().map(|e| e.product_id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn test_add_overflow_leaves_state_unchanged() {
        let mut state = CartState::default();
        state.add(pid("p1"), qty(i64::from(u32::MAX))).unwrap();
        let before = state.clone();

        let result = state.add(pid("p1"), qty(1));
        assert_eq!(result, Err(CartStateError::QuantityOverflow(pid("p1"))));
        assert_eq!(state, before);
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let mut state = CartState::default();
        state.add(pid("p1"), qty(5)).unwrap();

        let previous = state.set_quantity(&pid("p1"), qty(2)).unwrap();
        assert_eq!(previous, qty(5));
        assert_eq!(state.quantity_of(&pid("p1")), Some(qty(2)));
    }

    #[test]
    fn test_set_quantity_unknown_product() {
        let mut state = CartState::default();
        assert_eq!(
            state.set_quantity(&pid("ghost"), qty(1)),
            Err(CartStateError::NotInCart(pid("ghost")))
        );
        assert!(state.is_empty());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut state = CartState::default();
        state.add(pid("p1"), qty(1)).unwrap();

        assert!(state.remove(&pid("p1")));
        assert!(!state.remove(&pid("p1")));
        assert!(state.quantity_of(&pid("p1")).is_none());
    }

    #[test]
    fn test_clear_keeps_user() {
        let mut state = CartState::default();
        state.set_user_id(UserId::parse("u1").unwrap());
        state.add(pid("p1"), qty(1)).unwrap();

        state.clear();
        state.clear();
        assert!(state.is_empty());
        assert_eq!(state.user_id().map(UserId::as_str), Some("u1"));
    }

    #[test]
    fn test_total_quantity() {
        let mut state = CartState::default();
        state.add(pid("p1"), qty(5)).unwrap();
        state.add(pid("p2"), qty(1)).unwrap();
        assert_eq!(state.total_quantity(), 6);
    }

    #[test]
    fn test_wire_format_field_names() {
        let mut state = CartState::default();
        state.add(pid("p1"), qty(2)).unwrap();

        let json = state.to_json().unwrap();
        assert_eq!(json, r#"{"userId":null,"products":[{"productId":"p1","quantity":2}]}"#);
    }

    #[test]
    fn test_json_roundtrip_with_user() {
        let mut state = CartState::default();
        state.set_user_id(UserId::parse("u-42").unwrap());
        state.add(pid("p1"), qty(2)).unwrap();
        state.add(pid("p2"), qty(7)).unwrap();

        let parsed = CartState::from_json(&state.to_json().unwrap()).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_decode_rejects_invalid_states() {
        // Duplicate products
        assert!(
            CartState::from_json(
                r#"{"userId":null,"products":[{"productId":"p1","quantity":1},{"productId":"p1","quantity":2}]}"#
            )
            .is_err()
        );
        // Zero quantity
        assert!(
            CartState::from_json(r#"{"userId":null,"products":[{"productId":"p1","quantity":0}]}"#)
                .is_err()
        );
        // Empty product id
        assert!(
            CartState::from_json(r#"{"userId":null,"products":[{"productId":"","quantity":1}]}"#)
                .is_err()
        );
        // Missing products array
        assert!(CartState::from_json(r#"{"userId":null}"#).is_err());
        // Not JSON at all
        assert!(CartState::from_json("{not json").is_err());
    }

    #[test]
    fn test_decode_tolerates_missing_user_id() {
        let state = CartState::from_json(r#"{"products":[]}"#).unwrap();
        assert_eq!(state, CartState::default());
    }
}
