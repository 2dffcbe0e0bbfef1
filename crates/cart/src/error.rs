//! Cart store errors.
//!
//! Only invalid mutation input is an error. Storage failures never fail a
//! mutation: reads fall back to an empty cart and writes are reported through
//! [`WriteOutcome`](crate::WriteOutcome).

use inkwell_core::{CartStateError, IdError, ProductId, QuantityError};
use thiserror::Error;

/// Errors returned by cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The quantity is not a positive integer.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// The identifier is malformed.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// The mutation would break a cart invariant.
    #[error(transparent)]
    State(#[from] CartStateError),
}

impl CartError {
    /// The product the mutation referred to, when it was missing from the cart.
    #[must_use]
    pub const fn missing_product(&self) -> Option<&ProductId> {
        match self {
            Self::State(CartStateError::NotInCart(id)) => Some(id),
            _ => None,
        }
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
