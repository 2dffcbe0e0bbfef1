//! Inkwell Cart - the shopping cart store.
//!
//! The store owns one [`CartState`](inkwell_core::CartState) in memory and
//! mirrors every mutation into a [`DurableSlot`] with a full overwrite, so the
//! cart survives restarts.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use inkwell_cart::{CartStore, MemorySlot, DEFAULT_SLOT_KEY};
//! use inkwell_core::{ProductId, Quantity};
//!
//! let slot = Arc::new(MemorySlot::new());
//! let mut cart = CartStore::open(slot, DEFAULT_SLOT_KEY);
//!
//! let p1 = ProductId::parse("p1").unwrap();
//! let _ = cart.add_to_cart(p1.clone(), Quantity::new(2).unwrap()).unwrap();
//! let _ = cart.add_to_cart(p1.clone(), Quantity::new(3).unwrap()).unwrap();
//!
//! assert_eq!(cart.quantity_of(&p1).map(Quantity::get), Some(5));
//! assert_eq!(cart.total_quantity(), 5);
//! ```
//!
//! # Modules
//!
//! - [`slot`] - The durable key-value port and its memory/file backends
//! - [`store`] - The write-through cart store

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod slot;
pub mod store;

pub use error::{CartError, Result};
pub use slot::{DurableSlot, FileSlot, MemorySlot, SlotError};
pub use store::{CartStore, DEFAULT_SLOT_KEY, WriteOutcome};
