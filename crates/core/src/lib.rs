//! Inkwell Core - Shared domain types.
//!
//! This crate provides the types used across all Inkwell components:
//! - `cart` - Cart store and its durable slot port
//! - `storefront` - HTTP service exposing the cart to UI clients
//! - `cli` - Command-line access to a file-backed cart
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated identifiers, quantities, prices, order statuses and the
//!   cart state with its durable wire format

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
