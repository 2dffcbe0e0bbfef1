//! CLI command implementations.

pub mod cart;

pub use cart::{CartCommand, run};

use inkwell_cart::{CartError, SlotError};
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The mutation was rejected.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The slot location is unusable.
    #[error(transparent)]
    Slot(#[from] SlotError),
}
