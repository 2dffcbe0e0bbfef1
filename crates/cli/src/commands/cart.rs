//! Cart commands.
//!
//! Each invocation opens the cart from its slot, applies one command and
//! prints the resulting cart. A failed slot write is reported as a warning;
//! the command still succeeds.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use inkwell_cart::{CartError, CartStore, DEFAULT_SLOT_KEY, FileSlot, WriteOutcome};
use inkwell_core::{ProductId, Quantity, UserId};
use tracing::{info, warn};

use super::CliError;

/// One cart operation, as parsed from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCommand {
    Show,
    Add { product: String, quantity: i64 },
    Remove { product: String },
    Update { product: String, quantity: i64 },
    Clear,
    Login { user: String },
    Logout { clear: bool },
    Reset,
}

/// Slot key for an optional profile name.
#[must_use]
pub fn slot_key(profile: Option<&str>) -> String {
    profile.map_or_else(|| DEFAULT_SLOT_KEY.to_string(), |p| format!("cart-{p}"))
}

/// Open the cart under `data_dir` and apply `command`.
///
/// # Errors
///
/// Returns an error if the profile name cannot be used as a slot key or the
/// command is rejected by the cart.
pub fn run(data_dir: &Path, profile: Option<&str>, command: CartCommand) -> Result<(), CliError> {
    let slot = FileSlot::new(data_dir);
    let key = slot_key(profile);
    // Reject unusable keys before the store silently falls back to memory.
    let path = slot.path_for(&key)?;
    info!(path = %path.display(), "Opening cart");

    let mut store = CartStore::open(Arc::new(slot), key);
    let outcome = execute(&mut store, command)?;
    if let Some(warning) = outcome.warning() {
        warn!("{warning}");
    }

    print_cart(&store);
    Ok(())
}

/// Apply one command to an open store.
///
/// # Errors
///
/// Returns an error if an identifier or quantity is invalid, or the product
/// to update is not in the cart.
pub fn execute(store: &mut CartStore, command: CartCommand) -> Result<WriteOutcome, CliError> {
    let outcome = match command {
        CartCommand::Show | CartCommand::Logout { clear: false } => store.last_write().clone(),
        CartCommand::Add { product, quantity } => {
            let (product_id, quantity) = parse_line(&product, quantity)?;
            store.add_to_cart(product_id, quantity)?
        }
        CartCommand::Remove { product } => {
            let product_id = ProductId::parse(&product).map_err(CartError::from)?;
            store.remove_from_cart(&product_id)
        }
        CartCommand::Update { product, quantity } => {
            let (product_id, quantity) = parse_line(&product, quantity)?;
            store.update_quantity(&product_id, quantity)?
        }
        CartCommand::Clear => store.clear_cart(),
        CartCommand::Login { user } => {
            let user_id = UserId::parse(&user).map_err(CartError::from)?;
            store.set_user_id(user_id)
        }
        CartCommand::Logout { clear: true } => store.clear_cart(),
        CartCommand::Reset => store.reset(),
    };
    Ok(outcome)
}

fn parse_line(product: &str, quantity: i64) -> Result<(ProductId, Quantity), CartError> {
    Ok((ProductId::parse(product)?, Quantity::new(quantity)?))
}

/// Human-readable rendering of a cart.
#[must_use]
pub fn render(store: &CartStore) -> String {
    let mut out = String::new();
    let owner = store.user_id().map_or("(guest)", |u| u.as_str());
    let _ = writeln!(out, "Cart {} for {owner}", store.key());

    if store.is_empty() {
        out.push_str("  (empty)\n");
    }
    for entry in store.entries() {
        let _ = writeln!(out, "  {:>5} x {}", entry.quantity, entry.product_id);
    }
    let _ = writeln!(out, "Total items: {}", store.total_quantity());
    out
}

#[allow(clippy::print_stdout)] // command output
fn print_cart(store: &CartStore) {
    print!("{}", render(store));
}
