//! Checkout route handler.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::{info, instrument};

use super::CartSummary;
use crate::api::OrderConfirmation;
use crate::error::{AppError, Result};
use crate::middleware::CartProfile;
use crate::state::AppState;

/// Result of a successful checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: OrderConfirmation,
    pub cart: CartSummary,
}

/// Place an order for the cart's contents, then empty the cart.
///
/// The cart lock is held for the whole call so no mutation can slip in
/// between the order snapshot and the clear.
#[instrument(skip_all, fields(profile = %profile))]
pub async fn checkout(
    State(state): State<AppState>,
    profile: CartProfile,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let cart = state.carts().cart(profile.0);
    let mut store = cart.lock().await;

    let user_id = store
        .user_id()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("log in to check out".to_string()))?;
    if store.is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    }

    let order = state
        .orders()
        .create_order(&user_id, store.entries())
        .await?;

    let outcome = store.clear_cart();
    info!(order_id = %order.id, "Checkout complete");

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order,
            cart: CartSummary::new(&store, &outcome),
        }),
    ))
}
