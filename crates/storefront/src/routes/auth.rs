//! Login and logout hooks.
//!
//! Authentication itself happens elsewhere; these endpoints are called once it
//! has succeeded so the cart can follow the user.

use axum::{Json, extract::State};
use inkwell_cart::CartError;
use inkwell_core::UserId;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{AppJson, CartSummary};
use crate::error::Result;
use crate::middleware::CartProfile;
use crate::state::AppState;

/// Login notification.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
}

/// Attach the logged-in user to the profile's cart.
#[instrument(skip_all, fields(profile = %profile))]
pub async fn login(
    State(state): State<AppState>,
    profile: CartProfile,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<CartSummary>> {
    let user_id = UserId::parse(&req.user_id).map_err(CartError::from)?;

    let cart = state.carts().cart(profile.0);
    let mut store = cart.lock().await;
    info!(user_id = %user_id, "User logged in");
    let outcome = store.set_user_id(user_id);
    Ok(Json(CartSummary::new(&store, &outcome)))
}

/// Handle logout. The cart is kept unless clearing on logout is configured.
#[instrument(skip_all, fields(profile = %profile))]
pub async fn logout(State(state): State<AppState>, profile: CartProfile) -> Json<CartSummary> {
    let cart = state.carts().cart(profile.0);
    let mut store = cart.lock().await;

    let outcome = if state.config().clear_cart_on_logout {
        info!("User logged out, clearing cart");
        store.clear_cart()
    } else {
        info!("User logged out, keeping cart");
        store.last_write().clone()
    };
    Json(CartSummary::new(&store, &outcome))
}
