//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Cart (requires x-cart-profile)
//! GET  /cart                   - Cart view with catalog data
//! GET  /cart/count             - Total item count
//! POST /cart/add               - Add units of a product
//! POST /cart/update            - Set a product's quantity
//! POST /cart/remove            - Remove a product
//! POST /cart/clear             - Empty the cart
//!
//! # Auth (requires x-cart-profile)
//! POST /auth/login             - Attach a user to the cart
//! POST /auth/logout            - Logout (optionally clears the cart)
//!
//! # Checkout (requires x-cart-profile)
//! POST /checkout               - Create an order from the cart
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;

use axum::{
    Router,
    extract::FromRequest,
    routing::{get, post},
};
use inkwell_cart::{CartStore, WriteOutcome};
use inkwell_core::{CartEntry, UserId};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor whose rejections render as [`AppError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// A cart as returned by every mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub user_id: Option<UserId>,
    pub entries: Vec<CartEntry>,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl CartSummary {
    /// Snapshot a store together with the outcome of its last write.
    #[must_use]
    pub fn new(store: &CartStore, outcome: &WriteOutcome) -> Self {
        Self {
            user_id: store.user_id().cloned(),
            entries: store.entries().to_vec(),
            count: store.total_quantity(),
            warning: outcome.warning(),
        }
    }
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/cart", cart_routes())
        .nest("/auth", auth_routes())
        .route("/checkout", post(checkout::checkout))
}
