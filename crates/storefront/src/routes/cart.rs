//! Cart route handlers.
//!
//! The cart only holds product ids and quantities. The full view is enriched
//! with catalog data at render time; a catalog failure for one line degrades
//! that line instead of failing the page.

use axum::{Json, extract::State};
use inkwell_cart::CartError;
use inkwell_core::{CurrencyCode, Price, ProductId, Quantity, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{instrument, warn};

use super::{AppJson, CartSummary};
use crate::api::Product;
use crate::error::Result;
use crate::middleware::CartProfile;
use crate::state::AppState;

/// One cart line with display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub product: Option<Product>,
    pub line_price: Option<Price>,
}

/// Full cart display data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub user_id: Option<UserId>,
    pub items: Vec<CartItemView>,
    /// Absent when a line could not be priced or currencies differ.
    pub subtotal: Option<Price>,
    pub item_count: u64,
    /// Set while the cart is not reaching durable storage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl CartView {
    fn subtotal(items: &[CartItemView]) -> Option<Price> {
        let mut prices = items.iter().map(|item| item.line_price);
        let Some(first) = prices.next() else {
            return Some(Price::zero(CurrencyCode::default()));
        };
        prices.try_fold(first?, |sum, price| sum.checked_add(price?).ok())
    }
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: Option<i64>,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub product_id: String,
}

fn parse_product(raw: &str) -> Result<ProductId> {
    Ok(ProductId::parse(raw).map_err(CartError::from)?)
}

fn parse_quantity(raw: i64) -> Result<Quantity> {
    Ok(Quantity::new(raw).map_err(CartError::from)?)
}

/// Display the cart.
#[instrument(skip_all, fields(profile = %profile))]
pub async fn show(State(state): State<AppState>, profile: CartProfile) -> Json<CartView> {
    // Snapshot and release the lock before calling the catalog.
    let (user_id, entries, item_count, warning) = {
        let cart = state.carts().cart(profile.0);
        let store = cart.lock().await;
        (
            store.user_id().cloned(),
            store.entries().to_vec(),
            store.total_quantity(),
            store.last_write().warning(),
        )
    };

    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        let product = match state.catalog().get_product(&entry.product_id).await {
            Ok(product) => Some(product),
            Err(e) => {
                warn!(product_id = %entry.product_id, error = %e, "Failed to fetch product for cart");
                None
            }
        };
        let line_price = product
            .as_ref()
            .and_then(|p| match p.price.times(entry.quantity) {
                Ok(price) => Some(price),
                Err(e) => {
                    warn!(product_id = %entry.product_id, error = %e, "Cannot price cart line");
                    None
                }
            });
        items.push(CartItemView {
            product_id: entry.product_id,
            quantity: entry.quantity,
            product,
            line_price,
        });
    }

    let subtotal = CartView::subtotal(&items);
    Json(CartView {
        user_id,
        items,
        subtotal,
        item_count,
        warning,
    })
}

/// Get the cart item count.
#[instrument(skip_all, fields(profile = %profile))]
pub async fn count(State(state): State<AppState>, profile: CartProfile) -> Json<Value> {
    let cart = state.carts().cart(profile.0);
    let store = cart.lock().await;
    let mut body = json!({ "count": store.total_quantity() });
    if let Some(warning) = store.last_write().warning() {
        body["warning"] = Value::String(warning);
    }
    Json(body)
}

/// Add units of a product.
#[instrument(skip_all, fields(profile = %profile, product_id = %req.product_id))]
pub async fn add(
    State(state): State<AppState>,
    profile: CartProfile,
    AppJson(req): AppJson<AddToCartRequest>,
) -> Result<Json<CartSummary>> {
    let product_id = parse_product(&req.product_id)?;
    let quantity = req.quantity.map_or(Ok(Quantity::ONE), parse_quantity)?;

    let cart = state.carts().cart(profile.0);
    let mut store = cart.lock().await;
    let outcome = store.add_to_cart(product_id, quantity)?;
    Ok(Json(CartSummary::new(&store, &outcome)))
}

/// Set the quantity of a product already in the cart.
#[instrument(skip_all, fields(profile = %profile, product_id = %req.product_id))]
pub async fn update(
    State(state): State<AppState>,
    profile: CartProfile,
    AppJson(req): AppJson<UpdateCartRequest>,
) -> Result<Json<CartSummary>> {
    let product_id = parse_product(&req.product_id)?;
    let quantity = parse_quantity(req.quantity)?;

    let cart = state.carts().cart(profile.0);
    let mut store = cart.lock().await;
    let outcome = store.update_quantity(&product_id, quantity)?;
    Ok(Json(CartSummary::new(&store, &outcome)))
}

/// Remove a product from the cart.
#[instrument(skip_all, fields(profile = %profile, product_id = %req.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    profile: CartProfile,
    AppJson(req): AppJson<RemoveFromCartRequest>,
) -> Result<Json<CartSummary>> {
    let product_id = parse_product(&req.product_id)?;

    let cart = state.carts().cart(profile.0);
    let mut store = cart.lock().await;
    let outcome = store.remove_from_cart(&product_id);
    Ok(Json(CartSummary::new(&store, &outcome)))
}

/// Remove every product from the cart.
#[instrument(skip_all, fields(profile = %profile))]
pub async fn clear(State(state): State<AppState>, profile: CartProfile) -> Json<CartSummary> {
    let cart = state.carts().cart(profile.0);
    let mut store = cart.lock().await;
    let outcome = store.clear_cart();
    Json(CartSummary::new(&store, &outcome))
}
