//! Application state shared across handlers.

use std::sync::Arc;

use inkwell_cart::{DurableSlot, FileSlot};

use crate::api::{ApiError, CatalogClient, OrderClient, http_client};
use crate::carts::CartRegistry;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the cart registry, the backend clients and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    carts: CartRegistry,
    catalog: CatalogClient,
    orders: OrderClient,
}

impl AppState {
    /// Create application state persisting carts under `config.cart_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let slot = Arc::new(FileSlot::new(config.cart_dir.clone()));
        Self::with_slot(config, slot)
    }

    /// Create application state persisting carts into an arbitrary slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_slot(
        config: StorefrontConfig,
        slot: Arc<dyn DurableSlot>,
    ) -> Result<Self, ApiError> {
        let client = http_client(&config.api)?;
        let catalog = CatalogClient::new(client.clone(), &config.api);
        let orders = OrderClient::new(client, &config.api);
        let carts =
            CartRegistry::with_limits(slot, config.cart_capacity, config.cart_idle_timeout);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                carts,
                catalog,
                orders,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the per-profile cart registry.
    #[must_use]
    pub fn carts(&self) -> &CartRegistry {
        &self.inner.carts
    }

    /// Get a reference to the product catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the order client.
    #[must_use]
    pub fn orders(&self) -> &OrderClient {
        &self.inner.orders
    }
}
