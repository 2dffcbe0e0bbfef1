//! Order creation client.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use inkwell_core::{CartEntry, OrderId, OrderStatus, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use url::Url;

use super::{ApiError, check_status, decode_json, endpoint};
use crate::config::ApiConfig;

/// A successfully created order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub id: OrderId,
    pub status: OrderStatus,
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /orders`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderRequest<'a> {
    user_id: &'a UserId,
    products: &'a [CartEntry],
}

/// Order payload as sent by the backend.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderDto {
    #[serde(alias = "_id")]
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl TryFrom<OrderDto> for OrderConfirmation {
    type Error = ApiError;

    fn try_from(dto: OrderDto) -> Result<Self, Self::Error> {
        let id = OrderId::parse(&dto.id).map_err(|e| ApiError::Decode(e.to_string()))?;
        let status = dto
            .status
            .as_deref()
            .map(str::parse::<OrderStatus>)
            .transpose()
            .map_err(ApiError::Decode)?
            .unwrap_or_default();
        let created_at = dto
            .created_at
            .as_deref()
            .map(DateTime::parse_from_rfc3339)
            .transpose()
            .map_err(|e| ApiError::Decode(format!("order {id}: invalid createdAt: {e}")))?
            .map(|dt| dt.with_timezone(&Utc));

        Ok(Self {
            id,
            status,
            created_at,
        })
    }
}

/// Client for the order API.
#[derive(Clone)]
pub struct OrderClient {
    inner: Arc<OrderClientInner>,
}

struct OrderClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl OrderClient {
    /// Create a new order client.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            inner: Arc::new(OrderClientInner {
                client,
                base_url: config.base_url.clone(),
                token: config.token.clone(),
            }),
        }
    }

    /// Create an order for `user_id` from the given cart entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the backend rejects the order,
    /// or the confirmation payload is invalid.
    #[instrument(skip(self, entries), fields(user_id = %user_id, lines = entries.len()))]
    pub async fn create_order(
        &self,
        user_id: &UserId,
        entries: &[CartEntry],
    ) -> Result<OrderConfirmation, ApiError> {
        let url = endpoint(&self.inner.base_url, &["orders"])?;
        let body = CreateOrderRequest {
            user_id,
            products: entries,
        };

        let mut request = self.inner.client.post(url).json(&body);
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = check_status(request.send().await?, "orders").await?;
        let confirmation = OrderConfirmation::try_from(decode_json::<OrderDto>(response).await?)?;

        info!(order_id = %confirmation.id, status = %confirmation.status, "Order created");
        Ok(confirmation)
    }
}
