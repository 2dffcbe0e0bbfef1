//! Product catalog client.
//!
//! Resolves a [`ProductId`] to the display fields the cart view needs. The cart
//! never stores these fields, so prices and names always come from here.

use std::sync::Arc;

use inkwell_core::{CurrencyCode, Price, ProductId};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use super::{ApiError, check_status, decode_json, endpoint};
use crate::config::ApiConfig;

/// Display fields for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: Option<String>,
}

/// Product payload as sent by the backend.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDto {
    #[serde(alias = "_id")]
    id: String,
    name: String,
    price: AmountDto,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

/// Prices arrive either as JSON numbers or as decimal strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AmountDto {
    Text(String),
    Number(serde_json::Number),
}

impl AmountDto {
    fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

impl TryFrom<ProductDto> for Product {
    type Error = ApiError;

    fn try_from(dto: ProductDto) -> Result<Self, Self::Error> {
        let id = ProductId::parse(&dto.id).map_err(|e| ApiError::Decode(e.to_string()))?;

        let name = dto.name.trim();
        if name.is_empty() {
            return Err(ApiError::Decode(format!("product {id} has an empty name")));
        }

        let currency = dto
            .currency
            .as_deref()
            .map(str::parse::<CurrencyCode>)
            .transpose()
            .map_err(|e| ApiError::Decode(e.to_string()))?
            .unwrap_or_default();
        let price = Price::parse(&dto.price.into_text(), currency)
            .map_err(|e| ApiError::Decode(format!("product {id}: {e}")))?;

        let image = dto.image.filter(|url| !url.trim().is_empty());

        Ok(Self {
            id,
            name: name.to_owned(),
            price,
            image,
        })
    }
}

/// Client for the product catalog.
///
/// Cheaply cloneable. Lookups are cached for the configured TTL.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<ProductId, Product>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &ApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.catalog_cache_ttl)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        }
    }

    /// Fetch a product's display fields.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown products, [`ApiError::Decode`]
    /// if the payload is invalid or describes a different product, and other
    /// variants for transport failures.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        if let Some(product) = self.inner.cache.get(id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let url = endpoint(&self.inner.base_url, &["products", id.as_str()])?;
        let response = self.inner.client.get(url).send().await?;
        let response = check_status(response, &format!("product {id}")).await?;

        let product = Product::try_from(decode_json::<ProductDto>(response).await?)?;
        if &product.id != id {
            return Err(ApiError::Decode(format!(
                "requested product {id} but received {}",
                product.id
            )));
        }

        self.inner.cache.insert(id.clone(), product.clone()).await;
        Ok(product)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Result<Product, ApiError> {
        Product::try_from(serde_json::from_str::<ProductDto>(json).unwrap())
    }

    #[test]
    fn test_decode_numeric_price() {
        let product = decode(
            r#"{"_id":"p1","name":"A5 Dotted Notebook","price":12.5,"image":"https://cdn/p1.jpg"}"#,
        )
        .unwrap();

        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.name, "A5 Dotted Notebook");
        assert_eq!(product.price.to_string(), "$12.50");
        assert_eq!(product.image.as_deref(), Some("https://cdn/p1.jpg"));
    }

    #[test]
    fn test_decode_string_price_and_currency() {
        let product =
            decode(r#"{"id":"p2","name":"Fountain Pen","price":"30.00","currency":"eur"}"#)
                .unwrap();
        assert_eq!(product.price.currency_code, CurrencyCode::EUR);
        assert!(product.image.is_none());
    }

    #[test]
    fn test_decode_rejects_bad_payloads() {
        for json in [
            r#"{"id":"","name":"Pen","price":1}"#,
            r#"{"id":"p1","name":"  ","price":1}"#,
            r#"{"id":"p1","name":"Pen","price":-1}"#,
            r#"{"id":"p1","name":"Pen","price":"free"}"#,
            r#"{"id":"p1","name":"Pen","price":1,"currency":"XYZ"}"#,
        ] {
            assert!(
                matches!(decode(json), Err(ApiError::Decode(_))),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn test_missing_fields_fail_to_parse() {
        assert!(serde_json::from_str::<ProductDto>(r#"{"id":"p1","price":1}"#).is_err());
    }

    #[test]
    fn test_empty_image_is_dropped() {
        let product = decode(r#"{"id":"p1","name":"Pen","price":1,"image":""}"#).unwrap();
        assert!(product.image.is_none());
    }
}
