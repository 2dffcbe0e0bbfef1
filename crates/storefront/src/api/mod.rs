//! REST backend clients.
//!
//! # Architecture
//!
//! - The backend is the source of truth for products and orders; the cart only
//!   stores product ids and quantities
//! - Every response is decoded into a private DTO and then validated into a
//!   domain type, so malformed payloads stop here as [`ApiError::Decode`]
//! - Catalog lookups are cached in memory via `moka` (short TTL)
//!
//! # Endpoints
//!
//! ```text
//! GET  {base}/products/{id}   - Product display fields
//! POST {base}/orders          - Create an order from a cart
//! ```

mod catalog;
mod orders;

pub use catalog::{CatalogClient, Product};
pub use orders::{OrderClient, OrderConfirmation};

use reqwest::{Response, StatusCode};
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;

/// Errors that can occur when talking to the REST backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Start of the response body, for diagnostics.
        body: String,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The payload did not match the expected schema.
    #[error("invalid response payload: {0}")]
    Decode(String),

    /// A request URL could not be built.
    #[error("invalid request URL: {0}")]
    Url(String),
}

/// Build the HTTP client shared by all backend clients.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn http_client(config: &ApiConfig) -> Result<reqwest::Client, ApiError> {
    Ok(reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(concat!("inkwell-storefront/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Resolve `segments` beneath `base`, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ApiError::Url(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Map rate limiting and error statuses to [`ApiError`].
async fn check_status(response: Response, resource: &str) -> Result<Response, ApiError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(ApiError::RateLimited(retry_after));
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(resource.to_string()));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "Backend returned non-success status"
        );
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        });
    }

    Ok(response)
}

/// Parse a JSON body, logging the payload when it does not match.
async fn decode_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        ApiError::Decode(e.to_string())
    })
}
