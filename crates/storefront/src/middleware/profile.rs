//! Browser profile extractor.
//!
//! Every cart request names the browser profile it belongs to in the
//! `x-cart-profile` header. The value is a UUID generated and kept by the
//! client (the equivalent of a browser's local storage scope).

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

/// The HTTP header naming the cart profile.
pub const PROFILE_HEADER: &str = "x-cart-profile";

/// Extractor for the cart profile of the current request.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CartProfile(profile): CartProfile) -> String {
///     format!("cart for {profile}")
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartProfile(pub Uuid);

impl std::fmt::Display for CartProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<S> FromRequestParts<S> for CartProfile
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(PROFILE_HEADER)
            .ok_or_else(|| AppError::BadRequest(format!("missing {PROFILE_HEADER} header")))?;

        let profile = value
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .ok_or_else(|| {
                AppError::BadRequest(format!("{PROFILE_HEADER} header must be a UUID"))
            })?;

        Ok(Self(profile))
    }
}
