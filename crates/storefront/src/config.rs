//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `INKWELL_API_BASE_URL` - Base URL of the REST backend (products, orders)
//!
//! ## Optional
//! - `INKWELL_HOST` - Bind address (default: 127.0.0.1)
//! - `INKWELL_PORT` - Listen port (default: 3000)
//! - `INKWELL_CART_DIR` - Directory holding the durable cart slots (default: .inkwell)
//! - `INKWELL_API_TOKEN` - Bearer token for the order API
//! - `INKWELL_API_TIMEOUT_SECS` - Outbound request timeout (default: 10)
//! - `INKWELL_CATALOG_CACHE_TTL_SECS` - Product cache lifetime (default: 60)
//! - `INKWELL_CLEAR_CART_ON_LOGOUT` - Empty the cart on logout (default: false)
//! - `INKWELL_CART_CAPACITY` - Most carts held in memory at once (default: 10000)
//! - `INKWELL_CART_IDLE_SECS` - Idle time before a cart is dropped from memory (default: 1800)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory holding one durable slot file per cart profile
    pub cart_dir: PathBuf,
    /// REST backend configuration
    pub api: ApiConfig,
    /// Whether logout empties the cart
    pub clear_cart_on_logout: bool,
    /// Most cart stores kept in memory; evicted carts reopen from their slot
    pub cart_capacity: u64,
    /// Idle time after which a cart store is dropped from memory
    pub cart_idle_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// REST backend configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL; `products/{id}` and `orders` are resolved against it
    pub base_url: Url,
    /// Bearer token sent with order requests
    pub token: Option<SecretString>,
    /// Timeout for every outbound request
    pub timeout: Duration,
    /// How long catalog lookups are cached
    pub catalog_cache_ttl: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("catalog_cache_ttl", &self.catalog_cache_ttl)
            .finish()
    }
}

impl ApiConfig {
    /// Build a configuration for `base_url` with default timings and no token.
    ///
    /// A missing trailing slash is added so relative paths resolve beneath the
    /// base rather than replacing its last segment.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("INKWELL_API_BASE_URL", base_url)?,
            token: None,
            timeout: Duration::from_secs(10),
            catalog_cache_ttl: Duration::from_secs(60),
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the API token looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env
            .or_default("INKWELL_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("INKWELL_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("INKWELL_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("INKWELL_PORT".to_string(), e.to_string()))?;
        let cart_dir = PathBuf::from(env.or_default("INKWELL_CART_DIR", ".inkwell"));

        let mut api = ApiConfig::new(&env.required("INKWELL_API_BASE_URL")?)?;
        api.token = env
            .optional("INKWELL_API_TOKEN")
            .map(|token| validated_secret(token, "INKWELL_API_TOKEN"))
            .transpose()?;
        api.timeout = env.seconds("INKWELL_API_TIMEOUT_SECS", 10)?;
        api.catalog_cache_ttl = env.seconds("INKWELL_CATALOG_CACHE_TTL_SECS", 60)?;

        let clear_cart_on_logout = env.flag("INKWELL_CLEAR_CART_ON_LOGOUT", false)?;
        let cart_capacity = env.number("INKWELL_CART_CAPACITY", 10_000)?;
        let cart_idle_timeout = env.seconds("INKWELL_CART_IDLE_SECS", 30 * 60)?;

        Ok(Self {
            host,
            port,
            cart_dir,
            api,
            clear_cart_on_logout,
            cart_capacity,
            cart_idle_timeout,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Typed accessors over a variable lookup.
struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Get an unsigned integer.
    fn number(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        self.optional(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Get a whole number of seconds.
    fn seconds(&self, key: &str, default: u64) -> Result<Duration, ConfigError> {
        self.optional(key).map_or(Ok(Duration::from_secs(default)), |value| {
            value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Get a boolean flag (`true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`).
    fn flag(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = self.optional(key) else {
            return Ok(default);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("expected a boolean, got {other:?}"),
            )),
        }
    }
}

/// Parse an absolute http(s) base URL, ensuring a trailing slash.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {:?}", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholder or low-entropy secrets.
fn validated_secret(value: String, var_name: &str) -> Result<SecretString, ConfigError> {
    let lower = value.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(&value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(SecretString::from(value))
}
