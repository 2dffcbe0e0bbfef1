//! Integration test harness for Inkwell.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p inkwell-integration-tests
//! ```
//!
//! Each [`TestContext`] starts a [`FakeBackend`] on an ephemeral port and
//! builds the storefront router against it. Requests are driven through the
//! router in-process; only the backend calls cross a real socket.

#![cfg_attr(not(test), forbid(unsafe_code))]
// Test support: panicking on broken fixtures is the desired failure mode.
#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use inkwell_cart::{DurableSlot, MemorySlot, SlotError};
use inkwell_storefront::{
    app, carts::CartRegistry, config::StorefrontConfig, middleware::PROFILE_HEADER,
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

/// Bearer token configured for the order API.
pub const API_TOKEN: &str = "ik_live_7Qz9Lm2Vx4Rt8Kp3Wn6Yb";

/// An order request as received by the fake backend.
#[derive(Debug, Clone)]
pub struct RecordedOrder {
    pub body: Value,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct BackendState {
    orders: Mutex<Vec<RecordedOrder>>,
    fail_orders: AtomicBool,
}

/// A stand-in for the REST backend serving products and orders.
///
/// Known products: `p1` (12.50, string price) and `p2` (30, numeric price).
/// `vault` is priced at the largest representable amount, `broken` returns an
/// invalid payload, and everything else is a 404.
#[derive(Clone)]
pub struct FakeBackend {
    pub url: String,
    state: Arc<BackendState>,
}

impl FakeBackend {
    /// Bind to an ephemeral port and serve in the background.
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());
        let router = Router::new()
            .route("/products/{id}", get(product))
            .route("/orders", post(create_order))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    /// Orders received so far.
    pub fn orders(&self) -> Vec<RecordedOrder> {
        self.state.orders.lock().unwrap().clone()
    }

    /// Make order creation answer 500.
    pub fn fail_orders(&self, fail: bool) {
        self.state.fail_orders.store(fail, Ordering::SeqCst);
    }
}

async fn product(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "p1" => Json(json!({
            "id": "p1",
            "name": "A5 Dotted Notebook",
            "price": "12.50",
            "image": "https://cdn.inkwell.example/p1.jpg"
        }))
        .into_response(),
        "p2" => Json(json!({ "_id": "p2", "name": "Fountain Pen", "price": 30 })).into_response(),
        "broken" => Json(json!({ "id": "broken", "name": "", "price": "1.00" })).into_response(),
        "vault" => Json(json!({
            "id": "vault",
            "name": "Archive Vault",
            "price": "79228162514264337593543950335"
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn create_order(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if state.fail_orders.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "order service down").into_response();
    }

    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let mut orders = state.orders.lock().unwrap();
    orders.push(RecordedOrder {
        body,
        authorization,
    });

    let confirmation = json!({
        "id": format!("o-{}", orders.len()),
        "status": "Pending",
        "createdAt": "2026-10-19T12:00:00Z"
    });
    (StatusCode::CREATED, Json(confirmation)).into_response()
}

/// A slot that is always empty and refuses every write.
#[derive(Debug, Default)]
pub struct ReadOnlySlot;

impl DurableSlot for ReadOnlySlot {
    fn get(&self, _key: &str) -> Result<Option<String>, SlotError> {
        Ok(None)
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), SlotError> {
        Err(SlotError::Io {
            key: key.to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only slot"),
        })
    }

    fn delete(&self, _key: &str) -> Result<bool, SlotError> {
        Ok(false)
    }
}

/// A storefront wired to a fake backend and an inspectable slot.
pub struct TestContext {
    pub backend: FakeBackend,
    pub slot: Arc<dyn DurableSlot>,
    pub router: Router,
    /// Profile sent by [`get`](Self::get) and [`post`](Self::post).
    pub profile: Uuid,
}

impl TestContext {
    /// Storefront with default settings over an in-memory slot.
    pub async fn new() -> Self {
        Self::builder().build().await
    }

    /// Start configuring a context.
    #[must_use]
    pub fn builder() -> TestContextBuilder {
        TestContextBuilder::default()
    }

    /// Send a request with the context's profile header.
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send(self.request("GET", path).body(Body::empty()).unwrap())
            .await
    }

    /// POST a JSON body with the context's profile header.
    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let request = self
            .request("POST", path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send an arbitrary request and decode the response body.
    ///
    /// Non-JSON bodies are returned as a JSON string.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    /// Request builder carrying the context's profile header.
    pub fn request(&self, method: &str, path: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(path)
            .header(PROFILE_HEADER, self.profile.to_string())
    }

    /// Raw slot contents for the context's profile, parsed as JSON.
    pub fn stored_cart(&self) -> Option<Value> {
        self.slot
            .get(&CartRegistry::slot_key(self.profile))
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }
}

/// Builder for [`TestContext`].
#[derive(Default)]
pub struct TestContextBuilder {
    slot: Option<Arc<dyn DurableSlot>>,
    profile: Option<Uuid>,
    env: HashMap<String, String>,
}

impl TestContextBuilder {
    /// Persist carts into `slot` instead of a fresh in-memory slot.
    #[must_use]
    pub fn slot(mut self, slot: Arc<dyn DurableSlot>) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Use a fixed profile instead of a random one.
    #[must_use]
    pub const fn profile(mut self, profile: Uuid) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Set an additional configuration variable.
    #[must_use]
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Start the fake backend and build the storefront.
    pub async fn build(self) -> TestContext {
        let backend = FakeBackend::start().await;

        let mut env = self.env;
        env.insert("INKWELL_API_BASE_URL".to_string(), backend.url.clone());
        env.insert("INKWELL_API_TOKEN".to_string(), API_TOKEN.to_string());
        let config = StorefrontConfig::from_lookup(|key| env.get(key).cloned()).unwrap();

        let slot = self
            .slot
            .unwrap_or_else(|| Arc::new(MemorySlot::new()) as Arc<dyn DurableSlot>);
        let state = AppState::with_slot(config, Arc::clone(&slot)).unwrap();

        TestContext {
            backend,
            slot,
            router: app(state),
            profile: self.profile.unwrap_or_else(Uuid::new_v4),
        }
    }
}
