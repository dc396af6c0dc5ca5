//! Integration tests for the Lumina storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lumina-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_cart` - Cart fragments over HTTP
//! - `storefront_checkout` - Checkout flow over HTTP
//!
//! Tests build the router in-process with a temporary data directory and
//! drive it with `tower::ServiceExt::oneshot`; no server or network is needed.

use std::path::{Path, PathBuf};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use lumina_storefront::config::{CartConfig, PaymentConfig, StorefrontConfig};
use lumina_storefront::state::AppState;
use tower::ServiceExt;

/// Largest response body the helpers will read.
const BODY_LIMIT: usize = 1024 * 1024;

/// Gateway key used by test configurations.
pub const TEST_KEY_ID: &str = "rzp_test_1DP5mmOlF5G5ag";

/// Configuration pointing the cart slot at `data_dir` and serving the
/// storefront's static assets.
#[must_use]
pub fn test_config(data_dir: &Path, key_id: Option<&str>) -> StorefrontConfig {
    StorefrontConfig {
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../storefront/static"),
        cart: CartConfig {
            data_dir: data_dir.to_path_buf(),
            ..CartConfig::default()
        },
        payment: PaymentConfig {
            key_id: key_id.map(String::from),
            ..PaymentConfig::default()
        },
        ..StorefrontConfig::default()
    }
}

/// Build a router over a fresh state loaded from `config`.
#[must_use]
pub fn test_app(config: StorefrontConfig) -> Router {
    lumina_storefront::app(AppState::new(config))
}

/// A response with its body read to a string.
pub struct TestResponse {
    pub status: StatusCode,
    pub hx_trigger: Option<String>,
    pub body: String,
}

async fn collect(response: Response<Body>) -> TestResponse {
    let status = response.status();
    let hx_trigger = response
        .headers()
        .get("HX-Trigger")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let bytes = to_bytes(response.into_body(), BODY_LIMIT)
        .await
        .unwrap_or_default();

    TestResponse {
        status,
        hx_trigger,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

/// Send a GET request.
///
/// # Panics
///
/// Panics if the request cannot be built or the router errors.
pub async fn get(app: &Router, uri: &str) -> TestResponse {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request");
    collect(app.clone().oneshot(request).await.expect("router response")).await
}

/// Send a form-encoded POST request.
///
/// # Panics
///
/// Panics if the request cannot be built or the router errors.
pub async fn post_form(app: &Router, uri: &str, form: &str) -> TestResponse {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_owned()))
        .expect("valid request");
    collect(app.clone().oneshot(request).await.expect("router response")).await
}
