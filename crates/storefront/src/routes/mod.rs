//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart panel (rows, subtotal, open state)
//! GET  /cart/count             - Cart count badge
//! POST /cart/add               - Add item, open panel (returns panel, triggers cart-updated)
//! POST /cart/update            - Change quantity by delta (returns panel)
//! POST /cart/remove            - Remove item (returns panel)
//! POST /cart/toggle            - Open/close panel (returns panel)
//!
//! # Checkout
//! POST /cart/checkout          - Payment request JSON, or status modal on refusal
//! POST /cart/checkout/success  - Widget success callback (returns status modal)
//! POST /cart/checkout/failure  - Widget failure callback (returns status modal)
//! POST /cart/notice/dismiss    - Close the status modal
//! ```

pub mod cart;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/toggle", post(cart::toggle))
        .route("/checkout", post(cart::checkout))
        .route("/checkout/success", post(cart::checkout_success))
        .route("/checkout/failure", post(cart::checkout_failure))
        .route("/notice/dismiss", post(cart::dismiss_notice))
}

/// Create the main application router (without state).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/cart", cart_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
