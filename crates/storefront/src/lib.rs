//! Lumina Storefront library.
//!
//! This crate provides the cart panel and checkout service as a library,
//! allowing it to be tested and reused.
//!
//! # Modules
//!
//! - [`storage`] - Persistent cart slot (file or memory)
//! - [`cart`] - Cart store, the single owner of cart contents
//! - [`view`] - Panel, badge and notice rendering
//! - [`checkout`] - Checkout state machine and payment gateway seam
//! - [`session`] - Ties store, view and checkout together
//! - [`routes`] - HTMX endpoints
//!
//! The host page loads `/static/js/cart.js`, which starts checkout from the
//! panel's `data-checkout` button, opens the payment widget and posts its
//! outcome back to the checkout callbacks.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
pub mod view;

use axum::{Router, extract::Request, middleware::from_fn};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router with request tracing and static assets.
pub fn app(state: AppState) -> Router {
    let static_dir = state.config().static_dir.clone();

    Router::new()
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
}
