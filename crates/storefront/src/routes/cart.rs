//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Mutations return the re-rendered panel and an `HX-Trigger: cart-updated`
//! header so the badge refreshes itself.
//!
//! Checkout is split across requests because the browser hosts the payment
//! widget: `/cart/checkout` hands back the payment request as JSON, and the
//! widget's handlers report the outcome to `/cart/checkout/success` or
//! `/cart/checkout/failure`.

use axum::{
    Form, Json,
    extract::State,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use lumina_core::{ItemId, PaymentReference};
use serde::Deserialize;
use tracing::instrument;

use crate::checkout::PaymentRequest;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::view::{CartCountTemplate, CartPanelTemplate};

/// HTMX event fired after any cart change.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: String,
    pub name: String,
    pub price: u64,
    pub image: String,
}

/// Quantity change form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    pub delta: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: String,
}

/// Success callback from the payment widget.
#[derive(Debug, Deserialize)]
pub struct PaymentSuccessForm {
    pub razorpay_payment_id: String,
}

/// Failure callback from the payment widget.
#[derive(Debug, Deserialize)]
pub struct PaymentFailureForm {
    pub description: String,
}

/// Attach the update trigger to a panel rendered after a change.
fn updated_panel(panel: CartPanelTemplate) -> Response {
    (
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        panel,
    )
        .into_response()
}

/// Display the cart panel fragment.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    state.session().await.panel()
}

/// Get cart count badge (HTMX).
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> CartCountTemplate {
    state.session().await.badge()
}

/// Add one unit of an item and open the panel (HTMX).
#[instrument(skip(state))]
pub async fn add(State(state): State<AppState>, Form(form): Form<AddToCartForm>) -> Result<Response> {
    if form.id.trim().is_empty() {
        return Err(AppError::BadRequest("item id is required".to_string()));
    }

    let mut session = state.session().await;
    session.add_item(form.id, form.name, form.price, form.image);

    Ok(updated_panel(session.panel()))
}

/// Change an item's quantity by a signed delta (HTMX).
#[instrument(skip(state))]
pub async fn update(State(state): State<AppState>, Form(form): Form<UpdateCartForm>) -> Response {
    let mut session = state.session().await;
    session.change_quantity(&ItemId::new(form.id), form.delta);

    updated_panel(session.panel())
}

/// Remove an item (HTMX).
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let mut session = state.session().await;
    session.remove_item(&ItemId::new(form.id));

    updated_panel(session.panel())
}

/// Open or close the panel (HTMX).
#[instrument(skip(state))]
pub async fn toggle(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session().await;
    session.toggle_panel();
    session.panel()
}

/// Start checkout and return the payment request for the widget.
#[instrument(skip(state))]
pub async fn checkout(State(state): State<AppState>) -> Result<Json<PaymentRequest>> {
    let request = state
        .session()
        .await
        .begin_checkout(state.gateway_available())?;

    Ok(Json(request))
}

/// Payment widget reported success.
#[instrument(skip(state))]
pub async fn checkout_success(
    State(state): State<AppState>,
    Form(form): Form<PaymentSuccessForm>,
) -> Result<Response> {
    if form.razorpay_payment_id.trim().is_empty() {
        return Err(AppError::BadRequest("payment reference is required".to_string()));
    }

    let mut session = state.session().await;
    session.settle_payment(PaymentReference::new(form.razorpay_payment_id))?;

    let modal = session
        .notice()
        .ok_or_else(|| AppError::Internal("settled payment left no notice".to_string()))?;

    Ok((
        AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
        modal,
    )
        .into_response())
}

/// Payment widget reported failure.
#[instrument(skip(state))]
pub async fn checkout_failure(
    State(state): State<AppState>,
    Form(form): Form<PaymentFailureForm>,
) -> Result<Response> {
    let mut session = state.session().await;
    session.fail_payment(form.description)?;

    let modal = session
        .notice()
        .ok_or_else(|| AppError::Internal("failed payment left no notice".to_string()))?;

    Ok(modal.into_response())
}

/// Dismiss the status modal (HTMX swaps it out for nothing).
#[instrument(skip(state))]
pub async fn dismiss_notice(State(state): State<AppState>) -> Html<&'static str> {
    state.session().await.dismiss_notice();
    Html("")
}
