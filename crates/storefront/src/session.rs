//! Cart session: one cart store, one view binder, one checkout trigger.
//!
//! Every shopper interaction enters through a [`CartSession`] method and runs
//! to completion (mutate, persist, update presentation) before returning.
//! Rendering is on demand: after any call, [`CartSession::panel`] and
//! [`CartSession::badge`] reflect the new state.

use lumina_core::{Cart, ItemId, PaymentReference, QuantityChange};

use crate::cart::CartStore;
use crate::checkout::{
    CheckoutError, CheckoutState, CheckoutTrigger, PaymentCollaborator, PaymentOutcome,
    PaymentRequest,
};
use crate::config::{CartConfig, PaymentConfig};
use crate::error::add_breadcrumb;
use crate::storage::CartStorage;
use crate::view::{
    CartCountTemplate, CartPanelTemplate, Notice, StatusModalTemplate, ViewBinder,
};

/// Owner of all cart state for one storefront page.
#[derive(Debug)]
pub struct CartSession<S> {
    store: CartStore<S>,
    view: ViewBinder,
    checkout: CheckoutTrigger,
}

impl<S: CartStorage> CartSession<S> {
    /// Load the cart from `storage` and start with the panel closed.
    pub fn open(storage: S, cart: &CartConfig, payment: PaymentConfig) -> Self {
        Self {
            store: CartStore::open(storage),
            view: ViewBinder::new(cart.currency, cart.locale),
            checkout: CheckoutTrigger::new(payment, cart.currency),
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.store.cart()
    }

    #[must_use]
    pub const fn store(&self) -> &CartStore<S> {
        &self.store
    }

    #[must_use]
    pub const fn view(&self) -> &ViewBinder {
        &self.view
    }

    #[must_use]
    pub const fn checkout_state(&self) -> &CheckoutState {
        self.checkout.state()
    }

    // =========================================================================
    // Cart interactions
    // =========================================================================

    /// Add one unit of a product and open the panel to show it. Returns the
    /// item's new quantity.
    pub fn add_item(
        &mut self,
        id: impl Into<ItemId>,
        name: impl Into<String>,
        price: u64,
        image: impl Into<String>,
    ) -> u32 {
        let quantity = self.store.add_item(id, name, price, image);
        self.view.open_panel();
        quantity
    }

    /// Remove a line item; unknown ids are ignored.
    pub fn remove_item(&mut self, id: &ItemId) -> bool {
        self.store.remove_item(id)
    }

    /// Change a line item's quantity; zero or below removes it.
    pub fn change_quantity(&mut self, id: &ItemId, delta: i64) -> QuantityChange {
        self.store.change_quantity(id, delta)
    }

    /// Open or close the panel. Returns whether it is now open.
    pub fn toggle_panel(&mut self) -> bool {
        self.view.toggle_panel()
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    #[must_use]
    pub fn panel(&self) -> CartPanelTemplate {
        self.view.panel_template(self.store.cart())
    }

    #[must_use]
    pub fn badge(&self) -> CartCountTemplate {
        self.view.badge_template(self.store.cart())
    }

    #[must_use]
    pub fn notice(&self) -> Option<StatusModalTemplate> {
        self.view.notice_template()
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Start a checkout and return the request for the gateway.
    ///
    /// Refusals the shopper should see are presented as a notice.
    ///
    /// # Errors
    ///
    /// Returns the `CheckoutError` from [`CheckoutTrigger::begin`].
    pub fn begin_checkout(
        &mut self,
        gateway_available: bool,
    ) -> Result<PaymentRequest, CheckoutError> {
        match self.checkout.begin(self.store.cart(), gateway_available) {
            Ok(request) => {
                self.view.dismiss_notice();
                add_breadcrumb(
                    "checkout",
                    "Awaiting payment",
                    Some(&[("receipt", request.receipt.as_str())]),
                );
                Ok(request)
            }
            Err(e) => {
                tracing::info!(error = %e, "Checkout refused");
                if let Some(notice) = e.notice() {
                    self.view.present(notice);
                }
                Err(e)
            }
        }
    }

    /// The gateway confirmed payment: empty the cart, close the panel and
    /// show the reference.
    ///
    /// # Errors
    ///
    /// Returns `NotAwaitingPayment` if no checkout is in flight; nothing
    /// changes in that case.
    pub fn settle_payment(&mut self, reference: PaymentReference) -> Result<(), CheckoutError> {
        self.checkout.settle(reference.clone())?;
        self.store.clear();
        self.view.close_panel();
        add_breadcrumb(
            "checkout",
            "Payment settled",
            Some(&[("reference", reference.as_str())]),
        );
        self.view.present(Notice::PaymentSucceeded { reference });
        Ok(())
    }

    /// The gateway reported a failure: show it and leave the cart alone.
    ///
    /// # Errors
    ///
    /// Returns `NotAwaitingPayment` if no checkout is in flight.
    pub fn fail_payment(&mut self, description: impl Into<String>) -> Result<(), CheckoutError> {
        let description = description.into();
        self.checkout.fail(description.clone())?;
        add_breadcrumb("checkout", "Payment failed", None);
        self.view.present(Notice::PaymentFailed { description });
        Ok(())
    }

    /// Apply a gateway outcome.
    ///
    /// # Errors
    ///
    /// Returns `NotAwaitingPayment` if no checkout is in flight.
    pub fn resolve(&mut self, outcome: PaymentOutcome) -> Result<(), CheckoutError> {
        match outcome {
            PaymentOutcome::Succeeded { reference } => self.settle_payment(reference),
            PaymentOutcome::Failed { description } => self.fail_payment(description),
        }
    }

    /// Hide the notice and, after a resolved payment, return to idle.
    pub fn dismiss_notice(&mut self) {
        self.view.dismiss_notice();
        self.checkout.acknowledge();
    }

    /// Run a whole checkout against `gateway`.
    ///
    /// The session is borrowed for the duration of the payment, so no cart
    /// change can interleave with it.
    ///
    /// # Errors
    ///
    /// Returns the `CheckoutError` that stopped the checkout from starting.
    pub async fn checkout<C: PaymentCollaborator>(
        &mut self,
        gateway: &C,
    ) -> Result<PaymentOutcome, CheckoutError> {
        let request = self.begin_checkout(gateway.is_available())?;
        let outcome = gateway.collect(request).await;
        self.resolve(outcome.clone())?;
        Ok(outcome)
    }
}
