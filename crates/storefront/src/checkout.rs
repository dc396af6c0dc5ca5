//! Checkout trigger: hands the cart total to the payment gateway.
//!
//! # States
//!
//! ```text
//! Idle --begin--> AwaitingPayment --settle--> Settled --acknowledge--> Idle
//!                                 \--fail---> Failed  --acknowledge--> Idle
//! ```
//!
//! `begin` refuses to leave `Idle` when the cart is empty, the gateway is
//! unavailable, or a payment is already awaiting the gateway. Starting a new
//! checkout from `Settled` or `Failed` acknowledges the previous outcome
//! first.
//!
//! The gateway itself is opaque: a [`PaymentCollaborator`] takes a
//! [`PaymentRequest`] and resolves to a [`PaymentOutcome`].

use std::future::Future;

use chrono::{DateTime, Utc};
use lumina_core::{Cart, CurrencyCode, Money, PaymentReference};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::PaymentConfig;
use crate::view::Notice;

/// Reasons a checkout step was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("payment gateway not loaded")]
    GatewayUnavailable,

    #[error("a payment is already in progress")]
    AlreadyInProgress,

    #[error("no payment is awaiting confirmation")]
    NotAwaitingPayment,

    #[error("cart total {0} is too large to charge")]
    AmountOverflow(u64),
}

impl CheckoutError {
    /// The notice shown to the shopper for this error, if any.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::EmptyCart => Some(Notice::EmptyCart),
            Self::GatewayUnavailable => Some(Notice::GatewayUnavailable),
            Self::AlreadyInProgress => Some(Notice::PaymentInProgress),
            Self::AmountOverflow(_) => Some(Notice::PaymentFailed {
                description: "Your cart total is too large to charge in one payment.".to_string(),
            }),
            Self::NotAwaitingPayment => None,
        }
    }
}

/// Gateway accent color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentTheme {
    pub color: String,
}

/// Everything the gateway needs to open a payment window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    /// Gateway identity key.
    pub key: String,
    /// Amount in minor units (paise, cents).
    pub amount: u64,
    pub currency: CurrencyCode,
    /// Merchant display name.
    pub name: String,
    pub description: String,
    /// Merchant logo.
    pub image: String,
    pub theme: PaymentTheme,
    /// Checkout attempt id, echoed back by the gateway on its dashboard.
    pub receipt: String,
}

/// How the gateway resolved a payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded { reference: PaymentReference },
    Failed { description: String },
}

/// External payment gateway.
pub trait PaymentCollaborator {
    /// Whether the gateway is loaded and can take payments.
    fn is_available(&self) -> bool;

    /// Collect `request.amount` and report how it went.
    fn collect(&self, request: PaymentRequest) -> impl Future<Output = PaymentOutcome> + Send;
}

/// A payment handed to the gateway and not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPayment {
    pub attempt_id: Uuid,
    pub amount: Money,
    pub started_at: DateTime<Utc>,
}

/// Checkout state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckoutState {
    #[default]
    Idle,
    AwaitingPayment(PendingPayment),
    Settled { reference: PaymentReference },
    Failed { description: String },
}

/// Drives one checkout at a time.
#[derive(Debug, Clone)]
pub struct CheckoutTrigger {
    payment: PaymentConfig,
    currency: CurrencyCode,
    state: CheckoutState,
}

impl CheckoutTrigger {
    #[must_use]
    pub fn new(payment: PaymentConfig, currency: CurrencyCode) -> Self {
        Self {
            payment,
            currency,
            state: CheckoutState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    #[must_use]
    pub const fn is_awaiting_payment(&self) -> bool {
        matches!(self.state, CheckoutState::AwaitingPayment(_))
    }

    /// Start a checkout for `cart`.
    ///
    /// On success the trigger is `AwaitingPayment` and the returned request
    /// should be handed to the gateway. On error the state is unchanged
    /// (apart from acknowledging a previous outcome).
    ///
    /// # Errors
    ///
    /// - `AlreadyInProgress` if a payment is awaiting the gateway
    /// - `EmptyCart` if there is nothing to pay for
    /// - `GatewayUnavailable` if the gateway is not loaded or no key is configured
    /// - `AmountOverflow` if the total does not fit in minor units
    pub fn begin(
        &mut self,
        cart: &Cart,
        gateway_available: bool,
    ) -> Result<PaymentRequest, CheckoutError> {
        if self.is_awaiting_payment() {
            return Err(CheckoutError::AlreadyInProgress);
        }
        self.acknowledge();

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let Some(key) = self.payment.key_id.clone().filter(|_| gateway_available) else {
            return Err(CheckoutError::GatewayUnavailable);
        };

        let amount = Money::new(cart.subtotal(), self.currency);
        let amount_minor = amount
            .minor_units()
            .ok_or(CheckoutError::AmountOverflow(amount.amount))?;

        let pending = PendingPayment {
            attempt_id: Uuid::new_v4(),
            amount,
            started_at: Utc::now(),
        };

        let request = PaymentRequest {
            key,
            amount: amount_minor,
            currency: self.currency,
            name: self.payment.display_name.clone(),
            description: self.payment.description.clone(),
            image: self.payment.image.clone(),
            theme: PaymentTheme {
                color: self.payment.theme_color.clone(),
            },
            receipt: pending.attempt_id.to_string(),
        };

        tracing::info!(
            attempt_id = %pending.attempt_id,
            amount = amount_minor,
            currency = %self.currency,
            "Checkout awaiting payment"
        );
        self.state = CheckoutState::AwaitingPayment(pending);

        Ok(request)
    }

    /// The gateway confirmed the payment.
    ///
    /// # Errors
    ///
    /// Returns `NotAwaitingPayment` if no payment is in flight.
    pub fn settle(&mut self, reference: PaymentReference) -> Result<PendingPayment, CheckoutError> {
        let pending = self.take_pending()?;
        tracing::info!(
            attempt_id = %pending.attempt_id,
            reference = %reference,
            "Payment settled"
        );
        self.state = CheckoutState::Settled { reference };
        Ok(pending)
    }

    /// The gateway declined or errored.
    ///
    /// # Errors
    ///
    /// Returns `NotAwaitingPayment` if no payment is in flight.
    pub fn fail(&mut self, description: String) -> Result<PendingPayment, CheckoutError> {
        let pending = self.take_pending()?;
        tracing::warn!(
            attempt_id = %pending.attempt_id,
            description = %description,
            "Payment failed"
        );
        self.state = CheckoutState::Failed { description };
        Ok(pending)
    }

    /// Return to `Idle` after a settled or failed payment.
    pub fn acknowledge(&mut self) {
        if matches!(
            self.state,
            CheckoutState::Settled { .. } | CheckoutState::Failed { .. }
        ) {
            self.state = CheckoutState::Idle;
        }
    }

    fn take_pending(&mut self) -> Result<PendingPayment, CheckoutError> {
        match std::mem::take(&mut self.state) {
            CheckoutState::AwaitingPayment(pending) => Ok(pending),
            other => {
                self.state = other;
                Err(CheckoutError::NotAwaitingPayment)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn trigger() -> CheckoutTrigger {
        let payment = PaymentConfig {
            key_id: Some("rzp_test_1DP5mmOlF5G5ag".to_string()),
            ..PaymentConfig::default()
        };
        CheckoutTrigger::new(payment, CurrencyCode::INR)
    }

    fn cart_worth_15000() -> Cart {
        let mut cart = Cart::new();
        cart.add("r1", "Ring", 5000, "r1.png");
        cart.add("r1", "Ring", 5000, "r1.png");
        cart.add("e1", "Earring", 5000, "e1.png");
        cart
    }

    #[test]
    fn test_begin_builds_request_in_minor_units() {
        let mut checkout = trigger();
        let request = checkout.begin(&cart_worth_15000(), true).unwrap();

        assert_eq!(request.amount, 1_500_000);
        assert_eq!(request.currency, CurrencyCode::INR);
        assert_eq!(request.key, "rzp_test_1DP5mmOlF5G5ag");
        assert_eq!(request.name, "Lumina Jewelry");
        assert_eq!(request.theme.color, "#D4AF37");
        assert!(checkout.is_awaiting_payment());
    }

    #[test]
    fn test_request_serializes_for_gateway() {
        let mut checkout = trigger();
        let request = checkout.begin(&cart_worth_15000(), true).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["amount"], 1_500_000);
        assert_eq!(json["currency"], "INR");
        assert_eq!(json["theme"]["color"], "#D4AF37");
        assert_eq!(json["receipt"], request.receipt.as_str());
    }

    #[test]
    fn test_begin_empty_cart_stays_idle() {
        let mut checkout = trigger();
        assert_eq!(
            checkout.begin(&Cart::new(), true),
            Err(CheckoutError::EmptyCart)
        );
        assert_eq!(checkout.state(), &CheckoutState::Idle);
    }

    #[test]
    fn test_begin_gateway_unavailable_stays_idle() {
        let mut checkout = trigger();
        assert_eq!(
            checkout.begin(&cart_worth_15000(), false),
            Err(CheckoutError::GatewayUnavailable)
        );
        assert_eq!(checkout.state(), &CheckoutState::Idle);
    }

    #[test]
    fn test_begin_without_key_is_unavailable() {
        let mut checkout = CheckoutTrigger::new(PaymentConfig::default(), CurrencyCode::INR);
        assert_eq!(
            checkout.begin(&cart_worth_15000(), true),
            Err(CheckoutError::GatewayUnavailable)
        );
    }

    #[test]
    fn test_begin_twice_is_rejected() {
        let mut checkout = trigger();
        let first = checkout.begin(&cart_worth_15000(), true).unwrap();

        assert_eq!(
            checkout.begin(&cart_worth_15000(), true),
            Err(CheckoutError::AlreadyInProgress)
        );
        let CheckoutState::AwaitingPayment(pending) = checkout.state() else {
            panic!("expected AwaitingPayment");
        };
        assert_eq!(pending.attempt_id.to_string(), first.receipt);
    }

    #[test]
    fn test_begin_overflow() {
        let mut cart = Cart::new();
        cart.add("gold", "Gold Bar", u64::MAX / 10, "gold.png");
        let mut checkout = trigger();

        let err = checkout.begin(&cart, true).unwrap_err();
        assert!(matches!(err, CheckoutError::AmountOverflow(_)));
        assert_eq!(checkout.state(), &CheckoutState::Idle);
        assert!(matches!(err.notice(), Some(Notice::PaymentFailed { .. })));
    }

    #[test]
    fn test_settle_then_acknowledge() {
        let mut checkout = trigger();
        checkout.begin(&cart_worth_15000(), true).unwrap();

        let pending = checkout.settle(PaymentReference::new("pay_abc123")).unwrap();
        assert_eq!(pending.amount.amount, 15000);
        assert_eq!(
            checkout.state(),
            &CheckoutState::Settled {
                reference: PaymentReference::new("pay_abc123")
            }
        );

        checkout.acknowledge();
        assert_eq!(checkout.state(), &CheckoutState::Idle);
    }

    #[test]
    fn test_fail_allows_retry() {
        let mut checkout = trigger();
        checkout.begin(&cart_worth_15000(), true).unwrap();
        checkout.fail("Card declined".to_string()).unwrap();

        assert!(checkout.begin(&cart_worth_15000(), true).is_ok());
        assert!(checkout.is_awaiting_payment());
    }

    #[test]
    fn test_settle_without_payment_is_rejected() {
        let mut checkout = trigger();
        assert_eq!(
            checkout.settle(PaymentReference::new("pay_stray")),
            Err(CheckoutError::NotAwaitingPayment)
        );
        assert_eq!(checkout.state(), &CheckoutState::Idle);
    }

    #[test]
    fn test_error_notices() {
        assert_eq!(CheckoutError::EmptyCart.notice(), Some(Notice::EmptyCart));
        assert_eq!(
            CheckoutError::GatewayUnavailable.notice(),
            Some(Notice::GatewayUnavailable)
        );
        assert_eq!(CheckoutError::NotAwaitingPayment.notice(), None);
    }
}
