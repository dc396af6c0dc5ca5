//! View binder: projects the cart into the sidebar panel, badge and notices.
//!
//! The binder owns presentation state only (whether the panel is open and
//! which notice, if any, is showing). It reads the cart through a borrow and
//! never changes it. Rendering is a pure function of cart, presentation
//! state and currency settings, so re-rendering an unchanged cart yields the
//! same HTML.
//!
//! # Element Ids
//!
//! ```text
//! cart-panel    - swap target wrapping overlay and sidebar
//! cart-overlay  - dimmed backdrop, toggles the panel
//! cart-sidebar  - the panel itself
//! cart-items    - item rows
//! cart-total    - formatted subtotal
//! cart-badge    - item count
//! status-modal  - checkout notice
//! ```

use askama::Template;
use askama_web::WebTemplate;
use lumina_core::{Cart, CurrencyCode, LineItem, Money, NumberLocale, PaymentReference};

/// One rendered cart row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub image: String,
    pub price: String,
    pub line_price: String,
    pub quantity: u32,
}

/// Rendered panel contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub open: bool,
}

/// Rendered count badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeView {
    pub count: u64,
    pub visible: bool,
}

/// A user-visible checkout notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Checkout was attempted with nothing in the cart.
    EmptyCart,
    /// The payment gateway is not loaded or not configured.
    GatewayUnavailable,
    /// A payment is already awaiting the gateway.
    PaymentInProgress,
    /// The gateway confirmed the payment.
    PaymentSucceeded { reference: PaymentReference },
    /// The gateway declined or errored.
    PaymentFailed { description: String },
}

/// Display data for the status modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeView {
    pub tone: &'static str,
    pub title: &'static str,
    pub message: String,
    pub reference: String,
    pub action: &'static str,
}

impl Notice {
    /// Build the modal contents for this notice.
    #[must_use]
    pub fn view(&self) -> NoticeView {
        match self {
            Self::EmptyCart => NoticeView {
                tone: "error",
                title: "Your cart is empty!",
                message: "Add something you love before checking out.".to_string(),
                reference: String::new(),
                action: "OK",
            },
            Self::GatewayUnavailable => NoticeView {
                tone: "error",
                title: "Payment gateway not loaded.",
                message: "Please try again in a moment.".to_string(),
                reference: String::new(),
                action: "OK",
            },
            Self::PaymentInProgress => NoticeView {
                tone: "info",
                title: "Payment in progress",
                message: "Finish the open payment window before starting another.".to_string(),
                reference: String::new(),
                action: "OK",
            },
            Self::PaymentSucceeded { reference } => NoticeView {
                tone: "success",
                title: "Payment Successful!",
                message: "Your order is confirmed.".to_string(),
                reference: reference.to_string(),
                action: "Continue Shopping",
            },
            Self::PaymentFailed { description } => NoticeView {
                tone: "error",
                title: "Payment Failed",
                message: description.clone(),
                reference: String::new(),
                action: "Try Again",
            },
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Cart panel fragment (overlay, sidebar, rows and subtotal).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_panel.html")]
pub struct CartPanelTemplate {
    pub panel: PanelView,
}

/// Cart count badge fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub badge: BadgeView,
}

/// Status modal fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/status_modal.html")]
pub struct StatusModalTemplate {
    pub notice: NoticeView,
}

impl From<&Notice> for StatusModalTemplate {
    fn from(notice: &Notice) -> Self {
        Self {
            notice: notice.view(),
        }
    }
}

// =============================================================================
// Binder
// =============================================================================

/// Presentation state and rendering for the cart.
#[derive(Debug, Clone)]
pub struct ViewBinder {
    currency: CurrencyCode,
    locale: NumberLocale,
    panel_open: bool,
    notice: Option<Notice>,
}

impl ViewBinder {
    /// Create a binder with the panel closed and no notice.
    #[must_use]
    pub const fn new(currency: CurrencyCode, locale: NumberLocale) -> Self {
        Self {
            currency,
            locale,
            panel_open: false,
            notice: None,
        }
    }

    fn format(&self, amount: u64) -> String {
        Money::new(amount, self.currency).display(self.locale)
    }

    fn item_view(&self, item: &LineItem) -> CartItemView {
        CartItemView {
            id: item.id.to_string(),
            name: item.name.clone(),
            image: item.image.clone(),
            price: self.format(item.price),
            line_price: self.format(item.line_total()),
            quantity: item.quantity,
        }
    }

    /// Rows, subtotal and open state for `cart`.
    ///
    /// An empty cart renders no rows and a zero subtotal; the template shows
    /// the empty placeholder in that case.
    #[must_use]
    pub fn render_panel(&self, cart: &Cart) -> PanelView {
        PanelView {
            items: cart.items().iter().map(|item| self.item_view(item)).collect(),
            subtotal: self.format(cart.subtotal()),
            open: self.panel_open,
        }
    }

    /// Item count, hidden when zero.
    #[must_use]
    pub fn render_badge(&self, cart: &Cart) -> BadgeView {
        let count = cart.item_count();
        BadgeView {
            count,
            visible: count > 0,
        }
    }

    #[must_use]
    pub fn panel_template(&self, cart: &Cart) -> CartPanelTemplate {
        CartPanelTemplate {
            panel: self.render_panel(cart),
        }
    }

    #[must_use]
    pub fn badge_template(&self, cart: &Cart) -> CartCountTemplate {
        CartCountTemplate {
            badge: self.render_badge(cart),
        }
    }

    /// The current notice as a modal, if one is showing.
    #[must_use]
    pub fn notice_template(&self) -> Option<StatusModalTemplate> {
        self.notice.as_ref().map(StatusModalTemplate::from)
    }

    /// Flip the panel between open and closed. Returns the new state.
    pub const fn toggle_panel(&mut self) -> bool {
        self.panel_open = !self.panel_open;
        self.panel_open
    }

    pub const fn open_panel(&mut self) {
        self.panel_open = true;
    }

    pub const fn close_panel(&mut self) {
        self.panel_open = false;
    }

    #[must_use]
    pub const fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    /// Show `notice`, replacing any notice already showing.
    pub fn present(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Hide the current notice, returning it.
    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn binder() -> ViewBinder {
        ViewBinder::new(CurrencyCode::INR, NumberLocale::EnIn)
    }

    fn two_item_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add("r1", "Ring", 5000, "r1.png");
        cart.add("r1", "Ring", 5000, "r1.png");
        cart.add("e1", "Earring", 120_000, "e1.png");
        cart
    }

    #[test]
    fn test_render_panel_rows_in_order() {
        let panel = binder().render_panel(&two_item_cart());

        assert_eq!(panel.items.len(), 2);
        assert_eq!(panel.items[0].id, "r1");
        assert_eq!(panel.items[0].price, "₹5,000");
        assert_eq!(panel.items[0].line_price, "₹10,000");
        assert_eq!(panel.items[0].quantity, 2);
        assert_eq!(panel.items[1].price, "₹1,20,000");
        assert_eq!(panel.subtotal, "₹1,30,000");
    }

    #[test]
    fn test_render_panel_empty() {
        let panel = binder().render_panel(&Cart::new());
        assert!(panel.items.is_empty());
        assert_eq!(panel.subtotal, "₹0");
    }

    #[test]
    fn test_render_panel_html_is_idempotent() {
        let view = binder();
        let cart = two_item_cart();

        let first = view.panel_template(&cart).render().unwrap();
        let second = view.panel_template(&cart).render().unwrap();

        assert_eq!(first, second);
        assert!(first.contains("Ring"));
        assert!(first.contains("₹1,30,000"));
    }

    #[test]
    fn test_render_panel_html_empty_placeholder() {
        let html = binder().panel_template(&Cart::new()).render().unwrap();
        assert!(html.contains("Your cart is empty."));
        assert!(html.contains("₹0"));
    }

    #[test]
    fn test_render_panel_html_escapes_names() {
        let mut cart = Cart::new();
        cart.add("x1", "<script>alert(1)</script>", 10, "x.png");

        let html = binder().panel_template(&cart).render().unwrap();
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_render_badge_hidden_when_empty() {
        let badge = binder().render_badge(&Cart::new());
        assert_eq!(badge, BadgeView { count: 0, visible: false });

        let html = binder().badge_template(&Cart::new()).render().unwrap();
        assert!(html.contains("display: none"));
    }

    #[test]
    fn test_render_badge_counts_quantities() {
        let badge = binder().render_badge(&two_item_cart());
        assert_eq!(badge, BadgeView { count: 3, visible: true });
    }

    #[test]
    fn test_toggle_panel_independent_of_cart() {
        let mut view = binder();
        assert!(!view.is_panel_open());
        assert!(view.toggle_panel());
        assert!(view.render_panel(&Cart::new()).open);
        assert!(!view.toggle_panel());
        assert!(!view.render_panel(&two_item_cart()).open);
    }

    #[test]
    fn test_present_replaces_notice() {
        let mut view = binder();
        view.present(Notice::EmptyCart);
        view.present(Notice::PaymentFailed {
            description: "Card declined".to_string(),
        });

        let modal = view.notice_template().unwrap().render().unwrap();
        assert!(modal.contains("Card declined"));
        assert!(modal.contains("Try Again"));
        assert!(view.dismiss_notice().is_some());
        assert!(view.notice().is_none());
    }

    #[test]
    fn test_success_notice_shows_reference() {
        let notice = Notice::PaymentSucceeded {
            reference: PaymentReference::new("pay_abc123"),
        };
        let html = StatusModalTemplate::from(&notice).render().unwrap();
        assert!(html.contains("pay_abc123"));
        assert!(html.contains("Payment Successful!"));
    }
}
