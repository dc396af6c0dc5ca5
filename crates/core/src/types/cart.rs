//! The ordered, invariant-enforcing cart collection.
//!
//! A [`Cart`] keeps its line items in insertion order and guarantees, after
//! every method call, that:
//! - no two line items share an id
//! - every line item has a quantity of at least 1
//!
//! Deserialization goes through the same checks, so a persisted cart that
//! violates either rule is rejected rather than loaded.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ItemId;
use super::line_item::LineItem;

/// Reasons a sequence of line items cannot form a cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("duplicate line item id: {0}")]
    DuplicateItem(ItemId),
    #[error("line item {0} has zero quantity")]
    ZeroQuantity(ItemId),
}

/// Result of applying a quantity delta to a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// No line item with that id.
    Missing,
    /// The line item survives with the new quantity.
    Updated(u32),
    /// The quantity reached zero or below and the line item was dropped.
    Removed,
}

/// Ordered collection of line items, first added first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in display order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Look up a line item by id.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Add one unit of a product.
    ///
    /// An existing line item keeps its name, price and image and has its
    /// quantity incremented; otherwise a new line item is appended with
    /// quantity 1. Returns the resulting quantity.
    pub fn add(
        &mut self,
        id: impl Into<ItemId>,
        name: impl Into<String>,
        price: u64,
        image: impl Into<String>,
    ) -> u32 {
        let id = id.into();
        if let Some(existing) = self.items.iter_mut().find(|item| item.id == id) {
            existing.quantity = existing.quantity.saturating_add(1);
            return existing.quantity;
        }

        self.items.push(LineItem::new(id, name, price, image));
        1
    }

    /// Remove the line item with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    /// Add a signed `delta` to the quantity of the line item with `id`.
    ///
    /// A resulting quantity of zero or less removes the line item.
    pub fn change_quantity(&mut self, id: &ItemId, delta: i64) -> QuantityChange {
        let Some(position) = self.items.iter().position(|item| &item.id == id) else {
            return QuantityChange::Missing;
        };

        let Some(item) = self.items.get_mut(position) else {
            return QuantityChange::Missing;
        };
        let next = i64::from(item.quantity).saturating_add(delta);
        if next <= 0 {
            self.items.remove(position);
            return QuantityChange::Removed;
        }

        item.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        QuantityChange::Updated(item.quantity)
    }

    /// Remove every line item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of price times quantity over all line items.
    #[must_use]
    pub fn subtotal(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |sum, item| sum.saturating_add(item.line_total()))
    }

    /// Sum of quantities over all line items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |sum, item| sum.saturating_add(u64::from(item.quantity)))
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = CartError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.quantity == 0 {
                return Err(CartError::ZeroQuantity(item.id.clone()));
            }
            if !seen.insert(&item.id) {
                return Err(CartError::DuplicateItem(item.id.clone()));
            }
        }
        Ok(Self { items })
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}
