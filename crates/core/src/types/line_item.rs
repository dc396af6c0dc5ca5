//! A single product entry in the cart.

use serde::{Deserialize, Serialize};

use super::id::ItemId;

/// One product entry in the cart with its quantity.
///
/// Serialized as `{id, name, price, image, quantity}`, the record layout of
/// the persisted cart slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identity; unique within a cart.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Unit price in whole currency units.
    pub price: u64,
    /// Image URI shown next to the row.
    pub image: String,
    /// Always at least 1 while the item is in a cart.
    pub quantity: u32,
}

impl LineItem {
    /// Create a line item with quantity 1.
    #[must_use]
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        price: u64,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: image.into(),
            quantity: 1,
        }
    }

    /// Price times quantity, saturating at `u64::MAX`.
    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.price.saturating_mul(u64::from(self.quantity))
    }
}
