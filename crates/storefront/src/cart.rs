//! Cart store: the single owner of cart contents.
//!
//! Every mutation goes through [`CartStore`], which applies it to the
//! in-memory [`Cart`] and writes the result to the persistent slot. Unknown
//! ids are silently ignored and nothing is persisted for them.
//!
//! A failed write is logged and reported to Sentry, but the in-memory cart
//! stays authoritative so the shopper can keep going.

use lumina_core::{Cart, ItemId, QuantityChange};

use crate::storage::CartStorage;

/// In-memory cart backed by a persistent slot.
#[derive(Debug)]
pub struct CartStore<S> {
    cart: Cart,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    /// Load the cart from `storage`.
    pub fn open(storage: S) -> Self {
        let cart = storage.load();
        tracing::debug!(items = cart.len(), "Cart loaded");
        Self { cart, storage }
    }

    /// Read-only view of the current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The backing slot.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Add one unit of a product, appending it if new. Returns the item's
    /// new quantity.
    pub fn add_item(
        &mut self,
        id: impl Into<ItemId>,
        name: impl Into<String>,
        price: u64,
        image: impl Into<String>,
    ) -> u32 {
        let id = id.into();
        let quantity = self.cart.add(id.clone(), name, price, image);
        tracing::debug!(item_id = %id, quantity, "Item added to cart");
        self.persist();
        quantity
    }

    /// Remove a line item. Returns whether it was present.
    pub fn remove_item(&mut self, id: &ItemId) -> bool {
        let removed = self.cart.remove(id);
        if removed {
            tracing::debug!(item_id = %id, "Item removed from cart");
            self.persist();
        }
        removed
    }

    /// Apply a signed quantity change, removing the item at zero or below.
    pub fn change_quantity(&mut self, id: &ItemId, delta: i64) -> QuantityChange {
        let change = self.cart.change_quantity(id, delta);
        match change {
            QuantityChange::Missing => {}
            QuantityChange::Updated(quantity) => {
                tracing::debug!(item_id = %id, delta, quantity, "Cart quantity changed");
                self.persist();
            }
            QuantityChange::Removed => {
                tracing::debug!(item_id = %id, delta, "Item removed by quantity change");
                self.persist();
            }
        }
        change
    }

    /// Empty the cart. Used after a settled payment.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.persist();
    }

    #[must_use]
    pub fn subtotal(&self) -> u64 {
        self.cart.subtotal()
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.cart) {
            let event_id = sentry::capture_error(&e);
            tracing::error!(
                error = %e,
                sentry_event_id = %event_id,
                "Failed to persist cart"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lumina_core::Cart;

    use super::*;
    use crate::storage::{MemoryStorage, StorageError};

    /// Storage whose writes always fail.
    struct ReadOnlyStorage;

    impl CartStorage for ReadOnlyStorage {
        fn load(&self) -> Cart {
            Cart::new()
        }

        fn save(&self, _cart: &Cart) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    fn persisted(storage: &MemoryStorage) -> Cart {
        serde_json::from_str(&storage.raw().unwrap()).unwrap()
    }

    #[test]
    fn test_open_loads_existing_cart() {
        let storage = MemoryStorage::with_raw(
            r#"[{"id":"e1","name":"Earring","price":2000,"image":"e1.png","quantity":3}]"#,
        );
        let store = CartStore::open(storage);
        assert_eq!(store.item_count(), 3);
        assert_eq!(store.subtotal(), 6000);
    }

    #[test]
    fn test_add_item_persists() {
        let storage = MemoryStorage::new();
        let mut store = CartStore::open(storage.clone());

        assert_eq!(store.add_item("r1", "Ring", 5000, "r1.png"), 1);
        assert_eq!(store.add_item("r1", "Ring", 5000, "r1.png"), 2);

        assert_eq!(store.cart().len(), 1);
        assert_eq!(store.subtotal(), 10000);
        assert_eq!(persisted(&storage), *store.cart());
    }

    #[test]
    fn test_remove_unknown_does_not_write() {
        let storage = MemoryStorage::new();
        let mut store = CartStore::open(storage.clone());

        assert!(!store.remove_item(&ItemId::new("nonexistent")));
        assert!(storage.raw().is_none());
    }

    #[test]
    fn test_change_quantity_to_zero_persists_empty_cart() {
        let storage = MemoryStorage::with_raw(
            r#"[{"id":"e1","name":"Earring","price":2000,"image":"e1.png","quantity":3}]"#,
        );
        let mut store = CartStore::open(storage.clone());

        let change = store.change_quantity(&ItemId::new("e1"), -3);

        assert_eq!(change, QuantityChange::Removed);
        assert!(store.cart().is_empty());
        assert_eq!(storage.raw().as_deref(), Some("[]"));
    }

    #[test]
    fn test_clear_persists() {
        let storage = MemoryStorage::new();
        let mut store = CartStore::open(storage.clone());
        store.add_item("r1", "Ring", 5000, "r1.png");

        store.clear();

        assert!(store.cart().is_empty());
        assert!(persisted(&storage).is_empty());
    }

    #[test]
    fn test_failed_write_keeps_memory_state() {
        let mut store = CartStore::open(ReadOnlyStorage);
        store.add_item("r1", "Ring", 5000, "r1.png");
        assert_eq!(store.item_count(), 1);
    }
}
