//! Core types for Lumina.
//!
//! This module provides type-safe wrappers for cart domain concepts.

pub mod cart;
pub mod id;
pub mod line_item;
pub mod money;

pub use cart::{Cart, CartError, QuantityChange};
pub use id::*;
pub use line_item::LineItem;
pub use money::{CurrencyCode, Money, NumberLocale, UnsupportedValue};
