//! Lumina Core - Shared cart types.
//!
//! This crate provides the types shared by the storefront binary and its tests:
//! line items, the invariant-enforcing [`Cart`] collection, and money
//! formatting.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage, no HTTP. A
//! [`Cart`] can only be changed through its own methods, so every cart that
//! exists (including one just deserialized) has unique ids and positive
//! quantities.
//!
//! # Modules
//!
//! - [`types`] - Item ids, line items, the cart, and money

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
