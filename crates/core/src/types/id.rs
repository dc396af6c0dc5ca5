//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Storefront ids are
//! opaque strings chosen by the page (e.g. `"r1"` for a ring), so the
//! wrapper is around `String`.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<&str>`, `From<String>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use lumina_core::define_id;
/// define_id!(SkuId);
/// define_id!(PaymentId);
///
/// let sku = SkuId::new("r1");
/// let payment = PaymentId::new("r1");
///
/// // These are different types, so this won't compile:
/// // let _: SkuId = payment;
/// assert_eq!(sku.as_str(), payment.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Identity of a line item in the cart.
define_id!(ItemId);

// Opaque transaction reference returned by the payment collaborator.
define_id!(PaymentReference);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_display_matches_inner() {
        let id = ItemId::new("r1");
        assert_eq!(id.to_string(), "r1");
        assert_eq!(id.as_str(), "r1");
    }

    #[test]
    fn test_item_id_serializes_transparently() {
        let id = ItemId::from("e1");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"e1\""));
    }
}
