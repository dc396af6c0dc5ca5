//! Money amounts and their display formatting.
//!
//! Amounts are whole currency units (rupees, dollars), matching the prices
//! the storefront page hands to the cart. Payment gateways take minor units
//! (paise, cents), see [`Money::minor_units`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of minor units in one whole currency unit.
const MINOR_UNITS_PER_UNIT: u64 = 100;

/// An amount with its currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in whole currency units.
    pub amount: u64,
    /// ISO 4217 currency code.
    pub currency: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: u64, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Amount in minor units, or `None` if it does not fit in a `u64`.
    #[must_use]
    pub const fn minor_units(&self) -> Option<u64> {
        self.amount.checked_mul(MINOR_UNITS_PER_UNIT)
    }

    /// Format for display with the currency glyph, e.g. `₹12,34,567`.
    #[must_use]
    pub fn display(&self, locale: NumberLocale) -> String {
        format!("{}{}", self.currency.symbol(), locale.group(self.amount))
    }
}

/// ISO 4217 currency codes accepted by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error parsing an unknown currency or locale name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported value: {0}")]
pub struct UnsupportedValue(pub String);

impl FromStr for CurrencyCode {
    type Err = UnsupportedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INR" => Ok(Self::INR),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            _ => Err(UnsupportedValue(s.to_string())),
        }
    }
}

/// Digit grouping convention for displayed amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NumberLocale {
    /// Indian grouping: last three digits, then pairs (`12,34,567`).
    #[default]
    EnIn,
    /// Western grouping: thousands (`1,234,567`).
    EnUs,
}

impl NumberLocale {
    /// Insert group separators into a non-negative integer.
    #[must_use]
    pub fn group(self, value: u64) -> String {
        let digits = value.to_string();
        if digits.len() <= 3 {
            return digits;
        }

        let (head, tail) = digits.split_at(digits.len() - 3);
        let head_group = match self {
            Self::EnIn => 2,
            Self::EnUs => 3,
        };

        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(head_group);
            if let Some(group) = head.get(start..end) {
                groups.push(group);
            }
            end = start;
        }
        groups.reverse();

        format!("{},{tail}", groups.join(","))
    }
}

impl FromStr for NumberLocale {
    type Err = UnsupportedValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "en-in" => Ok(Self::EnIn),
            "en-us" => Ok(Self::EnUs),
            _ => Err(UnsupportedValue(s.to_string())),
        }
    }
}
