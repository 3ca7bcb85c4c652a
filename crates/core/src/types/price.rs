//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are never floats: `rust_decimal` keeps `199.99 * 2 + 249.99`
//! exactly `649.97`, which is what cart totals and order snapshots rely on.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price from a count of minor units (cents).
    ///
    /// ```rust
    /// use commerce_wave_core::{CurrencyCode, Price};
    ///
    /// let price = Price::from_cents(19_999, CurrencyCode::USD);
    /// assert_eq!(price.to_string(), "$199.99");
    /// ```
    #[must_use]
    pub fn from_cents(cents: i64, currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::new(cents, 2), currency_code)
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Multiply a unit price by a quantity (line total).
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}

impl Add for Price {
    type Output = Self;

    /// Adds two prices. Catalog prices share one currency, so the left
    /// operand's currency is kept.
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.amount + rhs.amount, self.currency_code)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(CurrencyCode::default()), |acc, p| {
            Self::new(acc.amount + p.amount, p.currency_code)
        })
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:.2}",
            self.currency_code.symbol(),
            self.amount.round_dp(2)
        )
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    INR,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::INR => "₹",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::INR => "INR",
        }
    }

    /// Parse a three-letter ISO code (case-sensitive, as stored).
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "USD" => Some(Self::USD),
            "EUR" => Some(Self::EUR),
            "GBP" => Some(Self::GBP),
            "INR" => Some(Self::INR),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(cents: i64) -> Price {
        Price::from_cents(cents, CurrencyCode::USD)
    }

    #[test]
    fn test_from_cents() {
        assert_eq!(usd(19_999).amount, Decimal::new(19_999, 2));
        assert_eq!(usd(-150).amount, Decimal::new(-150, 2));
        assert!(usd(-150).is_negative());
        assert!(!usd(0).is_negative());
    }

    #[test]
    fn test_times_and_sum_are_exact() {
        let total: Price = [usd(19_999).times(2), usd(24_999).times(1)]
            .into_iter()
            .sum();
        assert_eq!(total.amount, Decimal::new(64_997, 2));
    }

    #[test]
    fn test_sum_of_nothing_is_zero() {
        let total: Price = std::iter::empty().sum();
        assert_eq!(total.amount, Decimal::ZERO);
    }

    #[test]
    fn test_currency_code_round_trip() {
        assert_eq!(CurrencyCode::from_code(CurrencyCode::GBP.code()), Some(CurrencyCode::GBP));
        assert_eq!(CurrencyCode::from_code("usd"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(usd(64_997).to_string(), "$649.97");
        assert_eq!(usd(100).to_string(), "$1.00");
        assert_eq!(
            Price::from_cents(250, CurrencyCode::INR).to_string(),
            "₹2.50"
        );
    }
}
