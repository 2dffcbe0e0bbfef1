//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Quantity;

/// Errors that can occur when building a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is not a decimal number.
    #[error("invalid price amount: {0}")]
    InvalidAmount(String),
    /// The amount is negative.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
    /// The currency code is not supported.
    #[error("unsupported currency code: {0}")]
    UnknownCurrency(String),
    /// Two prices with different currencies were combined.
    #[error("currency mismatch: {0:?} vs {1:?}")]
    CurrencyMismatch(CurrencyCode, CurrencyCode),
    /// The result does not fit in a decimal amount.
    #[error("price amount overflow")]
    Overflow,
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Parse a non-negative decimal amount such as `"12.50"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not a decimal or is negative.
    pub fn parse(amount: &str, currency_code: CurrencyCode) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(amount.trim())
            .map_err(|_| PriceError::InvalidAmount(amount.to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self::new(amount, currency_code))
    }

    /// The price of `quantity` units.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the product is out of range.
    pub fn times(self, quantity: Quantity) -> Result<Self, PriceError> {
        let amount = self
            .amount
            .checked_mul(Decimal::from(quantity.get()))
            .ok_or(PriceError::Overflow)?;
        Ok(Self::new(amount, self.currency_code))
    }

    /// Add another price in the same currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the currencies differ or the sum is out of range.
    pub fn checked_add(self, other: Self) -> Result<Self, PriceError> {
        if self.currency_code != other.currency_code {
            return Err(PriceError::CurrencyMismatch(
                self.currency_code,
                other.currency_code,
            ));
        }
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(PriceError::Overflow)?;
        Ok(Self::new(amount, self.currency_code))
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
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(PriceError::UnknownCurrency(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let price = Price::parse("4.5", CurrencyCode::USD).unwrap();
        assert_eq!(price.to_string(), "$4.50");

        let price = Price::parse("12", CurrencyCode::GBP).unwrap();
        assert_eq!(price.to_string(), "£12.00");
    }

    #[test]
    fn test_parse_rejects_negative_and_garbage() {
        assert!(matches!(
            Price::parse("-1.00", CurrencyCode::USD),
            Err(PriceError::Negative(_))
        ));
        assert!(matches!(
            Price::parse("cheap", CurrencyCode::USD),
            Err(PriceError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_times_and_add() {
        let unit = Price::parse("2.25", CurrencyCode::USD).unwrap();
        let line = unit.times(Quantity::new(4).unwrap()).unwrap();
        assert_eq!(line.to_string(), "$9.00");

        let total = line.checked_add(unit).unwrap();
        assert_eq!(total.to_string(), "$11.25");
    }

    #[test]
    fn test_arithmetic_overflow_is_an_error() {
        let max = Price::parse("79228162514264337593543950335", CurrencyCode::USD).unwrap();
        assert_eq!(
            max.times(Quantity::new(2).unwrap()),
            Err(PriceError::Overflow)
        );
        assert_eq!(max.times(Quantity::ONE), Ok(max));

        let half = Price::parse("50000000000000000000000000000", CurrencyCode::USD).unwrap();
        assert_eq!(half.checked_add(half), Err(PriceError::Overflow));
    }

    #[test]
    fn test_add_currency_mismatch() {
        let usd = Price::zero(CurrencyCode::USD);
        let eur = Price::zero(CurrencyCode::EUR);
        assert!(matches!(
            usd.checked_add(eur),
            Err(PriceError::CurrencyMismatch(CurrencyCode::USD, CurrencyCode::EUR))
        ));
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!("EUR".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
        assert!("JPY".parse::<CurrencyCode>().is_err());
    }
}
