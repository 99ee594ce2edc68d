//! Non-negative prices using decimal arithmetic.
//!
//! Prices arrive from HTML forms as strings such as `"10"`, `"10.5"` or
//! `"$19.99"` and are stored as `NUMERIC(10, 2)`.

use core::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("Price must be a number, like 19.99.")]
    Invalid,
    /// The input is below zero.
    #[error("Price cannot be negative.")]
    Negative,
    /// The input does not fit in `NUMERIC(10, 2)`.
    #[error("Price must be less than {max}.", max = Price::MAX)]
    TooLarge,
}

/// A product price in the store currency.
///
/// ## Constraints
///
/// - Never negative
/// - Rounded to two decimal places (half away from zero)
/// - Less than 100,000,000 (fits `NUMERIC(10, 2)`)
///
/// ## Examples
///
/// ```
/// use shopkeep_core::Price;
///
/// assert_eq!(Price::parse("50.00").unwrap().to_string(), "50.00");
/// assert_eq!(Price::parse("$19.999").unwrap().to_string(), "20.00");
/// assert!(Price::parse("-1").is_err());
/// assert!(Price::parse("free").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Exclusive upper bound for prices.
    pub const MAX: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

    /// Parse a `Price` from user input.
    ///
    /// Surrounding whitespace and a leading `$` are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a decimal number, is negative, or
    /// is too large to store.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);

        let amount = Decimal::from_str(digits).map_err(|_| PriceError::Invalid)?;
        Self::try_from(amount)
    }

    /// Returns the amount in the store currency.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if rounded >= Self::MAX {
            return Err(PriceError::TooLarge);
        }

        // `-0` parses as negative zero; normalise it
        Ok(Self(rounded.abs()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::try_from(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_amounts() {
        assert_eq!(Price::parse("10").unwrap().to_string(), "10.00");
        assert_eq!(Price::parse("100.00").unwrap().to_string(), "100.00");
        assert_eq!(Price::parse(" 0.5 ").unwrap().to_string(), "0.50");
    }

    #[test]
    fn test_parse_dollar_prefix() {
        assert_eq!(Price::parse("$19.99").unwrap().to_string(), "19.99");
    }

    #[test]
    fn test_parse_rounds_to_cents() {
        assert_eq!(Price::parse("0.005").unwrap().to_string(), "0.01");
        assert_eq!(Price::parse("2.344").unwrap().to_string(), "2.34");
    }

    #[test]
    fn test_parse_zero_and_negative_zero() {
        assert_eq!(Price::parse("0").unwrap().amount(), Decimal::ZERO);
        assert_eq!(Price::parse("-0").unwrap().to_string(), "0.00");
    }

    #[test]
    fn test_parse_negative() {
        assert_eq!(Price::parse("-1.00"), Err(PriceError::Negative));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Price::parse(""), Err(PriceError::Invalid));
        assert_eq!(Price::parse("ten"), Err(PriceError::Invalid));
        assert_eq!(Price::parse("1,000"), Err(PriceError::Invalid));
    }

    #[test]
    fn test_parse_too_large() {
        assert_eq!(Price::parse("100000000"), Err(PriceError::TooLarge));
        assert!(Price::parse("99999999.99").is_ok());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PriceError::Invalid.to_string(),
            "Price must be a number, like 19.99."
        );
        assert_eq!(
            PriceError::TooLarge.to_string(),
            "Price must be less than 100000000."
        );
    }

    #[test]
    fn test_serde_as_string() {
        let price = Price::parse("20.00").unwrap();
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"20.00\"");
    }
}
