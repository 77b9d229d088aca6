//! Prices

use std::{fmt, ops::Deref, str::FromStr};

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
};
use thiserror::Error;

/// Error returned when building a price from a negative amount.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("price must not be negative: {0}")]
pub struct NegativePrice(Decimal);

/// A non-negative unit price in major units of the store currency.
///
/// Whole amounts serialize as JSON integers and fractional ones as floats, so saved
/// carts keep the shape the backend sends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    value: Decimal,
}

impl Price {
    /// Creates a new whole-unit Price
    pub fn new(value: u64) -> Self {
        Price {
            value: Decimal::from(value),
        }
    }

    /// Price of `quantity` units, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn times(self, quantity: u32) -> Decimal {
        self.value
            .checked_mul(Decimal::from(quantity))
            .unwrap_or(Decimal::MAX)
    }

    /// Converts the price into a money amount in the given currency.
    #[must_use]
    pub fn to_money(self, currency: &'static Currency) -> Money<'static, Currency> {
        Money::from_decimal(self.value, currency)
    }
}

impl From<u64> for Price {
    fn from(value: u64) -> Self {
        Price::new(value)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = NegativePrice;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(NegativePrice(value));
        }

        Ok(Price { value })
    }
}

impl Deref for Price {
    type Target = Decimal;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value.normalize())
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.value.fract().is_zero()
            && let Some(whole) = self.value.to_u64()
        {
            return serializer.serialize_u64(whole);
        }

        match self.value.to_f64() {
            Some(float) => serializer.serialize_f64(float),
            None => serializer.serialize_str(&self.value.to_string()),
        }
    }
}

struct PriceVisitor;

impl PriceVisitor {
    fn checked<E: de::Error>(value: Decimal) -> Result<Price, E> {
        Price::try_from(value).map_err(E::custom)
    }
}

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative number")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Price, E> {
        Ok(Price::new(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Price, E> {
        Self::checked(Decimal::from(value))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Price, E> {
        // Parse the shortest round-trip text so 19.99 stays 19.99.
        let decimal = Decimal::from_str(&value.to_string())
            .ok()
            .or_else(|| Decimal::from_f64(value))
            .ok_or_else(|| E::custom(format!("price {value} is not representable")))?;

        Self::checked(decimal)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Price, E> {
        let decimal = Decimal::from_str(value.trim()).map_err(E::custom)?;

        Self::checked(decimal)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{TZS, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn whole_price_derefs_to_decimal() {
        assert_eq!(*Price::new(1000), Decimal::from(1000));
        assert_eq!(Price::new(1000).to_string(), "1000");
    }

    #[test]
    fn times_multiplies_by_quantity() {
        assert_eq!(Price::new(1000).times(3), Decimal::from(3000));
    }

    #[test]
    fn times_keeps_fractional_cents() -> TestResult {
        let price = Price::try_from(Decimal::new(1999, 2))?;

        assert_eq!(price.times(3), Decimal::new(5997, 2));

        Ok(())
    }

    #[test]
    fn times_saturates() -> TestResult {
        let price = Price::try_from(Decimal::MAX)?;

        assert_eq!(price.times(2), Decimal::MAX);

        Ok(())
    }

    #[test]
    fn rejects_negative_amounts() {
        assert_eq!(
            Price::try_from(Decimal::new(-5, 0)),
            Err(NegativePrice(Decimal::new(-5, 0)))
        );
        assert!(serde_json::from_str::<Price>("-1").is_err());
        assert!(serde_json::from_str::<Price>("-0.5").is_err());
    }

    #[test]
    fn to_money_keeps_fractional_amounts() -> TestResult {
        assert_eq!(
            Price::new(2_750_000).to_money(TZS),
            Money::from_major(2_750_000, TZS)
        );
        assert_eq!(
            Price::try_from(Decimal::new(1999, 2))?.to_money(USD),
            Money::from_minor(1999, USD)
        );

        Ok(())
    }

    #[test]
    fn whole_prices_serialize_as_integers() -> TestResult {
        assert_eq!(serde_json::to_string(&Price::new(1500))?, "1500");
        assert_eq!(serde_json::from_str::<Price>("1500")?, Price::new(1500));

        Ok(())
    }

    #[test]
    fn fractional_prices_keep_their_digits() -> TestResult {
        let price = serde_json::from_str::<Price>("19.99")?;

        assert_eq!(*price, Decimal::new(1999, 2));
        assert_eq!(serde_json::to_string(&price)?, "19.99");
        assert_eq!(serde_json::from_str::<Price>("\"4.50\"")?, price_of(450, 2));

        Ok(())
    }

    fn price_of(mantissa: i64, scale: u32) -> Price {
        Price::try_from(Decimal::new(mantissa, scale)).unwrap_or_default()
    }
}
