//! Summary
//!
//! Order summary shown on the cart and checkout pages: subtotal, tax and the
//! tax-inclusive total.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::cart::Cart;

/// Errors that can occur while summarising a cart.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// The cart total does not fit a minor unit amount.
    #[error("cart total is out of range: {0}")]
    OutOfRange(Decimal),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Tax rate applied at checkout when none is configured.
#[must_use]
pub fn default_tax_rate() -> Percentage {
    Percentage::from(0.10)
}

/// Calculate `percent` of a minor unit amount, rounding half away from zero.
///
/// # Errors
///
/// Returns [`SummaryError::PercentConversion`] if the result overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, SummaryError> {
    let minor = Decimal::from_i64(minor).ok_or(SummaryError::PercentConversion)?;

    ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(SummaryError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(SummaryError::PercentConversion)
}

/// Convert a major unit amount to minor units of `currency`, rounding half away from zero.
///
/// # Errors
///
/// Returns [`SummaryError::OutOfRange`] if the result does not fit an `i64`.
pub fn to_minor_units(amount: Decimal, currency: &Currency) -> Result<i64, SummaryError> {
    let scale = 10_i64
        .checked_pow(currency.exponent)
        .ok_or(SummaryError::OutOfRange(amount))?;

    amount
        .checked_mul(Decimal::from(scale))
        .map(|minor| minor.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|minor| minor.to_i64())
        .ok_or(SummaryError::OutOfRange(amount))
}

/// Subtotal, tax and total of a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSummary {
    subtotal: Money<'static, Currency>,
    tax: Money<'static, Currency>,
    total: Money<'static, Currency>,
    items: u64,
}

impl CartSummary {
    /// Summarise `cart`, pricing it in `currency` and applying `tax_rate`.
    ///
    /// # Errors
    ///
    /// Returns a [`SummaryError`] if an amount overflows or money arithmetic fails.
    pub fn new(
        cart: &Cart,
        currency: &'static Currency,
        tax_rate: &Percentage,
    ) -> Result<Self, SummaryError> {
        let minor = to_minor_units(cart.total(), currency)?;
        let subtotal = Money::from_minor(minor, currency);
        let tax = Money::from_minor(percent_of_minor(tax_rate, minor)?, currency);
        let total = subtotal.add(tax)?;

        Ok(Self {
            subtotal,
            tax,
            total,
            items: cart.item_count(),
        })
    }

    /// Total before tax.
    #[must_use]
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Tax on the subtotal.
    #[must_use]
    pub fn tax(&self) -> Money<'static, Currency> {
        self.tax
    }

    /// Tax-inclusive total.
    #[must_use]
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Number of units in the cart.
    #[must_use]
    pub fn items(&self) -> u64 {
        self.items
    }

    /// Currency of every amount in the summary.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.total.currency()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{TZS, USD};
    use testresult::TestResult;

    use crate::{prices::Price, products::Product};

    use super::*;

    fn cart_of(lines: &[(&str, u64, u32)]) -> Cart {
        let mut cart = Cart::new();

        for &(id, price, quantity) in lines {
            cart.add(Product::new(id, id, price), quantity);
        }

        cart
    }

    #[test]
    fn summary_adds_ten_percent_tax() -> TestResult {
        let cart = cart_of(&[("P1", 1000, 3)]);

        let summary = CartSummary::new(&cart, TZS, &default_tax_rate())?;

        assert_eq!(summary.subtotal(), Money::from_major(3000, TZS));
        assert_eq!(summary.tax(), Money::from_major(300, TZS));
        assert_eq!(summary.total(), Money::from_major(3300, TZS));
        assert_eq!(summary.items(), 3);
        assert_eq!(summary.currency(), TZS);

        Ok(())
    }

    #[test]
    fn fractional_prices_are_taxed_in_cents() -> TestResult {
        let mut case = Product::new("P1", "Case", 0_u64);
        case.price = Price::try_from(Decimal::new(1999, 2))?;

        let mut cart = Cart::new();
        cart.add(case, 1);

        let summary = CartSummary::new(&cart, USD, &default_tax_rate())?;

        assert_eq!(summary.subtotal(), Money::from_minor(1999, USD));
        // 199.9 cents rounds to 200.
        assert_eq!(summary.tax(), Money::from_minor(200, USD));
        assert_eq!(summary.total(), Money::from_minor(2199, USD));

        Ok(())
    }

    #[test]
    fn empty_cart_summary_is_zero() -> TestResult {
        let summary = CartSummary::new(&Cart::new(), USD, &default_tax_rate())?;

        assert_eq!(summary.total(), Money::from_minor(0, USD));

        Ok(())
    }

    #[test]
    fn tax_rounds_half_away_from_zero() -> TestResult {
        let cart = cart_of(&[("P1", 1, 1)]);

        let summary = CartSummary::new(&cart, USD, &Percentage::from(0.125))?;

        // 12.5 cents rounds up to 13.
        assert_eq!(summary.tax(), Money::from_minor(13, USD));

        Ok(())
    }

    #[test]
    fn total_out_of_range_errors() {
        let cart = cart_of(&[("P1", u64::MAX, 1)]);

        let result = CartSummary::new(&cart, TZS, &default_tax_rate());

        assert!(matches!(result, Err(SummaryError::OutOfRange(_))));
    }

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let result = percent_of_minor(&Percentage::from(2.0), i64::MAX);

        assert!(matches!(result, Err(SummaryError::PercentConversion)));
    }
}
