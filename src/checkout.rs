//! Checkout
//!
//! Validation and construction of the order payload posted to the backend. Sending the
//! payload and clearing the cart afterwards are left to the caller.

use std::{fmt, str::FromStr};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::{Cart, CartLine},
    session::User,
    summary::{CartSummary, SummaryError},
};

/// Reasons an order cannot be placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nobody is signed in.
    #[error("sign in to place an order")]
    NotSignedIn,

    /// Back-office accounts cannot place orders.
    #[error("admins cannot place orders")]
    AdminCannotOrder,

    /// The cart has no lines.
    #[error("the cart is empty")]
    EmptyCart,

    /// A required shipping field is blank.
    #[error("shipping field {0} is required")]
    MissingField(&'static str),

    /// The order total could not be calculated.
    #[error(transparent)]
    Summary(#[from] SummaryError),
}

/// Error parsing a payment method name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown payment method {0:?}")]
pub struct UnknownPaymentMethod(String);

/// Supported payment methods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Visa card
    #[default]
    #[serde(rename = "VisaCard")]
    VisaCard,

    /// Vodacom M-Pesa
    #[serde(rename = "M-Pesa")]
    MPesa,

    /// Mix by Yas
    #[serde(rename = "Mix by Yas")]
    MixByYas,

    /// Airtel Money
    #[serde(rename = "Airtel Money")]
    AirtelMoney,

    /// TTCL T-Pesa
    #[serde(rename = "T-Pesa")]
    TPesa,

    /// Halotel HaloPesa
    #[serde(rename = "HaloPesa")]
    HaloPesa,
}

impl PaymentMethod {
    /// Every method, in the order offered at checkout.
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::VisaCard,
        PaymentMethod::MPesa,
        PaymentMethod::MixByYas,
        PaymentMethod::AirtelMoney,
        PaymentMethod::TPesa,
        PaymentMethod::HaloPesa,
    ];

    /// Name sent to the backend.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::VisaCard => "VisaCard",
            PaymentMethod::MPesa => "M-Pesa",
            PaymentMethod::MixByYas => "Mix by Yas",
            PaymentMethod::AirtelMoney => "Airtel Money",
            PaymentMethod::TPesa => "T-Pesa",
            PaymentMethod::HaloPesa => "HaloPesa",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();

        Self::ALL
            .into_iter()
            .find(|method| method.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownPaymentMethod(wanted.to_string()))
    }
}

/// Delivery details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Street address
    pub address: String,

    /// City
    pub city: String,

    /// Postal code
    pub zip_code: String,

    /// Contact phone number
    pub phone: String,
}

impl ShippingAddress {
    fn validate(&self) -> Result<(), CheckoutError> {
        let fields = [
            ("address", &self.address),
            ("city", &self.city),
            ("zipCode", &self.zip_code),
            ("phone", &self.phone),
        ];

        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(CheckoutError::MissingField(*name)),
            None => Ok(()),
        }
    }
}

/// Order payload for the backend's order endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    order_items: Vec<CartLine>,

    #[serde(with = "rust_decimal::serde::float")]
    total_price: Decimal,

    shipping_address: ShippingAddress,

    payment_method: PaymentMethod,
}

impl OrderDraft {
    /// Validate the checkout inputs and build the order payload.
    ///
    /// The total price includes tax at `tax_rate`.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] if nobody is signed in, the user is an admin, the
    /// cart is empty, a shipping field is blank, or the total cannot be calculated.
    pub fn prepare(
        cart: &Cart,
        user: Option<&User>,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        currency: &'static Currency,
        tax_rate: &Percentage,
    ) -> Result<Self, CheckoutError> {
        let user = user.ok_or(CheckoutError::NotSignedIn)?;

        if user.is_admin {
            return Err(CheckoutError::AdminCannotOrder);
        }

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        shipping_address.validate()?;

        let summary = CartSummary::new(cart, currency, tax_rate)?;

        Ok(Self {
            order_items: cart.lines().to_vec(),
            total_price: *summary.total().amount(),
            shipping_address,
            payment_method,
        })
    }

    /// Lines being ordered.
    #[must_use]
    pub fn order_items(&self) -> &[CartLine] {
        &self.order_items
    }

    /// Tax-inclusive total in major currency units.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    /// Delivery details.
    #[must_use]
    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    /// Chosen payment method.
    #[must_use]
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }
}
