//! Cart

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::{
    prices::Price,
    products::{Product, ProductId},
};

/// Errors raised when a set of lines does not form a valid cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The same product appears on more than one line.
    #[error("product {0} appears on more than one cart line")]
    DuplicateLine(ProductId),

    /// A line has a quantity of zero.
    #[error("product {0} has a quantity of zero")]
    ZeroQuantity(ProductId),
}

/// One distinct product held in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product fields as they were when the product was added.
    #[serde(flatten)]
    pub product: Product,

    /// Number of units, at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// Product id of this line.
    #[must_use]
    pub fn id(&self) -> &ProductId {
        &self.product.id
    }

    /// Unit price of this line.
    #[must_use]
    pub fn price(&self) -> Price {
        self.product.price
    }

    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price.times(self.quantity)
    }
}

/// Ordered collection of cart lines, keyed by product id.
///
/// Lines keep their insertion order. Ids are unique and quantities are never zero.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from existing lines.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if a product appears twice or a quantity is zero.
    pub fn from_lines(lines: impl Into<Vec<CartLine>>) -> Result<Self, CartError> {
        let lines = lines.into();
        let mut seen = FxHashSet::default();

        for line in &lines {
            if line.quantity == 0 {
                return Err(CartError::ZeroQuantity(line.id().clone()));
            }

            if !seen.insert(line.id()) {
                return Err(CartError::DuplicateLine(line.id().clone()));
            }
        }

        Ok(Self { lines })
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line for the same id keeps its fields and its quantity grows by
    /// `quantity`. Otherwise a new line is appended. A quantity of zero counts as one.
    pub fn add(&mut self, product: Product, quantity: u32) {
        let quantity = quantity.max(1);

        match self.position(&product.id) {
            Some(idx) => {
                if let Some(line) = self.lines.get_mut(idx) {
                    line.quantity = line.quantity.saturating_add(quantity);
                }
            }
            None => self.lines.push(CartLine { product, quantity }),
        }
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.lines.len();

        self.lines.retain(|line| line.id() != id);

        self.lines.len() != before
    }

    /// Set the quantity of the line for `id`.
    ///
    /// Quantities below one are rejected. Returns whether the update was applied.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: u32) -> bool {
        if quantity < 1 {
            return false;
        }

        match self.lines.iter_mut().find(|line| line.id() == id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of price times quantity across all lines, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().fold(Decimal::ZERO, |acc, line| {
            acc.checked_add(line.line_total()).unwrap_or(Decimal::MAX)
        })
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    /// Get the line for `id`.
    pub fn get(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id() == id)
    }

    /// Whether the cart holds a line for `id`.
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.lines.iter().position(|line| line.id() == id)
    }
}

impl TryFrom<Vec<CartLine>> for Cart {
    type Error = CartError;

    fn try_from(lines: Vec<CartLine>) -> Result<Self, Self::Error> {
        Self::from_lines(lines)
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.lines)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
