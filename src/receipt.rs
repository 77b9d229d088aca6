//! Receipt
//!
//! Plain-text tables for the cart, its summary and product listings.

use std::io;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{cart::Cart, products::Product, summary::CartSummary};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn money(value: Decimal, currency: &'static Currency) -> String {
    Money::from_decimal(value, currency).to_string()
}

/// Write the cart lines followed by the summary.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_cart(
    mut out: impl io::Write,
    cart: &Cart,
    summary: &CartSummary,
) -> Result<(), ReceiptError> {
    if cart.is_empty() {
        writeln!(out, "Your cart is empty.")?;
        return Ok(());
    }

    let currency = summary.currency();
    let mut builder = Builder::default();

    builder.push_record(["", "Item", "Id", "Unit Price", "Qty", "Line Total"]);

    for (idx, line) in cart.iter().enumerate() {
        builder.push_record([
            format!("#{:<3}", idx + 1),
            line.product.name.clone(),
            line.id().to_string(),
            line.price().to_money(currency).to_string(),
            line.quantity.to_string(),
            money(line.line_total(), currency),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..6), Alignment::right());

    writeln!(out, "{table}")?;
    writeln!(out, " Items:    {:>20}", summary.items())?;
    writeln!(out, " Subtotal: {:>20}", summary.subtotal().to_string())?;
    writeln!(out, " Tax:      {:>20}", summary.tax().to_string())?;
    writeln!(out, " Total:    {:>20}", summary.total().to_string())?;

    Ok(())
}

/// Write a product listing.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_products<'a>(
    mut out: impl io::Write,
    products: impl IntoIterator<Item = &'a Product>,
    currency: &'static Currency,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();
    let mut rows = 0_usize;

    builder.push_record(["Id", "Name", "Category", "Price"]);

    for product in products {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.category.clone().unwrap_or_default(),
            product.price.to_money(currency).to_string(),
        ]);

        rows += 1;
    }

    if rows == 0 {
        writeln!(out, "No products found.")?;
        return Ok(());
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..4), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}
