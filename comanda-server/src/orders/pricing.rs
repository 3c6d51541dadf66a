//! Pricing pass
//!
//! Pure computation of order totals against the catalog and a table's
//! tariff multiplier. No I/O, deterministic, aborted wholesale on the
//! first unknown product — there are no partial orders.

use super::money::round2;
use rust_decimal::Decimal;
use shared::models::Product;
use std::collections::HashMap;
use thiserror::Error;

/// VAT applied to every order (21%). Configurable upstream; fixed
/// input to this subsystem.
pub const TAX_RATE: Decimal = Decimal::from_parts(21, 0, 0, false, 2);

/// One requested line, as it arrives from the command
#[derive(Debug, Clone)]
pub struct LineRequest {
    pub product_id: i64,
    pub quantity: i64,
    pub notes: Option<String>,
}

/// One priced line, ready to persist
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    /// Per-unit price after the tariff multiplier
    pub unit_price: Decimal,
    /// Catalog price before the multiplier
    pub original_unit_price: Decimal,
    pub total_price: Decimal,
    pub notes: Option<String>,
}

/// Priced order totals. Invariant: `total = subtotal + tax_amount`.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub original_subtotal: Decimal,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub lines: Vec<PricedLine>,
}

#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("Product {product_id} not found")]
    ProductNotFound { product_id: i64 },

    #[error("Quantity must be positive, got {quantity}")]
    InvalidQuantity { quantity: i64 },
}

/// Price the requested lines against the catalog.
///
/// `adjusted_unit = catalog_price × multiplier` (2-dp per line),
/// `tax = subtotal × 21%`, everything rounded half away from zero.
pub fn price_order(
    lines: &[LineRequest],
    catalog: &HashMap<i64, Product>,
    tariff_multiplier: Decimal,
) -> Result<PricedOrder, PricingError> {
    let mut original_subtotal = Decimal::ZERO;
    let mut subtotal = Decimal::ZERO;
    let mut priced = Vec::with_capacity(lines.len());

    for line in lines {
        if line.quantity <= 0 {
            return Err(PricingError::InvalidQuantity {
                quantity: line.quantity,
            });
        }

        let product = catalog
            .get(&line.product_id)
            .ok_or(PricingError::ProductNotFound {
                product_id: line.product_id,
            })?;

        let quantity = Decimal::from(line.quantity);
        let unit_price = product.price;
        let adjusted_unit_price = round2(unit_price * tariff_multiplier);
        let original_line_total = round2(unit_price * quantity);
        let line_total = round2(adjusted_unit_price * quantity);

        original_subtotal += original_line_total;
        subtotal += line_total;

        priced.push(PricedLine {
            product_id: line.product_id,
            product_name: product.name.clone(),
            quantity: line.quantity,
            unit_price: adjusted_unit_price,
            original_unit_price: unit_price,
            total_price: line_total,
            notes: line.notes.clone(),
        });
    }

    let tax_amount = round2(subtotal * TAX_RATE);
    let total = subtotal + tax_amount;

    Ok(PricedOrder {
        original_subtotal,
        subtotal,
        tax_amount,
        total,
        lines: priced,
    })
}
