//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog product, as the pricing pass consumes it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Catalog price before any tariff multiplier
    pub price: Decimal,
    pub is_active: bool,
}
