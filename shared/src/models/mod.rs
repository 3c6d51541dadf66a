//! Domain Models

pub mod dining_table;
pub mod order;
pub mod product;

pub use dining_table::{DiningTable, TableInfo, TableStatus};
pub use order::{
    KitchenStats, KitchenStatus, KitchenTicket, KitchenTicketItem, Order, OrderItem, OrderStatus,
    OrderType, OrderWithItems, PaymentStatus,
};
pub use product::Product;

use thiserror::Error;

/// Raised when a wire string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value}")]
pub struct InvalidEnumValue {
    pub kind: &'static str,
    pub value: String,
}

impl InvalidEnumValue {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
