//! Shared types for the Comanda POS core
//!
//! Domain models and the realtime event vocabulary, used by the
//! server and by display clients. Serde-serializable, no I/O.

pub mod events;
pub mod models;

// Re-exports
pub use events::{OrderEventKind, Room};
pub use models::{
    DiningTable, KitchenStats, KitchenStatus, KitchenTicket, Order, OrderItem, OrderStatus,
    OrderType, OrderWithItems, PaymentStatus, Product, TableInfo, TableStatus,
};
pub use serde::{Deserialize, Serialize};
