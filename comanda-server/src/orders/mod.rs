//! Order domain: pricing, urgency, and the write-path orchestrator.

pub mod manager;
pub mod money;
pub mod pricing;
pub mod urgency;

pub use manager::{CreateOrder, OrdersManager};
