//! API route modules
//!
//! - [`health`] - liveness probe
//! - [`orders`] - order lifecycle and kitchen queue

pub mod health;
pub mod orders;
