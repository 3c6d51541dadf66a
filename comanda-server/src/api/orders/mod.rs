//! Order API Module
//!
//! Order creation, kitchen queue, status transitions and settlement.
//! All mutations go through the [`crate::orders::OrdersManager`].

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        // Kitchen work queue and today's stats
        .route("/kitchen", get(handler::kitchen_queue))
        .route("/kitchen/stats", get(handler::kitchen_stats))
        // Open orders on one table
        .route("/table/{table_id}", get(handler::by_table))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/kitchen-status", patch(handler::update_kitchen_status))
        .route("/{id}/complete", post(handler::complete))
}
