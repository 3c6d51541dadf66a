//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use shared::models::{KitchenStats, KitchenStatus, Order, OrderType, OrderWithItems};

use crate::auth::Waiter;
use crate::core::ServerState;
use crate::orders::manager::CreateOrder;
use crate::orders::pricing::LineRequest;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub table_id: Option<i64>,
    pub order_type: Option<OrderType>,
    #[validate(length(min = 1, message = "order must contain at least one item"), nested)]
    pub items: Vec<OrderItemRequest>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct OrderItemRequest {
    pub product_id: i64,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub data: OrderWithItems,
}

/// Create an order. Returns 201 with the fully priced order.
pub async fn create(
    State(state): State<ServerState>,
    waiter: Waiter,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<CreateOrderResponse>)> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    // Table orders default to "table", detached ones to "takeaway".
    let order_type = payload.order_type.unwrap_or(if payload.table_id.is_some() {
        OrderType::Table
    } else {
        OrderType::Takeaway
    });

    let created = state
        .orders
        .create_order(
            &waiter,
            CreateOrder {
                table_id: payload.table_id,
                order_type,
                items: payload
                    .items
                    .into_iter()
                    .map(|item| LineRequest {
                        product_id: item.product_id,
                        quantity: item.quantity,
                        notes: item.notes,
                    })
                    .collect(),
                notes: payload.notes,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            success: true,
            data: created,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct KitchenQuery {
    pub status: Option<KitchenStatus>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct KitchenQueueResponse {
    pub orders: Vec<OrderWithItems>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Active kitchen orders, urgent-flagged, preparing first
pub async fn kitchen_queue(
    State(state): State<ServerState>,
    Query(query): Query<KitchenQuery>,
) -> AppResult<Json<KitchenQueueResponse>> {
    let orders = state
        .orders
        .get_active_kitchen_orders(query.status, query.limit)
        .await?;

    Ok(Json(KitchenQueueResponse {
        count: orders.len(),
        timestamp: Utc::now(),
        orders,
    }))
}

/// Today's preparation stats
pub async fn kitchen_stats(State(state): State<ServerState>) -> AppResult<Json<KitchenStats>> {
    Ok(Json(state.orders.kitchen_stats().await?))
}

/// Open orders on one table
pub async fn by_table(
    State(state): State<ServerState>,
    Path(table_id): Path<i64>,
) -> AppResult<Json<Vec<OrderWithItems>>> {
    Ok(Json(state.orders.get_orders_for_table(table_id).await?))
}

/// Order detail by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderWithItems>> {
    Ok(Json(state.orders.get_order(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct KitchenStatusRequest {
    pub kitchen_status: String,
    pub notes: Option<String>,
}

/// Move an order through the kitchen pipeline. The status arrives as a
/// string so unknown spellings surface as a 400, not a body rejection.
pub async fn update_kitchen_status(
    State(state): State<ServerState>,
    waiter: Waiter,
    Path(id): Path<i64>,
    Json(payload): Json<KitchenStatusRequest>,
) -> AppResult<Json<Order>> {
    let new_status: KitchenStatus = payload.kitchen_status.parse()?;
    let order = state
        .orders
        .update_kitchen_status(id, new_status, &waiter, payload.notes)
        .await?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompleteOrderRequest {
    #[validate(length(min = 1, message = "payment method is required"))]
    pub payment_method: String,
    #[serde(default)]
    pub discount_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CompleteOrderResponse {
    pub success: bool,
    pub final_total: Decimal,
    pub data: Order,
}

/// Settle an order and free its table
pub async fn complete(
    State(state): State<ServerState>,
    _waiter: Waiter,
    Path(id): Path<i64>,
    Json(payload): Json<CompleteOrderRequest>,
) -> AppResult<Json<CompleteOrderResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let (order, final_total) = state
        .orders
        .complete_order(id, payload.payment_method, payload.discount_amount)
        .await?;

    Ok(Json(CompleteOrderResponse {
        success: true,
        final_total,
        data: order,
    }))
}
