//! Realtime event vocabulary
//!
//! Rooms and event names are a closed set so publish call sites are
//! exhaustive and typo-proof. Three observer classes subscribe to one
//! room each; table occupancy changes are globally interesting and go
//! out as an all-rooms broadcast.

use crate::models::{KitchenStatus, OrderItem, TableStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Broadcast room, one per observer class
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Room {
    /// Kitchen display stations
    Kitchen,
    /// Waitstaff handhelds
    Waiter,
    /// Admin dashboards
    Admin,
}

impl Room {
    pub fn as_str(&self) -> &'static str {
        match self {
            Room::Kitchen => "kitchen",
            Room::Waiter => "waiter",
            Room::Admin => "admin",
        }
    }

    /// All rooms, in publish order
    pub const ALL: [Room; 3] = [Room::Kitchen, Room::Waiter, Room::Admin];
}

impl std::str::FromStr for Room {
    type Err = crate::models::InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kitchen" => Ok(Room::Kitchen),
            "waiter" => Ok(Room::Waiter),
            "admin" => Ok(Room::Admin),
            other => Err(crate::models::InvalidEnumValue::new("room", other)),
        }
    }
}

/// Named order events carried over the realtime channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderEventKind {
    NewOrder,
    OrderStatusUpdated,
    OrderReady,
    OrderCompleted,
    TableStatusUpdated,
}

impl OrderEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderEventKind::NewOrder => "new_order",
            OrderEventKind::OrderStatusUpdated => "order_status_updated",
            OrderEventKind::OrderReady => "order_ready",
            OrderEventKind::OrderCompleted => "order_completed",
            OrderEventKind::TableStatusUpdated => "table_status_updated",
        }
    }
}

/// Payload for `new_order`, sent to kitchen and admin rooms
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewOrderPayload {
    pub order_id: i64,
    pub order_number: String,
    /// "Takeaway" when no table is attached
    pub table_number: String,
    pub salon_name: String,
    pub waiter_name: String,
    pub items: Vec<OrderItem>,
    pub notes: Option<String>,
    pub total: Decimal,
    pub kitchen_status: KitchenStatus,
    pub timestamp: DateTime<Utc>,
}

/// Payload for `order_status_updated` and `order_ready`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusUpdatePayload {
    pub order_id: i64,
    pub order_number: String,
    pub table_number: Option<String>,
    pub kitchen_status: KitchenStatus,
    pub updated_by: String,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Payload for `order_completed`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderCompletedPayload {
    pub order_id: i64,
    pub order_number: String,
    pub table_id: Option<i64>,
    pub table_number: Option<String>,
    pub payment_method: String,
    pub final_total: Decimal,
    pub waiter_name: String,
    pub timestamp: DateTime<Utc>,
}

/// Payload for the all-rooms `table_status_updated` broadcast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableStatusPayload {
    pub table_id: i64,
    pub table_number: String,
    pub status: TableStatus,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_match_wire_protocol() {
        assert_eq!(OrderEventKind::NewOrder.as_str(), "new_order");
        assert_eq!(
            OrderEventKind::OrderStatusUpdated.as_str(),
            "order_status_updated"
        );
        assert_eq!(OrderEventKind::OrderReady.as_str(), "order_ready");
        assert_eq!(OrderEventKind::OrderCompleted.as_str(), "order_completed");
        assert_eq!(
            OrderEventKind::TableStatusUpdated.as_str(),
            "table_status_updated"
        );
    }

    #[test]
    fn rooms_cover_all_observer_classes() {
        let names: Vec<&str> = Room::ALL.iter().map(|r| r.as_str()).collect();
        assert_eq!(names, ["kitchen", "waiter", "admin"]);
    }
}
