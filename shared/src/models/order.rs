//! Order Model
//!
//! An order lives along two orthogonal state axes:
//!
//! - `status`: draft → confirmed → completed (cancelled reserved in
//!   the model, unreachable through the current API surface)
//! - `kitchen_status`: pending → preparing → ready → served
//!
//! The kitchen axis is intentionally loose: any valid value is
//! accepted as the next state, only the preparation timestamps depend
//! on the previous one.

use super::InvalidEnumValue;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Draft,
    Confirmed,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(OrderStatus::Draft),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(InvalidEnumValue::new("order status", other)),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preparation stage, independent from payment/lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum KitchenStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Served,
}

impl KitchenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KitchenStatus::Pending => "pending",
            KitchenStatus::Preparing => "preparing",
            KitchenStatus::Ready => "ready",
            KitchenStatus::Served => "served",
        }
    }
}

impl FromStr for KitchenStatus {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(KitchenStatus::Pending),
            "preparing" => Ok(KitchenStatus::Preparing),
            "ready" => Ok(KitchenStatus::Ready),
            "served" => Ok(KitchenStatus::Served),
            other => Err(InvalidEnumValue::new("kitchen status", other)),
        }
    }
}

impl fmt::Display for KitchenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            other => Err(InvalidEnumValue::new("payment status", other)),
        }
    }
}

/// How the order is served
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Table,
    Takeaway,
    Delivery,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Table => "table",
            OrderType::Takeaway => "takeaway",
            OrderType::Delivery => "delivery",
        }
    }
}

impl FromStr for OrderType {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(OrderType::Table),
            "takeaway" => Ok(OrderType::Takeaway),
            "delivery" => Ok(OrderType::Delivery),
            other => Err(InvalidEnumValue::new("order type", other)),
        }
    }
}

/// Order entity — owned by the store, mirrored (non-authoritatively)
/// by the order cache.
///
/// Invariants: `total = subtotal + tax_amount`;
/// `subtotal = Σ(unit_price × tariff_multiplier × quantity)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    /// Human-readable day-scoped number, `ORD<yyyymmdd><seq4>`
    pub number: String,
    /// Absent for takeaway/delivery orders
    pub table_id: Option<i64>,
    /// Table label, denormalized at creation time
    pub table_number: Option<String>,
    pub salon_id: Option<i64>,
    pub tariff_id: Option<i64>,
    /// Pricing-tier factor; 1.00 when no table/tariff is attached
    pub tariff_multiplier: Decimal,
    pub waiter_id: i64,
    /// Denormalized from the authenticated principal at creation time
    pub waiter_name: String,
    pub order_type: OrderType,
    /// Subtotal before the tariff multiplier
    pub original_subtotal: Decimal,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub discount_amount: Decimal,
    pub payment_method: Option<String>,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub kitchen_status: KitchenStatus,
    pub notes: Option<String>,
    /// Last note the kitchen attached while moving the order along
    pub kitchen_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Stamped on the pending → preparing transition
    pub kitchen_started_at: Option<DateTime<Utc>>,
    /// Stamped on the first transition into ready
    pub kitchen_completed_at: Option<DateTime<Utc>>,
}

/// Order line — belongs to exactly one order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    /// Denormalized at creation time; later catalog renames don't
    /// rewrite history
    pub product_name: String,
    pub quantity: i64,
    /// Per-unit price after the tariff multiplier
    pub unit_price: Decimal,
    /// Catalog price before the multiplier
    pub original_unit_price: Decimal,
    pub total_price: Decimal,
    pub notes: Option<String>,
}

/// Order joined with its lines plus the read-time kitchen view.
///
/// `elapsed_minutes`/`is_urgent` are computed per request and never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub salon_name: Option<String>,
    pub elapsed_minutes: i64,
    pub is_urgent: bool,
}

/// Aggregate preparation numbers for today's service, computed by the
/// store at read time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KitchenStats {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub preparing_orders: i64,
    pub ready_orders: i64,
    pub served_orders: i64,
    pub avg_preparation_minutes: Option<f64>,
}

/// Kitchen-facing cache projection of an order.
///
/// Ephemeral and TTL-bounded; a cache miss means "recompute from the
/// store", never an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KitchenTicket {
    pub order_id: i64,
    pub order_number: String,
    pub table_number: String,
    pub salon_name: String,
    pub waiter_name: String,
    pub items: Vec<KitchenTicketItem>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Mirrors the order's `kitchen_status`
    pub status: KitchenStatus,
}

/// Line of a kitchen ticket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KitchenTicketItem {
    pub product_name: String,
    pub quantity: i64,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kitchen_status_round_trips_wire_spellings() {
        for s in ["pending", "preparing", "ready", "served"] {
            let parsed: KitchenStatus = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
    }

    #[test]
    fn unknown_kitchen_status_is_rejected() {
        let err = "archived".parse::<KitchenStatus>().unwrap_err();
        assert_eq!(err.value, "archived");
    }

    #[test]
    fn money_fields_serialize_as_json_numbers() {
        let item = OrderItem {
            id: 1,
            order_id: 7,
            product_id: 2,
            product_name: "Café solo".to_string(),
            quantity: 2,
            unit_price: Decimal::new(1200, 2),
            original_unit_price: Decimal::new(1000, 2),
            total_price: Decimal::new(2400, 2),
            notes: None,
        };

        let v = serde_json::to_value(&item).unwrap();
        assert!(v["unit_price"].is_number(), "got {}", v["unit_price"]);
        assert_eq!(v["unit_price"], serde_json::json!(12.0));
        assert_eq!(v["total_price"], serde_json::json!(24.0));
    }

    #[test]
    fn status_enums_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Draft).unwrap(),
            "\"draft\""
        );
        assert_eq!(
            serde_json::to_string(&KitchenStatus::Preparing).unwrap(),
            "\"preparing\""
        );
        assert_eq!(
            serde_json::to_string(&OrderType::Takeaway).unwrap(),
            "\"takeaway\""
        );
    }
}
