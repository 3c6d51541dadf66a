//! Dining Table Model

use super::InvalidEnumValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical table occupancy state.
///
/// Invariant: a table order can only be created against a table that
/// is not occupied; creation flips it to occupied, completion frees
/// it again. Both flips happen inside the order transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    #[default]
    Free,
    Occupied,
    Reserved,
    Maintenance,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Free => "free",
            TableStatus::Occupied => "occupied",
            TableStatus::Reserved => "reserved",
            TableStatus::Maintenance => "maintenance",
        }
    }
}

impl FromStr for TableStatus {
    type Err = InvalidEnumValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(TableStatus::Free),
            "occupied" => Ok(TableStatus::Occupied),
            "reserved" => Ok(TableStatus::Reserved),
            "maintenance" => Ok(TableStatus::Maintenance),
            other => Err(InvalidEnumValue::new("table status", other)),
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiningTable {
    pub id: i64,
    pub number: String,
    pub salon_id: Option<i64>,
    pub tariff_id: Option<i64>,
    pub status: TableStatus,
    pub is_active: bool,
}

/// Table lookup view with the salon and pricing tier joined in.
///
/// This is what order creation reads: the multiplier drives pricing,
/// the names end up denormalized on the order and its tickets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub table: DiningTable,
    pub salon_name: Option<String>,
    pub tariff_name: Option<String>,
    /// Defaults to 1.00 when the table carries no tariff
    pub tariff_multiplier: Decimal,
}
