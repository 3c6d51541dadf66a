//! Dining Table Repository

use super::{RepoError, RepoResult};
use crate::orders::money::multiplier_from_hundredths;
use shared::models::{DiningTable, TableInfo, TableStatus};
use sqlx::SqlitePool;

#[derive(Debug, sqlx::FromRow)]
struct TableInfoRow {
    id: i64,
    number: String,
    salon_id: Option<i64>,
    tariff_id: Option<i64>,
    status: String,
    is_active: bool,
    salon_name: Option<String>,
    tariff_name: Option<String>,
    tariff_multiplier: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct DiningTableRepository {
    pool: SqlitePool,
}

impl DiningTableRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Active table with its salon and tariff context. Tables with no
    /// tariff fall back to the neutral 1.00 multiplier.
    pub async fn find_table_info(&self, id: i64) -> RepoResult<TableInfo> {
        let row: Option<TableInfoRow> = sqlx::query_as(
            "SELECT t.id, t.number, t.salon_id, t.tariff_id, t.status, t.is_active, \
                 s.name AS salon_name, tf.name AS tariff_name, \
                 tf.multiplier AS tariff_multiplier \
             FROM dining_tables t \
             LEFT JOIN salons s ON s.id = t.salon_id \
             LEFT JOIN tariffs tf ON tf.id = t.tariff_id \
             WHERE t.id = ?1 AND t.is_active = 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| RepoError::NotFound(format!("Table {id} not found")))?;
        let status: TableStatus = row
            .status
            .parse()
            .map_err(|e: shared::models::InvalidEnumValue| RepoError::Database(e.to_string()))?;

        Ok(TableInfo {
            table: DiningTable {
                id: row.id,
                number: row.number,
                salon_id: row.salon_id,
                tariff_id: row.tariff_id,
                status,
                is_active: row.is_active,
            },
            salon_name: row.salon_name,
            tariff_name: row.tariff_name,
            tariff_multiplier: row
                .tariff_multiplier
                .map(multiplier_from_hundredths)
                .unwrap_or(rust_decimal::Decimal::ONE),
        })
    }

    pub async fn status(&self, id: i64) -> RepoResult<TableStatus> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM dining_tables WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        status
            .ok_or_else(|| RepoError::NotFound(format!("Table {id} not found")))?
            .parse()
            .map_err(|e: shared::models::InvalidEnumValue| RepoError::Database(e.to_string()))
    }
}
