//! Product Repository

use super::RepoResult;
use crate::orders::money::from_cents;
use shared::models::Product;
use sqlx::SqlitePool;
use std::collections::HashMap;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price_cents: i64,
    is_active: bool,
}

#[derive(Clone, Debug)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Active products for a set of ids, keyed by id. Missing or
    /// inactive products are simply absent; the caller decides whether
    /// that is an error.
    pub async fn find_active_by_ids(&self, ids: &[i64]) -> RepoResult<HashMap<i64, Product>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = (1..=ids.len())
            .map(|n| format!("?{n}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT id, name, price_cents, is_active FROM products \
             WHERE id IN ({placeholders}) AND is_active = 1"
        );
        let mut query = sqlx::query_as::<_, ProductRow>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.id,
                    Product {
                        id: row.id,
                        name: row.name,
                        price: from_cents(row.price_cents),
                        is_active: row.is_active,
                    },
                )
            })
            .collect())
    }
}
