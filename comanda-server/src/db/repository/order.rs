//! Order Store
//!
//! The transactional tier. Order creation and completion are
//! all-or-nothing transactions covering the order row, its lines, and
//! the table occupancy flip; the day-scoped number counter is bumped
//! inside the same transaction (`UPDATE … RETURNING`), so a rollback
//! wastes no numbers and two concurrent creations cannot collide.
//!
//! The kitchen status machine is deliberately loose: any valid enum
//! value is accepted as the next state regardless of the current one,
//! only the preparation timestamps look at the previous state.

use super::{RepoError, RepoResult};
use crate::orders::money::{from_cents, multiplier_from_hundredths, multiplier_to_hundredths, to_cents};
use crate::orders::pricing::PricedOrder;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::{
    KitchenStats, KitchenStatus, Order, OrderItem, OrderStatus, OrderType, PaymentStatus,
};
use sqlx::SqlitePool;

/// Table attachment for a new order, resolved before the write
#[derive(Debug, Clone)]
pub struct TableRef {
    pub id: i64,
    pub number: String,
    pub salon_id: Option<i64>,
    pub tariff_id: Option<i64>,
}

/// Everything the store needs to persist a new draft order
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub table: Option<TableRef>,
    pub tariff_multiplier: Decimal,
    pub waiter_id: i64,
    pub waiter_name: String,
    pub order_type: OrderType,
    pub notes: Option<String>,
    pub pricing: PricedOrder,
}

/// Order read model: row, lines, and the joined salon label
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub salon_name: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    number: String,
    table_id: Option<i64>,
    table_number: Option<String>,
    salon_id: Option<i64>,
    tariff_id: Option<i64>,
    tariff_multiplier: i64,
    waiter_id: i64,
    waiter_name: String,
    order_type: String,
    original_subtotal_cents: i64,
    subtotal_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    discount_cents: i64,
    payment_method: Option<String>,
    payment_status: String,
    status: String,
    kitchen_status: String,
    notes: Option<String>,
    kitchen_notes: Option<String>,
    created_at: DateTime<Utc>,
    kitchen_started_at: Option<DateTime<Utc>>,
    kitchen_completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let corrupt = |e: shared::models::InvalidEnumValue| RepoError::Database(e.to_string());
        Ok(Order {
            id: row.id,
            number: row.number,
            table_id: row.table_id,
            table_number: row.table_number,
            salon_id: row.salon_id,
            tariff_id: row.tariff_id,
            tariff_multiplier: multiplier_from_hundredths(row.tariff_multiplier),
            waiter_id: row.waiter_id,
            waiter_name: row.waiter_name,
            order_type: row.order_type.parse().map_err(corrupt)?,
            original_subtotal: from_cents(row.original_subtotal_cents),
            subtotal: from_cents(row.subtotal_cents),
            tax_amount: from_cents(row.tax_cents),
            total: from_cents(row.total_cents),
            discount_amount: from_cents(row.discount_cents),
            payment_method: row.payment_method,
            payment_status: row.payment_status.parse().map_err(corrupt)?,
            status: row.status.parse().map_err(corrupt)?,
            kitchen_status: row.kitchen_status.parse().map_err(corrupt)?,
            notes: row.notes,
            kitchen_notes: row.kitchen_notes,
            created_at: row.created_at,
            kitchen_started_at: row.kitchen_started_at,
            kitchen_completed_at: row.kitchen_completed_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    product_name: String,
    quantity: i64,
    unit_price_cents: i64,
    original_unit_price_cents: i64,
    total_price_cents: i64,
    notes: Option<String>,
}

impl From<ItemRow> for OrderItem {
    fn from(row: ItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: from_cents(row.unit_price_cents),
            original_unit_price: from_cents(row.original_unit_price_cents),
            total_price: from_cents(row.total_price_cents),
            notes: row.notes,
        }
    }
}

const ORDER_COLUMNS: &str = "id, number, table_id, table_number, salon_id, tariff_id, \
     tariff_multiplier, waiter_id, waiter_name, order_type, original_subtotal_cents, \
     subtotal_cents, tax_cents, total_cents, discount_cents, payment_method, payment_status, \
     status, kitchen_status, notes, kitchen_notes, created_at, kitchen_started_at, \
     kitchen_completed_at";

#[derive(Clone, Debug)]
pub struct OrderStore {
    pool: SqlitePool,
}

impl OrderStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a draft order: reserve the day-scoped number, flip the
    /// table to occupied (check-and-set), insert the order row and all
    /// item rows, as one transaction. On any failure nothing sticks.
    pub async fn create_order_atomic(&self, new: NewOrder) -> RepoResult<(Order, Vec<OrderItem>)> {
        let created_at = Utc::now();
        let day = created_at.format("%Y%m%d").to_string();

        let mut tx = self.pool.begin().await?;

        let seq: i64 = sqlx::query_scalar(
            "INSERT INTO order_counters (day, seq) VALUES (?1, 1) \
             ON CONFLICT (day) DO UPDATE SET seq = seq + 1 \
             RETURNING seq",
        )
        .bind(&day)
        .fetch_one(&mut *tx)
        .await?;
        let number = format!("ORD{day}{seq:04}");

        // Occupancy check-and-set inside the transaction: two
        // concurrent creations against the same table cannot both win.
        if let Some(table) = &new.table {
            let updated = sqlx::query(
                "UPDATE dining_tables SET status = 'occupied' \
                 WHERE id = ?1 AND status != 'occupied'",
            )
            .bind(table.id)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(RepoError::TableOccupied(format!("table {}", table.number)));
            }
        }

        let order_id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (number, table_id, table_number, salon_id, tariff_id, \
                 tariff_multiplier, waiter_id, waiter_name, order_type, \
                 original_subtotal_cents, subtotal_cents, tax_cents, total_cents, \
                 payment_status, status, kitchen_status, notes, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, \
                 'pending', 'draft', 'pending', ?14, ?15) \
             RETURNING id",
        )
        .bind(&number)
        .bind(new.table.as_ref().map(|t| t.id))
        .bind(new.table.as_ref().map(|t| t.number.as_str()))
        .bind(new.table.as_ref().and_then(|t| t.salon_id))
        .bind(new.table.as_ref().and_then(|t| t.tariff_id))
        .bind(multiplier_to_hundredths(new.tariff_multiplier))
        .bind(new.waiter_id)
        .bind(&new.waiter_name)
        .bind(new.order_type.as_str())
        .bind(to_cents(new.pricing.original_subtotal))
        .bind(to_cents(new.pricing.subtotal))
        .bind(to_cents(new.pricing.tax_amount))
        .bind(to_cents(new.pricing.total))
        .bind(&new.notes)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(new.pricing.lines.len());
        for line in &new.pricing.lines {
            let item_id: i64 = sqlx::query_scalar(
                "INSERT INTO order_items (order_id, product_id, product_name, quantity, \
                     unit_price_cents, original_unit_price_cents, total_price_cents, notes) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
                 RETURNING id",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(to_cents(line.unit_price))
            .bind(to_cents(line.original_unit_price))
            .bind(to_cents(line.total_price))
            .bind(&line.notes)
            .fetch_one(&mut *tx)
            .await?;

            items.push(OrderItem {
                id: item_id,
                order_id,
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                original_unit_price: line.original_unit_price,
                total_price: line.total_price,
                notes: line.notes.clone(),
            });
        }

        tx.commit().await?;

        let order = Order {
            id: order_id,
            number,
            table_id: new.table.as_ref().map(|t| t.id),
            table_number: new.table.as_ref().map(|t| t.number.clone()),
            salon_id: new.table.as_ref().and_then(|t| t.salon_id),
            tariff_id: new.table.as_ref().and_then(|t| t.tariff_id),
            tariff_multiplier: new.tariff_multiplier,
            waiter_id: new.waiter_id,
            waiter_name: new.waiter_name,
            order_type: new.order_type,
            original_subtotal: new.pricing.original_subtotal,
            subtotal: new.pricing.subtotal,
            tax_amount: new.pricing.tax_amount,
            total: new.pricing.total,
            discount_amount: Decimal::ZERO,
            payment_method: None,
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Draft,
            kitchen_status: KitchenStatus::Pending,
            notes: new.notes,
            kitchen_notes: None,
            created_at,
            kitchen_started_at: None,
            kitchen_completed_at: None,
        };

        Ok((order, items))
    }

    /// Fetch one order with its lines and salon label
    pub async fn get_order(&self, id: i64) -> RepoResult<OrderRecord> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))?;
        let order: Order = row.try_into()?;
        let items = self.fetch_items(id).await?;
        let salon_name = self.fetch_salon_name(order.salon_id).await?;

        Ok(OrderRecord {
            order,
            items,
            salon_name,
        })
    }

    /// Orders open against a table (completed ones excluded), newest
    /// first
    pub async fn get_orders_for_table(&self, table_id: i64) -> RepoResult<Vec<OrderRecord>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE table_id = ?1 AND status != 'completed' \
             ORDER BY created_at DESC"
        ))
        .bind(table_id)
        .fetch_all(&self.pool)
        .await?;

        self.into_records(rows).await
    }

    /// Set a new kitchen status, stamping the preparation timestamps:
    /// `kitchen_started_at` on pending → preparing,
    /// `kitchen_completed_at` on the first transition into ready.
    /// A note, when given, replaces the stored kitchen note; `None`
    /// leaves the previous one in place.
    pub async fn update_kitchen_status(
        &self,
        id: i64,
        new_status: KitchenStatus,
        notes: Option<&str>,
    ) -> RepoResult<Order> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(String, Option<DateTime<Utc>>)> = sqlx::query_as(
            "SELECT kitchen_status, kitchen_completed_at FROM orders WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let (current, completed_at) =
            row.ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))?;
        let current: KitchenStatus = current
            .parse()
            .map_err(|e: shared::models::InvalidEnumValue| RepoError::Database(e.to_string()))?;

        let now = Utc::now();
        let stamp_started =
            new_status == KitchenStatus::Preparing && current == KitchenStatus::Pending;
        let stamp_completed = new_status == KitchenStatus::Ready && completed_at.is_none();

        sqlx::query(
            "UPDATE orders SET kitchen_status = ?2, \
                 kitchen_started_at = CASE WHEN ?3 THEN ?4 ELSE kitchen_started_at END, \
                 kitchen_completed_at = CASE WHEN ?5 THEN ?4 ELSE kitchen_completed_at END, \
                 kitchen_notes = COALESCE(?6, kitchen_notes) \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(new_status.as_str())
        .bind(stamp_started)
        .bind(now)
        .bind(stamp_completed)
        .bind(notes)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.fetch_order(id).await
    }

    /// Complete an order: apply the discount, mark it paid/served, and
    /// free its table — one transaction.
    pub async fn complete_order_atomic(
        &self,
        id: i64,
        payment_method: &str,
        discount_amount: Decimal,
    ) -> RepoResult<(Order, Decimal)> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(i64, Option<i64>)> =
            sqlx::query_as("SELECT total_cents, table_id FROM orders WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let (total_cents, table_id) =
            row.ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))?;

        let final_cents = total_cents - to_cents(discount_amount);

        sqlx::query(
            "UPDATE orders SET payment_method = ?2, discount_cents = ?3, total_cents = ?4, \
                 payment_status = 'paid', status = 'completed', kitchen_status = 'served' \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(payment_method)
        .bind(to_cents(discount_amount))
        .bind(final_cents)
        .execute(&mut *tx)
        .await?;

        if let Some(table_id) = table_id {
            sqlx::query("UPDATE dining_tables SET status = 'free' WHERE id = ?1")
                .bind(table_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        let order = self.fetch_order(id).await?;
        Ok((order, from_cents(final_cents)))
    }

    /// Active kitchen orders: pending/preparing/ready (or one
    /// requested status), cancelled excluded, preparing first, then
    /// pending, then ready, oldest first within each group.
    pub async fn list_active_kitchen_orders(
        &self,
        status: Option<KitchenStatus>,
        limit: i64,
    ) -> RepoResult<Vec<OrderRecord>> {
        let order_clause = "ORDER BY CASE kitchen_status \
                 WHEN 'preparing' THEN 1 WHEN 'pending' THEN 2 WHEN 'ready' THEN 3 ELSE 4 END, \
             created_at ASC \
             LIMIT ?1";

        let rows: Vec<OrderRow> = match status {
            Some(status) => {
                sqlx::query_as(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders \
                     WHERE kitchen_status = ?2 AND status != 'cancelled' {order_clause}"
                ))
                .bind(limit)
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders \
                     WHERE kitchen_status IN ('pending', 'preparing', 'ready') \
                       AND status != 'cancelled' {order_clause}"
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        self.into_records(rows).await
    }

    /// Today's preparation numbers for the kitchen dashboard
    pub async fn kitchen_stats(&self) -> RepoResult<KitchenStats> {
        let (total, pending, preparing, ready, served, avg_prep): (
            i64,
            i64,
            i64,
            i64,
            i64,
            Option<f64>,
        ) = sqlx::query_as(
            "SELECT COUNT(*), \
                 COALESCE(SUM(kitchen_status = 'pending'), 0), \
                 COALESCE(SUM(kitchen_status = 'preparing'), 0), \
                 COALESCE(SUM(kitchen_status = 'ready'), 0), \
                 COALESCE(SUM(kitchen_status = 'served'), 0), \
                 AVG(CASE \
                     WHEN kitchen_completed_at IS NOT NULL AND kitchen_started_at IS NOT NULL \
                     THEN (julianday(kitchen_completed_at) - julianday(kitchen_started_at)) \
                         * 24 * 60 \
                 END) \
             FROM orders \
             WHERE date(created_at) = date('now') AND status != 'cancelled'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(KitchenStats {
            total_orders: total,
            pending_orders: pending,
            preparing_orders: preparing,
            ready_orders: ready,
            served_orders: served,
            avg_preparation_minutes: avg_prep,
        })
    }

    async fn fetch_order(&self, id: i64) -> RepoResult<Order> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))?
            .try_into()
    }

    async fn fetch_items(&self, order_id: i64) -> RepoResult<Vec<OrderItem>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT id, order_id, product_id, product_name, quantity, unit_price_cents, \
                 original_unit_price_cents, total_price_cents, notes \
             FROM order_items WHERE order_id = ?1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    async fn fetch_salon_name(&self, salon_id: Option<i64>) -> RepoResult<Option<String>> {
        let Some(salon_id) = salon_id else {
            return Ok(None);
        };
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM salons WHERE id = ?1")
            .bind(salon_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(name)
    }

    async fn into_records(&self, rows: Vec<OrderRow>) -> RepoResult<Vec<OrderRecord>> {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let order: Order = row.try_into()?;
            let items = self.fetch_items(order.id).await?;
            let salon_name = self.fetch_salon_name(order.salon_id).await?;
            records.push(OrderRecord {
                order,
                items,
                salon_name,
            });
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::orders::pricing::PricedLine;

    async fn store() -> OrderStore {
        let db = DbService::in_memory().await.unwrap();
        seed(&db.pool).await;
        OrderStore::new(db.pool)
    }

    async fn seed(pool: &SqlitePool) {
        sqlx::raw_sql(
            "INSERT INTO salons (id, name) VALUES (1, 'Main Hall');
             INSERT INTO tariffs (id, name, multiplier) VALUES (1, 'Standard', 100);
             INSERT INTO tariffs (id, name, multiplier) VALUES (2, 'Terrace', 120);
             INSERT INTO dining_tables (id, number, salon_id, tariff_id, status) \
                 VALUES (1, 'T1', 1, 2, 'free');
             INSERT INTO dining_tables (id, number, salon_id, tariff_id, status) \
                 VALUES (2, 'T2', 1, 1, 'free');
             INSERT INTO products (id, name, price_cents) VALUES (1, 'Paella', 1000);
             INSERT INTO products (id, name, price_cents) VALUES (2, 'Agua', 150);",
        )
        .execute(pool)
        .await
        .unwrap();
    }

    fn line(product_id: i64, quantity: i64, unit_cents: i64) -> PricedLine {
        PricedLine {
            product_id,
            product_name: format!("Product {product_id}"),
            quantity,
            unit_price: from_cents(unit_cents),
            original_unit_price: from_cents(unit_cents),
            total_price: from_cents(unit_cents * quantity),
            notes: None,
        }
    }

    fn draft(table: Option<TableRef>, lines: Vec<PricedLine>) -> NewOrder {
        let subtotal: i64 = lines.iter().map(|l| to_cents(l.total_price)).sum();
        NewOrder {
            table,
            tariff_multiplier: Decimal::ONE,
            waiter_id: 7,
            waiter_name: "Ana".into(),
            order_type: OrderType::Table,
            notes: None,
            pricing: PricedOrder {
                original_subtotal: from_cents(subtotal),
                subtotal: from_cents(subtotal),
                tax_amount: from_cents(subtotal * 21 / 100),
                total: from_cents(subtotal + subtotal * 21 / 100),
                lines,
            },
        }
    }

    fn table_ref(id: i64, number: &str) -> TableRef {
        TableRef {
            id,
            number: number.into(),
            salon_id: Some(1),
            tariff_id: Some(2),
        }
    }

    #[tokio::test]
    async fn numbers_are_sequential_within_a_day() {
        let store = store().await;
        let day = Utc::now().format("%Y%m%d").to_string();

        let (first, _) = store.create_order_atomic(draft(None, vec![line(1, 1, 1000)])).await.unwrap();
        let (second, _) = store.create_order_atomic(draft(None, vec![line(2, 1, 150)])).await.unwrap();

        assert_eq!(first.number, format!("ORD{day}0001"));
        assert_eq!(second.number, format!("ORD{day}0002"));
    }

    #[tokio::test]
    async fn creating_against_an_occupied_table_is_rejected() {
        let store = store().await;
        let first = store
            .create_order_atomic(draft(Some(table_ref(1, "T1")), vec![line(1, 1, 1200)]))
            .await;
        assert!(first.is_ok());

        let second = store
            .create_order_atomic(draft(Some(table_ref(1, "T1")), vec![line(2, 1, 180)]))
            .await;
        assert!(matches!(second, Err(RepoError::TableOccupied(_))));
    }

    #[tokio::test]
    async fn failed_creation_rolls_back_everything() {
        let store = store().await;

        // Second line points at a product that does not exist; the
        // foreign key violation must undo the order row, the table
        // flip, and the counter bump.
        let result = store
            .create_order_atomic(draft(
                Some(table_ref(1, "T1")),
                vec![line(1, 1, 1200), line(999, 1, 500)],
            ))
            .await;
        assert!(matches!(result, Err(RepoError::Database(_))));

        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(orders, 0);

        let table_status: String =
            sqlx::query_scalar("SELECT status FROM dining_tables WHERE id = 1")
                .fetch_one(&store.pool)
                .await
                .unwrap();
        assert_eq!(table_status, "free");

        // The wasted number is reused by the next creation.
        let day = Utc::now().format("%Y%m%d").to_string();
        let (order, _) = store.create_order_atomic(draft(None, vec![line(1, 1, 1000)])).await.unwrap();
        assert_eq!(order.number, format!("ORD{day}0001"));
    }

    #[tokio::test]
    async fn kitchen_status_transitions_stamp_timestamps() {
        let store = store().await;
        let (order, _) = store.create_order_atomic(draft(None, vec![line(1, 1, 1000)])).await.unwrap();

        let preparing = store
            .update_kitchen_status(order.id, KitchenStatus::Preparing, None)
            .await
            .unwrap();
        assert_eq!(preparing.kitchen_status, KitchenStatus::Preparing);
        assert!(preparing.kitchen_started_at.is_some());
        assert!(preparing.kitchen_completed_at.is_none());

        let ready = store
            .update_kitchen_status(order.id, KitchenStatus::Ready, None)
            .await
            .unwrap();
        assert!(ready.kitchen_completed_at.is_some());

        // Going back and forth must not re-stamp either timestamp.
        let started = preparing.kitchen_started_at;
        let completed = ready.kitchen_completed_at;
        store.update_kitchen_status(order.id, KitchenStatus::Preparing, None).await.unwrap();
        let again = store
            .update_kitchen_status(order.id, KitchenStatus::Ready, None)
            .await
            .unwrap();
        assert_eq!(again.kitchen_started_at, started);
        assert_eq!(again.kitchen_completed_at, completed);
    }

    #[tokio::test]
    async fn kitchen_notes_are_persisted_across_updates() {
        let store = store().await;
        let (order, _) = store.create_order_atomic(draft(None, vec![line(1, 1, 1000)])).await.unwrap();
        assert_eq!(order.kitchen_notes, None);

        let preparing = store
            .update_kitchen_status(order.id, KitchenStatus::Preparing, Some("out of basil"))
            .await
            .unwrap();
        assert_eq!(preparing.kitchen_notes.as_deref(), Some("out of basil"));

        // A status change without a note keeps the stored one.
        let ready = store
            .update_kitchen_status(order.id, KitchenStatus::Ready, None)
            .await
            .unwrap();
        assert_eq!(ready.kitchen_notes.as_deref(), Some("out of basil"));
    }

    #[tokio::test]
    async fn completion_applies_discount_and_frees_the_table() {
        let store = store().await;
        let (order, _) = store
            .create_order_atomic(draft(Some(table_ref(1, "T1")), vec![line(1, 2, 1200)]))
            .await
            .unwrap();

        let (completed, final_total) = store
            .complete_order_atomic(order.id, "cash", Decimal::new(200, 2))
            .await
            .unwrap();

        assert_eq!(completed.status, OrderStatus::Completed);
        assert_eq!(completed.payment_status, PaymentStatus::Paid);
        assert_eq!(completed.kitchen_status, KitchenStatus::Served);
        assert_eq!(final_total, order.total - Decimal::new(200, 2));
        assert_eq!(completed.total, final_total);

        let table_status: String =
            sqlx::query_scalar("SELECT status FROM dining_tables WHERE id = 1")
                .fetch_one(&store.pool)
                .await
                .unwrap();
        assert_eq!(table_status, "free");

        let open = store.get_orders_for_table(1).await.unwrap();
        assert!(open.is_empty());
    }

    #[tokio::test]
    async fn kitchen_list_orders_preparing_first_then_oldest() {
        let store = store().await;
        let (a, _) = store.create_order_atomic(draft(None, vec![line(1, 1, 1000)])).await.unwrap();
        let (b, _) = store.create_order_atomic(draft(None, vec![line(1, 1, 1000)])).await.unwrap();
        let (c, _) = store.create_order_atomic(draft(None, vec![line(2, 1, 150)])).await.unwrap();

        store.update_kitchen_status(b.id, KitchenStatus::Preparing, None).await.unwrap();
        store.update_kitchen_status(c.id, KitchenStatus::Ready, None).await.unwrap();

        let listed = store.list_active_kitchen_orders(None, 50).await.unwrap();
        let ids: Vec<i64> = listed.iter().map(|r| r.order.id).collect();
        assert_eq!(ids, vec![b.id, a.id, c.id]);

        let pending_only = store
            .list_active_kitchen_orders(Some(KitchenStatus::Pending), 50)
            .await
            .unwrap();
        assert_eq!(pending_only.len(), 1);
        assert_eq!(pending_only[0].order.id, a.id);
    }

    #[tokio::test]
    async fn stats_count_today_by_kitchen_status() {
        let store = store().await;
        let (a, _) = store.create_order_atomic(draft(None, vec![line(1, 1, 1000)])).await.unwrap();
        store.create_order_atomic(draft(None, vec![line(2, 1, 150)])).await.unwrap();

        store.update_kitchen_status(a.id, KitchenStatus::Preparing, None).await.unwrap();
        store.update_kitchen_status(a.id, KitchenStatus::Ready, None).await.unwrap();

        let stats = store.kitchen_stats().await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.preparing_orders, 0);
        assert_eq!(stats.ready_orders, 1);
        assert!(stats.avg_preparation_minutes.is_some());
    }
}
