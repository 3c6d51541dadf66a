//! Orders Manager
//!
//! Orchestrates the write path: resolve table and tariff context,
//! price the lines, commit atomically through the store, then mirror
//! into the cache and fan out events. Cache and broadcast run strictly
//! after the commit and are best effort — a failure there is logged
//! and swallowed, never surfaced to the caller, and never undoes the
//! write.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use shared::events::{
    NewOrderPayload, OrderCompletedPayload, OrderEventKind, Room, StatusUpdatePayload,
    TableStatusPayload,
};
use shared::models::{
    KitchenStats, KitchenStatus, KitchenTicket, KitchenTicketItem, Order, OrderItem, OrderType,
    OrderWithItems, TableStatus,
};

use crate::auth::Waiter;
use crate::cache::OrderCache;
use crate::db::repository::order::{NewOrder, OrderRecord, TableRef};
use crate::db::repository::{DiningTableRepository, OrderStore, ProductRepository};
use crate::orders::pricing::{self, LineRequest, PricingError};
use crate::orders::urgency;
use crate::realtime::EventBroadcaster;
use crate::utils::{AppError, AppResult};

/// Fallback salon label for orders with no salon attached
const DEFAULT_SALON: &str = "General";
/// Table label for takeaway/delivery tickets
const NO_TABLE: &str = "Takeaway";

/// New order request, already validated at the API edge
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub table_id: Option<i64>,
    pub order_type: OrderType,
    pub items: Vec<LineRequest>,
    pub notes: Option<String>,
}

pub struct OrdersManager {
    store: OrderStore,
    tables: DiningTableRepository,
    products: ProductRepository,
    cache: Arc<OrderCache>,
    broadcaster: Arc<dyn EventBroadcaster>,
}

impl OrdersManager {
    pub fn new(
        store: OrderStore,
        tables: DiningTableRepository,
        products: ProductRepository,
        cache: Arc<OrderCache>,
        broadcaster: Arc<dyn EventBroadcaster>,
    ) -> Self {
        Self {
            store,
            tables,
            products,
            cache,
            broadcaster,
        }
    }

    /// Create and commit a new order, then mirror and announce it.
    pub async fn create_order(&self, waiter: &Waiter, req: CreateOrder) -> AppResult<OrderWithItems> {
        if req.items.is_empty() {
            return Err(AppError::validation("Order must contain at least one item"));
        }

        // Only table orders touch a table; takeaway/delivery ignore
        // any table_id they carry.
        let table_info = match (req.order_type, req.table_id) {
            (OrderType::Table, Some(table_id)) => {
                Some(self.tables.find_table_info(table_id).await?)
            }
            _ => None,
        };
        if let Some(info) = &table_info {
            if info.table.status == TableStatus::Occupied {
                return Err(AppError::table_occupied(format!(
                    "table {}",
                    info.table.number
                )));
            }
        }
        let multiplier = table_info
            .as_ref()
            .map(|info| info.tariff_multiplier)
            .unwrap_or(Decimal::ONE);

        let product_ids: Vec<i64> = req.items.iter().map(|line| line.product_id).collect();
        let products = self.products.find_active_by_ids(&product_ids).await?;
        let priced = pricing::price_order(&req.items, &products, multiplier).map_err(|e| match e {
            PricingError::ProductNotFound { product_id } => AppError::not_found(format!(
                "Product {product_id} not found or unavailable"
            )),
            PricingError::InvalidQuantity { quantity } => {
                AppError::validation(format!("Invalid quantity: {quantity}"))
            }
        })?;

        let (order, items) = self
            .store
            .create_order_atomic(NewOrder {
                table: table_info.as_ref().map(|info| TableRef {
                    id: info.table.id,
                    number: info.table.number.clone(),
                    salon_id: info.table.salon_id,
                    tariff_id: info.table.tariff_id,
                }),
                tariff_multiplier: multiplier,
                waiter_id: waiter.id,
                waiter_name: waiter.name.clone(),
                order_type: req.order_type,
                notes: req.notes,
                pricing: priced,
            })
            .await?;

        let salon_name = table_info.as_ref().and_then(|info| info.salon_name.clone());
        let result = OrderWithItems {
            order: order.clone(),
            items: items.clone(),
            salon_name: salon_name.clone(),
            elapsed_minutes: 0,
            is_urgent: false,
        };

        // Committed. Everything below is best effort.
        self.cache.put_order(result.clone());
        self.cache
            .put_ticket(build_ticket(&order, &items, salon_name.as_deref()));

        let payload = NewOrderPayload {
            order_id: order.id,
            order_number: order.number.clone(),
            table_number: order
                .table_number
                .clone()
                .unwrap_or_else(|| NO_TABLE.to_string()),
            salon_name: salon_name.unwrap_or_else(|| DEFAULT_SALON.to_string()),
            waiter_name: order.waiter_name.clone(),
            items: items.clone(),
            notes: order.notes.clone(),
            total: order.total,
            kitchen_status: order.kitchen_status,
            timestamp: Utc::now(),
        };
        self.publish(Room::Kitchen, OrderEventKind::NewOrder, &payload).await;
        self.publish(Room::Admin, OrderEventKind::NewOrder, &payload).await;

        Ok(result)
    }

    /// Move an order through the kitchen. Any valid status is accepted
    /// as the next one; the store decides which timestamps to stamp.
    pub async fn update_kitchen_status(
        &self,
        order_id: i64,
        new_status: KitchenStatus,
        updated_by: &Waiter,
        notes: Option<String>,
    ) -> AppResult<Order> {
        let order = self
            .store
            .update_kitchen_status(order_id, new_status, notes.as_deref())
            .await?;

        self.cache
            .patch_kitchen_status(order_id, new_status, notes.as_deref());

        let payload = StatusUpdatePayload {
            order_id: order.id,
            order_number: order.number.clone(),
            table_number: order.table_number.clone(),
            kitchen_status: order.kitchen_status,
            updated_by: updated_by.name.clone(),
            notes,
            timestamp: Utc::now(),
        };
        self.publish(Room::Kitchen, OrderEventKind::OrderStatusUpdated, &payload)
            .await;
        self.publish(Room::Admin, OrderEventKind::OrderStatusUpdated, &payload)
            .await;
        if new_status == KitchenStatus::Ready {
            self.publish(Room::Waiter, OrderEventKind::OrderReady, &payload)
                .await;
        }

        Ok(order)
    }

    /// Settle an order: apply the discount, mark it paid and served,
    /// free the table, drop the cache mirror, and announce completion.
    pub async fn complete_order(
        &self,
        order_id: i64,
        payment_method: String,
        discount_amount: Decimal,
    ) -> AppResult<(Order, Decimal)> {
        if discount_amount < Decimal::ZERO {
            return Err(AppError::validation("Discount cannot be negative"));
        }

        let (order, final_total) = self
            .store
            .complete_order_atomic(order_id, &payment_method, discount_amount)
            .await?;

        self.cache.evict(order_id);

        let payload = OrderCompletedPayload {
            order_id: order.id,
            order_number: order.number.clone(),
            table_id: order.table_id,
            table_number: order.table_number.clone(),
            payment_method,
            final_total,
            waiter_name: order.waiter_name.clone(),
            timestamp: Utc::now(),
        };
        for room in Room::ALL {
            self.publish(room, OrderEventKind::OrderCompleted, &payload).await;
        }

        if let (Some(table_id), Some(table_number)) = (order.table_id, &order.table_number) {
            self.broadcast_table_status(table_id, table_number, TableStatus::Free)
                .await;
        }

        Ok((order, final_total))
    }

    /// Single order lookup, cache first. Elapsed time and urgency are
    /// recomputed on every read so cached entries never go stale on
    /// those two fields.
    pub async fn get_order(&self, order_id: i64) -> AppResult<OrderWithItems> {
        let now = Utc::now();

        if let Some(mut cached) = self.cache.get_order(order_id) {
            cached.elapsed_minutes = urgency::elapsed_minutes(cached.order.created_at, now);
            cached.is_urgent = urgency::is_urgent(cached.elapsed_minutes);
            return Ok(cached);
        }

        let record = self.store.get_order(order_id).await?;
        Ok(with_urgency(record, now))
    }

    pub async fn get_orders_for_table(&self, table_id: i64) -> AppResult<Vec<OrderWithItems>> {
        let now = Utc::now();
        let records = self.store.get_orders_for_table(table_id).await?;
        Ok(records.into_iter().map(|r| with_urgency(r, now)).collect())
    }

    /// Kitchen work queue with urgency flags
    pub async fn get_active_kitchen_orders(
        &self,
        status: Option<KitchenStatus>,
        limit: i64,
    ) -> AppResult<Vec<OrderWithItems>> {
        let now = Utc::now();
        let records = self.store.list_active_kitchen_orders(status, limit).await?;
        Ok(records.into_iter().map(|r| with_urgency(r, now)).collect())
    }

    pub async fn kitchen_stats(&self) -> AppResult<KitchenStats> {
        Ok(self.store.kitchen_stats().await?)
    }

    async fn publish<T: Serialize>(&self, room: Room, kind: OrderEventKind, payload: &T) {
        match serde_json::to_value(payload) {
            Ok(value) => {
                if let Err(e) = self.broadcaster.publish(room, kind, value).await {
                    warn!(event = kind.as_str(), room = room.as_str(), error = %e,
                        "event publish failed");
                }
            }
            Err(e) => {
                warn!(event = kind.as_str(), error = %e, "event payload serialization failed");
            }
        }
    }

    async fn broadcast_table_status(&self, table_id: i64, table_number: &str, status: TableStatus) {
        let payload = TableStatusPayload {
            table_id,
            table_number: table_number.to_string(),
            status,
            timestamp: Utc::now(),
        };
        match serde_json::to_value(&payload) {
            Ok(value) => {
                if let Err(e) = self
                    .broadcaster
                    .broadcast(OrderEventKind::TableStatusUpdated, value)
                    .await
                {
                    warn!(table_id, error = %e, "table status broadcast failed");
                }
            }
            Err(e) => {
                warn!(table_id, error = %e, "table status payload serialization failed");
            }
        }
    }
}

fn with_urgency(record: OrderRecord, now: chrono::DateTime<Utc>) -> OrderWithItems {
    let elapsed = urgency::elapsed_minutes(record.order.created_at, now);
    OrderWithItems {
        order: record.order,
        items: record.items,
        salon_name: record.salon_name,
        elapsed_minutes: elapsed,
        is_urgent: urgency::is_urgent(elapsed),
    }
}

fn build_ticket(order: &Order, items: &[OrderItem], salon_name: Option<&str>) -> KitchenTicket {
    KitchenTicket {
        order_id: order.id,
        order_number: order.number.clone(),
        table_number: order
            .table_number
            .clone()
            .unwrap_or_else(|| NO_TABLE.to_string()),
        salon_name: salon_name.unwrap_or(DEFAULT_SALON).to_string(),
        waiter_name: order.waiter_name.clone(),
        items: items
            .iter()
            .map(|item| KitchenTicketItem {
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                notes: item.notes.clone(),
            })
            .collect(),
        notes: order.notes.clone(),
        created_at: order.created_at,
        status: order.kitchen_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::realtime::memory::{BroadcastedEvent, MemoryBroadcaster};
    use crate::realtime::BroadcastError;
    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::sync::broadcast;

    struct FailingBroadcaster;

    #[async_trait]
    impl EventBroadcaster for FailingBroadcaster {
        async fn publish(
            &self,
            _room: Room,
            _kind: OrderEventKind,
            _payload: Value,
        ) -> Result<(), BroadcastError> {
            Err(BroadcastError::Transport("transport down".into()))
        }

        async fn broadcast(
            &self,
            _kind: OrderEventKind,
            _payload: Value,
        ) -> Result<(), BroadcastError> {
            Err(BroadcastError::Transport("transport down".into()))
        }
    }

    async fn manager_with(
        broadcaster: Arc<dyn EventBroadcaster>,
    ) -> (OrdersManager, Arc<OrderCache>) {
        let db = DbService::in_memory().await.unwrap();
        sqlx::raw_sql(
            "INSERT INTO salons (id, name) VALUES (1, 'Terraza');
             INSERT INTO tariffs (id, name, multiplier) VALUES (1, 'Terrace', 120);
             INSERT INTO dining_tables (id, number, salon_id, tariff_id, status) \
                 VALUES (1, 'T1', 1, 1, 'free');
             INSERT INTO products (id, name, price_cents) VALUES (1, 'Paella', 1000);
             INSERT INTO products (id, name, price_cents, is_active) VALUES (2, 'Off', 500, 0);",
        )
        .execute(&db.pool)
        .await
        .unwrap();

        let cache = Arc::new(OrderCache::new());
        let manager = OrdersManager::new(
            OrderStore::new(db.pool.clone()),
            DiningTableRepository::new(db.pool.clone()),
            ProductRepository::new(db.pool),
            cache.clone(),
            broadcaster,
        );
        (manager, cache)
    }

    fn waiter() -> Waiter {
        Waiter {
            id: 7,
            name: "Ana".into(),
        }
    }

    fn create_request() -> CreateOrder {
        CreateOrder {
            table_id: Some(1),
            order_type: OrderType::Table,
            items: vec![LineRequest {
                product_id: 1,
                quantity: 2,
                notes: None,
            }],
            notes: Some("no salt".into()),
        }
    }

    async fn drain(rx: &mut broadcast::Receiver<BroadcastedEvent>) -> Vec<BroadcastedEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn create_order_prices_caches_and_announces() {
        let broadcaster = Arc::new(MemoryBroadcaster::default());
        let mut rx = broadcaster.subscribe();
        let (manager, cache) = manager_with(broadcaster).await;

        let created = manager.create_order(&waiter(), create_request()).await.unwrap();

        // 10.00 x 2 at x1.20: subtotal 24.00, tax 5.04, total 29.04
        assert_eq!(created.order.subtotal, Decimal::new(2400, 2));
        assert_eq!(created.order.tax_amount, Decimal::new(504, 2));
        assert_eq!(created.order.total, Decimal::new(2904, 2));
        assert_eq!(created.order.original_subtotal, Decimal::new(2000, 2));
        assert!(!created.is_urgent);

        assert!(cache.get_order(created.order.id).is_some());
        assert!(cache.get_ticket(created.order.id).is_some());

        let events = drain(&mut rx).await;
        let rooms: Vec<Option<Room>> = events
            .iter()
            .filter(|e| e.kind == OrderEventKind::NewOrder)
            .map(|e| e.room)
            .collect();
        assert_eq!(rooms, vec![Some(Room::Kitchen), Some(Room::Admin)]);
        // Creation announces the order only; the table broadcast comes
        // with completion.
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn takeaway_order_leaves_the_table_alone() {
        let (manager, _) = manager_with(Arc::new(MemoryBroadcaster::default())).await;

        let req = CreateOrder {
            order_type: OrderType::Takeaway,
            ..create_request()
        };
        let created = manager.create_order(&waiter(), req).await.unwrap();

        // No table is claimed and the stray table_id is dropped.
        assert_eq!(created.order.table_id, None);
        assert_eq!(created.order.tariff_multiplier, Decimal::ONE);

        let table = manager.create_order(&waiter(), create_request()).await;
        assert!(table.is_ok(), "table should still be free");
    }

    #[tokio::test]
    async fn occupied_table_is_rejected_before_any_write() {
        let (manager, _) = manager_with(Arc::new(MemoryBroadcaster::default())).await;
        manager.create_order(&waiter(), create_request()).await.unwrap();

        let second = manager.create_order(&waiter(), create_request()).await;
        assert!(matches!(second, Err(AppError::TableOccupied(_))));
    }

    #[tokio::test]
    async fn inactive_product_is_not_found() {
        let (manager, _) = manager_with(Arc::new(MemoryBroadcaster::default())).await;
        let req = CreateOrder {
            items: vec![LineRequest {
                product_id: 2,
                quantity: 1,
                notes: None,
            }],
            ..create_request()
        };
        assert!(matches!(
            manager.create_order(&waiter(), req).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn broadcast_failure_does_not_fail_the_write() {
        let (manager, cache) = manager_with(Arc::new(FailingBroadcaster)).await;
        let created = manager.create_order(&waiter(), create_request()).await.unwrap();

        // Order is committed and mirrored despite the dead transport.
        assert!(cache.get_order(created.order.id).is_some());
        assert!(manager.get_order(created.order.id).await.is_ok());
    }

    #[tokio::test]
    async fn status_update_patches_cache_and_emits_ready() {
        let broadcaster = Arc::new(MemoryBroadcaster::default());
        let mut rx = broadcaster.subscribe();
        let (manager, cache) = manager_with(broadcaster).await;

        let created = manager.create_order(&waiter(), create_request()).await.unwrap();
        drain(&mut rx).await;

        let updated = manager
            .update_kitchen_status(
                created.order.id,
                KitchenStatus::Ready,
                &waiter(),
                Some("no onions".into()),
            )
            .await
            .unwrap();
        assert_eq!(updated.kitchen_notes.as_deref(), Some("no onions"));

        let cached = cache.get_order(created.order.id).unwrap();
        assert_eq!(cached.order.kitchen_status, KitchenStatus::Ready);
        assert_eq!(cached.order.kitchen_notes.as_deref(), Some("no onions"));

        let events = drain(&mut rx).await;
        let status_rooms: Vec<Option<Room>> = events
            .iter()
            .filter(|e| e.kind == OrderEventKind::OrderStatusUpdated)
            .map(|e| e.room)
            .collect();
        assert_eq!(status_rooms, vec![Some(Room::Kitchen), Some(Room::Admin)]);
        assert!(events
            .iter()
            .any(|e| e.kind == OrderEventKind::OrderReady && e.room == Some(Room::Waiter)));
    }

    #[tokio::test]
    async fn completion_evicts_cache_and_frees_table() {
        let broadcaster = Arc::new(MemoryBroadcaster::default());
        let mut rx = broadcaster.subscribe();
        let (manager, cache) = manager_with(broadcaster).await;

        let created = manager.create_order(&waiter(), create_request()).await.unwrap();
        drain(&mut rx).await;

        let (completed, final_total) = manager
            .complete_order(created.order.id, "card".into(), Decimal::new(104, 2))
            .await
            .unwrap();

        assert_eq!(final_total, Decimal::new(2800, 2));
        assert_eq!(completed.payment_status, shared::models::PaymentStatus::Paid);
        assert!(cache.get_order(created.order.id).is_none());

        // The table is free again so a new order can claim it.
        let again = manager.create_order(&waiter(), create_request()).await;
        assert!(again.is_ok());

        let events = drain(&mut rx).await;
        let completed_rooms: Vec<Option<Room>> = events
            .iter()
            .filter(|e| e.kind == OrderEventKind::OrderCompleted)
            .map(|e| e.room)
            .collect();
        assert_eq!(
            completed_rooms,
            vec![Some(Room::Kitchen), Some(Room::Waiter), Some(Room::Admin)]
        );
        assert!(events
            .iter()
            .any(|e| e.kind == OrderEventKind::TableStatusUpdated));
    }
}
