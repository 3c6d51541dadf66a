//! Order Cache
//!
//! Read-through mirror of recently written orders and kitchen tickets.
//! Strictly best effort: entries are written after a successful commit,
//! patched in place on status changes, and evicted on completion. A
//! miss means the caller goes to the database; nothing here is
//! re-populated on read.

use dashmap::DashMap;
use shared::models::{KitchenStatus, KitchenTicket, OrderWithItems};
use std::time::{Duration, Instant};

pub const ORDER_TTL: Duration = Duration::from_secs(3600);
pub const TICKET_TTL: Duration = Duration::from_secs(7200);

struct Entry<T> {
    value: T,
    expires_at: Instant,
}

impl<T> Entry<T> {
    fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Default)]
pub struct OrderCache {
    orders: DashMap<i64, Entry<OrderWithItems>>,
    tickets: DashMap<i64, Entry<KitchenTicket>>,
}

impl OrderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_order(&self, order: OrderWithItems) {
        self.orders
            .insert(order.order.id, Entry::new(order, ORDER_TTL));
    }

    pub fn put_ticket(&self, ticket: KitchenTicket) {
        self.tickets
            .insert(ticket.order_id, Entry::new(ticket, TICKET_TTL));
    }

    /// Expired entries read as misses; the sweeper reclaims them later.
    pub fn get_order(&self, order_id: i64) -> Option<OrderWithItems> {
        self.orders
            .get(&order_id)
            .filter(|entry| !entry.expired())
            .map(|entry| entry.value.clone())
    }

    pub fn get_ticket(&self, order_id: i64) -> Option<KitchenTicket> {
        self.tickets
            .get(&order_id)
            .filter(|entry| !entry.expired())
            .map(|entry| entry.value.clone())
    }

    /// Patch the kitchen status (and note, when one was given) on
    /// whatever is cached. TTLs are left untouched and absent entries
    /// stay absent.
    pub fn patch_kitchen_status(&self, order_id: i64, status: KitchenStatus, notes: Option<&str>) {
        if let Some(mut entry) = self.orders.get_mut(&order_id) {
            entry.value.order.kitchen_status = status;
            if let Some(notes) = notes {
                entry.value.order.kitchen_notes = Some(notes.to_string());
            }
        }
        if let Some(mut entry) = self.tickets.get_mut(&order_id) {
            entry.value.status = status;
        }
    }

    pub fn evict(&self, order_id: i64) {
        self.orders.remove(&order_id);
        self.tickets.remove(&order_id);
    }

    /// Drop expired entries. Called from the periodic sweeper task.
    pub fn sweep(&self) {
        self.orders.retain(|_, entry| !entry.expired());
        self.tickets.retain(|_, entry| !entry.expired());
    }

    pub fn len(&self) -> usize {
        self.orders.len() + self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty() && self.tickets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use shared::models::{Order, OrderStatus, OrderType, PaymentStatus};

    fn sample_order(id: i64) -> OrderWithItems {
        OrderWithItems {
            order: Order {
                id,
                number: format!("ORD202608290{id:03}"),
                table_id: Some(1),
                table_number: Some("T1".into()),
                salon_id: Some(1),
                tariff_id: Some(1),
                tariff_multiplier: Decimal::ONE,
                waiter_id: 7,
                waiter_name: "Ana".into(),
                order_type: OrderType::Table,
                original_subtotal: Decimal::new(1000, 2),
                subtotal: Decimal::new(1000, 2),
                tax_amount: Decimal::new(210, 2),
                total: Decimal::new(1210, 2),
                discount_amount: Decimal::ZERO,
                payment_method: None,
                payment_status: PaymentStatus::Pending,
                status: OrderStatus::Draft,
                kitchen_status: KitchenStatus::Pending,
                notes: None,
                kitchen_notes: None,
                created_at: Utc::now(),
                kitchen_started_at: None,
                kitchen_completed_at: None,
            },
            items: vec![],
            salon_name: Some("Main Hall".into()),
            elapsed_minutes: 0,
            is_urgent: false,
        }
    }

    #[test]
    fn put_get_evict() {
        let cache = OrderCache::new();
        cache.put_order(sample_order(1));
        assert!(cache.get_order(1).is_some());
        assert!(cache.get_order(2).is_none());

        cache.evict(1);
        assert!(cache.get_order(1).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn patch_updates_cached_status_in_place() {
        let cache = OrderCache::new();
        cache.put_order(sample_order(1));

        cache.patch_kitchen_status(1, KitchenStatus::Preparing, Some("rush it"));
        let cached = cache.get_order(1).unwrap();
        assert_eq!(cached.order.kitchen_status, KitchenStatus::Preparing);
        assert_eq!(cached.order.kitchen_notes.as_deref(), Some("rush it"));

        // Patching without a note keeps the stored one.
        cache.patch_kitchen_status(1, KitchenStatus::Ready, None);
        let cached = cache.get_order(1).unwrap();
        assert_eq!(cached.order.kitchen_notes.as_deref(), Some("rush it"));

        // Patching an absent id must not create an entry.
        cache.patch_kitchen_status(99, KitchenStatus::Ready, None);
        assert!(cache.get_order(99).is_none());
    }

    #[test]
    fn sweep_reclaims_expired_entries() {
        let cache = OrderCache::new();
        cache
            .orders
            .insert(1, Entry::new(sample_order(1), Duration::ZERO));
        cache.put_order(sample_order(2));

        assert!(cache.get_order(1).is_none());
        assert_eq!(cache.len(), 2);

        cache.sweep();
        assert_eq!(cache.len(), 1);
        assert!(cache.get_order(2).is_some());
    }
}
