//! Shared server state
//!
//! One `ServerState` is built at startup and cloned into every
//! handler. All heavyweight members are behind `Arc`.

use std::sync::Arc;

use crate::cache::OrderCache;
use crate::core::Config;
use crate::core::tasks;
use crate::db::DbService;
use crate::db::repository::{DiningTableRepository, OrderStore, ProductRepository};
use crate::orders::OrdersManager;
use crate::realtime::EventBroadcaster;
use crate::utils::AppResult;

#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: DbService,
    pub orders: Arc<OrdersManager>,
    pub cache: Arc<OrderCache>,
    pub broadcaster: Arc<dyn EventBroadcaster>,
}

impl ServerState {
    /// Open the database and wire up the full service graph.
    pub async fn initialize(
        config: &Config,
        broadcaster: Arc<dyn EventBroadcaster>,
    ) -> AppResult<Self> {
        let db = DbService::new(&config.db_path).await?;
        Ok(Self::from_parts(config.clone(), db, broadcaster))
    }

    /// Assemble state around an already-open database. Tests use this
    /// with [`DbService::in_memory`] and a memory broadcaster.
    pub fn from_parts(
        config: Config,
        db: DbService,
        broadcaster: Arc<dyn EventBroadcaster>,
    ) -> Self {
        let cache = Arc::new(OrderCache::new());
        let orders = Arc::new(OrdersManager::new(
            OrderStore::new(db.pool.clone()),
            DiningTableRepository::new(db.pool.clone()),
            ProductRepository::new(db.pool.clone()),
            cache.clone(),
            broadcaster.clone(),
        ));

        Self {
            config: Arc::new(config),
            db,
            orders,
            cache,
            broadcaster,
        }
    }

    /// Spawn the periodic jobs tied to this state.
    pub fn start_background_tasks(&self) {
        tasks::spawn_cache_sweeper(
            self.cache.clone(),
            std::time::Duration::from_secs(self.config.cache_sweep_interval_secs),
        );
    }
}
