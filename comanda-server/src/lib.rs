//! Comanda Server - order & kitchen orchestration core
//!
//! # Architecture
//!
//! - **API** (`api`): REST routes for order lifecycle and the kitchen
//!   queue
//! - **Orders** (`orders`): tariff pricing, urgency, and the
//!   commit-then-broadcast orchestrator
//! - **Database** (`db`): SQLite pool, migrations, transactional store
//! - **Cache** (`cache`): TTL-bounded in-process mirror of hot orders
//! - **Realtime** (`realtime`): room-based event fan-out (Socket.IO or
//!   in-memory)
//!
//! # Module structure
//!
//! ```text
//! comanda-server/src/
//! ├── core/       # config, state, server assembly, background tasks
//! ├── api/        # HTTP routes and handlers
//! ├── auth/       # waiter principal extraction
//! ├── orders/     # pricing, urgency, orders manager
//! ├── db/         # pool + repositories
//! ├── cache/      # order cache
//! ├── realtime/   # event broadcasters
//! └── utils/      # errors, logging
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod core;
pub mod db;
pub mod orders;
pub mod realtime;
pub mod utils;

pub use auth::Waiter;
pub use core::{Config, Server, ServerState};
pub use core::server::build_router;
pub use orders::OrdersManager;
pub use utils::{AppError, AppResult};
pub use utils::logger::{init_logger, init_logger_with_file};
