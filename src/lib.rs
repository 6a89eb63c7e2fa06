//! # Shard Handler
//!
//! Routes database queries to one of several pre-configured shards, selected
//! per execution context, while code that never selects a shard keeps using
//! the application's default connection pool unchanged.
//!
//! This crate is a facade over:
//!
//! - [`conf`] (`shard-handler-conf`): shard settings, per-shard connection
//!   parameters and pool tuning, loadable from TOML or JSON
//! - [`db`] (`shard-handler-db`): context-local selection, the per-shard pool
//!   cache, the pool resolution hook and scoped selection
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shard_handler::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! sqlx::any::install_default_drivers();
//! let default = sqlx::AnyPool::connect("sqlite://app.db").await?;
//!
//! let router = Arc::new(ShardRouter::new());
//! router.setup(&ShardSettings::from_toml_str(
//!     r#"
//!     [shard1]
//!     adapter = "sqlite3"
//!     database = "shard1.db"
//!     "#,
//! )?)?;
//!
//! let posts = ShardedExecutor::new(default).with_resolver(router.clone());
//! let titles = router
//!     .using("shard1", posts.pluck("SELECT title FROM posts"))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `postgres` (default): PostgreSQL shards
//! - `mysql` (default): MySQL shards
//! - `sqlite` (default): SQLite shards

pub use shard_handler_conf as conf;
pub use shard_handler_db as db;

// Re-export settings
pub use shard_handler_conf::{
	Adapter, DatabaseConfig, OptionValue, PoolConfig, SettingsError, ShardSettings,
};

// Re-export routing
pub use shard_handler_db::{
	DatabaseExecutor, PoolEvent, PoolEventListener, PoolResolver, ShardConnection, ShardError,
	ShardGuard, ShardId, ShardResult, ShardRouter, ShardedExecutor, current_shard, select_shard,
	set_current_shard,
};

/// Commonly used types for applications wiring up sharding
pub mod prelude {
	pub use shard_handler_conf::{DatabaseConfig, PoolConfig, ShardSettings};
	pub use shard_handler_db::prelude::*;
}
