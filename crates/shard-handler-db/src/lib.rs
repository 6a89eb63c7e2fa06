//! # Shard Handler Database Routing
//!
//! Routes queries to one of several pre-configured database shards, selected
//! per execution context, instead of always using the application's default
//! connection pool.
//!
//! ## Components
//!
//! - **Context registry** ([`context`]): the currently selected shard, stored
//!   task-locally inside router scopes and thread-locally elsewhere
//! - **Pool cache** ([`pool`]): one lazily connecting sqlx pool per shard
//! - **Router** ([`router`]): the [`PoolResolver`] hook the data-access layer
//!   calls before every query
//! - **Scoped selection** ([`scope`]): `using` / `using_blocking`, which select a
//!   shard for a block and release reserved connections on the way out
//! - **Executor** ([`executor`]): a small data-access layer holding the
//!   default pool and a resolver
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shard_handler_conf::ShardSettings;
//! use shard_handler_db::{DatabaseExecutor, ShardRouter, ShardedExecutor};
//! use sqlx::AnyPool;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! sqlx::any::install_default_drivers();
//! let default = AnyPool::connect("postgres://localhost/app").await?;
//!
//! let router = Arc::new(ShardRouter::new());
//! router.setup(&ShardSettings::from_file("shards.toml")?)?;
//!
//! let posts = ShardedExecutor::new(default).with_resolver(router.clone());
//! let titles = router
//!     .using("shard1", posts.pluck("SELECT title FROM posts"))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Behaviour without a selection
//!
//! When no shard is selected the router returns the caller's default pool
//! unchanged, so code that never opts into sharding keeps its exact behaviour,
//! errors included.
//!
//! ## Feature Flags
//!
//! - `postgres` (default): PostgreSQL shards
//! - `mysql` (default): MySQL shards
//! - `sqlite` (default): SQLite shards

pub mod context;
pub mod errors;
pub mod events;
pub mod executor;
pub mod pool;
pub mod router;
pub mod scope;
pub mod shard_id;

pub use context::{ShardGuard, current_shard, in_task_scope, select_shard, set_current_shard};
pub use errors::{ShardError, ShardResult};
pub use events::{PoolEvent, PoolEventListener};
pub use executor::{DatabaseExecutor, ShardedExecutor};
pub use pool::{PoolCache, ShardPool};
pub use router::{PoolResolver, ShardConnection, ShardRouter};
pub use shard_id::ShardId;

/// Re-export commonly used types
pub mod prelude {
	pub use super::context::{current_shard, select_shard, set_current_shard};
	pub use super::errors::*;
	pub use super::events::*;
	pub use super::executor::*;
	pub use super::router::*;
	pub use super::shard_id::ShardId;
}
