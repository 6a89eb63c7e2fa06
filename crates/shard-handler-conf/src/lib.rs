//! # Shard Handler Configuration
//!
//! Typed configuration for the shard router: one [`DatabaseConfig`] per shard
//! identifier, collected in [`ShardSettings`].
//!
//! Settings are consumed once, at router setup. They can be parsed from TOML or
//! JSON, loaded from a file, or built in code:
//!
//! ```rust
//! use shard_handler_conf::{DatabaseConfig, ShardSettings};
//!
//! let settings = ShardSettings::new()
//!     .with_shard("shard1", DatabaseConfig::postgresql("shard1", "postgres", "", "localhost", 5432))
//!     .with_shard("shard2", DatabaseConfig::sqlite("shard2.db").with_pool_size(2));
//!
//! assert!(settings.validate().is_ok());
//! ```
//!
//! ## Recognised keys
//!
//! - `adapter` (alias `engine`): `postgresql`, `mysql`, `sqlite3` and their common spellings
//! - `database` (alias `name`), `host`, `port`, `username` (alias `user`), `password`
//! - `pool`, `min_connections`, `checkout_timeout`, `idle_timeout`, `max_lifetime`,
//!   `test_before_acquire`: pool tuning, durations in seconds
//! - anything else is an adapter option and is appended to the connection URL

pub mod database_config;
pub mod errors;
pub mod pool_config;
pub mod settings;

pub use database_config::{Adapter, DatabaseConfig, OptionValue};
pub use errors::{SettingsError, SettingsResult};
pub use pool_config::PoolConfig;
pub use settings::ShardSettings;
