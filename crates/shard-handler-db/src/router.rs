//! Shard router: the pool resolution hook
//!
//! The data-access layer holds an `Arc<dyn PoolResolver>` and asks it for a
//! pool (or a connection) before every query. [`ShardRouter`] is the sharding
//! implementation: with no shard selected it hands back the caller's default
//! pool untouched, otherwise it substitutes the selected shard's pool.

use crate::context::{self, ReservedSlot};
use crate::errors::{ShardError, ShardResult};
use crate::events::{Listeners, PoolEventListener};
use crate::pool::{PoolCache, ShardPool};
use crate::shard_id::ShardId;
use async_trait::async_trait;
use parking_lot::RwLock;
use shard_handler_conf::ShardSettings;
use sqlx::pool::PoolConnection;
use sqlx::{Any, AnyConnection, AnyPool};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Extension point called by the data-access layer before pool acquisition
#[async_trait]
pub trait PoolResolver: Send + Sync {
	/// Pick the pool a query should run on, given the caller's default pool
	fn resolve_pool(&self, default: &AnyPool) -> ShardResult<AnyPool>;

	/// Check out a connection from the resolved pool
	async fn acquire(&self, default: &AnyPool) -> ShardResult<ShardConnection> {
		let pool = self.resolve_pool(default)?;
		Ok(ShardConnection::detached(pool.acquire().await?))
	}
}

enum Slot {
	Reserved(OwnedMutexGuard<PoolConnection<Any>>),
	Detached(PoolConnection<Any>),
}

/// Connection handed out by a [`PoolResolver`]
///
/// Dereferences to the driver connection, so it can be used anywhere sqlx
/// expects `&mut AnyConnection`.
pub struct ShardConnection {
	slot: Slot,
}

impl ShardConnection {
	pub(crate) fn detached(conn: PoolConnection<Any>) -> Self {
		Self {
			slot: Slot::Detached(conn),
		}
	}

	fn reserved(guard: OwnedMutexGuard<PoolConnection<Any>>) -> Self {
		Self {
			slot: Slot::Reserved(guard),
		}
	}

	/// Whether this connection is pinned to the current task
	pub fn is_reserved(&self) -> bool {
		matches!(self.slot, Slot::Reserved(_))
	}
}

impl Deref for ShardConnection {
	type Target = AnyConnection;

	fn deref(&self) -> &Self::Target {
		match &self.slot {
			Slot::Reserved(guard) => guard,
			Slot::Detached(conn) => conn,
		}
	}
}

impl DerefMut for ShardConnection {
	fn deref_mut(&mut self) -> &mut Self::Target {
		match &mut self.slot {
			Slot::Reserved(guard) => guard,
			Slot::Detached(conn) => conn,
		}
	}
}

/// Routes queries to the shard selected in the calling context
///
/// Build one at the application's composition root, call [`setup`] once, and
/// share it by `Arc` with the data-access layer.
///
/// ```rust,no_run
/// use shard_handler_conf::{DatabaseConfig, ShardSettings};
/// use shard_handler_db::ShardRouter;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let router = Arc::new(ShardRouter::new());
/// router.setup(&ShardSettings::new().with_shard(
///     "shard1",
///     DatabaseConfig::postgresql("shard1", "postgres", "", "localhost", 5432),
/// ))?;
///
/// router.using("shard1", async {
///     // queries issued here run on shard1
/// }).await;
///
/// router.teardown().await;
/// # Ok(())
/// # }
/// ```
///
/// [`setup`]: ShardRouter::setup
#[derive(Default)]
pub struct ShardRouter {
	cache: RwLock<Option<PoolCache>>,
	listeners: Listeners,
}

impl ShardRouter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a listener for pool events of every shard
	pub fn add_listener(&self, listener: Arc<dyn PoolEventListener>) {
		self.listeners.add(listener);
	}

	/// Build the pool cache from `settings`
	///
	/// Pools connect lazily, so this only fails on invalid settings or when
	/// the router is already set up. Needs a tokio runtime context because
	/// sqlx starts pool maintenance tasks.
	pub fn setup(&self, settings: &ShardSettings) -> ShardResult<()> {
		if self.is_setup() {
			return Err(ShardError::Setup(
				"the router is already set up; call teardown first".to_string(),
			));
		}

		let cache = PoolCache::setup_with_listeners(settings, self.listeners.clone())?;

		let mut slot = self.cache.write();
		if slot.is_some() {
			return Err(ShardError::Setup(
				"the router is already set up; call teardown first".to_string(),
			));
		}
		*slot = Some(cache);
		Ok(())
	}

	pub fn is_setup(&self) -> bool {
		self.cache.read().is_some()
	}

	/// Close every shard pool and forget the cache
	///
	/// Idempotent. The router can be set up again afterwards.
	pub async fn teardown(&self) {
		let cache = self.cache.write().take();
		match cache {
			Some(mut cache) => {
				cache.teardown().await;
				tracing::info!("shard router torn down");
			}
			None => tracing::debug!("shard router teardown skipped: not set up"),
		}
	}

	/// Configured shard identifiers, empty before setup
	pub fn shard_ids(&self) -> Vec<ShardId> {
		self.cache
			.read()
			.as_ref()
			.map(|cache| cache.shard_ids().cloned().collect())
			.unwrap_or_default()
	}

	/// Cached pool for `shard`, without logging or error reporting
	pub(crate) fn cached_pool(&self, shard: &str) -> Option<Arc<ShardPool>> {
		self.cache
			.read()
			.as_ref()
			.and_then(|cache| cache.lookup(shard).cloned())
	}

	/// Pool of a given shard
	pub fn pool(&self, shard: &str) -> ShardResult<Arc<ShardPool>> {
		let cache = self.cache.read();
		let cache = cache
			.as_ref()
			.ok_or_else(|| ShardError::Setup("the router was not set up".to_string()))?;
		cache.lookup(shard).cloned().ok_or_else(|| {
			tracing::warn!(shard, "query routed to an unconfigured shard");
			ShardError::UnknownShard(ShardId::from(shard))
		})
	}

	/// Pool of the shard selected in the current context, `None` when no
	/// shard is selected
	pub fn current_pool(&self) -> ShardResult<Option<Arc<ShardPool>>> {
		match context::current_shard() {
			Some(shard) => self.pool(shard.as_str()).map(Some),
			None => Ok(None),
		}
	}

	/// Check out a connection for the current context
	///
	/// Inside a router scope with a shard selected, the task keeps one
	/// connection per shard reserved and reuses it across queries until the
	/// scope switches away from that shard. If the reserved connection is
	/// already borrowed, a detached connection is handed out instead.
	///
	/// That detached checkout comes from the same shard pool, so holding one
	/// connection while asking for another needs a pool of at least two
	/// connections; with `pool = 1` the second call waits until the shard's
	/// `checkout_timeout` and fails with a pool timeout.
	pub async fn connection(&self, default: &AnyPool) -> ShardResult<ShardConnection> {
		let Some(shard) = context::current_shard() else {
			return Ok(ShardConnection::detached(default.acquire().await?));
		};
		let pool = self.pool(shard.as_str())?;

		if !context::in_task_scope() {
			return Ok(ShardConnection::detached(pool.acquire().await?));
		}

		if let Some(slot) = context::reserved_slot(&shard) {
			return match slot.try_lock_owned() {
				Ok(guard) => Ok(ShardConnection::reserved(guard)),
				Err(_) => Ok(ShardConnection::detached(pool.acquire().await?)),
			};
		}

		let conn = pool.acquire().await?;
		let slot: ReservedSlot = Arc::new(Mutex::new(conn));
		let Some((slot, inserted)) = context::reserve_slot(shard, slot) else {
			return Err(ShardError::Setup("task scope ended during checkout".to_string()));
		};
		if inserted {
			pool.record_reservation();
		}
		match slot.try_lock_owned() {
			Ok(guard) => Ok(ShardConnection::reserved(guard)),
			Err(_) => Ok(ShardConnection::detached(pool.acquire().await?)),
		}
	}
}

#[async_trait]
impl PoolResolver for ShardRouter {
	fn resolve_pool(&self, default: &AnyPool) -> ShardResult<AnyPool> {
		context::with_context(|cell| {
			let state = cell.borrow();
			match state.shard.as_ref() {
				None => Ok(default.clone()),
				Some(shard) => self.pool(shard.as_str()).map(|pool| pool.inner().clone()),
			}
		})
		.unwrap_or_else(|| Ok(default.clone()))
	}

	async fn acquire(&self, default: &AnyPool) -> ShardResult<ShardConnection> {
		self.connection(default).await
	}
}
