//! Minimal data-access layer wired to a [`PoolResolver`]
//!
//! [`ShardedExecutor`] stands in for the ORM side of the integration: it owns
//! the application's default pool and, when a resolver is attached, asks it
//! for a connection before every statement. Without a resolver it behaves as
//! a plain, unsharded executor.

use crate::errors::ShardResult;
use crate::router::{PoolResolver, ShardConnection};
use async_trait::async_trait;
use sqlx::AnyPool;
use sqlx::any::AnyRow;
use std::sync::Arc;

/// Statement execution interface used by models
#[async_trait]
pub trait DatabaseExecutor: Send + Sync {
	/// Run a statement and return the number of affected rows
	async fn execute(&self, sql: &str) -> ShardResult<u64>;

	/// Run a query and return every row
	async fn query(&self, sql: &str) -> ShardResult<Vec<AnyRow>>;
}

/// Executes SQL on the default pool or on the pool picked by a resolver
#[derive(Clone)]
pub struct ShardedExecutor {
	default: AnyPool,
	resolver: Option<Arc<dyn PoolResolver>>,
}

impl ShardedExecutor {
	/// Unsharded executor running everything on `default`
	pub fn new(default: AnyPool) -> Self {
		Self {
			default,
			resolver: None,
		}
	}

	/// Route every statement through `resolver`
	pub fn with_resolver(mut self, resolver: Arc<dyn PoolResolver>) -> Self {
		self.resolver = Some(resolver);
		self
	}

	pub fn default_pool(&self) -> &AnyPool {
		&self.default
	}

	pub fn is_sharded(&self) -> bool {
		self.resolver.is_some()
	}

	/// Pool the next statement would run on
	pub fn pool(&self) -> ShardResult<AnyPool> {
		match &self.resolver {
			Some(resolver) => resolver.resolve_pool(&self.default),
			None => Ok(self.default.clone()),
		}
	}

	/// Check out the connection the next statement would run on
	pub async fn connection(&self) -> ShardResult<ShardConnection> {
		match &self.resolver {
			Some(resolver) => resolver.acquire(&self.default).await,
			None => Ok(ShardConnection::detached(self.default.acquire().await?)),
		}
	}

	/// Run a query and return the first column of every row as text
	pub async fn pluck(&self, sql: &str) -> ShardResult<Vec<String>> {
		let mut conn = self.connection().await?;
		let values = sqlx::query_scalar::<_, String>(sql)
			.fetch_all(&mut *conn)
			.await?;
		Ok(values)
	}
}

#[async_trait]
impl DatabaseExecutor for ShardedExecutor {
	async fn execute(&self, sql: &str) -> ShardResult<u64> {
		let mut conn = self.connection().await?;
		let result = sqlx::query(sql).execute(&mut *conn).await?;
		Ok(result.rows_affected())
	}

	async fn query(&self, sql: &str) -> ShardResult<Vec<AnyRow>> {
		let mut conn = self.connection().await?;
		Ok(sqlx::query(sql).fetch_all(&mut *conn).await?)
	}
}
