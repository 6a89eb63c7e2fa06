//! Shard pool lifecycle events

use crate::shard_id::ShardId;
use parking_lot::RwLock;
use std::sync::Arc;

/// Lifecycle events emitted by shard pools
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
	/// A pool was built for a shard during setup
	PoolCreated { shard: ShardId },
	/// A connection was checked out and pinned to the current task
	ConnectionReserved { shard: ShardId },
	/// A scope switched away from a shard and returned its reserved
	/// connections; `count` may be zero
	ConnectionsReleased { shard: ShardId, count: usize },
	/// The pool was closed during teardown
	PoolClosed { shard: ShardId },
}

impl PoolEvent {
	pub fn pool_created(shard: ShardId) -> Self {
		Self::PoolCreated { shard }
	}

	pub fn connection_reserved(shard: ShardId) -> Self {
		Self::ConnectionReserved { shard }
	}

	pub fn connections_released(shard: ShardId, count: usize) -> Self {
		Self::ConnectionsReleased { shard, count }
	}

	pub fn pool_closed(shard: ShardId) -> Self {
		Self::PoolClosed { shard }
	}

	/// Shard the event belongs to
	pub fn shard(&self) -> &ShardId {
		match self {
			Self::PoolCreated { shard }
			| Self::ConnectionReserved { shard }
			| Self::ConnectionsReleased { shard, .. }
			| Self::PoolClosed { shard } => shard,
		}
	}
}

/// Receives pool events
///
/// Events are delivered synchronously, including from scope guards running in
/// `Drop`, so implementations should return quickly and must not block.
pub trait PoolEventListener: Send + Sync {
	fn on_event(&self, event: &PoolEvent);
}

/// Listener list shared between the router and every pool it builds
#[derive(Clone, Default)]
pub(crate) struct Listeners(Arc<RwLock<Vec<Arc<dyn PoolEventListener>>>>);

impl Listeners {
	pub(crate) fn add(&self, listener: Arc<dyn PoolEventListener>) {
		self.0.write().push(listener);
	}

	pub(crate) fn emit(&self, event: PoolEvent) {
		let listeners = self.0.read();
		for listener in listeners.iter() {
			listener.on_event(&event);
		}
	}
}
