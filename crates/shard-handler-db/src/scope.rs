//! Scoped shard selection
//!
//! [`ShardRouter::using`] and [`ShardRouter::using_blocking`] select a shard
//! for the duration of a future or closure. On every exit path (normal
//! return, early `?`, panic unwinding, future cancellation) the scope guard:
//!
//! 1. releases the connections the context reserved from the shard selected
//!    at exit, if that differs from the selection found on entry;
//! 2. restores the selection found on entry.
//!
//! Nesting a scope for the shard that is already selected therefore leaves
//! reserved connections in place for the outer scope to reuse.

use crate::context;
use crate::router::ShardRouter;
use crate::shard_id::ShardId;
use std::future::Future;

/// Restores the entry selection and releases connections on drop
struct ScopeGuard<'a> {
	router: &'a ShardRouter,
	previous: Option<ShardId>,
}

impl<'a> ScopeGuard<'a> {
	fn enter(router: &'a ShardRouter, shard: ShardId) -> Self {
		tracing::trace!(shard = %shard, "entering shard scope");
		let previous =
			context::with_context(|cell| cell.borrow_mut().shard.replace(shard)).flatten();
		Self { router, previous }
	}
}

impl Drop for ScopeGuard<'_> {
	fn drop(&mut self) {
		let previous = self.previous.take();
		let (changed, released) = context::with_context(|cell| {
			let mut state = cell.borrow_mut();
			let current = std::mem::replace(&mut state.shard, previous.clone());
			match current {
				Some(current) if previous.as_ref() != Some(&current) => {
					let slot = state.reserved.remove(&current);
					(Some(current), slot)
				}
				_ => (None, None),
			}
		})
		.unwrap_or((None, None));

		let Some(shard) = changed else {
			return;
		};
		let count = usize::from(released.is_some());
		// Dropping the slot returns the connection to its pool, unless a
		// caller still holds it; then it goes back when that borrow ends.
		drop(released);
		if let Some(pool) = self.router.cached_pool(shard.as_str()) {
			pool.record_release(count);
		}
	}
}

impl ShardRouter {
	/// Run `fut` with `shard` selected for the current task
	///
	/// Returns whatever `fut` returns; errors from queries inside the scope
	/// are the caller's to handle. The identifier is checked when a query
	/// resolves its pool, not here.
	///
	/// Tasks spawned from inside the scope do not inherit the selection;
	/// wrap their futures in `using` as well.
	pub async fn using<F>(&self, shard: impl Into<ShardId>, fut: F) -> F::Output
	where
		F: Future,
	{
		let shard = shard.into();
		context::task_scope(async move {
			let _guard = ScopeGuard::enter(self, shard);
			fut.await
		})
		.await
	}

	/// Run `f` with `shard` selected for the current context
	///
	/// Intended for synchronous code. Inside a router scope it updates the
	/// task's state; anywhere else, runtime threads included, the selection
	/// lives in a thread-local for the duration of `f`.
	pub fn using_blocking<R>(&self, shard: impl Into<ShardId>, f: impl FnOnce() -> R) -> R {
		let _blocking = context::BlockingScope::enter();
		let _guard = ScopeGuard::enter(self, shard.into());
		f()
	}

	/// Run `fut` in a task context of its own without selecting a shard
	///
	/// Inside the future [`set_current_shard`] and [`select_shard`] work and
	/// only affect this task. Unlike [`using`](Self::using) no release step
	/// runs on exit; reserved connections are returned when the scope ends.
	///
	/// [`set_current_shard`]: crate::context::set_current_shard
	/// [`select_shard`]: crate::context::select_shard
	pub async fn scope<F>(&self, fut: F) -> F::Output
	where
		F: Future,
	{
		context::task_scope(fut).await
	}
}
