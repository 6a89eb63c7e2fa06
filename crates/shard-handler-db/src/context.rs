//! Context-local shard selection
//!
//! The currently selected shard is stored per execution context:
//!
//! - inside a router scope (see [`ShardRouter::using`] and
//!   [`ShardRouter::scope`]) it lives in a tokio task-local, so it follows the
//!   task across worker threads and is never visible to other tasks;
//! - on a thread without a tokio runtime, or inside
//!   [`ShardRouter::using_blocking`], it lives in an OS thread-local.
//!
//! A runtime thread outside any router scope has no context at all: every
//! task polled there shares the thread, so reads return `None` and writes
//! fail with [`ShardError::Setup`].
//!
//! Nothing here is shared between contexts, so no locking is involved.
//!
//! [`ShardRouter::using`]: crate::router::ShardRouter::using
//! [`ShardRouter::scope`]: crate::router::ShardRouter::scope
//! [`ShardRouter::using_blocking`]: crate::router::ShardRouter::using_blocking

use crate::errors::{ShardError, ShardResult};
use crate::shard_id::ShardId;
use sqlx::Any;
use sqlx::pool::PoolConnection;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Connection pinned to a task for one shard
pub(crate) type ReservedSlot = Arc<Mutex<PoolConnection<Any>>>;

/// Per-context state: the selection plus connections pinned to the context
#[derive(Default)]
pub(crate) struct ContextState {
	pub(crate) shard: Option<ShardId>,
	pub(crate) reserved: HashMap<ShardId, ReservedSlot>,
}

tokio::task_local! {
	/// Task-local state, set up by the outermost router scope of a task.
	static TASK_CONTEXT: RefCell<ContextState>;
}

thread_local! {
	static THREAD_CONTEXT: RefCell<ContextState> = RefCell::new(ContextState::default());
	/// Number of synchronous scopes currently open on this thread
	static BLOCKING_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Where the calling context keeps its selection
enum Storage {
	Task,
	Thread,
	Unscoped,
}

fn storage() -> Storage {
	if in_task_scope() {
		Storage::Task
	} else if BLOCKING_DEPTH.with(Cell::get) > 0 || tokio::runtime::Handle::try_current().is_err()
	{
		Storage::Thread
	} else {
		Storage::Unscoped
	}
}

fn unscoped_error() -> ShardError {
	ShardError::Setup(
		"no shard context in this task; run it inside ShardRouter::scope or ShardRouter::using"
			.to_string(),
	)
}

/// Whether the caller runs inside a task-local router scope
pub fn in_task_scope() -> bool {
	TASK_CONTEXT.try_with(|_| ()).is_ok()
}

/// Run `f` against the active context state, `None` when there is none
pub(crate) fn with_context<R>(f: impl FnOnce(&RefCell<ContextState>) -> R) -> Option<R> {
	match storage() {
		Storage::Task => Some(TASK_CONTEXT.with(f)),
		Storage::Thread => Some(THREAD_CONTEXT.with(f)),
		Storage::Unscoped => None,
	}
}

/// Run `fut` inside a task-local scope, creating one if none is active
///
/// A new scope starts from the selection visible to the caller, so
/// `current_shard()` reads the same value just inside and just outside it.
pub(crate) async fn task_scope<F>(fut: F) -> F::Output
where
	F: Future,
{
	if in_task_scope() {
		fut.await
	} else {
		let seed = ContextState {
			shard: current_shard(),
			reserved: HashMap::new(),
		};
		TASK_CONTEXT.scope(RefCell::new(seed), fut).await
	}
}

/// Marks the current thread as running a synchronous scope
///
/// Only needed outside a task scope; the thread-local is then safe to use
/// because nothing can interleave with the synchronous body.
pub(crate) struct BlockingScope {
	active: bool,
	_context: PhantomData<*const ()>,
}

impl BlockingScope {
	pub(crate) fn enter() -> Self {
		let active = !in_task_scope();
		if active {
			BLOCKING_DEPTH.with(|depth| depth.set(depth.get() + 1));
		}
		Self {
			active,
			_context: PhantomData,
		}
	}
}

impl Drop for BlockingScope {
	fn drop(&mut self) {
		if self.active {
			BLOCKING_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
		}
	}
}

/// Returns the shard selected in the current context, if any.
///
/// # Examples
///
/// ```
/// use shard_handler_db::context::{current_shard, set_current_shard};
/// use shard_handler_db::ShardId;
///
/// set_current_shard(Some(ShardId::from("shard1"))).unwrap();
/// assert_eq!(current_shard(), Some(ShardId::from("shard1")));
///
/// set_current_shard(None).unwrap();
/// assert_eq!(current_shard(), None);
/// ```
pub fn current_shard() -> Option<ShardId> {
	with_context(|cell| cell.borrow().shard.clone()).flatten()
}

/// Sets (or clears, with `None`) the shard for the current context.
///
/// The identifier is not checked here; an unknown shard is reported when a
/// query resolves its pool. Fails with [`ShardError::Setup`] when called from
/// a runtime thread outside any router scope.
pub fn set_current_shard(shard: Option<ShardId>) -> ShardResult<()> {
	with_context(|cell| cell.borrow_mut().shard = shard).ok_or_else(unscoped_error)
}

/// Reserved connection for `shard` in the current task scope
pub(crate) fn reserved_slot(shard: &ShardId) -> Option<ReservedSlot> {
	TASK_CONTEXT
		.try_with(|cell| cell.borrow().reserved.get(shard).cloned())
		.ok()
		.flatten()
}

/// Pin `slot` to the current task scope unless another one got there first
///
/// Returns the slot that ends up reserved and whether it was inserted, or
/// `None` outside a task scope.
pub(crate) fn reserve_slot(shard: ShardId, slot: ReservedSlot) -> Option<(ReservedSlot, bool)> {
	TASK_CONTEXT
		.try_with(|cell| {
			let mut state = cell.borrow_mut();
			match state.reserved.get(&shard) {
				Some(existing) => (existing.clone(), false),
				None => {
					state.reserved.insert(shard, slot.clone());
					(slot, true)
				}
			}
		})
		.ok()
}

/// RAII guard for a synchronous shard selection.
///
/// Restores the previous selection when dropped. Unlike a router scope it
/// does not release reserved connections. The guard is tied to the context
/// that created it and is therefore neither `Send` nor `Sync`.
///
/// # Examples
///
/// ```
/// use shard_handler_db::context::{current_shard, select_shard};
///
/// assert_eq!(current_shard(), None);
/// {
///     let _guard = select_shard("shard2").unwrap();
///     assert_eq!(current_shard().as_ref().map(|s| s.as_str()), Some("shard2"));
/// }
/// assert_eq!(current_shard(), None);
/// ```
#[must_use = "the selection is reverted as soon as the guard is dropped"]
pub struct ShardGuard {
	previous: Option<ShardId>,
	_context: PhantomData<*const ()>,
}

impl Drop for ShardGuard {
	fn drop(&mut self) {
		let previous = self.previous.take();
		with_context(|cell| cell.borrow_mut().shard = previous);
	}
}

/// Selects `shard` until the returned guard is dropped
///
/// Fails like [`set_current_shard`] when the caller has no context.
pub fn select_shard(shard: impl Into<ShardId>) -> ShardResult<ShardGuard> {
	let shard = shard.into();
	let previous = with_context(|cell| cell.borrow_mut().shard.replace(shard))
		.ok_or_else(unscoped_error)?;
	Ok(ShardGuard {
		previous,
		_context: PhantomData,
	})
}
