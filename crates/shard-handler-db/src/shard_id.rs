//! Shard identifiers

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Name of a configured shard
///
/// Cloning is a reference count bump, so identifiers can be stored in
/// context-local state and compared on every query without allocating.
///
/// # Examples
///
/// ```
/// use shard_handler_db::ShardId;
///
/// let id = ShardId::from("shard1");
/// assert_eq!(id, "shard1");
/// assert_eq!(id.to_string(), "shard1");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShardId(Arc<str>);

impl ShardId {
	pub fn new(name: impl AsRef<str>) -> Self {
		Self(Arc::from(name.as_ref()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for ShardId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ShardId({:?})", self.as_str())
	}
}

impl fmt::Display for ShardId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl AsRef<str> for ShardId {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}

impl Borrow<str> for ShardId {
	fn borrow(&self) -> &str {
		self.as_str()
	}
}

impl From<&str> for ShardId {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

impl From<String> for ShardId {
	fn from(name: String) -> Self {
		Self(Arc::from(name))
	}
}

impl From<&String> for ShardId {
	fn from(name: &String) -> Self {
		Self::new(name)
	}
}

impl From<&ShardId> for ShardId {
	fn from(id: &ShardId) -> Self {
		id.clone()
	}
}

impl PartialEq<str> for ShardId {
	fn eq(&self, other: &str) -> bool {
		self.as_str() == other
	}
}

impl PartialEq<&str> for ShardId {
	fn eq(&self, other: &&str) -> bool {
		self.as_str() == *other
	}
}
