//! Shard routing errors

use crate::shard_id::ShardId;
use shard_handler_conf::SettingsError;

/// Errors raised by the shard router
#[derive(Debug, thiserror::Error)]
pub enum ShardError {
	/// Invalid configuration, repeated setup, or a shard query before setup
	#[error("Shard setup error: {0}")]
	Setup(String),

	/// The selected shard identifier is not in the pool cache
	#[error("handler not configured for shard '{0}'")]
	UnknownShard(ShardId),

	/// Failure raised by the pooled connection itself, passed through untouched
	#[error(transparent)]
	Database(#[from] sqlx::Error),
}

impl From<SettingsError> for ShardError {
	fn from(error: SettingsError) -> Self {
		Self::Setup(error.to_string())
	}
}

/// Result type for shard routing operations
pub type ShardResult<T> = Result<T, ShardError>;
