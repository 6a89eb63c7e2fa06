//! Per-shard pool configuration

use std::time::Duration;

/// Connection pool tuning for a single shard
///
/// Every shard gets its own pool built from one of these. Pools are opened
/// lazily, so `min_connections` defaults to zero.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
	pub max_connections: u32,
	pub min_connections: u32,
	/// How long a checkout may wait for a free connection
	pub acquire_timeout: Duration,
	pub idle_timeout: Option<Duration>,
	pub max_lifetime: Option<Duration>,
	pub test_before_acquire: bool,
}

impl Default for PoolConfig {
	fn default() -> Self {
		Self {
			max_connections: 5,
			min_connections: 0,
			acquire_timeout: Duration::from_secs(5),
			idle_timeout: Some(Duration::from_secs(300)),
			max_lifetime: Some(Duration::from_secs(1800)),
			test_before_acquire: true,
		}
	}
}

impl PoolConfig {
	/// Create a new pool configuration with default values
	///
	/// # Examples
	///
	/// ```rust
	/// use shard_handler_conf::PoolConfig;
	///
	/// let config = PoolConfig::new();
	/// assert_eq!(config.max_connections, 5);
	/// assert_eq!(config.min_connections, 0);
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_max_connections(mut self, max: u32) -> Self {
		self.max_connections = max;
		self
	}

	pub fn with_min_connections(mut self, min: u32) -> Self {
		self.min_connections = min;
		self
	}

	pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
		self.acquire_timeout = timeout;
		self
	}

	pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.idle_timeout = timeout;
		self
	}

	pub fn with_max_lifetime(mut self, lifetime: Option<Duration>) -> Self {
		self.max_lifetime = lifetime;
		self
	}

	pub fn with_test_before_acquire(mut self, test: bool) -> Self {
		self.test_before_acquire = test;
		self
	}

	pub fn validate(&self) -> Result<(), String> {
		if self.max_connections == 0 {
			return Err("max_connections must be greater than zero".to_string());
		}
		if self.max_connections < self.min_connections {
			return Err("max_connections must be >= min_connections".to_string());
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_default_pool_config_is_lazy() {
		// Arrange
		let config = PoolConfig::default();

		// Act
		let result = config.validate();

		// Assert
		assert!(result.is_ok());
		assert_eq!(config.min_connections, 0);
	}

	#[rstest]
	#[case(0, 0, "max_connections must be greater than zero")]
	#[case(2, 3, "max_connections must be >= min_connections")]
	fn test_validate_rejects_bad_bounds(
		#[case] max: u32,
		#[case] min: u32,
		#[case] expected: &str,
	) {
		// Arrange
		let config = PoolConfig::new()
			.with_max_connections(max)
			.with_min_connections(min);

		// Act
		let result = config.validate();

		// Assert
		assert_eq!(result, Err(expected.to_string()));
	}
}
