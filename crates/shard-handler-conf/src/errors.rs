//! Settings errors

use std::path::PathBuf;

/// Errors raised while loading or validating shard settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	/// The settings file could not be read
	#[error("Failed to read settings file {path}: {source}")]
	Io {
		/// Path that was being read
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// TOML input could not be parsed into shard settings
	#[error("Invalid TOML settings: {0}")]
	Toml(#[from] toml::de::Error),

	/// JSON input could not be parsed into shard settings
	#[error("Invalid JSON settings: {0}")]
	Json(#[from] serde_json::Error),

	/// The file extension does not map to a supported format
	#[error("Unsupported settings format: {0} (expected .toml or .json)")]
	UnsupportedFormat(String),

	/// A shard entry is present but its parameters are unusable
	#[error("Invalid configuration for shard '{shard}': {reason}")]
	Invalid {
		/// Shard identifier of the offending entry
		shard: String,
		/// Human readable reason
		reason: String,
	},
}

impl SettingsError {
	pub(crate) fn invalid(shard: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::Invalid {
			shard: shard.into(),
			reason: reason.into(),
		}
	}
}

/// Result type for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;
