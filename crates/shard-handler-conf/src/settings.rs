//! Shard settings: the identifier → connection parameters mapping

use crate::database_config::DatabaseConfig;
use crate::errors::{SettingsError, SettingsResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Mapping from shard identifier to its connection parameters
///
/// The mapping keeps insertion (file) order so setup and logging walk shards
/// in the order they were declared.
///
/// # Examples
///
/// ```
/// use shard_handler_conf::ShardSettings;
///
/// let settings = ShardSettings::from_toml_str(r#"
///     [shard1]
///     adapter = "postgresql"
///     database = "shard1"
///     username = "postgres"
///
///     [shard2]
///     adapter = "sqlite3"
///     database = ":memory:"
/// "#).unwrap();
///
/// assert_eq!(settings.names().collect::<Vec<_>>(), vec!["shard1", "shard2"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShardSettings {
	shards: IndexMap<String, DatabaseConfig>,
}

impl ShardSettings {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a shard entry, replacing any entry with the same identifier
	pub fn with_shard(mut self, name: impl Into<String>, config: DatabaseConfig) -> Self {
		self.insert(name, config);
		self
	}

	pub fn insert(&mut self, name: impl Into<String>, config: DatabaseConfig) -> Option<DatabaseConfig> {
		self.shards.insert(name.into(), config)
	}

	pub fn get(&self, name: &str) -> Option<&DatabaseConfig> {
		self.shards.get(name)
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.shards.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &DatabaseConfig)> {
		self.shards.iter().map(|(name, config)| (name.as_str(), config))
	}

	pub fn len(&self) -> usize {
		self.shards.len()
	}

	pub fn is_empty(&self) -> bool {
		self.shards.is_empty()
	}

	/// Parse settings from a TOML document whose top-level tables are shards
	pub fn from_toml_str(input: &str) -> SettingsResult<Self> {
		let settings: Self = toml::from_str(input)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Parse settings from a JSON object whose keys are shard identifiers
	pub fn from_json_str(input: &str) -> SettingsResult<Self> {
		let settings: Self = serde_json::from_str(input)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Load settings from a `.toml` or `.json` file
	pub fn from_file(path: impl AsRef<Path>) -> SettingsResult<Self> {
		let path = path.as_ref();
		let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
			path: path.to_path_buf(),
			source,
		})?;

		match path.extension().and_then(|ext| ext.to_str()) {
			Some("toml") => Self::from_toml_str(&contents),
			Some("json") => Self::from_json_str(&contents),
			other => Err(SettingsError::UnsupportedFormat(
				other.unwrap_or("<none>").to_string(),
			)),
		}
	}

	/// Check every entry; the first invalid shard is reported
	pub fn validate(&self) -> SettingsResult<()> {
		for (name, config) in &self.shards {
			if name.trim().is_empty() {
				return Err(SettingsError::invalid(name.as_str(), "empty shard identifier"));
			}
			config
				.validate()
				.map_err(|reason| SettingsError::invalid(name.as_str(), reason))?;
		}
		Ok(())
	}
}

impl FromIterator<(String, DatabaseConfig)> for ShardSettings {
	fn from_iter<I: IntoIterator<Item = (String, DatabaseConfig)>>(iter: I) -> Self {
		Self {
			shards: iter.into_iter().collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_json_settings_accept_null_password_and_extra_options() {
		// Arrange
		let input = r#"{
			"shard1": {
				"adapter": "postgresql",
				"encoding": "unicode",
				"database": "shard1",
				"username": "postgres",
				"password": null
			}
		}"#;

		// Act
		let settings = ShardSettings::from_json_str(input).unwrap();

		// Assert
		let shard1 = settings.get("shard1").unwrap();
		assert_eq!(shard1.password, None);
		assert_eq!(
			shard1.options.get("encoding").map(ToString::to_string),
			Some("unicode".to_string())
		);
	}

	#[rstest]
	fn test_numeric_strings_are_accepted() {
		// Arrange
		let input = r#"{
			"shard1": { "adapter": "mysql", "database": "app", "port": "3307", "pool": 8 }
		}"#;

		// Act
		let settings = ShardSettings::from_json_str(input).unwrap();

		// Assert
		let shard1 = settings.get("shard1").unwrap();
		assert_eq!(shard1.port, Some(3307));
		assert_eq!(shard1.pool_config().max_connections, 8);
	}

	#[rstest]
	fn test_invalid_entry_names_the_shard() {
		// Arrange
		let input = r#"
			[good]
			adapter = "sqlite3"
			database = "good.db"

			[bad]
			adapter = "oracle"
			database = "bad"
		"#;

		// Act
		let result = ShardSettings::from_toml_str(input);

		// Assert
		match result {
			Err(SettingsError::Invalid { shard, reason }) => {
				assert_eq!(shard, "bad");
				assert_eq!(reason, "unknown adapter 'oracle'");
			}
			other => panic!("expected invalid settings error, got {:?}", other),
		}
	}

	#[rstest]
	fn test_builder_keeps_declaration_order() {
		// Arrange
		let settings = ShardSettings::new()
			.with_shard("b", DatabaseConfig::sqlite("b.db"))
			.with_shard("a", DatabaseConfig::sqlite("a.db"));

		// Act
		let names: Vec<&str> = settings.names().collect();

		// Assert
		assert_eq!(names, vec!["b", "a"]);
		assert_eq!(settings.len(), 2);
	}
}
