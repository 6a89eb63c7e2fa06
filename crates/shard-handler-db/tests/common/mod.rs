//! Shared fixtures: sqlite-file shards with distinct marker rows
#![allow(dead_code)]

use shard_handler_conf::{DatabaseConfig, ShardSettings};
use shard_handler_db::{PoolEvent, PoolEventListener};
use sqlx::AnyPool;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Two shard databases plus an empty "root" database used as default pool
pub struct ShardFixture {
	pub dir: TempDir,
	pub settings: ShardSettings,
	pub default: AnyPool,
}

impl ShardFixture {
	pub fn path(&self, file: &str) -> PathBuf {
		self.dir.path().join(file)
	}
}

fn sqlite_url(path: &Path, create: bool) -> String {
	if create {
		format!("sqlite://{}?mode=rwc", path.display())
	} else {
		format!("sqlite://{}", path.display())
	}
}

/// Create a shard database holding a `posts` table with one marker row
pub async fn create_shard_db(path: &Path, marker: &str) {
	let pool = AnyPool::connect(&sqlite_url(path, true))
		.await
		.expect("Failed to create shard database");
	sqlx::query("CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT NOT NULL)")
		.execute(&pool)
		.await
		.expect("Failed to create posts table");
	sqlx::query(&format!("INSERT INTO posts (title) VALUES ('{}')", marker))
		.execute(&pool)
		.await
		.expect("Failed to insert marker row");
	pool.close().await;
}

pub async fn shard_fixture() -> ShardFixture {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
	sqlx::any::install_default_drivers();
	let dir = tempfile::tempdir().expect("Failed to create temp dir");

	let shard1 = dir.path().join("shard1.db");
	let shard2 = dir.path().join("shard2.db");
	create_shard_db(&shard1, "post from shard1").await;
	create_shard_db(&shard2, "post from shard2").await;

	// The root database exists but has no posts table
	let root = dir.path().join("root.db");
	let default = AnyPool::connect(&sqlite_url(&root, true))
		.await
		.expect("Failed to open root database");

	let settings = ShardSettings::new()
		.with_shard(
			"shard1",
			DatabaseConfig::sqlite(shard1.to_string_lossy()).with_pool_size(2),
		)
		.with_shard(
			"shard2",
			DatabaseConfig::sqlite(shard2.to_string_lossy()).with_pool_size(2),
		);

	ShardFixture {
		dir,
		settings,
		default,
	}
}

/// Listener that records every event it receives
#[derive(Default)]
pub struct RecordingListener {
	events: Mutex<Vec<PoolEvent>>,
}

impl RecordingListener {
	pub fn events(&self) -> Vec<PoolEvent> {
		self.events.lock().unwrap().clone()
	}

	pub fn releases(&self) -> Vec<(String, usize)> {
		self.events()
			.into_iter()
			.filter_map(|event| match event {
				PoolEvent::ConnectionsReleased { shard, count } => {
					Some((shard.to_string(), count))
				}
				_ => None,
			})
			.collect()
	}
}

impl PoolEventListener for RecordingListener {
	fn on_event(&self, event: &PoolEvent) {
		self.events.lock().unwrap().push(event.clone());
	}
}
