//! Construction of a [`KitchenBoard`] from configuration.
//!
//! The builder resolves the configured storage and source implementations
//! through factory maps, so the binary decides which implementations exist
//! and the configuration decides which one is used.

use crate::assembler::OrderAssembler;
use crate::engine::{event_bus::EventBus, KitchenBoard};
use crate::preferences::FilterPreferenceStore;
use kitchen_config::Config;
use kitchen_source::{OrderSourceInterface, SourceError};
use kitchen_storage::{StorageError, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building a board.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Factory functions available to the builder, keyed by implementation name.
pub struct KitchenFactories<SF, OF> {
	pub storage_factories: HashMap<String, SF>,
	pub source_factories: HashMap<String, OF>,
}

pub struct KitchenBuilder {
	config: Config,
}

impl KitchenBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the board with an empty snapshot. Call
	/// [`KitchenBoard::refresh`] to load orders.
	pub fn build<SF, OF>(
		self,
		factories: KitchenFactories<SF, OF>,
	) -> Result<KitchenBoard, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
		OF: Fn(&toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError>,
	{
		let storage_backend = create_primary(
			"storage",
			&self.config.storage.primary,
			&self.config.storage.implementations,
			&factories.storage_factories,
		)?;
		let storage = Arc::new(StorageService::new(storage_backend));

		let source: Arc<dyn OrderSourceInterface> = Arc::from(create_primary(
			"source",
			&self.config.source.primary,
			&self.config.source.implementations,
			&factories.source_factories,
		)?);

		let board = &self.config.board;
		let assembler = OrderAssembler::new(source, board.unknown_product_label.clone());

		tracing::info!(
			board = %board.id,
			statuses = ?board.fetch_statuses,
			"Kitchen board built"
		);

		Ok(KitchenBoard::new(
			board.id.clone(),
			board.fetch_statuses.clone(),
			assembler,
			FilterPreferenceStore::new(storage),
			EventBus::default(),
		))
	}
}

/// Creates the primary implementation of one component.
///
/// Only the primary is constructed; other configured implementations are
/// validated by their factory when they become primary.
fn create_primary<T: ?Sized, E: std::fmt::Display, F>(
	component: &str,
	primary: &str,
	implementations: &HashMap<String, toml::Value>,
	factories: &HashMap<String, F>,
) -> Result<Box<T>, BuilderError>
where
	F: Fn(&toml::Value) -> Result<Box<T>, E>,
{
	let config = implementations.get(primary).ok_or_else(|| {
		BuilderError::Config(format!(
			"Primary {} '{}' has no configuration",
			component, primary
		))
	})?;

	let factory = factories.get(primary).ok_or_else(|| {
		tracing::error!(component = %component, implementation = %primary, "Unknown implementation");
		BuilderError::MissingComponent(format!(
			"No {} implementation named '{}' (available: {})",
			component,
			primary,
			available(factories)
		))
	})?;

	match factory(config) {
		Ok(implementation) => {
			tracing::info!(component = %component, implementation = %primary, "Loaded");
			Ok(implementation)
		},
		Err(e) => {
			tracing::error!(
				component = %component,
				implementation = %primary,
				error = %e,
				"Failed to create implementation"
			);
			Err(BuilderError::Config(format!(
				"Failed to create {} implementation '{}': {}",
				component, primary, e
			)))
		},
	}
}

fn available<F>(factories: &HashMap<String, F>) -> String {
	let mut names: Vec<&str> = factories.keys().map(String::as_str).collect();
	names.sort_unstable();
	names.join(", ")
}

#[cfg(test)]
mod tests {
	use super::*;
	use kitchen_config::builders::ConfigBuilder;
	use kitchen_source::SourceFactory;
	use kitchen_storage::StorageFactory;

	fn factories() -> KitchenFactories<StorageFactory, SourceFactory> {
		KitchenFactories {
			storage_factories: kitchen_storage::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			source_factories: kitchen_source::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		}
	}

	#[tokio::test]
	async fn test_builds_from_memory_config() {
		let config = ConfigBuilder::new().board_id("line-1").build();
		let board = KitchenBuilder::new(config).build(factories()).unwrap();

		assert_eq!(board.id(), "line-1");
		assert_eq!(board.refresh().await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_builds_with_file_storage_and_fixtures() {
		let dir = tempfile::TempDir::new().unwrap();
		let fixtures = dir.path().join("orders.json");
		std::fs::write(
			&fixtures,
			r#"{"orders": [{"id": 1, "status": "pending", "created_at": "2026-05-01T19:00:00Z", "total": 10}]}"#,
		)
		.unwrap();

		let mut storage = toml::map::Map::new();
		storage.insert(
			"storage_path".into(),
			toml::Value::String(dir.path().join("prefs").to_string_lossy().into_owned()),
		);
		let mut source = toml::map::Map::new();
		source.insert(
			"fixtures_path".into(),
			toml::Value::String(fixtures.to_string_lossy().into_owned()),
		);

		let config = ConfigBuilder::new()
			.storage("file", toml::Value::Table(storage))
			.source("memory", toml::Value::Table(source))
			.build();
		let board = KitchenBuilder::new(config).build(factories()).unwrap();

		assert_eq!(board.refresh().await.unwrap(), 1);
	}

	#[test]
	fn test_unknown_implementation() {
		let config = ConfigBuilder::new()
			.source("graphql", toml::Value::Table(Default::default()))
			.build();
		let err = KitchenBuilder::new(config).build(factories()).err().unwrap();
		assert!(matches!(err, BuilderError::MissingComponent(_)));
		assert!(err.to_string().contains("memory, postgrest"));
	}

	#[test]
	fn test_factory_failure_is_reported() {
		// postgrest requires base_url
		let config = ConfigBuilder::new()
			.source("postgrest", toml::Value::Table(Default::default()))
			.build();
		let err = KitchenBuilder::new(config).build(factories()).err().unwrap();
		assert!(matches!(err, BuilderError::Config(_)));
	}
}
