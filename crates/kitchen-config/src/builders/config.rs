use crate::{ApiConfig, BoardConfig, Config, SourceConfig, StorageConfig};
use std::collections::HashMap;

/// Builds a [`Config`] backed by in-memory storage and an in-memory source.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	board_id: String,
	unknown_product_label: String,
	fetch_statuses: Option<Vec<String>>,
	storage_primary: String,
	storage_config: toml::Value,
	source_primary: String,
	source_config: toml::Value,
	api: Option<ApiConfig>,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	pub fn new() -> Self {
		Self {
			board_id: "test-board".to_string(),
			unknown_product_label: "Unknown product".to_string(),
			fetch_statuses: None,
			storage_primary: "memory".to_string(),
			storage_config: toml::Value::Table(Default::default()),
			source_primary: "memory".to_string(),
			source_config: toml::Value::Table(Default::default()),
			api: None,
		}
	}

	pub fn board_id(mut self, id: impl Into<String>) -> Self {
		self.board_id = id.into();
		self
	}

	pub fn unknown_product_label(mut self, label: impl Into<String>) -> Self {
		self.unknown_product_label = label.into();
		self
	}

	pub fn fetch_statuses(mut self, statuses: Vec<String>) -> Self {
		self.fetch_statuses = Some(statuses);
		self
	}

	/// Selects the storage implementation and its settings.
	pub fn storage(mut self, primary: impl Into<String>, config: toml::Value) -> Self {
		self.storage_primary = primary.into();
		self.storage_config = config;
		self
	}

	/// Selects the source implementation and its settings.
	pub fn source(mut self, primary: impl Into<String>, config: toml::Value) -> Self {
		self.source_primary = primary.into();
		self.source_config = config;
		self
	}

	pub fn api(mut self, api: Option<ApiConfig>) -> Self {
		self.api = api;
		self
	}

	pub fn build(self) -> Config {
		Config {
			board: BoardConfig {
				id: self.board_id,
				unknown_product_label: self.unknown_product_label,
				fetch_statuses: self
					.fetch_statuses
					.unwrap_or_else(kitchen_types::OrderStatus::all_raw),
			},
			storage: StorageConfig {
				implementations: HashMap::from([(
					self.storage_primary.clone(),
					self.storage_config,
				)]),
				primary: self.storage_primary,
			},
			source: SourceConfig {
				implementations: HashMap::from([(
					self.source_primary.clone(),
					self.source_config,
				)]),
				primary: self.source_primary,
			},
			api: self.api,
		}
	}
}
