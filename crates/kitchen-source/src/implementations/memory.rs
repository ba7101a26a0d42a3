//! In-memory order source.
//!
//! Holds a [`Dataset`] of raw records. It can be seeded from a JSON fixture
//! file through the `fixtures_path` setting, which makes it usable for demos
//! and for running the board without a database.

use crate::{OrderSourceInterface, SourceError, SourceFactory, SourceRegistry};
use async_trait::async_trait;
use kitchen_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, OrderId, OrderLineRecord, OrderRecord,
	ProductId, ProductRecord, Schema, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The three collections the board reads from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
	#[serde(default)]
	pub orders: Vec<OrderRecord>,
	#[serde(default)]
	pub order_items: Vec<OrderLineRecord>,
	#[serde(default)]
	pub products: Vec<ProductRecord>,
}

impl Dataset {
	/// Reads a dataset from a JSON file.
	pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| {
			SourceError::Configuration(format!("Cannot read {}: {}", path.display(), e))
		})?;
		serde_json::from_str(&content)
			.map_err(|e| SourceError::Parse(format!("{}: {}", path.display(), e)))
	}
}

pub struct MemorySource {
	dataset: Arc<RwLock<Dataset>>,
}

impl MemorySource {
	pub fn new(dataset: Dataset) -> Self {
		Self {
			dataset: Arc::new(RwLock::new(dataset)),
		}
	}

	/// Replaces the whole dataset. The next load sees the new records.
	pub async fn replace(&self, dataset: Dataset) {
		*self.dataset.write().await = dataset;
	}

	/// Changes the raw status of one order record, as another terminal would.
	pub async fn set_status(&self, order_id: OrderId, status: &str) -> bool {
		let mut dataset = self.dataset.write().await;
		match dataset.orders.iter_mut().find(|o| o.id == order_id) {
			Some(order) => {
				order.status = status.to_string();
				true
			},
			None => false,
		}
	}
}

impl Default for MemorySource {
	fn default() -> Self {
		Self::new(Dataset::default())
	}
}

#[async_trait]
impl OrderSourceInterface for MemorySource {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemorySourceSchema)
	}

	async fn list_orders(&self, statuses: &[String]) -> Result<Vec<OrderRecord>, SourceError> {
		let wanted: HashSet<&str> = statuses.iter().map(String::as_str).collect();
		let dataset = self.dataset.read().await;
		Ok(dataset
			.orders
			.iter()
			.filter(|o| wanted.contains(o.status.as_str()))
			.cloned()
			.collect())
	}

	async fn list_order_lines(
		&self,
		order_ids: &[OrderId],
	) -> Result<Vec<OrderLineRecord>, SourceError> {
		let wanted: HashSet<OrderId> = order_ids.iter().copied().collect();
		let dataset = self.dataset.read().await;
		Ok(dataset
			.order_items
			.iter()
			.filter(|line| wanted.contains(&line.order_id))
			.cloned()
			.collect())
	}

	async fn list_products(
		&self,
		product_ids: &[ProductId],
	) -> Result<Vec<ProductRecord>, SourceError> {
		let wanted: HashSet<ProductId> = product_ids.iter().copied().collect();
		let dataset = self.dataset.read().await;
		Ok(dataset
			.products
			.iter()
			.filter(|p| wanted.contains(&p.id))
			.cloned()
			.collect())
	}
}

/// Configuration schema for MemorySource.
pub struct MemorySourceSchema;

impl ConfigSchema for MemorySourceSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(vec![], vec![Field::new("fixtures_path", FieldType::String)]);
		schema.validate(config)
	}
}

/// Factory function to create a memory source from configuration.
///
/// Configuration parameters:
/// - `fixtures_path`: optional JSON file with `orders`, `order_items` and
///   `products` arrays. Without it the source starts empty.
pub fn create_source(config: &toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError> {
	MemorySourceSchema
		.validate(config)
		.map_err(|e| SourceError::Configuration(e.to_string()))?;

	let dataset = match config.get("fixtures_path").and_then(|v| v.as_str()) {
		Some(path) => {
			let dataset = Dataset::from_json_file(path)?;
			tracing::info!(
				path = %path,
				orders = dataset.orders.len(),
				lines = dataset.order_items.len(),
				products = dataset.products.len(),
				"Loaded order fixtures"
			);
			dataset
		},
		None => Dataset::default(),
	};

	Ok(Box::new(MemorySource::new(dataset)))
}

/// Registry for the memory source implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = SourceFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl SourceRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use rust_decimal::Decimal;

	fn order(id: OrderId, status: &str) -> OrderRecord {
		OrderRecord {
			id,
			status: status.to_string(),
			is_delivery: false,
			table: None,
			created_at: Utc::now(),
			total: Decimal::ZERO,
			assigned_to: None,
		}
	}

	fn line(order_id: OrderId, product_id: ProductId) -> OrderLineRecord {
		OrderLineRecord {
			order_id,
			product_id,
			quantity: 1,
			price: Decimal::ONE,
			notes: None,
		}
	}

	fn dataset() -> Dataset {
		Dataset {
			orders: vec![order(1, "pending"), order(2, "ready"), order(3, "cancelled")],
			order_items: vec![line(1, 10), line(2, 11), line(3, 12), line(1, 11)],
			products: vec![
				ProductRecord {
					id: 10,
					name: "Coxinha".into(),
					image_url: None,
					price: None,
				},
				ProductRecord {
					id: 11,
					name: "Guaraná".into(),
					image_url: None,
					price: None,
				},
			],
		}
	}

	#[tokio::test]
	async fn test_filters_by_status_and_keeps_order() {
		let source = MemorySource::new(dataset());

		let orders = source
			.list_orders(&["ready".to_string(), "pending".to_string()])
			.await
			.unwrap();
		assert_eq!(orders.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 2]);

		assert!(source.list_orders(&[]).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_lines_and_products_by_id() {
		let source = MemorySource::new(dataset());

		let lines = source.list_order_lines(&[1]).await.unwrap();
		assert_eq!(
			lines.iter().map(|l| l.product_id).collect::<Vec<_>>(),
			vec![10, 11]
		);

		let products = source.list_products(&[11, 99]).await.unwrap();
		assert_eq!(products.len(), 1);
		assert_eq!(products[0].name, "Guaraná");
	}

	#[tokio::test]
	async fn test_set_status() {
		let source = MemorySource::new(dataset());
		assert!(source.set_status(3, "queued").await);
		assert!(!source.set_status(42, "queued").await);

		let orders = source.list_orders(&["queued".to_string()]).await.unwrap();
		assert_eq!(orders.len(), 1);
		assert_eq!(orders[0].id, 3);
	}

	#[tokio::test]
	async fn test_factory_loads_fixture_file() {
		let dir = tempfile::TempDir::new().unwrap();
		let path = dir.path().join("fixtures.json");
		std::fs::write(
			&path,
			r#"{
				"orders": [{"id": 5, "status": "preparing", "is_delivery": true, "created_at": "2026-03-01T18:30:00Z", "total": 31.9}],
				"order_items": [{"order_id": 5, "product_id": 1, "quantity": 2, "price": 15.95}],
				"products": [{"id": 1, "name": "X-Burger", "image_url": "burger.png"}]
			}"#,
		)
		.unwrap();

		let mut table = toml::map::Map::new();
		table.insert(
			"fixtures_path".to_string(),
			toml::Value::String(path.to_string_lossy().into_owned()),
		);
		let source = create_source(&toml::Value::Table(table)).unwrap();

		let orders = source.list_orders(&["preparing".to_string()]).await.unwrap();
		assert_eq!(orders.len(), 1);
		assert!(orders[0].is_delivery);
		assert_eq!(source.list_order_lines(&[5]).await.unwrap().len(), 1);
	}

	#[test]
	fn test_factory_reports_missing_fixture() {
		let config: toml::Value =
			toml::from_str(r#"fixtures_path = "/nonexistent/fixtures.json""#).unwrap();
		assert!(matches!(
			create_source(&config),
			Err(SourceError::Configuration(_))
		));
	}
}
