//! Order source for the kitchen board.
//!
//! The board never talks to a database directly. It reads orders, order lines
//! and products through [`OrderSourceInterface`], which is implemented by an
//! in-memory dataset (tests, demos, fixture files) and by a PostgREST client.
//! Status write-backs are not part of this interface; the board only reads.

use async_trait::async_trait;
use kitchen_types::{
	ConfigSchema, ImplementationRegistry, OrderId, OrderLineRecord, OrderRecord, ProductId,
	ProductRecord,
};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
	pub mod postgrest;
}

/// Errors that can occur while reading from an order source.
#[derive(Debug, Error)]
pub enum SourceError {
	/// The source could not be reached.
	#[error("Connection error: {0}")]
	Connection(String),
	/// The source answered with a non-success status.
	#[error("HTTP {status}: {message}")]
	Http { status: u16, message: String },
	/// The response could not be decoded.
	#[error("Parse error: {0}")]
	Parse(String),
	/// The implementation's configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Read operations the board needs from its data collaborator.
///
/// Implementations return records in the order the underlying collection
/// yields them. An empty id or status slice yields an empty result.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait OrderSourceInterface: Send + Sync {
	/// Returns the configuration schema for this implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Lists orders whose raw status is one of `statuses`.
	async fn list_orders(&self, statuses: &[String]) -> Result<Vec<OrderRecord>, SourceError>;

	/// Lists the lines of the given orders.
	async fn list_order_lines(
		&self,
		order_ids: &[OrderId],
	) -> Result<Vec<OrderLineRecord>, SourceError>;

	/// Lists the products with the given ids.
	async fn list_products(
		&self,
		product_ids: &[ProductId],
	) -> Result<Vec<ProductRecord>, SourceError>;
}

/// Signature of the factory every source implementation provides.
pub type SourceFactory = fn(&toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError>;

/// Registry trait for source implementations.
pub trait SourceRegistry: ImplementationRegistry<Factory = SourceFactory> {}

/// Get all registered source implementations.
pub fn get_all_implementations() -> Vec<(&'static str, SourceFactory)> {
	use implementations::{memory, postgrest};

	vec![
		(memory::Registry::NAME, memory::Registry::factory()),
		(postgrest::Registry::NAME, postgrest::Registry::factory()),
	]
}
