//! PostgREST order source.
//!
//! Reads the `orders`, `order_items` and `products` tables through a
//! PostgREST endpoint (e.g. `https://<project>.supabase.co/rest/v1`). Each
//! read is a single GET with an `in.(...)` filter on the relevant column.

use crate::{OrderSourceInterface, SourceError, SourceFactory, SourceRegistry};
use async_trait::async_trait;
use kitchen_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, OrderId, OrderLineRecord, OrderRecord,
	ProductId, ProductRecord, Schema, SecretString, ValidationError,
};
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Table names, overridable for schemas that prefix or rename them.
#[derive(Debug, Clone)]
pub struct Tables {
	pub orders: String,
	pub order_items: String,
	pub products: String,
}

impl Default for Tables {
	fn default() -> Self {
		Self {
			orders: "orders".to_string(),
			order_items: "order_items".to_string(),
			products: "products".to_string(),
		}
	}
}

pub struct PostgrestSource {
	client: reqwest::Client,
	base_url: String,
	api_key: Option<SecretString>,
	tables: Tables,
}

impl PostgrestSource {
	pub fn new(
		base_url: impl Into<String>,
		api_key: Option<SecretString>,
		tables: Tables,
		timeout: Duration,
	) -> Result<Self, SourceError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| SourceError::Configuration(e.to_string()))?;

		Ok(Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
			api_key,
			tables,
		})
	}

	/// Runs `GET <base>/<table>?select=<select>&<column>=in.(...)`.
	async fn fetch<T, V>(
		&self,
		table: &str,
		select: &str,
		column: &str,
		values: &[V],
	) -> Result<Vec<T>, SourceError>
	where
		T: DeserializeOwned,
		V: Display,
	{
		if values.is_empty() {
			return Ok(Vec::new());
		}

		let url = format!("{}/{}", self.base_url, table);
		let mut request = self
			.client
			.get(&url)
			.query(&[("select", select.to_string()), (column, in_filter(values))]);

		if let Some(key) = &self.api_key {
			request = request
				.header("apikey", key.expose_secret())
				.bearer_auth(key.expose_secret());
		}

		tracing::debug!(table = %table, count = values.len(), "Querying order source");

		let response = request
			.send()
			.await
			.map_err(|e| SourceError::Connection(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let message = response.text().await.unwrap_or_default();
			return Err(SourceError::Http {
				status: status.as_u16(),
				message,
			});
		}

		response
			.json::<Vec<T>>()
			.await
			.map_err(|e| SourceError::Parse(format!("{}: {}", table, e)))
	}
}

/// Builds a PostgREST `in` filter, quoting every value.
fn in_filter<V: Display>(values: &[V]) -> String {
	let quoted: Vec<String> = values
		.iter()
		.map(|v| format!("\"{}\"", v.to_string().replace('"', "\\\"")))
		.collect();
	format!("in.({})", quoted.join(","))
}

#[async_trait]
impl OrderSourceInterface for PostgrestSource {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(PostgrestSourceSchema)
	}

	async fn list_orders(&self, statuses: &[String]) -> Result<Vec<OrderRecord>, SourceError> {
		self.fetch(&self.tables.orders, "*", "status", statuses)
			.await
	}

	async fn list_order_lines(
		&self,
		order_ids: &[OrderId],
	) -> Result<Vec<OrderLineRecord>, SourceError> {
		self.fetch(
			&self.tables.order_items,
			"order_id,product_id,quantity,price,notes",
			"order_id",
			order_ids,
		)
		.await
	}

	async fn list_products(
		&self,
		product_ids: &[ProductId],
	) -> Result<Vec<ProductRecord>, SourceError> {
		self.fetch(&self.tables.products, "id,name,image_url,price", "id", product_ids)
			.await
	}
}

/// Configuration schema for PostgrestSource.
pub struct PostgrestSourceSchema;

impl ConfigSchema for PostgrestSourceSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("base_url", FieldType::String).with_validator(|value| {
				match value.as_str() {
					Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
						Ok(())
					},
					_ => Err("base_url must start with http:// or https://".to_string()),
				}
			})],
			vec![
				Field::new("api_key", FieldType::String),
				Field::new(
					"timeout_seconds",
					FieldType::Integer {
						min: Some(1),
						max: Some(300),
					},
				),
				Field::new("orders_table", FieldType::String),
				Field::new("order_items_table", FieldType::String),
				Field::new("products_table", FieldType::String),
			],
		);
		schema.validate(config)
	}
}

/// Factory function to create a PostgREST source from configuration.
///
/// Configuration parameters:
/// - `base_url`: PostgREST root, e.g. `https://xyz.supabase.co/rest/v1` (required)
/// - `api_key`: sent as `apikey` and bearer token (optional)
/// - `timeout_seconds`: per-request timeout (default: 30)
/// - `orders_table`, `order_items_table`, `products_table`: table names
pub fn create_source(config: &toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError> {
	PostgrestSourceSchema
		.validate(config)
		.map_err(|e| SourceError::Configuration(e.to_string()))?;

	let str_setting = |name: &str| config.get(name).and_then(|v| v.as_str());

	let base_url = str_setting("base_url")
		.ok_or_else(|| SourceError::Configuration("base_url is required".into()))?;
	let api_key = str_setting("api_key")
		.map(SecretString::from)
		.filter(|key| !key.is_empty());
	let timeout = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.map(|v| v as u64)
		.unwrap_or(DEFAULT_TIMEOUT_SECONDS);

	let defaults = Tables::default();
	let tables = Tables {
		orders: str_setting("orders_table")
			.map(str::to_string)
			.unwrap_or(defaults.orders),
		order_items: str_setting("order_items_table")
			.map(str::to_string)
			.unwrap_or(defaults.order_items),
		products: str_setting("products_table")
			.map(str::to_string)
			.unwrap_or(defaults.products),
	};

	if api_key.is_none() {
		tracing::warn!(base_url = %base_url, "PostgREST source configured without api_key");
	}

	Ok(Box::new(PostgrestSource::new(
		base_url,
		api_key,
		tables,
		Duration::from_secs(timeout),
	)?))
}

/// Registry for the PostgREST source implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "postgrest";
	type Factory = SourceFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl SourceRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::{
		extract::{Query, State},
		http::{HeaderMap, StatusCode},
		response::IntoResponse,
		routing::get,
		Json, Router,
	};
	use std::collections::HashMap;
	use std::sync::{Arc, Mutex};
	use tokio::net::TcpListener;

	type Seen = Arc<Mutex<Vec<(HashMap<String, String>, Option<String>)>>>;

	async fn orders_handler(
		State(seen): State<Seen>,
		headers: HeaderMap,
		Query(query): Query<HashMap<String, String>>,
	) -> impl IntoResponse {
		let api_key = headers
			.get("apikey")
			.and_then(|v| v.to_str().ok())
			.map(str::to_string);
		seen.lock().unwrap().push((query, api_key));
		Json(serde_json::json!([
			{"id": 1, "status": "pending", "isDelivery": false, "table": 3, "created_at": "2026-03-01T12:00:00Z", "total": 20.0}
		]))
	}

	async fn failing_handler() -> impl IntoResponse {
		(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable")
	}

	async fn spawn_server(seen: Seen) -> String {
		let app = Router::new()
			.route("/orders", get(orders_handler))
			.route("/products", get(failing_handler))
			.with_state(seen);
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});
		format!("http://{}", addr)
	}

	fn source(base_url: &str) -> PostgrestSource {
		PostgrestSource::new(
			base_url,
			Some(SecretString::from("anon-key")),
			Tables::default(),
			Duration::from_secs(5),
		)
		.unwrap()
	}

	#[test]
	fn test_in_filter_quotes_values() {
		assert_eq!(in_filter(&[1, 2, 3]), r#"in.("1","2","3")"#);
		assert_eq!(
			in_filter(&["preparing".to_string(), "ready".to_string()]),
			r#"in.("preparing","ready")"#
		);
	}

	#[tokio::test]
	async fn test_list_orders_sends_filter_and_key() {
		let seen: Seen = Arc::default();
		let base_url = spawn_server(seen.clone()).await;

		let orders = source(&base_url)
			.list_orders(&["pending".to_string(), "ready".to_string()])
			.await
			.unwrap();

		assert_eq!(orders.len(), 1);
		assert_eq!(orders[0].table.as_deref(), Some("3"));

		let seen = seen.lock().unwrap();
		assert_eq!(seen.len(), 1);
		let (query, api_key) = &seen[0];
		assert_eq!(query.get("status").unwrap(), r#"in.("pending","ready")"#);
		assert_eq!(query.get("select").unwrap(), "*");
		assert_eq!(api_key.as_deref(), Some("anon-key"));
	}

	#[tokio::test]
	async fn test_http_error_is_reported() {
		let base_url = spawn_server(Arc::default()).await;

		let result = source(&base_url).list_products(&[1]).await;
		match result {
			Err(SourceError::Http { status, message }) => {
				assert_eq!(status, 500);
				assert!(message.contains("database unavailable"));
			},
			other => panic!("expected HTTP error, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_empty_ids_skip_request() {
		// nothing listens on this port; an actual request would fail
		let source = source("http://127.0.0.1:9");
		assert!(source.list_order_lines(&[]).await.unwrap().is_empty());
	}

	#[test]
	fn test_factory_validation() {
		let config: toml::Value = toml::from_str(r#"api_key = "k""#).unwrap();
		assert!(matches!(
			create_source(&config),
			Err(SourceError::Configuration(_))
		));

		let config: toml::Value = toml::from_str(
			r#"
base_url = "https://example.supabase.co/rest/v1/"
api_key = "k"
timeout_seconds = 10
orders_table = "kitchen_orders"
"#,
		)
		.unwrap();
		assert!(create_source(&config).is_ok());
	}
}
