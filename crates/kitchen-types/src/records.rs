//! Raw records returned by the order source.
//!
//! These mirror the rows of the `orders`, `order_items` and `products`
//! collections. Field aliases accept both snake_case and camelCase column
//! names so the same types work for fixture files and HTTP payloads.

use crate::{OrderId, ProductId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// A row of the orders collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
	pub id: OrderId,
	/// Raw status string, normalized during assembly.
	pub status: String,
	#[serde(default, rename = "isDelivery", alias = "is_delivery")]
	pub is_delivery: bool,
	#[serde(default, deserialize_with = "deserialize_table")]
	pub table: Option<String>,
	#[serde(rename = "createdAt", alias = "created_at")]
	pub created_at: DateTime<Utc>,
	pub total: Decimal,
	#[serde(default, rename = "assignedTo", alias = "assigned_to")]
	pub assigned_to: Option<String>,
}

/// A row of the order items collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineRecord {
	pub order_id: OrderId,
	pub product_id: ProductId,
	pub quantity: u32,
	/// Unit price charged on this order.
	pub price: Decimal,
	#[serde(default)]
	pub notes: Option<String>,
}

/// A row of the products collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
	pub id: ProductId,
	pub name: String,
	#[serde(default)]
	pub image_url: Option<String>,
	#[serde(default)]
	pub price: Option<Decimal>,
}

/// Table references show up as numbers or strings depending on the source.
#[derive(Deserialize)]
#[serde(untagged)]
enum TableRef {
	Text(String),
	Number(i64),
}

fn deserialize_table<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let table = Option::<TableRef>::deserialize(deserializer)?;
	Ok(table
		.map(|t| match t {
			TableRef::Text(s) => s.trim().to_string(),
			TableRef::Number(n) => n.to_string(),
		})
		.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_order_record_accepts_both_column_styles() {
		let camel: OrderRecord = serde_json::from_str(
			r#"{"id":1,"status":"pending","isDelivery":true,"createdAt":"2026-03-01T12:00:00Z","total":42.5}"#,
		)
		.unwrap();
		let snake: OrderRecord = serde_json::from_str(
			r#"{"id":1,"status":"pending","is_delivery":true,"created_at":"2026-03-01T12:00:00Z","total":42.5}"#,
		)
		.unwrap();

		assert_eq!(camel, snake);
		assert!(camel.is_delivery);
		assert_eq!(camel.total, Decimal::new(425, 1));
		assert_eq!(camel.table, None);
	}

	#[test]
	fn test_table_number_or_string() {
		let numeric: OrderRecord = serde_json::from_str(
			r#"{"id":2,"status":"ready","table":7,"created_at":"2026-03-01T12:00:00Z","total":10}"#,
		)
		.unwrap();
		assert_eq!(numeric.table.as_deref(), Some("7"));

		let text: OrderRecord = serde_json::from_str(
			r#"{"id":3,"status":"ready","table":"Terrace 2","created_at":"2026-03-01T12:00:00Z","total":10}"#,
		)
		.unwrap();
		assert_eq!(text.table.as_deref(), Some("Terrace 2"));

		let blank: OrderRecord = serde_json::from_str(
			r#"{"id":4,"status":"ready","table":"  ","created_at":"2026-03-01T12:00:00Z","total":10}"#,
		)
		.unwrap();
		assert_eq!(blank.table, None);

		let null: OrderRecord = serde_json::from_str(
			r#"{"id":5,"status":"ready","table":null,"created_at":"2026-03-01T12:00:00Z","total":10}"#,
		)
		.unwrap();
		assert_eq!(null.table, None);
	}

	#[test]
	fn test_product_optional_fields() {
		let product: ProductRecord = serde_json::from_str(r#"{"id":9,"name":"Pastel"}"#).unwrap();
		assert_eq!(product.image_url, None);
		assert_eq!(product.price, None);
	}
}
