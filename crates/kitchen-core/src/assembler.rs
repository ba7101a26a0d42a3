//! Assembly of display-ready orders from raw source records.
//!
//! A load issues at most three reads against the order source: the orders
//! matching a status set, the lines of those orders, and the products those
//! lines reference. Reads that have nothing to ask for are skipped. Any failed
//! read fails the whole assembly, so callers never see a partial result.

use kitchen_source::{OrderSourceInterface, SourceError};
use kitchen_types::{
	Channel, Order, OrderId, OrderLine, OrderLineRecord, OrderRecord, OrderStatus, ProductId,
	ProductRecord,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while assembling orders.
#[derive(Debug, Error)]
pub enum AssemblyError {
	#[error("Failed to fetch orders: {0}")]
	Orders(#[source] SourceError),
	#[error("Failed to fetch order lines: {0}")]
	Lines(#[source] SourceError),
	#[error("Failed to fetch products: {0}")]
	Products(#[source] SourceError),
}

/// Joins orders, order lines and products into [`Order`] aggregates.
pub struct OrderAssembler {
	source: Arc<dyn OrderSourceInterface>,
	unknown_product_label: String,
}

impl OrderAssembler {
	pub fn new(
		source: Arc<dyn OrderSourceInterface>,
		unknown_product_label: impl Into<String>,
	) -> Self {
		Self {
			source,
			unknown_product_label: unknown_product_label.into(),
		}
	}

	/// Loads and assembles every order whose raw status is in `statuses`.
	///
	/// Records with a status the board does not track are skipped.
	pub async fn load(&self, statuses: &[String]) -> Result<Vec<Order>, AssemblyError> {
		let records = self
			.source
			.list_orders(statuses)
			.await
			.map_err(AssemblyError::Orders)?;

		let headers: Vec<(OrderRecord, OrderStatus)> = records
			.into_iter()
			.filter_map(|record| match OrderStatus::from_raw(&record.status) {
				Some(status) => Some((record, status)),
				None => {
					tracing::warn!(
						order_id = record.id,
						status = %record.status,
						"Skipping order with unknown status"
					);
					None
				},
			})
			.collect();

		if headers.is_empty() {
			return Ok(Vec::new());
		}

		let order_ids: Vec<OrderId> = headers.iter().map(|(record, _)| record.id).collect();
		let lines = self
			.source
			.list_order_lines(&order_ids)
			.await
			.map_err(AssemblyError::Lines)?;
		let products = self.fetch_products(&lines).await?;

		let mut lines_by_order: HashMap<OrderId, Vec<OrderLine>> = HashMap::new();
		for line in lines {
			let order_id = line.order_id;
			lines_by_order
				.entry(order_id)
				.or_default()
				.push(self.resolve_line(line, &products));
		}

		let orders: Vec<Order> = headers
			.into_iter()
			.map(|(record, status)| {
				let items = lines_by_order.remove(&record.id).unwrap_or_default();
				header_to_order(record, status, items)
			})
			.collect();

		tracing::debug!(count = orders.len(), "Assembled orders");
		Ok(orders)
	}

	/// Re-reads the lines of one order and returns it with fresh items.
	///
	/// Everything except `items` is taken from `order` unchanged.
	pub async fn detail(&self, order: &Order) -> Result<Order, AssemblyError> {
		let lines = self
			.source
			.list_order_lines(&[order.id])
			.await
			.map_err(AssemblyError::Lines)?;
		let products = self.fetch_products(&lines).await?;

		let items = lines
			.into_iter()
			.filter(|line| line.order_id == order.id)
			.map(|line| self.resolve_line(line, &products))
			.collect();

		Ok(Order {
			items,
			..order.clone()
		})
	}

	/// Fetches the products referenced by `lines`, each id once.
	async fn fetch_products(
		&self,
		lines: &[OrderLineRecord],
	) -> Result<HashMap<ProductId, ProductRecord>, AssemblyError> {
		let mut seen = HashSet::new();
		let product_ids: Vec<ProductId> = lines
			.iter()
			.map(|line| line.product_id)
			.filter(|id| seen.insert(*id))
			.collect();

		if product_ids.is_empty() {
			return Ok(HashMap::new());
		}

		let products = self
			.source
			.list_products(&product_ids)
			.await
			.map_err(AssemblyError::Products)?;

		Ok(products.into_iter().map(|p| (p.id, p)).collect())
	}

	fn resolve_line(
		&self,
		line: OrderLineRecord,
		products: &HashMap<ProductId, ProductRecord>,
	) -> OrderLine {
		let product = products.get(&line.product_id);
		OrderLine {
			product_id: line.product_id,
			product_name: product
				.map(|p| p.name.clone())
				.unwrap_or_else(|| self.unknown_product_label.clone()),
			image_ref: product.and_then(|p| p.image_url.clone()),
			quantity: line.quantity,
			unit_price: line.price,
			notes: line.notes.filter(|n| !n.trim().is_empty()),
		}
	}
}

fn header_to_order(record: OrderRecord, status: OrderStatus, items: Vec<OrderLine>) -> Order {
	let channel = Channel::from_delivery_flag(record.is_delivery);
	Order {
		id: record.id,
		status,
		raw_status: record.status.trim().to_string(),
		channel,
		table: if channel.is_delivery() {
			None
		} else {
			record.table
		},
		created_at: record.created_at,
		total: record.total,
		assigned_to: record.assigned_to,
		items,
	}
}
