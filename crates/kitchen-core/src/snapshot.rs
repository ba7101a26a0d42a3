//! The in-memory set of orders currently on the board.

use kitchen_types::{Order, OrderId};
use std::collections::HashSet;

/// Active orders in insertion order.
///
/// Orders enter only through [`OrderSnapshot::replace`] with freshly assembled
/// data and leave only by cancellation or the next replace.
#[derive(Debug, Clone, Default)]
pub struct OrderSnapshot {
	orders: Vec<Order>,
}

impl OrderSnapshot {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_orders(orders: Vec<Order>) -> Self {
		let mut snapshot = Self::new();
		snapshot.replace(orders);
		snapshot
	}

	/// Replaces every order at once.
	///
	/// When the same id appears twice only the first occurrence is kept.
	pub fn replace(&mut self, orders: Vec<Order>) {
		let mut seen: HashSet<OrderId> = HashSet::with_capacity(orders.len());
		let mut kept: Vec<Order> = Vec::with_capacity(orders.len());
		for order in orders {
			if !seen.insert(order.id) {
				tracing::warn!(order_id = order.id, "Dropping duplicate order from load");
				continue;
			}
			kept.push(order);
		}
		self.orders = kept;
	}

	pub fn get(&self, id: OrderId) -> Option<&Order> {
		self.orders.iter().find(|o| o.id == id)
	}

	pub(crate) fn get_mut(&mut self, id: OrderId) -> Option<&mut Order> {
		self.orders.iter_mut().find(|o| o.id == id)
	}

	pub(crate) fn remove(&mut self, id: OrderId) -> Option<Order> {
		let index = self.orders.iter().position(|o| o.id == id)?;
		Some(self.orders.remove(index))
	}

	pub fn iter(&self) -> impl Iterator<Item = &Order> {
		self.orders.iter()
	}

	pub fn len(&self) -> usize {
		self.orders.len()
	}

	pub fn is_empty(&self) -> bool {
		self.orders.is_empty()
	}

	pub fn to_vec(&self) -> Vec<Order> {
		self.orders.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::order;
	use kitchen_types::OrderStatus;

	#[test]
	fn test_replace_keeps_insertion_order() {
		let mut snapshot = OrderSnapshot::new();
		snapshot.replace(vec![
			order(3, OrderStatus::Ready, false),
			order(1, OrderStatus::Queued, false),
			order(2, OrderStatus::Queued, true),
		]);

		assert_eq!(snapshot.iter().map(|o| o.id).collect::<Vec<_>>(), vec![3, 1, 2]);

		snapshot.replace(vec![order(9, OrderStatus::Queued, false)]);
		assert_eq!(snapshot.len(), 1);
		assert!(snapshot.get(3).is_none());
	}

	#[test]
	fn test_duplicate_ids_keep_first() {
		let snapshot = OrderSnapshot::from_orders(vec![
			order(1, OrderStatus::Queued, false),
			order(1, OrderStatus::Ready, false),
		]);
		assert_eq!(snapshot.len(), 1);
		assert_eq!(snapshot.get(1).map(|o| o.status), Some(OrderStatus::Queued));
	}

	#[test]
	fn test_remove() {
		let mut snapshot = OrderSnapshot::from_orders(vec![
			order(1, OrderStatus::Queued, false),
			order(2, OrderStatus::Queued, false),
		]);
		assert_eq!(snapshot.remove(1).map(|o| o.id), Some(1));
		assert!(snapshot.remove(1).is_none());
		assert_eq!(snapshot.to_vec().len(), 1);
	}
}
