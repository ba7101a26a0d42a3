//! Order aggregate types for the kitchen board.
//!
//! An [`Order`] is the display-ready form of a raw order record: its status has
//! been normalized into one canonical [`OrderStatus`], its channel resolved and
//! its line items joined with product metadata.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an order in the order source.
pub type OrderId = i64;

/// Identifier of a product in the order source.
pub type ProductId = i64;

/// Raw source statuses that all mean "waiting in the queue".
const QUEUED_SYNONYMS: &[&str] = &["preparing", "queued", "pending"];

/// Canonical lifecycle status of an order on the board.
///
/// Orders only ever move forward through
/// `Queued -> InProgress -> Ready -> PickedUp`; cancelling removes the order
/// from the board instead of assigning a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	/// Waiting to be picked up by a cook.
	Queued,
	/// Being prepared.
	InProgress,
	/// Prepared and waiting for pickup.
	Ready,
	/// Handed over to the waiter or courier.
	PickedUp,
}

impl OrderStatus {
	/// Normalizes a raw source status.
	///
	/// `preparing`, `queued` and `pending` all collapse into [`OrderStatus::Queued`].
	/// Returns `None` for statuses the board does not track.
	pub fn from_raw(raw: &str) -> Option<Self> {
		let raw = raw.trim();
		if QUEUED_SYNONYMS.contains(&raw) {
			return Some(Self::Queued);
		}
		match raw {
			"in_progress" => Some(Self::InProgress),
			"ready" => Some(Self::Ready),
			"picked_up" => Some(Self::PickedUp),
			_ => None,
		}
	}

	/// The raw value written for this status after a transition.
	pub fn as_raw(&self) -> &'static str {
		match self {
			Self::Queued => "queued",
			Self::InProgress => "in_progress",
			Self::Ready => "ready",
			Self::PickedUp => "picked_up",
		}
	}

	/// Every raw source value that normalizes to this status.
	pub fn raw_synonyms(&self) -> &'static [&'static str] {
		match self {
			Self::Queued => QUEUED_SYNONYMS,
			Self::InProgress => &["in_progress"],
			Self::Ready => &["ready"],
			Self::PickedUp => &["picked_up"],
		}
	}

	/// The status that follows this one, if any.
	pub fn next(&self) -> Option<Self> {
		match self {
			Self::Queued => Some(Self::InProgress),
			Self::InProgress => Some(Self::Ready),
			Self::Ready => Some(Self::PickedUp),
			Self::PickedUp => None,
		}
	}

	/// Returns an iterator over all statuses in lifecycle order.
	pub fn all() -> impl Iterator<Item = Self> {
		[Self::Queued, Self::InProgress, Self::Ready, Self::PickedUp].into_iter()
	}

	/// Every raw status value the board tracks, in lifecycle order.
	pub fn all_raw() -> Vec<String> {
		Self::all()
			.flat_map(|status| status.raw_synonyms().iter().map(|s| s.to_string()))
			.collect()
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_raw())
	}
}

impl FromStr for OrderStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_raw(s).ok_or_else(|| format!("unknown order status '{}'", s))
	}
}

/// Sales channel an order came in through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
	/// Eaten in the restaurant, usually bound to a table.
	Store,
	/// Sent out for delivery.
	Delivery,
}

impl Channel {
	pub fn from_delivery_flag(is_delivery: bool) -> Self {
		if is_delivery {
			Self::Delivery
		} else {
			Self::Store
		}
	}

	pub fn is_delivery(&self) -> bool {
		matches!(self, Self::Delivery)
	}
}

impl fmt::Display for Channel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Store => write!(f, "store"),
			Self::Delivery => write!(f, "delivery"),
		}
	}
}

/// A fully assembled order as shown on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Unique identifier of this order.
	pub id: OrderId,
	/// Canonical lifecycle status.
	pub status: OrderStatus,
	/// The raw status value as last seen or written.
	pub raw_status: String,
	/// Channel the order came in through.
	pub channel: Channel,
	/// Table reference, only present for store orders.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub table: Option<String>,
	/// When the order was placed.
	pub created_at: DateTime<Utc>,
	/// Order total as recorded by the source. Never recomputed from items.
	pub total: Decimal,
	/// Operator who started the preparation.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub assigned_to: Option<String>,
	/// Line items in source order.
	#[serde(default)]
	pub items: Vec<OrderLine>,
}

impl Order {
	pub fn is_delivery(&self) -> bool {
		self.channel.is_delivery()
	}

	/// Short human-readable reference, e.g. `table 4` or `delivery #17`.
	pub fn label(&self) -> String {
		match (&self.channel, &self.table) {
			(Channel::Store, Some(table)) => format!("table {}", table),
			(Channel::Store, None) => format!("order #{}", self.id),
			(Channel::Delivery, _) => format!("delivery #{}", self.id),
		}
	}

	/// Total number of units across all lines.
	pub fn item_count(&self) -> u32 {
		self.items.iter().map(|line| line.quantity).sum()
	}
}

/// One line of an assembled order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
	/// Product referenced by this line.
	pub product_id: ProductId,
	/// Resolved product name, or the unknown-product placeholder.
	pub product_name: String,
	/// Product image, when the product record has one.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub image_ref: Option<String>,
	pub quantity: u32,
	pub unit_price: Decimal,
	/// Free-text instructions from the customer.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
}

impl OrderLine {
	/// `unit_price * quantity`.
	pub fn subtotal(&self) -> Decimal {
		self.unit_price * Decimal::from(self.quantity)
	}
}
