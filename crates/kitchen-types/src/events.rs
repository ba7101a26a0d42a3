//! Event types published by the kitchen board.
//!
//! Every successful mutation of the board emits one [`BoardEvent`]. Consumers
//! use them to compose user notifications; the board itself never formats
//! notification text.

use crate::{Bucket, Channel, ChannelFilter, OrderId, OrderStatus, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The operations that move an order through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
	Start,
	Finish,
	ConfirmPickup,
	Cancel,
}

impl TransitionAction {
	/// Status an order must have for this action to apply. `None` means any.
	pub fn required_status(&self) -> Option<OrderStatus> {
		match self {
			Self::Start => Some(OrderStatus::Queued),
			Self::Finish => Some(OrderStatus::InProgress),
			Self::ConfirmPickup => Some(OrderStatus::Ready),
			Self::Cancel => None,
		}
	}

	/// Status the order ends up in. `None` means the order is removed.
	pub fn target_status(&self) -> Option<OrderStatus> {
		match self {
			Self::Start => Some(OrderStatus::InProgress),
			Self::Finish => Some(OrderStatus::Ready),
			Self::ConfirmPickup => Some(OrderStatus::PickedUp),
			Self::Cancel => None,
		}
	}
}

impl fmt::Display for TransitionAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Start => write!(f, "start"),
			Self::Finish => write!(f, "finish"),
			Self::ConfirmPickup => write!(f, "confirm_pickup"),
			Self::Cancel => write!(f, "cancel"),
		}
	}
}

/// Outcome of a successful transition.
///
/// Carries the identity of the order as it was before the transition so the
/// caller can tell the user which table or delivery was affected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionReceipt {
	pub order_id: OrderId,
	pub action: TransitionAction,
	pub from: OrderStatus,
	/// `None` when the order was removed.
	pub to: Option<OrderStatus>,
	pub channel: Channel,
	pub table: Option<String>,
	pub assigned_to: Option<String>,
}

/// Events emitted by the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardEvent {
	/// The snapshot was replaced by a fresh load.
	SnapshotReplaced { order_count: usize },
	/// An order moved or was cancelled.
	Transitioned(TransitionReceipt),
	/// A user changed the channel filter of one bucket.
	FilterChanged {
		user_id: Option<UserId>,
		bucket: Bucket,
		filter: ChannelFilter,
	},
}
