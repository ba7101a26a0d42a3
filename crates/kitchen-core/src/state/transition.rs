//! Lifecycle transitions of orders in the snapshot.
//!
//! Orders move forward only: Queued -> InProgress -> Ready -> PickedUp.
//! Cancelling removes the order from the snapshot whatever its status.
//! Transitions touch the snapshot only; nothing is written back to the source.

use crate::snapshot::OrderSnapshot;
use kitchen_types::{OrderId, OrderStatus, TransitionAction, TransitionReceipt};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors that can occur when applying a transition.
///
/// The snapshot is left unchanged whenever one of these is returned.
#[derive(Debug, Error)]
pub enum TransitionError {
	#[error("Order not found: {0}")]
	OrderNotFound(OrderId),
	#[error("Cannot {action} order {order_id} while it is {from}")]
	InvalidTransition {
		order_id: OrderId,
		action: TransitionAction,
		from: OrderStatus,
	},
}

/// Allowed forward edges of the lifecycle.
static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(OrderStatus::Queued, HashSet::from([OrderStatus::InProgress]));
	m.insert(OrderStatus::InProgress, HashSet::from([OrderStatus::Ready]));
	m.insert(OrderStatus::Ready, HashSet::from([OrderStatus::PickedUp]));
	m.insert(OrderStatus::PickedUp, HashSet::new()); // terminal
	m
});

/// Applies lifecycle transitions to an [`OrderSnapshot`].
pub struct StatusTransitionEngine;

impl StatusTransitionEngine {
	/// Moves a queued order into preparation and records who started it.
	///
	/// `assignee` is only written when given; an existing assignment is never
	/// cleared.
	pub fn start(
		snapshot: &mut OrderSnapshot,
		order_id: OrderId,
		assignee: Option<&str>,
	) -> Result<TransitionReceipt, TransitionError> {
		Self::advance(snapshot, order_id, TransitionAction::Start, assignee)
	}

	pub fn finish(
		snapshot: &mut OrderSnapshot,
		order_id: OrderId,
	) -> Result<TransitionReceipt, TransitionError> {
		Self::advance(snapshot, order_id, TransitionAction::Finish, None)
	}

	pub fn confirm_pickup(
		snapshot: &mut OrderSnapshot,
		order_id: OrderId,
	) -> Result<TransitionReceipt, TransitionError> {
		Self::advance(snapshot, order_id, TransitionAction::ConfirmPickup, None)
	}

	/// Removes an order from the snapshot. Valid from any status.
	pub fn cancel(
		snapshot: &mut OrderSnapshot,
		order_id: OrderId,
	) -> Result<TransitionReceipt, TransitionError> {
		let order = snapshot
			.remove(order_id)
			.ok_or(TransitionError::OrderNotFound(order_id))?;

		Ok(TransitionReceipt {
			order_id,
			action: TransitionAction::Cancel,
			from: order.status,
			to: None,
			channel: order.channel,
			table: order.table,
			assigned_to: order.assigned_to,
		})
	}

	/// Checks if a state transition is valid.
	pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
		TRANSITIONS
			.get(&from)
			.is_some_and(|allowed| allowed.contains(&to))
	}

	fn advance(
		snapshot: &mut OrderSnapshot,
		order_id: OrderId,
		action: TransitionAction,
		assignee: Option<&str>,
	) -> Result<TransitionReceipt, TransitionError> {
		let order = snapshot
			.get_mut(order_id)
			.ok_or(TransitionError::OrderNotFound(order_id))?;

		let from = order.status;
		let to = match action.target_status() {
			Some(to) if action.required_status() == Some(from) => to,
			_ => {
				return Err(TransitionError::InvalidTransition {
					order_id,
					action,
					from,
				})
			},
		};

		if !Self::is_valid_transition(from, to) {
			return Err(TransitionError::InvalidTransition {
				order_id,
				action,
				from,
			});
		}

		order.status = to;
		order.raw_status = to.as_raw().to_string();
		if action == TransitionAction::Start {
			if let Some(name) = assignee {
				order.assigned_to = Some(name.to_string());
			}
		}

		Ok(TransitionReceipt {
			order_id,
			action,
			from,
			to: Some(to),
			channel: order.channel,
			table: order.table.clone(),
			assigned_to: order.assigned_to.clone(),
		})
	}
}
