//! The kitchen board: one snapshot of active orders and the operations on it.
//!
//! [`KitchenBoard`] ties together the assembler that loads orders, the
//! transition engine that moves them, the partitioner that groups them and
//! the preference store that remembers each user's filters. Every successful
//! mutation is announced on the [`event_bus::EventBus`].

pub mod event_bus;

use crate::assembler::{AssemblyError, OrderAssembler};
use crate::partition::{BoardSummary, QueuePartitioner};
use crate::preferences::FilterPreferenceStore;
use crate::snapshot::OrderSnapshot;
use crate::state::{StatusTransitionEngine, TransitionError};
use kitchen_types::{
	BoardEvent, Bucket, ChannelFilter, FilterPreferences, Operator, Order, OrderId,
	TransitionReceipt,
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

/// Errors returned by board operations.
#[derive(Debug, Error)]
pub enum BoardError {
	#[error(transparent)]
	Assembly(#[from] AssemblyError),
	#[error(transparent)]
	Transition(#[from] TransitionError),
	#[error("Order not found: {0}")]
	OrderNotFound(OrderId),
}

impl BoardError {
	/// Whether the error means the order is not on the board.
	pub fn is_not_found(&self) -> bool {
		matches!(
			self,
			Self::OrderNotFound(_) | Self::Transition(TransitionError::OrderNotFound(_))
		)
	}
}

pub struct KitchenBoard {
	board_id: String,
	/// Raw statuses requested on every refresh.
	fetch_statuses: Vec<String>,
	assembler: OrderAssembler,
	snapshot: RwLock<OrderSnapshot>,
	preferences: FilterPreferenceStore,
	event_bus: event_bus::EventBus,
}

impl KitchenBoard {
	pub fn new(
		board_id: impl Into<String>,
		fetch_statuses: Vec<String>,
		assembler: OrderAssembler,
		preferences: FilterPreferenceStore,
		event_bus: event_bus::EventBus,
	) -> Self {
		Self {
			board_id: board_id.into(),
			fetch_statuses,
			assembler,
			snapshot: RwLock::new(OrderSnapshot::new()),
			preferences,
			event_bus,
		}
	}

	pub fn id(&self) -> &str {
		&self.board_id
	}

	pub fn event_bus(&self) -> &event_bus::EventBus {
		&self.event_bus
	}

	/// Reloads the active orders and replaces the snapshot.
	///
	/// The snapshot lock is not held while the source is queried. On failure
	/// the previous snapshot stays in place.
	#[instrument(skip(self), fields(board = %self.board_id))]
	pub async fn refresh(&self) -> Result<usize, BoardError> {
		let orders = match self.assembler.load(&self.fetch_statuses).await {
			Ok(orders) => orders,
			Err(e) => {
				tracing::error!(error = %e, "Failed to load orders");
				return Err(e.into());
			},
		};

		let order_count = {
			let mut snapshot = self.snapshot.write().await;
			snapshot.replace(orders);
			snapshot.len()
		};

		tracing::info!(order_count, "Board refreshed");
		self.event_bus
			.publish(BoardEvent::SnapshotReplaced { order_count });
		Ok(order_count)
	}

	/// Returns an order on the board with freshly loaded lines.
	///
	/// The snapshot itself is not modified.
	#[instrument(skip(self), fields(board = %self.board_id))]
	pub async fn order_details(&self, order_id: OrderId) -> Result<Order, BoardError> {
		let order = self
			.snapshot
			.read()
			.await
			.get(order_id)
			.cloned()
			.ok_or(BoardError::OrderNotFound(order_id))?;

		Ok(self.assembler.detail(&order).await?)
	}

	/// Starts preparing a queued order on behalf of `operator`.
	#[instrument(skip(self, operator), fields(board = %self.board_id))]
	pub async fn start(
		&self,
		order_id: OrderId,
		operator: &Operator,
	) -> Result<TransitionReceipt, BoardError> {
		let result = {
			let mut snapshot = self.snapshot.write().await;
			StatusTransitionEngine::start(&mut snapshot, order_id, operator.name.as_deref())
		};
		self.announce(result)
	}

	#[instrument(skip(self), fields(board = %self.board_id))]
	pub async fn finish(&self, order_id: OrderId) -> Result<TransitionReceipt, BoardError> {
		let result = {
			let mut snapshot = self.snapshot.write().await;
			StatusTransitionEngine::finish(&mut snapshot, order_id)
		};
		self.announce(result)
	}

	#[instrument(skip(self), fields(board = %self.board_id))]
	pub async fn confirm_pickup(&self, order_id: OrderId) -> Result<TransitionReceipt, BoardError> {
		let result = {
			let mut snapshot = self.snapshot.write().await;
			StatusTransitionEngine::confirm_pickup(&mut snapshot, order_id)
		};
		self.announce(result)
	}

	#[instrument(skip(self), fields(board = %self.board_id))]
	pub async fn cancel(&self, order_id: OrderId) -> Result<TransitionReceipt, BoardError> {
		let result = {
			let mut snapshot = self.snapshot.write().await;
			StatusTransitionEngine::cancel(&mut snapshot, order_id)
		};
		self.announce(result)
	}

	fn announce(
		&self,
		result: Result<TransitionReceipt, TransitionError>,
	) -> Result<TransitionReceipt, BoardError> {
		match result {
			Ok(receipt) => {
				tracing::info!(
					order_id = receipt.order_id,
					action = %receipt.action,
					from = %receipt.from,
					channel = %receipt.channel,
					"Order transitioned"
				);
				self.event_bus
					.publish(BoardEvent::Transitioned(receipt.clone()));
				Ok(receipt)
			},
			Err(e) => {
				tracing::warn!(error = %e, "Transition rejected");
				Err(e.into())
			},
		}
	}

	pub async fn preferences(&self, user_id: Option<&str>) -> FilterPreferences {
		self.preferences.load(user_id).await
	}

	/// Changes one bucket's filter for `user_id` and returns the resulting
	/// preferences.
	///
	/// The returned value reflects the change even when it could not be
	/// persisted.
	#[instrument(skip(self), fields(board = %self.board_id))]
	pub async fn set_filter(
		&self,
		user_id: Option<&str>,
		bucket: Bucket,
		filter: ChannelFilter,
	) -> FilterPreferences {
		let updated = self.preferences.load(user_id).await.with(bucket, filter);
		self.preferences.save(user_id, bucket, filter).await;

		self.event_bus.publish(BoardEvent::FilterChanged {
			user_id: user_id.map(str::to_string),
			bucket,
			filter,
		});
		updated
	}

	/// The four buckets as `user_id` has them filtered.
	pub async fn view(&self, user_id: Option<&str>) -> BoardSummary {
		let preferences = self.preferences.load(user_id).await;
		self.view_with(&preferences).await
	}

	pub async fn view_with(&self, preferences: &FilterPreferences) -> BoardSummary {
		let snapshot = self.snapshot.read().await;
		QueuePartitioner::partition(&snapshot, preferences).to_summary()
	}

	/// Copy of every order on the board, in insertion order.
	pub async fn orders(&self) -> Vec<Order> {
		self.snapshot.read().await.to_vec()
	}

	pub async fn order(&self, order_id: OrderId) -> Option<Order> {
		self.snapshot.read().await.get(order_id).cloned()
	}
}
