//! Order detail and lifecycle endpoints.

use super::{ApiError, KitchenOperator};
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	response::Json,
};
use kitchen_types::{Order, OrderId, TransitionReceipt};

/// Handles GET /api/orders/{id}.
///
/// The order must be on the board; its lines are loaded fresh.
pub async fn get_order(
	State(state): State<AppState>,
	Path(order_id): Path<OrderId>,
	_operator: KitchenOperator,
) -> Result<Json<Order>, ApiError> {
	Ok(Json(state.board.order_details(order_id).await?))
}

/// Handles POST /api/orders/{id}/start. The operator's name is recorded as
/// the assignee.
pub async fn start_order(
	State(state): State<AppState>,
	Path(order_id): Path<OrderId>,
	KitchenOperator(operator): KitchenOperator,
) -> Result<Json<TransitionReceipt>, ApiError> {
	Ok(Json(state.board.start(order_id, &operator).await?))
}

pub async fn finish_order(
	State(state): State<AppState>,
	Path(order_id): Path<OrderId>,
	_operator: KitchenOperator,
) -> Result<Json<TransitionReceipt>, ApiError> {
	Ok(Json(state.board.finish(order_id).await?))
}

pub async fn confirm_pickup(
	State(state): State<AppState>,
	Path(order_id): Path<OrderId>,
	_operator: KitchenOperator,
) -> Result<Json<TransitionReceipt>, ApiError> {
	Ok(Json(state.board.confirm_pickup(order_id).await?))
}

/// Handles DELETE /api/orders/{id}. The order leaves the board whatever its
/// status.
pub async fn cancel_order(
	State(state): State<AppState>,
	Path(order_id): Path<OrderId>,
	_operator: KitchenOperator,
) -> Result<Json<TransitionReceipt>, ApiError> {
	Ok(Json(state.board.cancel(order_id).await?))
}
