//! Board view and refresh endpoints.

use super::{ApiError, KitchenOperator};
use crate::server::AppState;
use axum::{extract::State, response::Json};
use kitchen_core::BoardSummary;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
	pub order_count: usize,
}

/// Handles GET /api/board.
///
/// Returns the four buckets filtered by the operator's stored preferences.
pub async fn get_board(
	State(state): State<AppState>,
	operator: KitchenOperator,
) -> Json<BoardSummary> {
	Json(state.board.view(operator.user_id()).await)
}

/// Handles POST /api/board/refresh.
pub async fn refresh_board(
	State(state): State<AppState>,
	_operator: KitchenOperator,
) -> Result<Json<RefreshResponse>, ApiError> {
	let order_count = state.board.refresh().await?;
	Ok(Json(RefreshResponse { order_count }))
}
