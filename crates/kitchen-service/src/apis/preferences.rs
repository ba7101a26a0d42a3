//! Filter preference endpoints.

use super::{ApiError, KitchenOperator};
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	response::Json,
};
use kitchen_types::{Bucket, ChannelFilter, FilterPreferences};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SetFilterRequest {
	pub filter: String,
}

/// Handles GET /api/preferences.
pub async fn get_preferences(
	State(state): State<AppState>,
	operator: KitchenOperator,
) -> Json<FilterPreferences> {
	Json(state.board.preferences(operator.user_id()).await)
}

/// Handles PUT /api/preferences/{bucket}.
///
/// Returns the updated preferences. A failed write is logged but still
/// answers with the requested change.
pub async fn set_filter(
	State(state): State<AppState>,
	Path(bucket): Path<String>,
	operator: KitchenOperator,
	Json(request): Json<SetFilterRequest>,
) -> Result<Json<FilterPreferences>, ApiError> {
	let bucket: Bucket = bucket.parse().map_err(ApiError::BadRequest)?;
	let filter: ChannelFilter = request.filter.parse().map_err(ApiError::BadRequest)?;

	Ok(Json(
		state
			.board
			.set_filter(operator.user_id(), bucket, filter)
			.await,
	))
}
