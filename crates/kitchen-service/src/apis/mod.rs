//! HTTP handlers for the kitchen board API.
//!
//! Every handler requires a kitchen operator, identified by the
//! `x-operator-id`, `x-operator-name` and `x-operator-role` headers set by the
//! authenticating proxy in front of the service.

pub mod board;
pub mod orders;
pub mod preferences;

use axum::{
	extract::FromRequestParts,
	http::{request::Parts, HeaderMap, StatusCode},
	response::{IntoResponse, Json, Response},
};
use kitchen_core::{BoardError, TransitionError};
use kitchen_types::{Operator, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const OPERATOR_ID_HEADER: &str = "x-operator-id";
pub const OPERATOR_NAME_HEADER: &str = "x-operator-name";
pub const OPERATOR_ROLE_HEADER: &str = "x-operator-role";

/// Error body returned by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Machine-readable error code.
	pub error: String,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum ApiError {
	#[error("{0}")]
	BadRequest(String),
	#[error("Kitchen access required")]
	Forbidden,
	#[error(transparent)]
	Board(#[from] BoardError),
}

impl ApiError {
	pub fn status_code(&self) -> StatusCode {
		match self {
			Self::BadRequest(_) => StatusCode::BAD_REQUEST,
			Self::Forbidden => StatusCode::FORBIDDEN,
			Self::Board(e) if e.is_not_found() => StatusCode::NOT_FOUND,
			Self::Board(BoardError::Transition(_)) => StatusCode::CONFLICT,
			Self::Board(_) => StatusCode::BAD_GATEWAY,
		}
	}

	fn code(&self) -> &'static str {
		match self {
			Self::BadRequest(_) => "BAD_REQUEST",
			Self::Forbidden => "FORBIDDEN",
			Self::Board(e) if e.is_not_found() => "ORDER_NOT_FOUND",
			Self::Board(BoardError::Transition(_)) => "INVALID_TRANSITION",
			Self::Board(_) => "SOURCE_UNAVAILABLE",
		}
	}

	fn details(&self) -> Option<serde_json::Value> {
		match self {
			Self::Board(BoardError::Transition(TransitionError::InvalidTransition {
				order_id,
				action,
				from,
			})) => Some(serde_json::json!({
				"orderId": order_id,
				"action": action,
				"status": from,
			})),
			_ => None,
		}
	}

	pub fn to_error_response(&self) -> ErrorResponse {
		ErrorResponse {
			error: self.code().to_string(),
			message: self.to_string(),
			details: self.details(),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status_code();
		if status.is_server_error() {
			tracing::warn!(error = %self, "Request failed");
		}
		(status, Json(self.to_error_response())).into_response()
	}
}

/// An operator allowed to use the kitchen board.
///
/// Extraction fails with 403 for any role other than admin, restaurant owner
/// or chef, including requests without a role header.
#[derive(Debug, Clone)]
pub struct KitchenOperator(pub Operator);

impl KitchenOperator {
	pub fn user_id(&self) -> Option<&str> {
		self.0.id.as_deref()
	}
}

impl<S: Send + Sync> FromRequestParts<S> for KitchenOperator {
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let operator = operator_from_headers(&parts.headers);
		if !operator.is_kitchen_staff() {
			tracing::debug!(role = ?operator.role, "Rejected non-kitchen operator");
			return Err(ApiError::Forbidden);
		}
		Ok(Self(operator))
	}
}

fn operator_from_headers(headers: &HeaderMap) -> Operator {
	let header = |name: &str| {
		headers
			.get(name)
			.and_then(|v| v.to_str().ok())
			.map(str::trim)
			.filter(|v| !v.is_empty())
			.map(str::to_string)
	};

	let role = header(OPERATOR_ROLE_HEADER)
		.map(|r| r.parse::<Role>().unwrap_or(Role::Other))
		.unwrap_or(Role::Other);

	Operator {
		id: header(OPERATOR_ID_HEADER),
		name: header(OPERATOR_NAME_HEADER),
		role,
	}
}
