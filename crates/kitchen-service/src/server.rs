//! HTTP server for the kitchen board API.

use crate::apis::{board, orders, preferences};
use axum::{
	http::HeaderValue,
	routing::{get, post, put},
	Router,
};
use kitchen_config::{ApiConfig, CorsConfig};
use kitchen_core::KitchenBoard;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
	cors::{Any, CorsLayer},
	timeout::TimeoutLayer,
	trace::TraceLayer,
};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub board: Arc<KitchenBoard>,
}

/// Builds the API router under `/api`.
pub fn router(state: AppState) -> Router {
	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/board", get(board::get_board))
				.route("/board/refresh", post(board::refresh_board))
				.route(
					"/orders/{id}",
					get(orders::get_order).delete(orders::cancel_order),
				)
				.route("/orders/{id}/start", post(orders::start_order))
				.route("/orders/{id}/finish", post(orders::finish_order))
				.route("/orders/{id}/pickup", post(orders::confirm_pickup))
				.route("/preferences", get(preferences::get_preferences))
				.route("/preferences/{bucket}", put(preferences::set_filter)),
		)
		.with_state(state)
}

/// Starts the HTTP server and serves until the listener fails.
pub async fn start_server(
	api_config: ApiConfig,
	board: Arc<KitchenBoard>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(AppState { board }).layer(
		ServiceBuilder::new()
			.layer(TraceLayer::new_for_http())
			.layer(cors_layer(api_config.cors.as_ref()))
			.layer(TimeoutLayer::new(Duration::from_secs(
				api_config.timeout_seconds,
			))),
	);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Kitchen board API listening on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Permissive unless specific origins are configured.
fn cors_layer(cors: Option<&CorsConfig>) -> CorsLayer {
	let Some(cors) = cors else {
		return CorsLayer::permissive();
	};

	let origins: Vec<HeaderValue> = cors
		.allowed_origins
		.iter()
		.filter_map(|origin| match origin.parse::<HeaderValue>() {
			Ok(value) => Some(value),
			Err(_) => {
				tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
				None
			},
		})
		.collect();

	CorsLayer::new()
		.allow_origin(origins)
		.allow_methods(Any)
		.allow_headers(Any)
}
