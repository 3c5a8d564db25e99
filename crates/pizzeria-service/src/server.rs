//! HTTP server for the pizzeria API.
//!
//! A thin adapter: handlers authenticate the caller, translate the request
//! into an engine call and map the result onto a JSON response.

use crate::apis::{management, menu, orders};
use axum::{
	routing::{get, post},
	Router,
};
use pizzeria_config::ApiConfig;
use pizzeria_core::PizzeriaEngine;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub engine: Arc<PizzeriaEngine>,
}

/// Builds the `/api` router.
pub fn router(engine: Arc<PizzeriaEngine>) -> Router {
	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/menu", get(menu::list_menu).post(menu::create_menu_item))
				.route("/orders/items", post(orders::add_item))
				.route("/orders/confirm", post(orders::confirm))
				.route("/orders/pick", post(orders::pick))
				.route("/orders/current", get(orders::current))
				.route("/orders/{id}/complete", post(orders::complete))
				.route("/management/orders/count", get(management::order_count)),
		)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive()),
		)
		.with_state(AppState { engine })
}

/// Starts the HTTP server and serves until the listener fails.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<PizzeriaEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(engine);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Pizzeria API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}
