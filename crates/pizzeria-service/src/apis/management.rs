//! Owner-only statistics.

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::server::AppState;
use axum::{extract::State, response::Json};
use pizzeria_types::OrderCountResponse;

/// GET /api/management/orders/count
pub async fn order_count(
	State(state): State<AppState>,
	Authenticated(ctx): Authenticated,
) -> Result<Json<OrderCountResponse>, ApiError> {
	let count = state.engine.lifecycle().order_count(&ctx).await?;
	Ok(Json(OrderCountResponse { count }))
}
