//! Order lifecycle endpoints.

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	response::Json,
};
use pizzeria_core::OrderError;
use pizzeria_types::{AddItemRequest, Order, OrderId};

/// POST /api/orders/items
pub async fn add_item(
	State(state): State<AppState>,
	Authenticated(ctx): Authenticated,
	Json(request): Json<AddItemRequest>,
) -> Result<Json<Order>, ApiError> {
	let item = state
		.engine
		.catalog()
		.find(request.item_id)
		.await
		.map_err(|e| OrderError::Storage(e.to_string()))?
		.ok_or_else(|| OrderError::NotFound(format!("Menu item {} not found", request.item_id)))?;

	let order = state.engine.lifecycle().add_item(&ctx, item).await?;
	Ok(Json(order))
}

/// POST /api/orders/confirm
pub async fn confirm(
	State(state): State<AppState>,
	Authenticated(ctx): Authenticated,
) -> Result<Json<Order>, ApiError> {
	Ok(Json(state.engine.lifecycle().confirm(&ctx).await?))
}

/// POST /api/orders/pick
pub async fn pick(
	State(state): State<AppState>,
	Authenticated(ctx): Authenticated,
) -> Result<Json<Order>, ApiError> {
	Ok(Json(state.engine.lifecycle().pick(&ctx).await?))
}

/// POST /api/orders/{id}/complete
pub async fn complete(
	State(state): State<AppState>,
	Authenticated(ctx): Authenticated,
	Path(order_id): Path<OrderId>,
) -> Result<Json<Order>, ApiError> {
	Ok(Json(state.engine.lifecycle().complete(&ctx, order_id).await?))
}

/// GET /api/orders/current; `null` when the worker holds no order.
pub async fn current(
	State(state): State<AppState>,
	Authenticated(ctx): Authenticated,
) -> Result<Json<Option<Order>>, ApiError> {
	let current = state.engine.lifecycle().current_order(&ctx)?;
	Ok(Json(current.map(|order| (*order).clone())))
}
