//! Menu endpoints: plain catalog pass-through.

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::server::AppState;
use axum::{
	extract::{Query, State},
	http::StatusCode,
	response::Json,
};
use pizzeria_core::OrderError;
use pizzeria_types::{MenuItem, Role};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
	/// Only list items carrying this topping.
	pub topping: Option<String>,
}

/// GET /api/menu
pub async fn list_menu(
	State(state): State<AppState>,
	Query(query): Query<MenuQuery>,
) -> Result<Json<Vec<MenuItem>>, ApiError> {
	let catalog = state.engine.catalog();
	let items = match query.topping {
		Some(topping) => catalog.containing_topping(&topping).await,
		None => catalog.list().await,
	}
	.map_err(|e| OrderError::Storage(e.to_string()))?;
	Ok(Json(items))
}

/// POST /api/menu, owner only.
pub async fn create_menu_item(
	State(state): State<AppState>,
	Authenticated(ctx): Authenticated,
	Json(item): Json<MenuItem>,
) -> Result<(StatusCode, Json<MenuItem>), ApiError> {
	ctx.require_role(Role::Owner)?;
	let item = state
		.engine
		.catalog()
		.create(item)
		.await
		.map_err(|e| OrderError::Storage(e.to_string()))?;
	tracing::info!(item_id = ?item.id, name = %item.name, "Menu item created");
	Ok((StatusCode::CREATED, Json(item)))
}
