//! API types for the HTTP adapter.

use serde::{Deserialize, Serialize};

/// JSON body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Machine readable error code, e.g. "INVARIANT_VIOLATION".
	pub error: String,
	/// Human readable description.
	pub message: String,
}

/// Body of `POST /api/orders/items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddItemRequest {
	pub item_id: crate::MenuItemId,
}

/// Body of `GET /api/management/orders/count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCountResponse {
	pub count: u64,
}
