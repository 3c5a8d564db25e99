//! Order types for the pizzeria.
//!
//! This module defines the order record (a "purchase") and the states it
//! moves through: Draft -> Placed -> Ongoing -> Served.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CustomerId, MenuItem};

/// Identifier of an order, assigned by persistence on first save.
pub type OrderId = u64;

/// A customer's order and its progress through the kitchen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
	/// `None` until the order has been saved once.
	#[serde(default)]
	pub id: Option<OrderId>,
	/// The customer who assembled the order.
	pub customer_id: CustomerId,
	/// The worker who picked the order, set on the Placed -> Ongoing step.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub worker_id: Option<CustomerId>,
	/// Current lifecycle state.
	pub state: OrderState,
	/// Ordered items, in the order they were added.
	#[serde(default)]
	pub items: Vec<MenuItem>,
	/// Refreshed every time an item is added to the draft.
	pub created_at: DateTime<Utc>,
	/// Set when the order is served.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub checkout_at: Option<DateTime<Utc>>,
	/// Price charged, computed once when the order is served.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub amount: Option<Decimal>,
}

impl Order {
	/// Creates an empty, unsaved draft owned by the given customer.
	pub fn draft(customer_id: CustomerId) -> Self {
		Self {
			id: None,
			customer_id,
			worker_id: None,
			state: OrderState::Draft,
			items: Vec::new(),
			created_at: Utc::now(),
			checkout_at: None,
			amount: None,
		}
	}

	/// Identifier rendered for logs; unsaved orders show as "new".
	pub fn display_id(&self) -> String {
		self.id
			.map(|id| id.to_string())
			.unwrap_or_else(|| "new".to_string())
	}
}

/// Lifecycle state of an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderState {
	/// Being assembled by the customer.
	Draft,
	/// Submitted and waiting for a worker.
	Placed,
	/// Picked by a worker and being prepared.
	Ongoing,
	/// Prepared, priced and final.
	Served,
}

impl fmt::Display for OrderState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderState::Draft => write!(f, "DRAFT"),
			OrderState::Placed => write!(f, "PLACED"),
			OrderState::Ongoing => write!(f, "ONGOING"),
			OrderState::Served => write!(f, "SERVED"),
		}
	}
}
