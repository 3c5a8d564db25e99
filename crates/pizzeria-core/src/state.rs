//! Order state machine.
//!
//! Orders move Draft -> Placed -> Ongoing -> Served and nowhere else.

use crate::OrderError;
use once_cell::sync::Lazy;
use pizzeria_types::{Order, OrderState};
use std::collections::{HashMap, HashSet};

/// Static transition table: each state maps to its allowed next states.
static TRANSITIONS: Lazy<HashMap<OrderState, HashSet<OrderState>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(OrderState::Draft, HashSet::from([OrderState::Placed]));
	m.insert(OrderState::Placed, HashSet::from([OrderState::Ongoing]));
	m.insert(OrderState::Ongoing, HashSet::from([OrderState::Served]));
	m.insert(OrderState::Served, HashSet::new()); // terminal
	m
});

/// Checks if a state transition is valid.
pub fn is_valid_transition(from: OrderState, to: OrderState) -> bool {
	TRANSITIONS
		.get(&from)
		.is_some_and(|allowed| allowed.contains(&to))
}

/// Moves `order` to `to`, rejecting anything outside the table.
pub fn transition(order: &mut Order, to: OrderState) -> Result<(), OrderError> {
	if !is_valid_transition(order.state, to) {
		return Err(OrderError::InvariantViolation(format!(
			"Order {} cannot move from {} to {}",
			order.display_id(),
			order.state,
			to
		)));
	}
	order.state = to;
	Ok(())
}
