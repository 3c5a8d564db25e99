//! Menu item types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of a menu item.
pub type MenuItemId = u64;

/// A pizza on the menu.
///
/// Orders carry copies of the items they reference; the catalog owns the
/// originals and the order lifecycle never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
	/// Assigned by the catalog when absent.
	#[serde(default)]
	pub id: Option<MenuItemId>,
	pub name: String,
	pub price: Decimal,
	#[serde(default)]
	pub toppings: Vec<String>,
}

impl MenuItem {
	/// Creates a menu item that has not been stored in the catalog yet.
	pub fn new(name: impl Into<String>, price: Decimal, toppings: &[&str]) -> Self {
		Self {
			id: None,
			name: name.into(),
			price,
			toppings: toppings.iter().map(|t| t.to_string()).collect(),
		}
	}

	/// Returns true if the item carries the given topping (exact match).
	pub fn has_topping(&self, topping: &str) -> bool {
		self.toppings.iter().any(|t| t == topping)
	}
}
