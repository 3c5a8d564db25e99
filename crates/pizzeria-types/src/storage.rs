//! Storage-related types for the pizzeria.

use std::str::FromStr;

/// Namespaces for the collections kept in storage.
///
/// Records are stored under `"<namespace>:<id>"` keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Order records keyed by order id.
	Orders,
	/// Customer records keyed by customer id.
	Customers,
	/// Customer id keyed by username.
	CustomerByUsername,
	/// Menu items keyed by item id.
	Menu,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Orders => "orders",
			StorageKey::Customers => "customers",
			StorageKey::CustomerByUsername => "customer_by_username",
			StorageKey::Menu => "menu",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Orders,
			Self::Customers,
			Self::CustomerByUsername,
			Self::Menu,
		]
		.into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::all().find(|key| key.as_str() == s).ok_or(())
	}
}
