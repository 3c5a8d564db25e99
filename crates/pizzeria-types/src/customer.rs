//! Customer identity types.
//!
//! A single [`Customer`] record describes everybody who talks to the service:
//! people ordering pizza, the workers preparing it and the owner. What a
//! customer may do is decided by the [`Role`]s attached to the record and the
//! [`Permission`]s those roles grant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a customer record.
pub type CustomerId = u64;

/// Role tags attached to a customer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
	/// Orders pizza: assembles and confirms drafts.
	Customer,
	/// Prepares pizza: picks placed orders and serves them.
	#[serde(alias = "PIZZA_MAKER")]
	Worker,
	/// Runs the shop; granted every permission.
	Owner,
}

impl Role {
	/// Returns true if this role grants the given permission.
	pub fn grants(&self, permission: Permission) -> bool {
		match self {
			Role::Customer => matches!(
				permission,
				Permission::AddItem | Permission::ConfirmOrder
			),
			Role::Worker => matches!(permission, Permission::PickOrder),
			Role::Owner => true,
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Customer => write!(f, "CUSTOMER"),
			Role::Worker => write!(f, "WORKER"),
			Role::Owner => write!(f, "OWNER"),
		}
	}
}

/// Capability tags checked by the order lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
	AddItem,
	ConfirmOrder,
	PickOrder,
}

impl fmt::Display for Permission {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Permission::AddItem => write!(f, "ADD_ITEM"),
			Permission::ConfirmOrder => write!(f, "CONFIRM_ORDER"),
			Permission::PickOrder => write!(f, "PICK_ORDER"),
		}
	}
}

/// A registered customer.
///
/// Workers and the owner are customers too; they differ only in their roles.
/// The roles are kept in the order they were granted and duplicates are
/// tolerated.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
	pub id: CustomerId,
	pub name: String,
	pub username: String,
	/// Hex encoded SHA3-256 digest of the password.
	pub password_hash: String,
	pub email: String,
	#[serde(default)]
	pub roles: Vec<Role>,
}

impl Customer {
	/// Returns true if the customer holds the given role.
	pub fn has_role(&self, role: Role) -> bool {
		self.roles.contains(&role)
	}

	/// Returns true if any of the customer's roles grants the permission.
	pub fn has_permission(&self, permission: Permission) -> bool {
		self.roles.iter().any(|role| role.grants(permission))
	}
}

impl fmt::Debug for Customer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Customer")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("username", &self.username)
			.field("email", &self.email)
			.field("roles", &self.roles)
			.finish_non_exhaustive()
	}
}
