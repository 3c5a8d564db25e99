//! Identity and authorization collaborator.
//!
//! [`CustomerDirectory`] stores customer records and verifies credentials.
//! [`RequestContext`] carries the authenticated customer through a single
//! request; every lifecycle operation receives one explicitly.

use crate::OrderError;
use pizzeria_storage::{StorageError, StorageService};
use pizzeria_types::{Customer, CustomerId, Permission, Role, StorageKey};
use sha3::{Digest, Sha3_256};
use std::sync::Arc;

/// Hex encoded SHA3-256 digest of a password.
pub fn hash_password(password: &str) -> String {
	hex::encode(Sha3_256::digest(password.as_bytes()))
}

/// The identity acting in the current request.
#[derive(Debug, Clone)]
pub struct RequestContext {
	customer: Customer,
}

impl RequestContext {
	pub fn new(customer: Customer) -> Self {
		Self { customer }
	}

	/// The acting identity in its customer role.
	pub fn current_customer(&self) -> &Customer {
		&self.customer
	}

	/// The acting identity in its worker role. Same record, different context.
	pub fn current_worker(&self) -> &Customer {
		&self.customer
	}

	pub fn require_permission(&self, permission: Permission) -> Result<(), OrderError> {
		if self.customer.has_permission(permission) {
			Ok(())
		} else {
			Err(OrderError::AuthorizationDenied(format!(
				"{} lacks permission {}",
				self.customer.username, permission
			)))
		}
	}

	pub fn require_role(&self, role: Role) -> Result<(), OrderError> {
		if self.customer.has_role(role) {
			Ok(())
		} else {
			Err(OrderError::AuthorizationDenied(format!(
				"{} lacks role {}",
				self.customer.username, role
			)))
		}
	}
}

/// Customer records kept in the storage backend.
///
/// Records live under `customers:<id>`; a `customer_by_username:<username>`
/// entry maps usernames back to ids.
pub struct CustomerDirectory {
	storage: Arc<StorageService>,
}

impl CustomerDirectory {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Stores a customer, replacing the record with the same id.
	///
	/// Fails if the username already belongs to a different customer. A
	/// replaced record's old username stops resolving.
	pub async fn register(&self, customer: Customer) -> Result<Customer, OrderError> {
		if let Some(existing) = self
			.lookup_username(&customer.username)
			.await
			.map_err(|e| OrderError::Storage(e.to_string()))?
		{
			if existing != customer.id {
				return Err(OrderError::InvariantViolation(format!(
					"Username '{}' is already taken",
					customer.username
				)));
			}
		}

		let previous = self
			.find_by_id(customer.id)
			.await
			.map_err(|e| OrderError::Storage(e.to_string()))?;

		self.storage
			.store(
				StorageKey::Customers.as_str(),
				&customer.id.to_string(),
				&customer,
			)
			.await
			.map_err(|e| OrderError::Storage(e.to_string()))?;
		self.storage
			.store(
				StorageKey::CustomerByUsername.as_str(),
				&customer.username,
				&customer.id,
			)
			.await
			.map_err(|e| OrderError::Storage(e.to_string()))?;

		if let Some(previous) = previous.filter(|p| p.username != customer.username) {
			self.storage
				.remove(StorageKey::CustomerByUsername.as_str(), &previous.username)
				.await
				.map_err(|e| OrderError::Storage(e.to_string()))?;
		}

		tracing::debug!(customer_id = customer.id, username = %customer.username, "Registered customer");
		Ok(customer)
	}

	pub async fn contains(&self, id: CustomerId) -> Result<bool, StorageError> {
		self.storage
			.exists(StorageKey::Customers.as_str(), &id.to_string())
			.await
	}

	pub async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StorageError> {
		self.storage
			.find(StorageKey::Customers.as_str(), &id.to_string())
			.await
	}

	pub async fn find_by_username(&self, username: &str) -> Result<Option<Customer>, StorageError> {
		match self.lookup_username(username).await? {
			Some(id) => self.find_by_id(id).await,
			None => Ok(None),
		}
	}

	/// Verifies a username and password pair.
	///
	/// Unknown users and wrong passwords are reported the same way.
	pub async fn authenticate(
		&self,
		username: &str,
		password: &str,
	) -> Result<Customer, OrderError> {
		let customer = self
			.find_by_username(username)
			.await
			.map_err(|e| OrderError::Storage(e.to_string()))?;

		match customer {
			Some(customer) if customer.password_hash == hash_password(password) => Ok(customer),
			_ => Err(OrderError::AuthorizationDenied(
				"Invalid username or password".into(),
			)),
		}
	}

	async fn lookup_username(&self, username: &str) -> Result<Option<CustomerId>, StorageError> {
		self.storage
			.find(StorageKey::CustomerByUsername.as_str(), username)
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pizzeria_storage::implementations::memory::MemoryStorage;

	fn customer(id: CustomerId, username: &str, roles: Vec<Role>) -> Customer {
		Customer {
			id,
			name: username.to_uppercase(),
			username: username.into(),
			password_hash: hash_password("secret"),
			email: format!("{}@pizzeria.test", username),
			roles,
		}
	}

	fn directory() -> CustomerDirectory {
		CustomerDirectory::new(Arc::new(StorageService::new(Box::new(MemoryStorage::new()))))
	}

	#[test]
	fn test_hash_password_is_sha3_hex() {
		assert_eq!(
			hash_password(""),
			"a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
		);
	}

	#[tokio::test]
	async fn test_authenticate() {
		let directory = directory();
		directory
			.register(customer(1, "papa", vec![Role::Customer]))
			.await
			.unwrap();

		let found = directory.authenticate("papa", "secret").await.unwrap();
		assert_eq!(found.id, 1);

		assert!(matches!(
			directory.authenticate("papa", "wrong").await,
			Err(OrderError::AuthorizationDenied(_))
		));
		assert!(matches!(
			directory.authenticate("nobody", "secret").await,
			Err(OrderError::AuthorizationDenied(_))
		));
	}

	#[tokio::test]
	async fn test_username_taken_by_other_customer() {
		let directory = directory();
		directory
			.register(customer(1, "papa", vec![]))
			.await
			.unwrap();
		// re-registering the same customer is an update
		directory
			.register(customer(1, "papa", vec![Role::Owner]))
			.await
			.unwrap();
		assert!(matches!(
			directory.register(customer(2, "papa", vec![])).await,
			Err(OrderError::InvariantViolation(_))
		));
		assert_eq!(
			directory.find_by_username("papa").await.unwrap().unwrap().roles,
			vec![Role::Owner]
		);
	}

	#[tokio::test]
	async fn test_renamed_customer_drops_old_username() {
		let directory = directory();
		directory
			.register(customer(1, "papa", vec![Role::Customer]))
			.await
			.unwrap();
		assert!(directory.contains(1).await.unwrap());
		assert!(!directory.contains(2).await.unwrap());

		directory
			.register(customer(1, "papa_john", vec![Role::Customer]))
			.await
			.unwrap();

		assert!(directory.find_by_username("papa").await.unwrap().is_none());
		assert!(matches!(
			directory.authenticate("papa", "secret").await,
			Err(OrderError::AuthorizationDenied(_))
		));
		assert_eq!(directory.authenticate("papa_john", "secret").await.unwrap().id, 1);
		// the freed username can be taken by someone else
		directory
			.register(customer(2, "papa", vec![Role::Customer]))
			.await
			.unwrap();
	}

	#[test]
	fn test_request_context_checks() {
		let ctx = RequestContext::new(customer(1, "owner", vec![Role::Owner]));
		assert!(ctx.require_permission(Permission::PickOrder).is_ok());
		assert!(ctx.require_role(Role::Owner).is_ok());
		// owners are granted every permission but are not workers
		assert!(matches!(
			ctx.require_role(Role::Worker),
			Err(OrderError::AuthorizationDenied(_))
		));

		let ctx = RequestContext::new(customer(2, "maker", vec![Role::Worker]));
		assert!(matches!(
			ctx.require_permission(Permission::AddItem),
			Err(OrderError::AuthorizationDenied(_))
		));
	}
}
