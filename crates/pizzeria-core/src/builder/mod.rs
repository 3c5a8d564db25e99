//! Builder pattern for constructing the pizzeria engine.
//!
//! Storage and notification backends are created through factory functions
//! looked up by implementation name, so the binary decides which
//! implementations exist and the configuration decides which one is primary.
//! The builder also seeds configured customers and menu items and restores
//! the worker registry from ONGOING orders left in storage.

use crate::catalog::Catalog;
use crate::engine::PizzeriaEngine;
use crate::identity::CustomerDirectory;
use crate::lifecycle::OrderLifecycle;
use crate::pricing::PricingRules;
use crate::registry::OngoingOrders;
use crate::repository::StorageOrderRepository;
use pizzeria_config::Config;
use pizzeria_notify::{NotificationError, NotificationInterface, NotificationService};
use pizzeria_storage::{StorageError, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Seeding error: {0}")]
	Seed(String),
}

/// Factory functions for every pluggable component, keyed by implementation name.
pub struct PizzeriaFactories<SF, NF> {
	pub storage_factories: HashMap<String, SF>,
	pub notification_factories: HashMap<String, NF>,
}

/// Builder for constructing a [`PizzeriaEngine`].
pub struct PizzeriaBuilder {
	config: Config,
}

impl PizzeriaBuilder {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the engine using the given factories.
	pub async fn build<SF, NF>(
		self,
		factories: PizzeriaFactories<SF, NF>,
	) -> Result<PizzeriaEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
		NF: Fn(&toml::Value) -> Result<Box<dyn NotificationInterface>, NotificationError>,
	{
		let storage_backend = create_primary(
			"storage",
			&self.config.storage.primary,
			&self.config.storage.implementations,
			&factories.storage_factories,
		)?;
		let storage = Arc::new(StorageService::new(storage_backend));

		let channel = create_primary(
			"notification",
			&self.config.notification.primary,
			&self.config.notification.implementations,
			&factories.notification_factories,
		)?;
		let notifier = Arc::new(NotificationService::new(channel));

		let repository = Arc::new(
			StorageOrderRepository::open(Arc::clone(&storage))
				.await
				.map_err(|e| BuilderError::Config(format!("Failed to open orders: {}", e)))?,
		);
		let directory = Arc::new(CustomerDirectory::new(Arc::clone(&storage)));
		let catalog = Arc::new(
			Catalog::open(Arc::clone(&storage))
				.await
				.map_err(|e| BuilderError::Config(format!("Failed to open catalog: {}", e)))?,
		);

		self.seed_customers(&directory).await?;
		self.seed_menu(&catalog).await?;

		let pricing = PricingRules::from(&self.config.pricing);
		tracing::info!(
			qualifying_topping = %pricing.qualifying_topping,
			discount_percent = pricing.discount_percent,
			bundle_size = pricing.bundle_size,
			"Pricing rules"
		);

		let lifecycle = Arc::new(OrderLifecycle::new(
			repository,
			Arc::clone(&directory),
			Arc::new(OngoingOrders::new()),
			notifier,
			pricing,
			Duration::from_secs(self.config.notification.timeout_seconds),
		));

		let restored = lifecycle
			.recover_ongoing()
			.await
			.map_err(|e| BuilderError::Config(format!("Failed to restore ongoing orders: {}", e)))?;
		if restored > 0 {
			tracing::info!(restored, "Restored ongoing orders");
		}

		Ok(PizzeriaEngine::new(self.config, lifecycle, catalog, directory))
	}

	/// Registers configured customers that are not stored yet.
	async fn seed_customers(&self, directory: &CustomerDirectory) -> Result<(), BuilderError> {
		for customer in &self.config.customers {
			let existing = directory
				.contains(customer.id)
				.await
				.map_err(|e| BuilderError::Seed(e.to_string()))?;
			if existing {
				continue;
			}
			directory
				.register(customer.clone())
				.await
				.map_err(|e| BuilderError::Seed(e.to_string()))?;
			tracing::info!(customer_id = customer.id, username = %customer.username, "Seeded customer");
		}
		Ok(())
	}

	/// Creates configured menu items that are not stored yet. Items without an
	/// id are matched by name.
	async fn seed_menu(&self, catalog: &Catalog) -> Result<(), BuilderError> {
		let stored_names: Vec<String> = catalog
			.list()
			.await
			.map_err(|e| BuilderError::Seed(e.to_string()))?
			.into_iter()
			.map(|item| item.name)
			.collect();

		for item in &self.config.menu {
			let present = match item.id {
				Some(id) => catalog
					.find(id)
					.await
					.map_err(|e| BuilderError::Seed(e.to_string()))?
					.is_some(),
				None => stored_names.contains(&item.name),
			};
			if present {
				continue;
			}
			let created = catalog
				.create(item.clone())
				.await
				.map_err(|e| BuilderError::Seed(e.to_string()))?;
			tracing::info!(item_id = ?created.id, name = %created.name, "Seeded menu item");
		}
		Ok(())
	}
}

/// Creates every configured implementation that has a factory and returns the
/// primary one.
fn create_primary<T, E, F>(
	component: &str,
	primary: &str,
	implementations: &HashMap<String, toml::Value>,
	factories: &HashMap<String, F>,
) -> Result<T, BuilderError>
where
	E: std::fmt::Display,
	F: Fn(&toml::Value) -> Result<T, E>,
{
	let mut created = HashMap::new();
	for (name, config) in implementations {
		let Some(factory) = factories.get(name) else {
			tracing::warn!(component, implementation = %name, "No factory registered");
			continue;
		};
		match factory(config) {
			Ok(implementation) => {
				let is_primary = primary == name;
				tracing::info!(component, implementation = %name, enabled = %is_primary, "Loaded");
				created.insert(name.clone(), implementation);
			},
			Err(e) => {
				tracing::error!(
					component,
					implementation = %name,
					error = %e,
					"Failed to create implementation"
				);
				return Err(BuilderError::Config(format!(
					"Failed to create {} implementation '{}': {}",
					component, name, e
				)));
			},
		}
	}

	created.remove(primary).ok_or_else(|| {
		BuilderError::Config(format!(
			"Primary {} '{}' failed to load or has invalid configuration",
			component, primary
		))
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::identity::{hash_password, RequestContext};
	use pizzeria_notify::NotificationFactory;
	use pizzeria_storage::StorageFactory;
	use pizzeria_types::{OrderState, Role};
	use tempfile::TempDir;

	fn factories() -> PizzeriaFactories<StorageFactory, NotificationFactory> {
		PizzeriaFactories {
			storage_factories: pizzeria_storage::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			notification_factories: pizzeria_notify::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		}
	}

	fn config(storage_path: &str) -> Config {
		format!(
			r#"
[service]
id = "pizzeria-test"

[storage]
primary = "file"
[storage.implementations.file]
storage_path = "{}"

[notification]
primary = "log"
[notification.implementations.log]

[[customers]]
id = 1
name = "Papa"
username = "papa"
email = "abc@def.com"
password_hash = "{}"
roles = ["CUSTOMER"]

[[customers]]
id = 2
name = "Luigi"
username = "luigi"
email = "luigi@def.com"
password_hash = "{}"
roles = ["PIZZA_MAKER"]

[[menu]]
id = 1
name = "Hawaiian"
price = "12.00"
toppings = ["ham", "pineapple"]

[[menu]]
name = "Pepperoni"
price = "14.00"
toppings = ["tomato", "pepperoni"]
"#,
			storage_path,
			hash_password("secret"),
			hash_password("secret"),
		)
		.parse()
		.unwrap()
	}

	#[tokio::test]
	async fn test_build_seeds_once_and_restores_registry() {
		let temp_dir = TempDir::new().unwrap();
		let path = temp_dir.path().to_str().unwrap().to_string();

		let engine = PizzeriaBuilder::new(config(&path))
			.build(factories())
			.await
			.unwrap();
		let papa = engine.directory().authenticate("papa", "secret").await.unwrap();
		let luigi = engine.directory().authenticate("luigi", "secret").await.unwrap();
		assert!(luigi.has_role(Role::Worker));
		assert_eq!(engine.catalog().list().await.unwrap().len(), 2);

		let hawaiian = engine.catalog().find(1).await.unwrap().unwrap();
		let customer = RequestContext::new(papa);
		let worker = RequestContext::new(luigi);
		engine.lifecycle().add_item(&customer, hawaiian).await.unwrap();
		engine.lifecycle().confirm(&customer).await.unwrap();
		let picked = engine.lifecycle().pick(&worker).await.unwrap();
		assert_eq!(picked.state, OrderState::Ongoing);

		// second start on the same storage
		let engine = PizzeriaBuilder::new(config(&path))
			.build(factories())
			.await
			.unwrap();
		assert_eq!(engine.catalog().list().await.unwrap().len(), 2);
		let current = engine.lifecycle().current_order(&worker).unwrap().unwrap();
		assert_eq!(current.id, picked.id);
	}

	#[tokio::test]
	async fn test_invalid_backend_config_fails() {
		let mut config = config("./unused");
		config.storage.implementations.insert(
			"file".into(),
			toml::from_str("storage_path = \"\"").unwrap(),
		);
		assert!(matches!(
			PizzeriaBuilder::new(config).build(factories()).await,
			Err(BuilderError::Config(_))
		));
	}
}
