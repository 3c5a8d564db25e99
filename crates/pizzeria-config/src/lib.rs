//! Configuration module for the pizzeria service.
//!
//! This module provides structures and utilities for managing service configuration.
//! It supports loading configuration from TOML files and validates the result before
//! anything is built from it.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files:
//! - Use `include = ["storage.toml", "menu.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)

mod loader;

pub use loader::ConfigLoader;

use pizzeria_types::{Customer, MenuItem};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message only; the default rendering echoes the whole input.
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the pizzeria service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	/// Identity of this service instance.
	pub service: ServiceConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for served-order notifications.
	pub notification: NotificationConfig,
	/// Discount rules applied when an order is served.
	#[serde(default)]
	pub pricing: PricingConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
	/// Accounts created at startup when they are not stored yet.
	#[serde(default)]
	pub customers: Vec<Customer>,
	/// Menu items created at startup when they are not stored yet.
	#[serde(default)]
	pub menu: Vec<MenuItem>,
}

/// Configuration specific to the service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this instance, attached to the root log span.
	pub id: String,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for served-order notifications.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Upper bound on a single delivery attempt, in seconds.
	#[serde(default = "default_notification_timeout")]
	pub timeout_seconds: u64,
	/// Map of notification implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

fn default_notification_timeout() -> u64 {
	5
}

/// Discount rules for the pricing engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
	/// Topping that makes an item eligible for the bundle discount.
	#[serde(default = "default_qualifying_topping")]
	pub qualifying_topping: String,
	/// Percentage taken off the most expensive qualifying item.
	#[serde(default = "default_discount_percent")]
	pub discount_percent: u32,
	/// Exact number of qualifying items that triggers the discount.
	#[serde(default = "default_bundle_size")]
	pub bundle_size: usize,
}

impl Default for PricingConfig {
	fn default() -> Self {
		Self {
			qualifying_topping: default_qualifying_topping(),
			discount_percent: default_discount_percent(),
			bundle_size: default_bundle_size(),
		}
	}
}

fn default_qualifying_topping() -> String {
	"pineapple".to_string()
}

fn default_discount_percent() -> u32 {
	10
}

fn default_bundle_size() -> usize {
	3
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)));
				},
			},
		};

		result.push_str(&input[last_end..full_match.start()]);
		result.push_str(&value);
		last_end = full_match.end();
	}
	result.push_str(&input[last_end..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	///
	/// Each top-level section must be unique across all configuration files.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Validates cross-field rules that deserialization cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.trim().is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}

		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		if !self
			.notification
			.implementations
			.contains_key(&self.notification.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary notification '{}' not found in implementations",
				self.notification.primary
			)));
		}
		if self.notification.timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"Notification timeout_seconds must be greater than 0".into(),
			));
		}

		if self.pricing.discount_percent > 100 {
			return Err(ConfigError::Validation(format!(
				"discount_percent must be within 0..=100, got {}",
				self.pricing.discount_percent
			)));
		}
		if self.pricing.bundle_size == 0 {
			return Err(ConfigError::Validation(
				"bundle_size must be at least 1".into(),
			));
		}

		let mut ids = HashSet::new();
		let mut usernames = HashSet::new();
		for customer in &self.customers {
			if !ids.insert(customer.id) {
				return Err(ConfigError::Validation(format!(
					"Duplicate customer id {}",
					customer.id
				)));
			}
			if !usernames.insert(customer.username.as_str()) {
				return Err(ConfigError::Validation(format!(
					"Duplicate username '{}'",
					customer.username
				)));
			}
		}

		let mut menu_ids = HashSet::new();
		for item in &self.menu {
			if let Some(id) = item.id {
				if !menu_ids.insert(id) {
					return Err(ConfigError::Validation(format!(
						"Duplicate menu item id {}",
						id
					)));
				}
			}
			if item.price < Decimal::ZERO {
				return Err(ConfigError::Validation(format!(
					"Menu item '{}' has a negative price",
					item.name
				)));
			}
		}

		Ok(())
	}
}

/// Parses a TOML string: environment variables are resolved first and the
/// result is validated.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pizzeria_types::Role;

	const BASE: &str = r#"
[service]
id = "pizzeria-test"

[storage]
primary = "memory"
[storage.implementations.memory]

[notification]
primary = "log"
[notification.implementations.log]
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("PIZZERIA_TEST_HOST", "localhost");
		std::env::set_var("PIZZERIA_TEST_PORT", "8080");

		let input = "host = \"${PIZZERIA_TEST_HOST}:${PIZZERIA_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:8080\"");

		std::env::remove_var("PIZZERIA_TEST_HOST");
		std::env::remove_var("PIZZERIA_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${PIZZERIA_MISSING_VAR:-fallback}\"";
		assert_eq!(resolve_env_vars(input).unwrap(), "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("value = \"${PIZZERIA_MISSING_VAR}\"");
		assert!(result.unwrap_err().to_string().contains("PIZZERIA_MISSING_VAR"));
	}

	#[test]
	fn test_defaults_applied() {
		let config: Config = BASE.parse().unwrap();
		assert_eq!(config.service.id, "pizzeria-test");
		assert_eq!(config.notification.timeout_seconds, 5);
		assert_eq!(config.pricing.qualifying_topping, "pineapple");
		assert_eq!(config.pricing.discount_percent, 10);
		assert_eq!(config.pricing.bundle_size, 3);
		assert!(config.api.is_none());
		assert!(config.customers.is_empty());
	}

	#[test]
	fn test_seed_data_parsed() {
		let config_str = format!(
			r#"{}
[api]
enabled = true

[[customers]]
id = 1
name = "Papa"
username = "papa"
email = "abc@def.com"
password_hash = "00"
roles = ["CUSTOMER", "PIZZA_MAKER"]

[[menu]]
id = 1
name = "Hawaii"
price = "14.00"
toppings = ["pineapple", "ham"]
"#,
			BASE
		);
		let config: Config = config_str.parse().unwrap();
		let api = config.api.unwrap();
		assert_eq!((api.host.as_str(), api.port), ("127.0.0.1", 3000));
		assert_eq!(config.customers[0].roles, vec![Role::Customer, Role::Worker]);
		assert_eq!(config.menu[0].price, Decimal::new(1400, 2));
		assert!(config.menu[0].has_topping("pineapple"));
	}

	#[test]
	fn test_primary_must_be_configured() {
		let config_str = BASE.replace("primary = \"log\"", "primary = \"webhook\"");
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("Primary notification 'webhook'"));
	}

	#[test]
	fn test_invalid_pricing_rejected() {
		let too_much = format!("{}\n[pricing]\ndiscount_percent = 101\n", BASE);
		assert!(matches!(
			too_much.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));

		let empty_bundle = format!("{}\n[pricing]\nbundle_size = 0\n", BASE);
		assert!(matches!(
			empty_bundle.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_duplicate_usernames_rejected() {
		let config_str = format!(
			r#"{}
[[customers]]
id = 1
name = "A"
username = "same"
email = "a@x.com"
password_hash = "00"

[[customers]]
id = 2
name = "B"
username = "same"
email = "b@x.com"
password_hash = "00"
"#,
			BASE
		);
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("Duplicate username 'same'"));
	}

	#[test]
	fn test_negative_menu_price_rejected() {
		let config_str = format!(
			"{}\n[[menu]]\nname = \"Refund\"\nprice = \"-1.00\"\n",
			BASE
		);
		let err = config_str.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("negative price"));
	}
}
