//! Notification module for the pizzeria service.
//!
//! Tells a customer that their order has been served. Delivery is best effort:
//! callers decide what a failure means, and the order lifecycle discards it.

use async_trait::async_trait;
use pizzeria_types::{ConfigSchema, Customer, ImplementationRegistry, Order};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod log;
	pub mod webhook;
}

/// Errors that can occur while sending a notification.
#[derive(Debug, Error)]
pub enum NotificationError {
	/// The remote endpoint could not be reached.
	#[error("Network error: {0}")]
	Network(String),
	/// The remote endpoint answered with a failure.
	#[error("Notification rejected: {0}")]
	Rejected(String),
	/// The implementation configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Interface every notification channel implements.
#[async_trait]
pub trait NotificationInterface: Send + Sync {
	/// Returns the configuration schema for this channel.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Sends the "your order has been served" confirmation.
	async fn send_confirmation(
		&self,
		customer: &Customer,
		order: &Order,
	) -> Result<(), NotificationError>;
}

/// Factory signature every notification implementation provides.
pub type NotificationFactory =
	fn(&toml::Value) -> Result<Box<dyn NotificationInterface>, NotificationError>;

/// Registry trait for notification implementations.
pub trait NotificationRegistry: ImplementationRegistry<Factory = NotificationFactory> {}

/// Returns `(name, factory)` for every built-in notification implementation.
pub fn get_all_implementations() -> Vec<(&'static str, NotificationFactory)> {
	use implementations::{log, webhook};

	vec![
		(log::Registry::NAME, log::Registry::factory()),
		(webhook::Registry::NAME, webhook::Registry::factory()),
	]
}

/// Service that forwards confirmations to the configured channel.
pub struct NotificationService {
	channel: Box<dyn NotificationInterface>,
}

impl NotificationService {
	pub fn new(channel: Box<dyn NotificationInterface>) -> Self {
		Self { channel }
	}

	/// Sends a served-order confirmation to the order's customer.
	pub async fn send_confirmation(
		&self,
		customer: &Customer,
		order: &Order,
	) -> Result<(), NotificationError> {
		tracing::debug!(
			customer_id = customer.id,
			order_id = %order.display_id(),
			"Sending confirmation"
		);
		self.channel.send_confirmation(customer, order).await
	}
}
