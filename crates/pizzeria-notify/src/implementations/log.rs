//! Notification channel that only writes the confirmation to the log.

use crate::{
	NotificationError, NotificationFactory, NotificationInterface, NotificationRegistry,
};
use async_trait::async_trait;
use pizzeria_types::{
	ConfigSchema, Customer, ImplementationRegistry, Order, Schema, ValidationError,
};

/// Logs confirmations at info level.
pub struct LogNotification;

#[async_trait]
impl NotificationInterface for LogNotification {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LogNotificationSchema)
	}

	async fn send_confirmation(
		&self,
		customer: &Customer,
		order: &Order,
	) -> Result<(), NotificationError> {
		tracing::info!(
			email = %customer.email,
			order_id = %order.display_id(),
			amount = ?order.amount,
			"Order served"
		);
		Ok(())
	}
}

/// Configuration schema for LogNotification; the table takes no fields.
pub struct LogNotificationSchema;

impl ConfigSchema for LogNotificationSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Factory function for the log channel.
pub fn create_notification(
	config: &toml::Value,
) -> Result<Box<dyn NotificationInterface>, NotificationError> {
	LogNotificationSchema
		.validate(config)
		.map_err(|e| NotificationError::Configuration(e.to_string()))?;
	Ok(Box::new(LogNotification))
}

/// Registry for the log notification implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "log";
	type Factory = NotificationFactory;

	fn factory() -> Self::Factory {
		create_notification
	}
}

impl NotificationRegistry for Registry {}
