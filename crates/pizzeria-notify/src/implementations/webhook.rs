//! Notification channel that POSTs the confirmation to an HTTP endpoint.
//!
//! The endpoint receives a JSON body with the customer's contact details and
//! the served order. Any non-2xx answer counts as a failed delivery.

use crate::{
	NotificationError, NotificationFactory, NotificationInterface, NotificationRegistry,
};
use async_trait::async_trait;
use pizzeria_types::{
	ConfigSchema, Customer, Field, FieldType, ImplementationRegistry, Order, Schema,
	SecretString, ValidationError,
};
use serde::Serialize;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

/// Body posted to the webhook.
#[derive(Debug, Serialize)]
struct ConfirmationPayload<'a> {
	name: &'a str,
	email: &'a str,
	order: &'a Order,
}

/// HTTP webhook channel.
pub struct WebhookNotification {
	client: reqwest::Client,
	url: String,
	token: Option<SecretString>,
}

impl WebhookNotification {
	pub fn new(
		url: String,
		token: Option<SecretString>,
		timeout: Duration,
	) -> Result<Self, NotificationError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| NotificationError::Configuration(e.to_string()))?;
		Ok(Self { client, url, token })
	}
}

#[async_trait]
impl NotificationInterface for WebhookNotification {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(WebhookNotificationSchema)
	}

	async fn send_confirmation(
		&self,
		customer: &Customer,
		order: &Order,
	) -> Result<(), NotificationError> {
		let payload = ConfirmationPayload {
			name: &customer.name,
			email: &customer.email,
			order,
		};

		let mut request = self.client.post(&self.url).json(&payload);
		if let Some(token) = &self.token {
			request = request.bearer_auth(token.expose_secret());
		}

		let response = request
			.send()
			.await
			.map_err(|e| NotificationError::Network(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			return Err(NotificationError::Rejected(format!(
				"{} answered {}",
				self.url, status
			)));
		}
		Ok(())
	}
}

/// Configuration schema for WebhookNotification.
pub struct WebhookNotificationSchema;

impl ConfigSchema for WebhookNotificationSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("url", FieldType::String).with_validator(|value| {
				match value.as_str() {
					Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
						Ok(())
					},
					_ => Err("url must start with http:// or https://".to_string()),
				}
			})],
			vec![
				Field::new("token", FieldType::String),
				Field::new(
					"timeout_seconds",
					FieldType::Integer {
						min: Some(1),
						max: Some(60),
					},
				),
			],
		);
		schema.validate(config)
	}
}

/// Factory function for the webhook channel.
///
/// Configuration parameters:
/// - `url`: Endpoint receiving the confirmation (required)
/// - `token`: Bearer token sent with every request (optional)
/// - `timeout_seconds`: Request timeout, 1-60 (default: 5)
pub fn create_notification(
	config: &toml::Value,
) -> Result<Box<dyn NotificationInterface>, NotificationError> {
	WebhookNotificationSchema
		.validate(config)
		.map_err(|e| NotificationError::Configuration(e.to_string()))?;

	let url = config
		.get("url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| NotificationError::Configuration("url is required".into()))?
		.to_string();
	let token = config
		.get("token")
		.and_then(|v| v.as_str())
		.map(SecretString::from);
	let timeout = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.map(|secs| secs as u64)
		.unwrap_or(DEFAULT_TIMEOUT_SECONDS);

	Ok(Box::new(WebhookNotification::new(
		url,
		token,
		Duration::from_secs(timeout),
	)?))
}

/// Registry for the webhook notification implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "webhook";
	type Factory = NotificationFactory;

	fn factory() -> Self::Factory {
		create_notification
	}
}

impl NotificationRegistry for Registry {}
