//! Main entry point for the pizzeria service.
//!
//! Loads the configuration, wires the order engine with the configured storage
//! and notification backends, and serves the HTTP API until interrupted.

use clap::Parser;
use pizzeria_config::Config;
use pizzeria_core::{PizzeriaBuilder, PizzeriaEngine, PizzeriaFactories};
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod auth;
mod error;
mod server;

use pizzeria_notify::implementations::log::create_notification as create_log_notification;
use pizzeria_notify::implementations::webhook::create_notification as create_webhook_notification;
use pizzeria_storage::implementations::file::create_storage as create_file_storage;
use pizzeria_storage::implementations::memory::create_storage as create_memory_storage;

/// Command-line arguments for the pizzeria service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config/pizzeria.toml", env = "PIZZERIA_CONFIG")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config_path = args
		.config
		.to_str()
		.ok_or("Configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!(service_id = %config.service.id, "Loaded configuration");

	let engine = Arc::new(build_engine(config.clone()).await?);

	match config.api.filter(|api| api.enabled) {
		Some(api_config) => {
			tokio::select! {
				result = server::start_server(api_config, Arc::clone(&engine)) => {
					tracing::info!("API server finished");
					result?;
				}
				_ = tokio::signal::ctrl_c() => {
					tracing::info!("Shutdown requested");
				}
			}
		},
		None => {
			tracing::warn!("API disabled; nothing to serve until interrupted");
			tokio::signal::ctrl_c().await?;
		},
	}

	tracing::info!("Stopped pizzeria");
	Ok(())
}

/// Creates a factory HashMap with the appropriate function pointer type.
macro_rules! create_factory_map {
    ($interface:path, $error:path, $( $name:literal => $factory:expr ),* $(,)?) => {{
        let mut factories = std::collections::HashMap::new();
        $(
            factories.insert(
                $name.to_string(),
                $factory as fn(&toml::Value) -> Result<Box<dyn $interface>, $error>
            );
        )*
        factories
    }};
}

/// Wires the engine with every storage and notification implementation this
/// binary ships.
async fn build_engine(config: Config) -> Result<PizzeriaEngine, Box<dyn std::error::Error>> {
	let storage_factories = create_factory_map!(
		pizzeria_storage::StorageInterface,
		pizzeria_storage::StorageError,
		"file" => create_file_storage,
		"memory" => create_memory_storage,
	);

	let notification_factories = create_factory_map!(
		pizzeria_notify::NotificationInterface,
		pizzeria_notify::NotificationError,
		"log" => create_log_notification,
		"webhook" => create_webhook_notification,
	);

	let factories = PizzeriaFactories {
		storage_factories,
		notification_factories,
	};

	Ok(PizzeriaBuilder::new(config).build(factories).await?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_args_parse() {
		let args = Args::parse_from(["pizzeria", "--config", "custom.toml", "-l", "debug"]);
		assert_eq!(args.config, PathBuf::from("custom.toml"));
		assert_eq!(args.log_level, "debug");
	}

	#[tokio::test]
	async fn test_build_engine_from_config() {
		let config: Config = r#"
[service]
id = "pizzeria-test"

[storage]
primary = "memory"
[storage.implementations.memory]

[notification]
primary = "webhook"
[notification.implementations.webhook]
url = "http://127.0.0.1:9/served"
"#
		.parse()
		.unwrap();

		let engine = build_engine(config).await.unwrap();
		assert_eq!(engine.config().service.id, "pizzeria-test");
		assert!(engine.catalog().list().await.unwrap().is_empty());
	}
}
