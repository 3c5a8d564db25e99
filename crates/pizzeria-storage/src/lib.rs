//! Storage module for the pizzeria service.
//!
//! This module provides the persistence backend abstraction. Backends only deal
//! in raw bytes under string keys; [`StorageService`] layers typed JSON records
//! on top, grouped into namespaces (see [`pizzeria_types::StorageKey`]).

use async_trait::async_trait;
use pizzeria_types::{ConfigSchema, ImplementationRegistry};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// The requested key does not exist.
	#[error("Not found")]
	NotFound,
	/// A record could not be encoded or decoded.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// The backend itself failed.
	#[error("Backend error: {0}")]
	Backend(String),
	/// The backend configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Low-level interface every storage backend implements.
///
/// Keys have the form `"<namespace>:<id>"`. A single `set_bytes` call must be
/// atomic with respect to concurrent readers of the same key; nothing stronger
/// is assumed.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes, replacing any previous value.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value for the given key; deleting a missing key is not an error.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Lists every key stored under the given namespace.
	async fn list_keys(&self, namespace: &str) -> Result<Vec<String>, StorageError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Factory signature every storage implementation provides.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Returns `(name, factory)` for every built-in storage implementation.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level storage service that provides typed operations.
pub struct StorageService {
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	fn key(namespace: &str, id: &str) -> String {
		format!("{}:{}", namespace, id)
	}

	/// Serializes `data` to JSON and stores it, creating or overwriting.
	pub async fn store<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&Self::key(namespace, id), bytes).await
	}

	/// Retrieves and deserializes a record.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(&Self::key(namespace, id)).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Retrieves a record, mapping a missing key to `None`.
	pub async fn find<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<Option<T>, StorageError> {
		match self.retrieve(namespace, id).await {
			Ok(value) => Ok(Some(value)),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e),
		}
	}

	/// Removes a record.
	pub async fn remove(&self, namespace: &str, id: &str) -> Result<(), StorageError> {
		self.backend.delete(&Self::key(namespace, id)).await
	}

	/// Checks if a record exists.
	pub async fn exists(&self, namespace: &str, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(&Self::key(namespace, id)).await
	}

	/// Returns the ids of every record in a namespace, in no particular order.
	pub async fn list_ids(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
		let prefix = format!("{}:", namespace);
		Ok(self
			.backend
			.list_keys(namespace)
			.await?
			.into_iter()
			.filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
			.collect())
	}

	/// Loads every record in a namespace whose id is numeric, sorted by id.
	///
	/// Keys that disappear between listing and loading are skipped.
	pub async fn load_all<T: DeserializeOwned>(
		&self,
		namespace: &str,
	) -> Result<Vec<(u64, T)>, StorageError> {
		let mut ids: Vec<u64> = self
			.list_ids(namespace)
			.await?
			.iter()
			.filter_map(|id| id.parse().ok())
			.collect();
		ids.sort_unstable();

		let mut records = Vec::with_capacity(ids.len());
		for id in ids {
			if let Some(record) = self.find(namespace, &id.to_string()).await? {
				records.push((id, record));
			}
		}
		Ok(records)
	}

	/// Highest numeric id in a namespace, or 0 when it is empty.
	pub async fn max_id(&self, namespace: &str) -> Result<u64, StorageError> {
		Ok(self
			.list_ids(namespace)
			.await?
			.iter()
			.filter_map(|id| id.parse::<u64>().ok())
			.max()
			.unwrap_or(0))
	}
}
