//! File-based storage backend.
//!
//! Each record is one JSON file: the key `"orders:42"` lives at
//! `<storage_path>/orders/42.json`. Each write goes to its own uniquely named
//! temporary file that is renamed into place, so readers never observe a
//! half-written record.

use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry};
use async_trait::async_trait;
use pizzeria_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError,
};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tokio::fs;

const DEFAULT_STORAGE_PATH: &str = "./data/storage";

/// File-based storage implementation.
pub struct FileStorage {
	base_path: PathBuf,
}

impl FileStorage {
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Maps `"<namespace>:<id>"` to its file, sanitising the id for the filesystem.
	fn get_file_path(&self, key: &str) -> Result<PathBuf, StorageError> {
		let (namespace, id) = key
			.split_once(':')
			.filter(|(namespace, id)| !namespace.is_empty() && !id.is_empty())
			.ok_or_else(|| StorageError::Backend(format!("Malformed storage key: {}", key)))?;
		let safe_id = id.replace(['/', '\\', ':'], "_");
		Ok(self
			.base_path
			.join(namespace)
			.join(format!("{}.json", safe_id)))
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.get_file_path(key)?;
		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.get_file_path(key)?;

		let parent = path
			.parent()
			.map(PathBuf::from)
			.ok_or_else(|| StorageError::Backend(format!("No parent directory for {}", key)))?;
		fs::create_dir_all(&parent)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		tokio::task::spawn_blocking(move || -> std::io::Result<()> {
			let mut temp = NamedTempFile::new_in(&parent)?;
			temp.write_all(&value)?;
			temp.persist(&path).map_err(|e| e.error)?;
			Ok(())
		})
		.await
		.map_err(|e| StorageError::Backend(e.to_string()))?
		.map_err(|e| StorageError::Backend(e.to_string()))
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.get_file_path(key)?;
		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.get_file_path(key)?;
		fs::try_exists(&path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	async fn list_keys(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
		let dir = self.base_path.join(namespace);
		let mut entries = match fs::read_dir(&dir).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let mut keys = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() != Some(std::ffi::OsStr::new("json")) {
				continue;
			}
			match path.file_stem().and_then(|stem| stem.to_str()) {
				Some(id) => keys.push(format!("{}:{}", namespace, id)),
				None => tracing::debug!("Skipping file with non UTF-8 name {:?}", path),
			}
		}
		Ok(keys)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("storage_path", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(path) if path.trim().is_empty() => {
							Err("storage_path cannot be empty".to_string())
						},
						_ => Ok(()),
					}
				}),
			],
		);
		schema.validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for record files (default: "./data/storage")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_STORAGE_PATH);

	Ok(Box::new(FileStorage::new(PathBuf::from(storage_path))))
}

/// Registry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}
