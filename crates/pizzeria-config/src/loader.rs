//! Loader for configurations split across several files.
//!
//! Included files may include further files. Every top-level section must be
//! defined exactly once across the whole set, and a file may be loaded only once.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Configuration loader that handles multi-file configurations with includes.
pub struct ConfigLoader {
	/// Base path for resolving relative includes
	base_path: PathBuf,
	/// Canonical paths of files already read
	loaded_files: HashSet<PathBuf>,
	/// Which file defined each top-level section
	section_sources: HashMap<String, PathBuf>,
}

impl ConfigLoader {
	/// Creates a new ConfigLoader with the given base path.
	pub fn new(base_path: impl AsRef<Path>) -> Self {
		Self {
			base_path: base_path.as_ref().to_path_buf(),
			loaded_files: HashSet::new(),
			section_sources: HashMap::new(),
		}
	}

	/// Loads a configuration file and all its includes, then validates the result.
	pub async fn load_config(
		&mut self,
		config_path: impl AsRef<Path>,
	) -> Result<Config, ConfigError> {
		let config_path = self.resolve_path(config_path)?;

		let mut combined = toml::Table::new();
		let mut pending = vec![config_path];

		while let Some(path) = pending.pop() {
			let content = self.load_file(&path).await?;
			let mut table: toml::Table = toml::from_str(&content)?;

			if let Some(include_value) = table.remove("include") {
				// Pushed in reverse so files are read in the listed order.
				for include in extract_includes(&include_value)?.into_iter().rev() {
					pending.push(self.resolve_path(include)?);
				}
			}

			for (key, value) in table {
				if let Some(existing_source) = self.section_sources.get(&key) {
					return Err(ConfigError::Validation(format!(
						"Duplicate section '{}' found in {} and {}. \
						Each top-level section must be unique across all configuration files.",
						key,
						existing_source.display(),
						path.display()
					)));
				}
				self.section_sources.insert(key.clone(), path.clone());
				combined.insert(key, value);
			}
		}

		let config_str = toml::to_string(&combined).map_err(|e| {
			ConfigError::Parse(format!("Failed to serialize combined config: {}", e))
		})?;
		config_str.parse()
	}

	/// Reads a file once and resolves environment variables in it.
	async fn load_file(&mut self, path: &Path) -> Result<String, ConfigError> {
		let canonical_path = tokio::fs::canonicalize(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Cannot resolve path {}: {}", path.display(), e),
			))
		})?;

		if !self.loaded_files.insert(canonical_path.clone()) {
			return Err(ConfigError::Validation(format!(
				"Circular include detected: {} was already loaded",
				canonical_path.display()
			)));
		}

		let content = tokio::fs::read_to_string(path).await?;
		resolve_env_vars(&content)
	}

	/// Resolves a path relative to the base path.
	fn resolve_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
		let path = path.as_ref();

		let resolved = if path.is_absolute() {
			path.to_path_buf()
		} else {
			self.base_path.join(path)
		};

		if !resolved.exists() {
			return Err(ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Configuration file not found: {}", resolved.display()),
			)));
		}

		Ok(resolved)
	}
}

/// Reads an `include` value: a single path or an array of paths.
fn extract_includes(include_value: &toml::Value) -> Result<Vec<PathBuf>, ConfigError> {
	if let Some(path_str) = include_value.as_str() {
		return Ok(vec![PathBuf::from(path_str)]);
	}

	let include_array = include_value.as_array().ok_or_else(|| {
		ConfigError::Validation("Include must be a string or array of strings".into())
	})?;

	include_array
		.iter()
		.map(|item| {
			item.as_str().map(PathBuf::from).ok_or_else(|| {
				ConfigError::Validation("Include array must contain only strings".into())
			})
		})
		.collect()
}
