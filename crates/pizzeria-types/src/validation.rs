//! Configuration validation for implementation-specific TOML tables.
//!
//! Every pluggable backend receives its own `implementations.<name>` table as a
//! raw `toml::Value`. Backends describe what they accept with a [`Schema`] and
//! expose it through [`ConfigSchema`] so bad configuration is rejected at
//! startup instead of on first use.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	#[error("Missing required field: {0}")]
	MissingField(String),
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// Type expected for a configuration field.
#[derive(Debug)]
pub enum FieldType {
	String,
	/// An integer with optional inclusive bounds.
	Integer { min: Option<i64>, max: Option<i64> },
	Boolean,
	/// An array whose elements all have the inner type.
	Array(Box<FieldType>),
}

/// Extra check run after the type check succeeds.
pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

/// A named field in a [`Schema`].
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Attaches a custom check; the closure returns an error message on failure.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}

	fn check(&self, value: &toml::Value) -> Result<(), ValidationError> {
		check_type(&self.name, value, &self.field_type)?;
		if let Some(validator) = &self.validator {
			validator(value).map_err(|message| ValidationError::InvalidValue {
				field: self.name.clone(),
				message,
			})?;
		}
		Ok(())
	}
}

/// Required and optional fields accepted by a configuration table.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a table: required fields must exist, and every present field
	/// must have the declared type and pass its custom check.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			field.check(value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				field.check(value)?;
			}
		}

		Ok(())
	}
}

fn check_type(
	field_name: &str,
	value: &toml::Value,
	expected_type: &FieldType,
) -> Result<(), ValidationError> {
	let mismatch = |expected: &str| ValidationError::TypeMismatch {
		field: field_name.to_string(),
		expected: expected.to_string(),
		actual: value.type_str().to_string(),
	};

	match expected_type {
		FieldType::String if !value.is_str() => Err(mismatch("string")),
		FieldType::Boolean if !value.is_bool() => Err(mismatch("boolean")),
		FieldType::String | FieldType::Boolean => Ok(()),
		FieldType::Integer { min, max } => {
			let int_val = value.as_integer().ok_or_else(|| mismatch("integer"))?;
			if min.is_some_and(|min| int_val < min) || max.is_some_and(|max| int_val > max) {
				return Err(ValidationError::InvalidValue {
					field: field_name.to_string(),
					message: format!("Value {} is out of range {:?}..={:?}", int_val, min, max),
				});
			}
			Ok(())
		},
		FieldType::Array(inner_type) => {
			let array = value.as_array().ok_or_else(|| mismatch("array"))?;
			for (i, item) in array.iter().enumerate() {
				check_type(&format!("{}[{}]", field_name, i), item, inner_type)?;
			}
			Ok(())
		},
	}
}

/// A configuration schema that can validate a backend's TOML table.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}
