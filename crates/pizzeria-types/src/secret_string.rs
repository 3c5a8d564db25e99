//! Secret string type for passwords and tokens.
//!
//! `SecretString` zeroes its buffer on drop and never prints its contents in
//! `Debug` or `Display` output, so credentials can travel through structured
//! logs without leaking.

use serde::{Deserialize, Deserializer};
use std::fmt;
use zeroize::Zeroizing;

/// A string that is zeroed on drop and redacted when formatted.
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	/// Wraps the given string.
	pub fn new(s: String) -> Self {
		Self(Zeroizing::new(s))
	}

	/// Exposes the secret as a string slice.
	///
	/// Callers must not log or persist the returned value.
	pub fn expose_secret(&self) -> &str {
		&self.0
	}

	/// Returns true if the secret is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SecretString(***REDACTED***)")
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "***REDACTED***")
	}
}

impl From<String> for SecretString {
	fn from(s: String) -> Self {
		Self::new(s)
	}
}

impl From<&str> for SecretString {
	fn from(s: &str) -> Self {
		Self::new(s.to_string())
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(Self::new)
	}
}
