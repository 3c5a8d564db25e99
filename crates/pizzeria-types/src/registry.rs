//! Registry trait for self-registering implementations.
//!
//! Pluggable backends (storage, notification) expose a `Registry` unit struct
//! that names the backend as it appears in configuration and hands out the
//! factory that builds it.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// Name used under `implementations.<name>` in the TOML configuration,
	/// e.g. "memory" for `storage.implementations.memory`.
	const NAME: &'static str;

	/// Factory function type defined by the owning crate.
	type Factory;

	/// Returns the factory that builds this implementation from its config table.
	fn factory() -> Self::Factory;
}
