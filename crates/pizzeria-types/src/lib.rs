//! Common types module for the pizzeria service.
//!
//! This module defines the data types shared by every pizzeria crate: the
//! people placing and preparing orders, the menu items they order, the order
//! itself with its lifecycle state, and the small pieces of infrastructure
//! (storage namespaces, configuration schemas, secrets) that the
//! implementation crates agree on.

/// API response types shared by the HTTP adapter.
pub mod api;
/// Customers, roles and the permissions roles grant.
pub mod customer;
/// Menu items ("pizzas") referenced by orders.
pub mod menu;
/// Orders and their lifecycle states.
pub mod order;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Redacting wrapper for passwords and tokens.
pub mod secret_string;
/// Storage namespaces for persisted records.
pub mod storage;
/// Configuration validation types for implementation-specific TOML tables.
pub mod validation;

pub use api::*;
pub use customer::*;
pub use menu::*;
pub use order::*;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use storage::*;
pub use validation::*;
