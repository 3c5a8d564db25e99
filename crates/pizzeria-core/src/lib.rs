//! Core order engine for the pizzeria service.
//!
//! This crate owns the order lifecycle: the state machine an order moves
//! through, the registry that keeps each worker to one order at a time, and
//! the pricing engine that computes what a served order costs. The
//! collaborators it talks to (persistence, identity, catalog, notification)
//! live here as thin adapters over the storage and notification crates, and
//! [`builder::PizzeriaBuilder`] wires them together from configuration.

use thiserror::Error;

pub mod builder;
pub mod catalog;
pub mod engine;
pub mod identity;
pub mod lifecycle;
pub mod pricing;
pub mod registry;
pub mod repository;
pub mod state;

pub use builder::{BuilderError, PizzeriaBuilder, PizzeriaFactories};
pub use catalog::Catalog;
pub use engine::PizzeriaEngine;
pub use identity::{hash_password, CustomerDirectory, RequestContext};
pub use lifecycle::OrderLifecycle;
pub use pricing::PricingRules;
pub use registry::{OngoingOrders, RegistryError};
pub use repository::{OrderRepository, StorageOrderRepository};

/// Errors surfaced by lifecycle operations.
#[derive(Debug, Error)]
pub enum OrderError {
	/// The acting identity lacks the required permission or role.
	#[error("Authorization denied: {0}")]
	AuthorizationDenied(String),
	/// A lifecycle precondition does not hold.
	#[error("Invariant violation: {0}")]
	InvariantViolation(String),
	/// The referenced order does not exist, or there is nothing to pick.
	#[error("Not found: {0}")]
	NotFound(String),
	/// A collaborator failed.
	#[error("Storage error: {0}")]
	Storage(String),
}
