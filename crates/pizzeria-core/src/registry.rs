//! Registry of the order each worker is currently preparing.
//!
//! A worker holds at most one ONGOING order. The persisted order state does not
//! enforce this; the registry does, with an atomic check-and-insert.

use dashmap::{mapref::entry::Entry, DashMap};
use pizzeria_types::{CustomerId, Order};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
	#[error("Worker {worker_id} already holds order {order_id}")]
	AlreadyHoldingOrder {
		worker_id: CustomerId,
		order_id: String,
	},
}

/// Worker id -> ongoing order.
#[derive(Debug, Default)]
pub struct OngoingOrders {
	entries: DashMap<CustomerId, Arc<Order>>,
}

impl OngoingOrders {
	pub fn new() -> Self {
		Self::default()
	}

	/// Assigns `order` to `worker`, failing if the worker already holds one.
	pub fn assign(&self, worker: CustomerId, order: Arc<Order>) -> Result<(), RegistryError> {
		match self.entries.entry(worker) {
			Entry::Occupied(held) => Err(RegistryError::AlreadyHoldingOrder {
				worker_id: worker,
				order_id: held.get().display_id(),
			}),
			Entry::Vacant(slot) => {
				slot.insert(order);
				Ok(())
			},
		}
	}

	pub fn get(&self, worker: CustomerId) -> Option<Arc<Order>> {
		self.entries.get(&worker).map(|entry| Arc::clone(entry.value()))
	}

	/// Removes the worker's entry; a no-op if there is none.
	pub fn release(&self, worker: CustomerId) {
		self.entries.remove(&worker);
	}

	/// Number of workers currently holding an order.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn order(id: u64) -> Arc<Order> {
		let mut order = Order::draft(1);
		order.id = Some(id);
		Arc::new(order)
	}

	#[test]
	fn test_assign_get_release() {
		let registry = OngoingOrders::new();
		assert!(registry.get(7).is_none());

		registry.assign(7, order(1)).unwrap();
		assert_eq!(registry.get(7).unwrap().id, Some(1));

		let err = registry.assign(7, order(2)).unwrap_err();
		assert!(err.to_string().contains("already holds order 1"));
		assert_eq!(registry.get(7).unwrap().id, Some(1));

		registry.release(7);
		assert!(registry.is_empty());
		// releasing an empty slot is fine
		registry.release(7);
	}

	#[test]
	fn test_get_returns_same_reference() {
		let registry = OngoingOrders::new();
		registry.assign(3, order(9)).unwrap();
		assert!(Arc::ptr_eq(&registry.get(3).unwrap(), &registry.get(3).unwrap()));
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn test_concurrent_assign_single_winner() {
		let registry = Arc::new(OngoingOrders::new());
		let mut handles = Vec::new();
		for id in 0..32u64 {
			let registry = Arc::clone(&registry);
			handles.push(tokio::spawn(async move { registry.assign(42, order(id)).is_ok() }));
		}

		let mut winners = 0;
		for handle in handles {
			if handle.await.unwrap() {
				winners += 1;
			}
		}
		assert_eq!(winners, 1);
		assert_eq!(registry.len(), 1);
	}
}
