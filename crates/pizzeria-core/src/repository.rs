//! Persistence collaborator for orders.
//!
//! [`OrderRepository`] is the narrow set of queries the order lifecycle needs.
//! [`StorageOrderRepository`] answers them from a [`StorageService`] by scanning
//! the orders namespace; ids are handed out from a counter seeded with the
//! highest stored id.

use async_trait::async_trait;
use pizzeria_storage::{StorageError, StorageService};
use pizzeria_types::{CustomerId, Order, OrderId, OrderState, StorageKey};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Order lookups and saves used by the lifecycle.
#[async_trait]
pub trait OrderRepository: Send + Sync {
	/// All DRAFT orders owned by the customer.
	async fn find_draft_orders_by_customer(
		&self,
		customer_id: CustomerId,
	) -> Result<Vec<Order>, StorageError>;

	/// The PLACED order that arrived first, if any.
	async fn find_first_placed_order(&self) -> Result<Option<Order>, StorageError>;

	async fn find_order_by_id(&self, id: OrderId) -> Result<Option<Order>, StorageError>;

	/// Every order currently in the given state, by ascending id.
	async fn find_orders_by_state(&self, state: OrderState) -> Result<Vec<Order>, StorageError>;

	/// Inserts or replaces the order, assigning an id on first save.
	async fn save(&self, order: Order) -> Result<Order, StorageError>;

	async fn count_orders(&self) -> Result<u64, StorageError>;
}

/// [`OrderRepository`] backed by the configured storage backend.
pub struct StorageOrderRepository {
	storage: Arc<StorageService>,
	last_id: AtomicU64,
}

impl StorageOrderRepository {
	/// Opens the repository, continuing the id sequence found in storage.
	pub async fn open(storage: Arc<StorageService>) -> Result<Self, StorageError> {
		let last_id = storage.max_id(StorageKey::Orders.as_str()).await?;
		Ok(Self {
			storage,
			last_id: AtomicU64::new(last_id),
		})
	}

	async fn load_all(&self) -> Result<Vec<Order>, StorageError> {
		Ok(self
			.storage
			.load_all::<Order>(StorageKey::Orders.as_str())
			.await?
			.into_iter()
			.map(|(_, order)| order)
			.collect())
	}
}

#[async_trait]
impl OrderRepository for StorageOrderRepository {
	async fn find_draft_orders_by_customer(
		&self,
		customer_id: CustomerId,
	) -> Result<Vec<Order>, StorageError> {
		Ok(self
			.load_all()
			.await?
			.into_iter()
			.filter(|order| order.customer_id == customer_id && order.state == OrderState::Draft)
			.collect())
	}

	async fn find_first_placed_order(&self) -> Result<Option<Order>, StorageError> {
		Ok(self
			.load_all()
			.await?
			.into_iter()
			.find(|order| order.state == OrderState::Placed))
	}

	async fn find_order_by_id(&self, id: OrderId) -> Result<Option<Order>, StorageError> {
		self.storage
			.find(StorageKey::Orders.as_str(), &id.to_string())
			.await
	}

	async fn find_orders_by_state(&self, state: OrderState) -> Result<Vec<Order>, StorageError> {
		Ok(self
			.load_all()
			.await?
			.into_iter()
			.filter(|order| order.state == state)
			.collect())
	}

	async fn save(&self, mut order: Order) -> Result<Order, StorageError> {
		let id = match order.id {
			Some(id) => id,
			None => {
				let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
				order.id = Some(id);
				id
			},
		};

		self.storage
			.store(StorageKey::Orders.as_str(), &id.to_string(), &order)
			.await?;
		tracing::debug!(order_id = id, state = %order.state, "Saved order");
		Ok(order)
	}

	async fn count_orders(&self) -> Result<u64, StorageError> {
		Ok(self
			.storage
			.list_ids(StorageKey::Orders.as_str())
			.await?
			.len() as u64)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pizzeria_storage::implementations::{file::FileStorage, memory::MemoryStorage};
	use pizzeria_types::MenuItem;
	use rust_decimal::Decimal;
	use tempfile::TempDir;

	async fn repository() -> StorageOrderRepository {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		StorageOrderRepository::open(storage).await.unwrap()
	}

	#[tokio::test]
	async fn test_save_assigns_sequential_ids() {
		let repo = repository().await;
		let first = repo.save(Order::draft(1)).await.unwrap();
		let second = repo.save(Order::draft(2)).await.unwrap();
		assert_eq!(first.id, Some(1));
		assert_eq!(second.id, Some(2));

		// saving again keeps the id
		let again = repo.save(first.clone()).await.unwrap();
		assert_eq!(again.id, Some(1));
		assert_eq!(repo.count_orders().await.unwrap(), 2);
	}

	#[tokio::test]
	async fn test_queries_filter_by_state_and_owner() {
		let repo = repository().await;
		repo.save(Order::draft(1)).await.unwrap();
		repo.save(Order::draft(2)).await.unwrap();

		let mut placed = Order::draft(1);
		placed.state = OrderState::Placed;
		let placed_first = repo.save(placed.clone()).await.unwrap();
		repo.save(placed).await.unwrap();

		let drafts = repo.find_draft_orders_by_customer(1).await.unwrap();
		assert_eq!(drafts.len(), 1);
		assert_eq!(drafts[0].customer_id, 1);

		let first = repo.find_first_placed_order().await.unwrap().unwrap();
		assert_eq!(first.id, placed_first.id);
		assert_eq!(repo.find_orders_by_state(OrderState::Placed).await.unwrap().len(), 2);
		assert!(repo.find_order_by_id(99).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_reload_reflects_last_saved_state() {
		let temp_dir = TempDir::new().unwrap();
		let storage = Arc::new(StorageService::new(Box::new(FileStorage::new(
			temp_dir.path().to_path_buf(),
		))));
		let repo = StorageOrderRepository::open(Arc::clone(&storage)).await.unwrap();

		let mut order = Order::draft(5);
		order
			.items
			.push(MenuItem::new("Hawaiian", Decimal::new(1200, 2), &["pineapple"]));
		order.state = OrderState::Placed;
		let saved = repo.save(order).await.unwrap();

		let loaded = repo.find_order_by_id(1).await.unwrap().unwrap();
		assert_eq!(loaded, saved);

		// a reopened repository continues the id sequence
		let reopened = StorageOrderRepository::open(storage).await.unwrap();
		assert_eq!(reopened.save(Order::draft(5)).await.unwrap().id, Some(2));
	}
}
