//! Menu catalog. Plain storage pass-through, no business rules.

use pizzeria_storage::{StorageError, StorageService};
use pizzeria_types::{MenuItem, MenuItemId, StorageKey};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub struct Catalog {
	storage: Arc<StorageService>,
	last_id: AtomicU64,
}

impl Catalog {
	pub async fn open(storage: Arc<StorageService>) -> Result<Self, StorageError> {
		let last_id = storage.max_id(StorageKey::Menu.as_str()).await?;
		Ok(Self {
			storage,
			last_id: AtomicU64::new(last_id),
		})
	}

	/// Stores an item, assigning an id when it has none.
	pub async fn create(&self, mut item: MenuItem) -> Result<MenuItem, StorageError> {
		let id = match item.id {
			Some(id) => {
				self.last_id.fetch_max(id, Ordering::SeqCst);
				id
			},
			None => {
				let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
				item.id = Some(id);
				id
			},
		};
		self.storage
			.store(StorageKey::Menu.as_str(), &id.to_string(), &item)
			.await?;
		Ok(item)
	}

	/// Every item, by ascending id.
	pub async fn list(&self) -> Result<Vec<MenuItem>, StorageError> {
		Ok(self
			.storage
			.load_all::<MenuItem>(StorageKey::Menu.as_str())
			.await?
			.into_iter()
			.map(|(_, item)| item)
			.collect())
	}

	pub async fn containing_topping(&self, topping: &str) -> Result<Vec<MenuItem>, StorageError> {
		Ok(self
			.list()
			.await?
			.into_iter()
			.filter(|item| item.has_topping(topping))
			.collect())
	}

	pub async fn find(&self, id: MenuItemId) -> Result<Option<MenuItem>, StorageError> {
		self.storage
			.find(StorageKey::Menu.as_str(), &id.to_string())
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pizzeria_storage::implementations::memory::MemoryStorage;
	use rust_decimal::Decimal;

	#[tokio::test]
	async fn test_create_list_filter() {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let catalog = Catalog::open(storage).await.unwrap();

		let mut seeded = MenuItem::new("Hawaiian", Decimal::new(1200, 2), &["ham", "pineapple"]);
		seeded.id = Some(5);
		catalog.create(seeded).await.unwrap();

		let created = catalog
			.create(MenuItem::new("Margherita", Decimal::new(1300, 2), &["tomato"]))
			.await
			.unwrap();
		// generated ids never collide with explicit ones
		assert_eq!(created.id, Some(6));

		let names: Vec<String> = catalog
			.list()
			.await
			.unwrap()
			.into_iter()
			.map(|item| item.name)
			.collect();
		assert_eq!(names, vec!["Hawaiian", "Margherita"]);

		let pineapple = catalog.containing_topping("pineapple").await.unwrap();
		assert_eq!(pineapple.len(), 1);
		assert!(catalog.containing_topping("pine").await.unwrap().is_empty());

		assert_eq!(catalog.find(6).await.unwrap().unwrap().name, "Margherita");
		assert!(catalog.find(7).await.unwrap().is_none());
	}
}
