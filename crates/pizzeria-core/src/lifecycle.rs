//! Order lifecycle orchestrator.
//!
//! Customers assemble a draft and confirm it, workers pick placed orders and
//! serve them. Every operation checks the caller's permission or role before it
//! reads or writes anything, validates the lifecycle preconditions, persists
//! the result and, for a served order, sends a best-effort notification.

use crate::identity::{CustomerDirectory, RequestContext};
use crate::pricing::PricingRules;
use crate::registry::OngoingOrders;
use crate::repository::OrderRepository;
use crate::{state, OrderError};
use chrono::Utc;
use dashmap::DashMap;
use pizzeria_notify::NotificationService;
use pizzeria_types::{CustomerId, MenuItem, Order, OrderId, OrderState, Permission, Role};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::instrument;

/// Drives orders through Draft -> Placed -> Ongoing -> Served.
pub struct OrderLifecycle {
	repository: Arc<dyn OrderRepository>,
	directory: Arc<CustomerDirectory>,
	registry: Arc<OngoingOrders>,
	notifier: Arc<NotificationService>,
	pricing: PricingRules,
	notification_timeout: Duration,
	/// Serialises "load first placed order, guard, save" across workers.
	pick_lock: Mutex<()>,
	/// Per-customer locks around draft creation and confirmation.
	draft_locks: DashMap<CustomerId, Arc<Mutex<()>>>,
	/// Per-worker locks held from loading an order to releasing its slot.
	serve_locks: DashMap<CustomerId, Arc<Mutex<()>>>,
}

impl OrderLifecycle {
	pub fn new(
		repository: Arc<dyn OrderRepository>,
		directory: Arc<CustomerDirectory>,
		registry: Arc<OngoingOrders>,
		notifier: Arc<NotificationService>,
		pricing: PricingRules,
		notification_timeout: Duration,
	) -> Self {
		Self {
			repository,
			directory,
			registry,
			notifier,
			pricing,
			notification_timeout,
			pick_lock: Mutex::new(()),
			draft_locks: DashMap::new(),
			serve_locks: DashMap::new(),
		}
	}

	fn draft_lock(&self, customer_id: CustomerId) -> Arc<Mutex<()>> {
		Arc::clone(self.draft_locks.entry(customer_id).or_default().value())
	}

	fn serve_lock(&self, worker_id: CustomerId) -> Arc<Mutex<()>> {
		Arc::clone(self.serve_locks.entry(worker_id).or_default().value())
	}

	async fn load_drafts(&self, customer_id: CustomerId) -> Result<Vec<Order>, OrderError> {
		self.repository
			.find_draft_orders_by_customer(customer_id)
			.await
			.map_err(|e| OrderError::Storage(e.to_string()))
	}

	async fn save(&self, order: Order) -> Result<Order, OrderError> {
		self.repository
			.save(order)
			.await
			.map_err(|e| OrderError::Storage(e.to_string()))
	}

	/// Adds an item to the customer's draft, opening a draft if there is none.
	#[instrument(skip_all, fields(customer_id = ctx.current_customer().id))]
	pub async fn add_item(&self, ctx: &RequestContext, item: MenuItem) -> Result<Order, OrderError> {
		ctx.require_permission(Permission::AddItem)?;
		let customer = ctx.current_customer();

		let lock = self.draft_lock(customer.id);
		let _guard = lock.lock().await;

		let mut drafts = self.load_drafts(customer.id).await?;
		if drafts.len() > 1 {
			return Err(OrderError::InvariantViolation(format!(
				"Customer {} has {} draft orders",
				customer.id,
				drafts.len()
			)));
		}

		let mut order = drafts.pop().unwrap_or_else(|| {
			tracing::debug!("Opening a new draft");
			Order::draft(customer.id)
		});
		order.items.push(item);
		order.created_at = Utc::now();

		let order = self.save(order).await?;
		tracing::info!(
			order_id = %order.display_id(),
			items = order.items.len(),
			"Item added"
		);
		Ok(order)
	}

	/// Submits the customer's draft.
	#[instrument(skip_all, fields(customer_id = ctx.current_customer().id))]
	pub async fn confirm(&self, ctx: &RequestContext) -> Result<Order, OrderError> {
		ctx.require_permission(Permission::ConfirmOrder)?;
		let customer = ctx.current_customer();

		let lock = self.draft_lock(customer.id);
		let _guard = lock.lock().await;

		let mut drafts = self.load_drafts(customer.id).await?;
		let mut order = match (drafts.pop(), drafts.is_empty()) {
			(Some(order), true) => order,
			(None, _) => {
				return Err(OrderError::InvariantViolation(format!(
					"Customer {} has no draft order",
					customer.id
				)));
			},
			(Some(_), false) => {
				return Err(OrderError::InvariantViolation(format!(
					"Customer {} has {} draft orders",
					customer.id,
					drafts.len() + 1
				)));
			},
		};

		state::transition(&mut order, OrderState::Placed)?;
		let order = self.save(order).await?;
		tracing::info!(order_id = %order.display_id(), "Order placed");
		Ok(order)
	}

	/// Assigns the earliest placed order to the acting worker.
	///
	/// The registry guard runs before the order is touched. If it fails, or
	/// the save fails, the stored order stays PLACED and the worker's registry
	/// slot is left as it was.
	#[instrument(skip_all, fields(worker_id = ctx.current_worker().id))]
	pub async fn pick(&self, ctx: &RequestContext) -> Result<Order, OrderError> {
		ctx.require_permission(Permission::PickOrder)?;
		let worker = ctx.current_worker();

		let _pick = self.pick_lock.lock().await;

		if let Some(held) = self.registry.get(worker.id) {
			return Err(OrderError::InvariantViolation(format!(
				"Worker {} already holds order {}",
				worker.id,
				held.display_id()
			)));
		}

		let mut order = self
			.repository
			.find_first_placed_order()
			.await
			.map_err(|e| OrderError::Storage(e.to_string()))?
			.ok_or_else(|| OrderError::NotFound("No placed order to pick".into()))?;

		state::transition(&mut order, OrderState::Ongoing)?;
		order.worker_id = Some(worker.id);

		self.registry
			.assign(worker.id, Arc::new(order.clone()))
			.map_err(|e| OrderError::InvariantViolation(e.to_string()))?;

		match self.save(order).await {
			Ok(order) => {
				tracing::info!(order_id = %order.display_id(), "Order picked");
				Ok(order)
			},
			Err(e) => {
				self.registry.release(worker.id);
				Err(e)
			},
		}
	}

	/// Serves the worker's ongoing order: prices it, persists it, frees the
	/// worker and notifies the customer.
	///
	/// Calls from the same worker are serialised, so an order is served and
	/// notified at most once.
	#[instrument(skip_all, fields(worker_id = ctx.current_worker().id, order_id = order_id))]
	pub async fn complete(&self, ctx: &RequestContext, order_id: OrderId) -> Result<Order, OrderError> {
		ctx.require_role(Role::Worker)?;
		let worker = ctx.current_worker();

		let lock = self.serve_lock(worker.id);
		let serving = lock.lock().await;

		let mut order = self
			.repository
			.find_order_by_id(order_id)
			.await
			.map_err(|e| OrderError::Storage(e.to_string()))?
			.ok_or_else(|| OrderError::NotFound(format!("Order {} not found", order_id)))?;

		if order.state != OrderState::Ongoing {
			return Err(OrderError::InvariantViolation(format!(
				"Order {} is {}, not {}",
				order_id,
				order.state,
				OrderState::Ongoing
			)));
		}

		let held = self.registry.get(worker.id).and_then(|held| held.id);
		if held != Some(order_id) {
			return Err(OrderError::InvariantViolation(format!(
				"Order {} is not held by worker {}",
				order_id, worker.id
			)));
		}

		order.checkout_at = Some(Utc::now());
		state::transition(&mut order, OrderState::Served)?;
		order.amount = Some(self.pricing.compute_amount(&order.items));

		let order = self.save(order).await?;
		self.registry.release(worker.id);
		drop(serving);
		tracing::info!(amount = ?order.amount, "Order served");

		self.notify_served(&order).await;
		Ok(order)
	}

	/// Tells the order's customer it has been served.
	///
	/// Never fails: lookup and delivery errors, and deliveries that outlast the
	/// notification timeout, are logged and dropped.
	async fn notify_served(&self, order: &Order) {
		let delivery = async {
			let customer = self
				.directory
				.find_by_id(order.customer_id)
				.await
				.map_err(|e| e.to_string())?
				.ok_or_else(|| format!("Customer {} not found", order.customer_id))?;
			self.notifier
				.send_confirmation(&customer, order)
				.await
				.map_err(|e| e.to_string())
		};

		match tokio::time::timeout(self.notification_timeout, delivery).await {
			Ok(Ok(())) => {},
			Ok(Err(error)) => {
				tracing::warn!(order_id = %order.display_id(), %error, "Confirmation not sent");
			},
			Err(_) => {
				tracing::warn!(
					order_id = %order.display_id(),
					timeout_seconds = self.notification_timeout.as_secs_f64(),
					"Confirmation timed out"
				);
			},
		}
	}

	/// The order the acting worker is preparing, if any.
	pub fn current_order(&self, ctx: &RequestContext) -> Result<Option<Arc<Order>>, OrderError> {
		ctx.require_role(Role::Worker)?;
		Ok(self.registry.get(ctx.current_worker().id))
	}

	/// Number of stored orders in any state. Owner only.
	#[instrument(skip_all)]
	pub async fn order_count(&self, ctx: &RequestContext) -> Result<u64, OrderError> {
		ctx.require_role(Role::Owner)?;
		self.repository
			.count_orders()
			.await
			.map_err(|e| OrderError::Storage(e.to_string()))
	}

	/// Re-registers ONGOING orders found in storage, e.g. after a restart.
	///
	/// Returns the number of orders restored. Orders without a worker, or whose
	/// worker already holds another order, are logged and skipped.
	pub async fn recover_ongoing(&self) -> Result<usize, OrderError> {
		let ongoing = self
			.repository
			.find_orders_by_state(OrderState::Ongoing)
			.await
			.map_err(|e| OrderError::Storage(e.to_string()))?;

		let mut restored = 0;
		for order in ongoing {
			let Some(worker_id) = order.worker_id else {
				tracing::warn!(order_id = %order.display_id(), "Ongoing order without worker");
				continue;
			};
			match self.registry.assign(worker_id, Arc::new(order)) {
				Ok(()) => restored += 1,
				Err(error) => tracing::warn!(%error, "Skipping ongoing order"),
			}
		}
		Ok(restored)
	}
}
