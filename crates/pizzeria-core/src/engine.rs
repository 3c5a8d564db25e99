//! The assembled pizzeria: lifecycle plus the collaborators the HTTP layer
//! needs direct access to.

use crate::catalog::Catalog;
use crate::identity::CustomerDirectory;
use crate::lifecycle::OrderLifecycle;
use pizzeria_config::Config;
use std::sync::Arc;

pub struct PizzeriaEngine {
	config: Config,
	lifecycle: Arc<OrderLifecycle>,
	catalog: Arc<Catalog>,
	directory: Arc<CustomerDirectory>,
}

impl PizzeriaEngine {
	pub fn new(
		config: Config,
		lifecycle: Arc<OrderLifecycle>,
		catalog: Arc<Catalog>,
		directory: Arc<CustomerDirectory>,
	) -> Self {
		Self {
			config,
			lifecycle,
			catalog,
			directory,
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn lifecycle(&self) -> &Arc<OrderLifecycle> {
		&self.lifecycle
	}

	pub fn catalog(&self) -> &Arc<Catalog> {
		&self.catalog
	}

	pub fn directory(&self) -> &Arc<CustomerDirectory> {
		&self.directory
	}
}
