//! Pricing engine for served orders.
//!
//! Two promotions stack on the same order:
//! - when any item carries the qualifying topping, every item without it is
//!   discounted by `discount_percent`;
//! - when the order holds exactly `bundle_size` items, the cheapest item (after
//!   the first promotion) is taken off the total once.
//!
//! The result is rounded to cents, midpoint away from zero.

use pizzeria_config::PricingConfig;
use pizzeria_types::MenuItem;
use rust_decimal::{Decimal, RoundingStrategy};

/// Promotion parameters applied by [`PricingRules::compute_amount`].
#[derive(Debug, Clone, PartialEq)]
pub struct PricingRules {
	pub qualifying_topping: String,
	pub discount_percent: u32,
	pub bundle_size: usize,
}

impl Default for PricingRules {
	fn default() -> Self {
		Self {
			qualifying_topping: "pineapple".to_string(),
			discount_percent: 10,
			bundle_size: 3,
		}
	}
}

impl From<&PricingConfig> for PricingRules {
	fn from(config: &PricingConfig) -> Self {
		Self {
			qualifying_topping: config.qualifying_topping.clone(),
			discount_percent: config.discount_percent,
			bundle_size: config.bundle_size,
		}
	}
}

impl PricingRules {
	/// Computes the amount charged for the given items.
	///
	/// Prices are taken as given; negative prices are not rejected here.
	pub fn compute_amount(&self, items: &[MenuItem]) -> Decimal {
		let qualifies = items
			.iter()
			.any(|item| item.has_topping(&self.qualifying_topping));
		let factor = (Decimal::ONE_HUNDRED - Decimal::from(self.discount_percent))
			/ Decimal::ONE_HUNDRED;

		let prices: Vec<Decimal> = items
			.iter()
			.map(|item| {
				if qualifies && !item.has_topping(&self.qualifying_topping) {
					item.price * factor
				} else {
					item.price
				}
			})
			.collect();

		let mut total: Decimal = prices.iter().sum();
		if prices.len() == self.bundle_size {
			if let Some(cheapest) = prices.iter().min() {
				total -= *cheapest;
			}
		}

		let mut amount = total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
		amount.rescale(2);
		amount
	}
}
