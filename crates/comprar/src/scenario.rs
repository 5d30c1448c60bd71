//! Explicit context passed between scenario steps.
//!
//! Scenarios capture values in one step (the cart total before checkout,
//! the admin dashboard's totals) and assert against them later. Instead
//! of module-level mutable "saved" variables — which couple scenarios to
//! their execution order — each step receives a [`ScenarioRecord`] and
//! returns a new one with its captures added.

use serde::{Deserialize, Serialize};

use crate::extract::Money;
use crate::result::{ComprarError, ComprarResult};

/// Immutable record of values captured during a scenario
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioRecord {
    /// Cart total captured before checkout
    pub cart_total: Option<Money>,
    /// Total-orders stat captured from the admin dashboard
    pub total_orders: Option<u32>,
    /// Total-revenue stat captured from the admin dashboard
    pub total_revenue: Option<Money>,
}

impl ScenarioRecord {
    /// An empty record
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a record with the cart total captured
    #[must_use]
    pub fn with_cart_total(mut self, total: Money) -> Self {
        self.cart_total = Some(total);
        self
    }

    /// Return a record with the admin totals captured
    #[must_use]
    pub fn with_admin_totals(mut self, orders: Option<u32>, revenue: Option<Money>) -> Self {
        self.total_orders = orders;
        self.total_revenue = revenue;
        self
    }

    /// Assert that an order total matches the captured cart total.
    ///
    /// # Errors
    ///
    /// [`ComprarError::Assertion`] when nothing was captured or the
    /// amounts differ.
    pub fn expect_order_total(&self, order_total: Money) -> ComprarResult<()> {
        match self.cart_total {
            Some(expected) if expected == order_total => Ok(()),
            Some(expected) => Err(ComprarError::Assertion {
                message: format!("order total {order_total} != captured cart total {expected}"),
            }),
            None => Err(ComprarError::Assertion {
                message: "no cart total was captured before checkout".to_string(),
            }),
        }
    }
}
