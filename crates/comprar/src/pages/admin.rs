//! Admin dashboard page.

use std::time::Duration;

use crate::driver::StoreDriver;
use crate::extract::{find_count, find_money, Money};
use crate::locator::{ResolveOptions, Resolution};
use crate::pages::{tables, PageObject, SelectorRev};
use crate::result::ComprarResult;

const PATH: &str = "/web/admin";

/// Dashboard stats captured for later comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardTotals {
    /// Total order count
    pub total_orders: Option<u32>,
    /// Total revenue
    pub total_revenue: Option<Money>,
}

/// The admin dashboard screen
#[derive(Debug)]
pub struct AdminPage<'d, D: StoreDriver + ?Sized> {
    driver: &'d D,
    base: String,
    rev: SelectorRev,
    resolve: ResolveOptions,
}

impl<'d, D: StoreDriver + ?Sized> AdminPage<'d, D> {
    /// Create an admin page bound to a driver and base URL
    pub fn new(driver: &'d D, base: impl Into<String>) -> Self {
        Self {
            driver,
            base: base.into(),
            rev: SelectorRev::default(),
            resolve: ResolveOptions::default(),
        }
    }

    /// Use a specific selector table revision
    #[must_use]
    pub fn with_rev(mut self, rev: SelectorRev) -> Self {
        self.rev = rev;
        self
    }

    /// Use specific locator options
    #[must_use]
    pub fn with_resolve_options(mut self, resolve: ResolveOptions) -> Self {
        self.resolve = resolve;
        self
    }

    /// Navigate to the dashboard and wait for it to settle
    pub async fn navigate(&self) -> ComprarResult<()> {
        self.driver.goto(&format!("{}{PATH}", self.base)).await?;
        self.driver
            .wait_for_network_idle(Duration::from_secs(5))
            .await
    }

    /// Whether the dashboard heading is visible
    pub async fn is_loaded(&self) -> ComprarResult<bool> {
        Ok(matches!(
            tables::page_heading("Admin Dashboard")
                .resolve(self.driver, &self.resolve)
                .await?,
            Resolution::Found(_)
        ))
    }

    /// Read both dashboard stats
    pub async fn totals(&self) -> ComprarResult<DashboardTotals> {
        Ok(DashboardTotals {
            total_orders: self
                .stat_text(&tables::admin_total_orders(self.rev))
                .await?
                .as_deref()
                .and_then(find_count),
            total_revenue: self
                .stat_text(&tables::admin_total_revenue(self.rev))
                .await?
                .as_deref()
                .and_then(find_money),
        })
    }

    async fn stat_text(
        &self,
        locator: &crate::locator::FallbackLocator,
    ) -> ComprarResult<Option<String>> {
        match locator.resolve(self.driver, &self.resolve).await? {
            Resolution::Found(el) => self.driver.text_of(&el.selector, 0).await,
            Resolution::NotFound => Ok(None),
        }
    }
}

impl<D: StoreDriver + ?Sized> PageObject for AdminPage<'_, D> {
    fn url_pattern(&self) -> &str {
        PATH
    }
}
