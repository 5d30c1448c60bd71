//! Orders page: status tabs, order cards, and confirm-gated cancellation.

use std::time::Duration;

use crate::dialog::{DialogIntent, DialogResolution};
use crate::driver::StoreDriver;
use crate::extract::{date_text, find_order_id, find_status, labeled_count, labeled_money, Money};
use crate::locator::{ResolveOptions, Resolution};
use crate::pages::{tables, PageObject, SelectorRev};
use crate::result::{ComprarError, ComprarResult};
use crate::workflow::{dialog_gated_click, drain_pending, DrainBudget, DrainReport, GatedActionOptions};

const PATH: &str = "/web/orders";

/// Status filter tabs on the orders page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderTab {
    /// All orders
    All,
    /// Pending orders (cancellable)
    Pending,
    /// Orders being processed
    Processing,
    /// Shipped orders
    Shipped,
    /// Delivered orders
    Delivered,
}

impl OrderTab {
    /// Rendered tab label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }

    /// Every tab the page renders
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::All,
            Self::Pending,
            Self::Processing,
            Self::Shipped,
            Self::Delivered,
        ]
    }
}

/// One order card as rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    /// Order id from the `Order #N` heading
    pub order_id: Option<u64>,
    /// Lifecycle status keyword, lowercased
    pub status: Option<String>,
    /// Order total
    pub total: Option<Money>,
    /// Rendered order date, label stripped
    pub date: Option<String>,
    /// Item count from the `Items:` line
    pub items: Option<u32>,
}

/// The order history screen
#[derive(Debug)]
pub struct OrderPage<'d, D: StoreDriver + ?Sized> {
    driver: &'d D,
    base: String,
    rev: SelectorRev,
    resolve: ResolveOptions,
    gated: GatedActionOptions,
}

impl<'d, D: StoreDriver + ?Sized> OrderPage<'d, D> {
    /// Create an orders page bound to a driver and base URL
    pub fn new(driver: &'d D, base: impl Into<String>) -> Self {
        Self {
            driver,
            base: base.into(),
            rev: SelectorRev::default(),
            resolve: ResolveOptions::default(),
            gated: GatedActionOptions::default(),
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
        self.gated = self.gated.clone().with_resolve(resolve.clone());
        self.resolve = resolve;
        self
    }

    /// Use specific dialog-gated action options
    #[must_use]
    pub fn with_gated_options(mut self, gated: GatedActionOptions) -> Self {
        self.gated = gated;
        self
    }

    /// Navigate to the orders page and wait for it to settle
    pub async fn navigate(&self) -> ComprarResult<()> {
        self.driver.goto(&format!("{}{PATH}", self.base)).await?;
        self.driver
            .wait_for_network_idle(Duration::from_secs(5))
            .await
    }

    /// Whether the page heading is visible
    pub async fn is_loaded(&self) -> ComprarResult<bool> {
        Ok(matches!(
            tables::page_heading("My Orders")
                .resolve(self.driver, &self.resolve)
                .await?,
            Resolution::Found(_)
        ))
    }

    /// Click a status tab and wait for the list to settle
    pub async fn select_tab(&self, tab: OrderTab) -> ComprarResult<()> {
        let button = tables::order_tab(tab.label())
            .require(self.driver, &self.resolve)
            .await?;
        self.driver.click(&button.selector, 0).await?;
        self.driver.wait_for_network_idle(self.gated.settle).await
    }

    /// Tabs currently rendered
    pub async fn visible_tabs(&self) -> ComprarResult<Vec<OrderTab>> {
        let mut tabs = Vec::new();
        for tab in OrderTab::all() {
            if matches!(
                tables::order_tab(tab.label())
                    .resolve(self.driver, &self.resolve)
                    .await?,
                Resolution::Found(_)
            ) {
                tabs.push(tab);
            }
        }
        Ok(tabs)
    }

    /// Live order card count
    pub async fn order_count(&self) -> ComprarResult<usize> {
        tables::order_card(self.rev).live_count(self.driver).await
    }

    /// Live count of cancellable (pending) orders, read from the render
    /// tree rather than cached
    pub async fn pending_count(&self) -> ComprarResult<usize> {
        tables::cancel_order_button(self.rev)
            .live_count(self.driver)
            .await
    }

    /// Parse the nth order card
    pub async fn order(&self, index: usize) -> ComprarResult<OrderSummary> {
        let cards = tables::order_card(self.rev)
            .require(self.driver, &self.resolve)
            .await?;
        if index >= cards.count {
            return Err(ComprarError::StaleReference {
                name: "order card".to_string(),
                index,
                count: cards.count,
            });
        }
        let text = self
            .driver
            .text_of(&cards.selector, index)
            .await?
            .unwrap_or_default();
        Ok(OrderSummary {
            order_id: find_order_id(&text),
            status: find_status(&text),
            total: labeled_money(&text, "Total"),
            date: date_text(&text),
            items: labeled_count(&text, "Items"),
        })
    }

    /// Cancel the first pending order, resolving its confirmation dialog
    /// per `intent`
    pub async fn cancel_first(&self, intent: DialogIntent) -> ComprarResult<DialogResolution> {
        dialog_gated_click(
            self.driver,
            &tables::cancel_order_button(self.rev),
            intent,
            &self.gated,
        )
        .await
    }

    /// Whether the inline cancellation confirmation is visible, waiting
    /// up to the locator's visibility budget
    pub async fn cancelled_banner_visible(&self) -> ComprarResult<bool> {
        Ok(matches!(
            tables::order_cancelled_banner(self.rev)
                .resolve(self.driver, &self.resolve)
                .await?,
            Resolution::Found(_)
        ))
    }

    /// Cancel pending orders until none remain or the budget runs out.
    ///
    /// Re-reads the live pending count every iteration; `exhausted=true`
    /// in the report means orders remain and must be treated as a
    /// failure by the scenario.
    pub async fn cancel_all_pending(&self, budget: &DrainBudget) -> ComprarResult<DrainReport> {
        let banner = tables::order_cancelled_banner(self.rev);
        drain_pending(
            self.driver,
            &tables::cancel_order_button(self.rev),
            Some(&banner),
            budget,
            &self.gated,
        )
        .await
    }

    /// Whether the empty-state label is showing
    pub async fn no_orders_visible(&self) -> ComprarResult<bool> {
        Ok(matches!(
            tables::no_orders_label(self.rev)
                .resolve(self.driver, &self.resolve)
                .await?,
            Resolution::Found(_)
        ))
    }
}

impl<D: StoreDriver + ?Sized> PageObject for OrderPage<'_, D> {
    fn url_pattern(&self) -> &str {
        PATH
    }
}
