//! Cart page: quantities, removal, and the prompt-gated checkout.

use std::time::Duration;

use crate::convergence::{converge, ConvergenceCheck};
use crate::dialog::{DialogIntent, DialogResolution};
use crate::driver::StoreDriver;
use crate::extract::{find_count, find_money, Money};
use crate::locator::{ResolveOptions, Resolution};
use crate::pages::{tables, PageObject, SelectorRev, UrlMatcher};
use crate::result::{ComprarError, ComprarResult};
use crate::workflow::{dialog_gated_click, drain_pending, DrainBudget, DrainReport, GatedActionOptions};

const PATH: &str = "/web/cart";
const ORDERS_PATTERN: &str = "/web/orders";
const CHECKOUT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(10);

/// One cart row as rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    /// Product name
    pub name: Option<String>,
    /// Unit price
    pub price: Option<Money>,
    /// Quantity in the cart
    pub quantity: Option<u32>,
    /// Line total
    pub line_total: Option<Money>,
}

/// The cart screen
#[derive(Debug)]
pub struct CartPage<'d, D: StoreDriver + ?Sized> {
    driver: &'d D,
    base: String,
    rev: SelectorRev,
    resolve: ResolveOptions,
    gated: GatedActionOptions,
}

impl<'d, D: StoreDriver + ?Sized> CartPage<'d, D> {
    /// Create a cart page bound to a driver and base URL
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

    /// Navigate to the cart and wait for it to settle
    pub async fn navigate(&self) -> ComprarResult<()> {
        self.driver.goto(&format!("{}{PATH}", self.base)).await?;
        self.driver
            .wait_for_network_idle(Duration::from_secs(5))
            .await
    }

    /// Whether the empty-cart label is showing
    pub async fn is_empty(&self) -> ComprarResult<bool> {
        Ok(matches!(
            tables::cart_empty_label(self.rev)
                .resolve(self.driver, &self.resolve)
                .await?,
            Resolution::Found(_)
        ))
    }

    /// Live cart row count
    pub async fn item_count(&self) -> ComprarResult<usize> {
        tables::cart_item_card(self.rev)
            .live_count(self.driver)
            .await
    }

    /// Parse the nth cart row
    pub async fn item(&self, index: usize) -> ComprarResult<CartItem> {
        let cards = tables::cart_item_card(self.rev)
            .require(self.driver, &self.resolve)
            .await?;
        if index >= cards.count {
            return Err(ComprarError::StaleReference {
                name: "cart item".to_string(),
                index,
                count: cards.count,
            });
        }
        let text = self
            .driver
            .text_of(&cards.selector, index)
            .await?
            .unwrap_or_default();

        let amounts: Vec<Money> = text
            .lines()
            .filter_map(|line| find_money(line))
            .collect();
        Ok(CartItem {
            name: text
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty() && !line.contains('$') && find_count(line).is_none())
                .map(str::to_string),
            price: amounts.first().copied(),
            quantity: text
                .lines()
                .find(|line| line.contains("Qty"))
                .and_then(|line| find_count(line)),
            // Line total renders after the unit price.
            line_total: amounts.last().copied().filter(|_| amounts.len() > 1),
        })
    }

    /// Click the quantity-increase control on the nth row
    pub async fn increase_quantity(&self, index: usize) -> ComprarResult<()> {
        self.click_row_control(&tables::increase_button(self.rev), index)
            .await
    }

    /// Click the quantity-decrease control on the nth row
    pub async fn decrease_quantity(&self, index: usize) -> ComprarResult<()> {
        self.click_row_control(&tables::decrease_button(self.rev), index)
            .await
    }

    /// Type a quantity into the nth row's input
    pub async fn set_quantity(&self, index: usize, quantity: u32) -> ComprarResult<()> {
        let inputs = tables::quantity_input(self.rev)
            .require(self.driver, &self.resolve)
            .await?;
        if index >= inputs.count {
            return Err(ComprarError::StaleReference {
                name: "quantity input".to_string(),
                index,
                count: inputs.count,
            });
        }
        self.driver
            .fill(&inputs.selector, index, &quantity.to_string())
            .await?;
        self.driver.wait_for_network_idle(self.gated.settle).await
    }

    /// Remove the first cart row, resolving its confirmation dialog
    pub async fn remove_first(&self, intent: DialogIntent) -> ComprarResult<DialogResolution> {
        dialog_gated_click(
            self.driver,
            &tables::remove_button(self.rev),
            intent,
            &self.gated,
        )
        .await
    }

    /// Remove rows until the cart is empty or the budget runs out.
    ///
    /// Idempotent on an empty cart; the live row count is re-read each
    /// iteration.
    pub async fn clear_cart(&self, budget: &DrainBudget) -> ComprarResult<DrainReport> {
        drain_pending(
            self.driver,
            &tables::remove_button(self.rev),
            None,
            budget,
            &self.gated,
        )
        .await
    }

    /// Cart subtotal
    pub async fn subtotal(&self) -> ComprarResult<Money> {
        self.read_amount(&tables::cart_subtotal(self.rev)).await
    }

    /// Cart total
    pub async fn total(&self) -> ComprarResult<Money> {
        self.read_amount(&tables::cart_total(self.rev)).await
    }

    /// Complete checkout, answering the shipping-address prompt.
    ///
    /// The prompt interception is armed before the checkout click; after
    /// the prompt is accepted the flow converges on the orders page URL
    /// rather than sleeping.
    pub async fn checkout_with_shipping_address(
        &self,
        address: &str,
    ) -> ComprarResult<DialogResolution> {
        let resolution = dialog_gated_click(
            self.driver,
            &tables::checkout_button(self.rev),
            DialogIntent::AcceptWith(address.to_string()),
            &self.gated,
        )
        .await?;

        let matcher = UrlMatcher::new(ORDERS_PATTERN);
        let check = ConvergenceCheck::new("navigated to orders page")
            .with_timeout(CHECKOUT_NAVIGATION_TIMEOUT);
        let driver = self.driver;
        converge(&check, || {
            let matcher = matcher.clone();
            async move { Ok(matcher.matches(&driver.current_url().await?)) }
        })
        .await?;
        tracing::info!("checkout complete");
        Ok(resolution)
    }

    async fn click_row_control(
        &self,
        control: &crate::locator::FallbackLocator,
        index: usize,
    ) -> ComprarResult<()> {
        let buttons = control.require(self.driver, &self.resolve).await?;
        if index >= buttons.count {
            return Err(ComprarError::StaleReference {
                name: control.name().to_string(),
                index,
                count: buttons.count,
            });
        }
        self.driver.click(&buttons.selector, index).await?;
        self.driver.wait_for_network_idle(self.gated.settle).await
    }

    async fn read_amount(
        &self,
        locator: &crate::locator::FallbackLocator,
    ) -> ComprarResult<Money> {
        let element = locator.require(self.driver, &self.resolve).await?;
        let text = self
            .driver
            .text_of(&element.selector, 0)
            .await?
            .unwrap_or_default();
        find_money(&text).ok_or_else(|| ComprarError::Parse {
            what: "price",
            text,
        })
    }
}

impl<D: StoreDriver + ?Sized> PageObject for CartPage<'_, D> {
    fn url_pattern(&self) -> &str {
        PATH
    }
}
