//! Products listing page.

use std::time::Duration;

use crate::convergence::{converge, ConvergenceCheck};
use crate::driver::StoreDriver;
use crate::extract::{find_count, find_money, Money};
use crate::locator::{ResolveOptions, Resolution};
use crate::pages::{tables, PageObject, SelectorRev};
use crate::result::{ComprarError, ComprarResult};

const PATH: &str = "/web/products";

/// One product as rendered on the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    /// Product name (first text line of the card)
    pub name: Option<String>,
    /// Listed price
    pub price: Option<Money>,
}

/// The product listing screen
#[derive(Debug)]
pub struct ProductsPage<'d, D: StoreDriver + ?Sized> {
    driver: &'d D,
    base: String,
    rev: SelectorRev,
    resolve: ResolveOptions,
}

impl<'d, D: StoreDriver + ?Sized> ProductsPage<'d, D> {
    /// Create a products page bound to a driver and base URL
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

    /// Navigate to the product listing and wait for it to settle
    pub async fn navigate(&self) -> ComprarResult<()> {
        self.driver.goto(&format!("{}{PATH}", self.base)).await?;
        self.driver
            .wait_for_network_idle(Duration::from_secs(5))
            .await
    }

    /// Whether the listing heading is visible
    pub async fn is_loaded(&self) -> ComprarResult<bool> {
        Ok(matches!(
            tables::page_heading("Products")
                .resolve(self.driver, &self.resolve)
                .await?,
            Resolution::Found(_)
        ))
    }

    /// Live product count
    pub async fn product_count(&self) -> ComprarResult<usize> {
        tables::product_card(self.rev).live_count(self.driver).await
    }

    /// Name and price of the nth product card
    pub async fn product(&self, index: usize) -> ComprarResult<ProductCard> {
        let cards = tables::product_card(self.rev)
            .require(self.driver, &self.resolve)
            .await?;
        if index >= cards.count {
            return Err(ComprarError::StaleReference {
                name: "product card".to_string(),
                index,
                count: cards.count,
            });
        }
        let text = self
            .driver
            .text_of(&cards.selector, index)
            .await?
            .unwrap_or_default();
        Ok(ProductCard {
            name: text
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty() && !line.contains('$'))
                .map(str::to_string),
            price: find_money(&text),
        })
    }

    /// Add the nth product to the cart and wait for the inline
    /// confirmation alert
    pub async fn add_to_cart(&self, index: usize) -> ComprarResult<()> {
        let buttons = tables::add_to_cart_button(self.rev)
            .require(self.driver, &self.resolve)
            .await?;
        if index >= buttons.count {
            return Err(ComprarError::StaleReference {
                name: "add to cart button".to_string(),
                index,
                count: buttons.count,
            });
        }
        self.driver.click(&buttons.selector, index).await?;

        let banner = tables::alert("Added to cart!");
        let check = ConvergenceCheck::new("added-to-cart alert");
        let driver = self.driver;
        let resolve = self.resolve.clone();
        converge(&check, || {
            let banner = banner.clone();
            let resolve = resolve.clone();
            async move {
                Ok(matches!(
                    banner.resolve(driver, &resolve).await?,
                    Resolution::Found(_)
                ))
            }
        })
        .await?;
        Ok(())
    }

    /// Item count shown on the nav-bar cart badge (zero when absent)
    pub async fn cart_badge_count(&self) -> ComprarResult<u32> {
        match tables::cart_link(self.rev)
            .resolve(self.driver, &self.resolve)
            .await?
        {
            Resolution::Found(link) => {
                let text = self
                    .driver
                    .text_of(&link.selector, 0)
                    .await?
                    .unwrap_or_default();
                Ok(find_count(&text).unwrap_or(0))
            }
            Resolution::NotFound => Ok(0),
        }
    }
}

impl<D: StoreDriver + ?Sized> PageObject for ProductsPage<'_, D> {
    fn url_pattern(&self) -> &str {
        PATH
    }
}
