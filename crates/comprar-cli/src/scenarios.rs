//! Built-in scenarios the CLI can drive against a live storefront.

use crate::{CliResult, RunArgs};

/// Names and one-line descriptions of the built-in scenarios
pub const SCENARIOS: [(&str, &str); 2] = [
    (
        "smoke",
        "log in, add a product, checkout via the shipping prompt, verify and cancel the order",
    ),
    (
        "clean",
        "drain the cart and cancel all pending orders for the shopper account",
    ),
];

/// Print the scenario listing
pub fn list() {
    for (name, description) in SCENARIOS {
        println!("{name:<8} {description}");
    }
}

#[cfg(feature = "browser")]
mod browser {
    use super::*;
    use crate::CliError;
    use comprar::prelude::*;
    use comprar::CdpDriver;

    fn runtime() -> CliResult<tokio::runtime::Runtime> {
        Ok(tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?)
    }

    fn driver_config(args: &RunArgs) -> DriverConfig {
        let mut config = DriverConfig::new().with_headless(!args.headed);
        if let Some(ref path) = args.chromium_path {
            config = config.with_chromium_path(path);
        }
        config
    }

    /// Full checkout-and-cancel pass
    pub fn run_smoke(args: &RunArgs) -> CliResult<()> {
        let users = args.load_users()?;
        let address = args
            .shipping_address
            .clone()
            .unwrap_or_else(|| comprar::fixture::ShippingAddresses::default().valid);

        runtime()?.block_on(async {
            let driver = CdpDriver::launch(driver_config(args)).await?;
            let base = args.base_url.as_str();

            let login = LoginPage::new(&driver, base);
            login.navigate().await?;
            login
                .login(&users.shopper.email, &users.shopper.password)
                .await?;

            let budget = DrainBudget::new();
            let gated = GatedActionOptions::new();
            ensure_clean_state(&driver, base, &budget, &gated).await?;

            let products = ProductsPage::new(&driver, base);
            products.navigate().await?;
            products.add_to_cart(0).await?;

            let cart = CartPage::new(&driver, base);
            cart.navigate().await?;
            let record = ScenarioRecord::new().with_cart_total(cart.total().await?);
            cart.checkout_with_shipping_address(&address).await?;

            let orders = OrderPage::new(&driver, base);
            orders.navigate().await?;
            orders.select_tab(OrderTab::Pending).await?;
            let order = orders.order(0).await?;
            if let Some(total) = order.total {
                record.expect_order_total(total)?;
            }

            let report = orders.cancel_all_pending(&budget).await?;
            if report.exhausted {
                return Err(CliError::Generic(format!(
                    "cancellation budget exhausted with orders remaining (removed {})",
                    report.removed
                )));
            }
            tracing::info!(cancelled = report.removed, "smoke scenario passed");

            driver.close().await?;
            Ok(())
        })
    }

    /// Clean-state pass only
    pub fn run_clean(args: &RunArgs) -> CliResult<()> {
        let users = args.load_users()?;

        runtime()?.block_on(async {
            let driver = CdpDriver::launch(driver_config(args)).await?;
            let base = args.base_url.as_str();

            let login = LoginPage::new(&driver, base);
            login.navigate().await?;
            login
                .login(&users.shopper.email, &users.shopper.password)
                .await?;

            let report = ensure_clean_state(
                &driver,
                base,
                &DrainBudget::new(),
                &GatedActionOptions::new(),
            )
            .await?;
            if report.exhausted {
                return Err(CliError::Generic(
                    "drain budget exhausted before reaching a clean state".to_string(),
                ));
            }
            println!(
                "cart rows removed: {}, orders cancelled: {}",
                report.cart_removed, report.orders_removed
            );

            driver.close().await?;
            Ok(())
        })
    }
}

#[cfg(feature = "browser")]
pub use browser::{run_clean, run_smoke};

/// Browser commands without the `browser` feature fail loudly
#[cfg(not(feature = "browser"))]
pub fn run_smoke(_args: &RunArgs) -> CliResult<()> {
    Err(crate::CliError::Generic(
        "Browser control not enabled. Rebuild with --features browser".to_string(),
    ))
}

/// Browser commands without the `browser` feature fail loudly
#[cfg(not(feature = "browser"))]
pub fn run_clean(_args: &RunArgs) -> CliResult<()> {
    Err(crate::CliError::Generic(
        "Browser control not enabled. Rebuild with --features browser".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_listing_is_complete() {
        let names: Vec<&str> = SCENARIOS.iter().map(|(name, _)| *name).collect();
        assert!(names.contains(&"smoke"));
        assert!(names.contains(&"clean"));
    }

    #[cfg(not(feature = "browser"))]
    #[test]
    fn test_browser_commands_error_without_feature() {
        let args = RunArgs {
            base_url: "http://127.0.0.1:5000".to_string(),
            headed: false,
            chromium_path: None,
            users: None,
            shipping_address: None,
        };
        let err = run_smoke(&args).unwrap_err();
        assert!(err.to_string().contains("--features browser"));
    }
}
