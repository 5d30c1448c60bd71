//! Login page.

use std::time::Duration;

use crate::convergence::{converge, ConvergenceCheck};
use crate::driver::StoreDriver;
use crate::locator::{ResolveOptions, Resolution};
use crate::pages::{tables, PageObject, SelectorRev};
use crate::result::ComprarResult;

const PATH: &str = "/web/login";
const LOGIN_TIMEOUT: Duration = Duration::from_secs(10);

/// The storefront login screen
#[derive(Debug)]
pub struct LoginPage<'d, D: StoreDriver + ?Sized> {
    driver: &'d D,
    base: String,
    rev: SelectorRev,
    resolve: ResolveOptions,
}

impl<'d, D: StoreDriver + ?Sized> LoginPage<'d, D> {
    /// Create a login page bound to a driver and base URL
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

    /// Navigate to the login page and wait for it to settle
    pub async fn navigate(&self) -> ComprarResult<()> {
        self.driver.goto(&format!("{}{PATH}", self.base)).await?;
        self.driver
            .wait_for_network_idle(Duration::from_secs(5))
            .await
    }

    /// Log in and wait until the session is established.
    ///
    /// Convergence target is the logout button becoming visible, not a
    /// fixed delay.
    pub async fn login(&self, email: &str, password: &str) -> ComprarResult<()> {
        let email_field = tables::email_input(self.rev)
            .require(self.driver, &self.resolve)
            .await?;
        self.driver.fill(&email_field.selector, 0, email).await?;

        let password_field = tables::password_input(self.rev)
            .require(self.driver, &self.resolve)
            .await?;
        self.driver
            .fill(&password_field.selector, 0, password)
            .await?;

        let submit = tables::login_button(self.rev)
            .require(self.driver, &self.resolve)
            .await?;
        self.driver.click(&submit.selector, 0).await?;

        let check = ConvergenceCheck::new("logged-in session").with_timeout(LOGIN_TIMEOUT);
        let logout = tables::logout_button(self.rev);
        let driver = self.driver;
        let resolve = self.resolve.clone();
        converge(&check, || {
            let logout = logout.clone();
            let resolve = resolve.clone();
            async move {
                Ok(matches!(
                    logout.resolve(driver, &resolve).await?,
                    Resolution::Found(_)
                ))
            }
        })
        .await?;
        tracing::info!(email, "logged in");
        Ok(())
    }

    /// Whether a session is currently established
    pub async fn is_logged_in(&self) -> ComprarResult<bool> {
        Ok(matches!(
            tables::logout_button(self.rev)
                .resolve(self.driver, &self.resolve)
                .await?,
            Resolution::Found(_)
        ))
    }

    /// Log out of the current session
    pub async fn logout(&self) -> ComprarResult<()> {
        let logout = tables::logout_button(self.rev)
            .require(self.driver, &self.resolve)
            .await?;
        self.driver.click(&logout.selector, 0).await?;
        self.driver
            .wait_for_network_idle(Duration::from_secs(5))
            .await
    }
}

impl<D: StoreDriver + ?Sized> PageObject for LoginPage<'_, D> {
    fn url_pattern(&self) -> &str {
        PATH
    }
}
