//! Comprar: storefront E2E automation for Rust.
//!
//! Comprar (Spanish: "to buy") drives an e-commerce web application
//! through a browser and asserts on what renders: authentication, product
//! browsing, cart management, prompt-gated checkout, and order lifecycle
//! including confirm-gated cancellation.
//!
//! Two pieces carry the engineering weight:
//!
//! - **Resilient locators** ([`locator`]): a logical element is an
//!   ordered chain of selector candidates; resolution returns the first
//!   candidate with a visible match, tolerating markup drift between
//!   storefront versions.
//! - **Eventually-consistent workflows** ([`workflow`]): destructive
//!   actions are confirmed through native dialogs and applied
//!   asynchronously, so a one-shot dialog gate is armed before each
//!   trigger and the resulting UI state is polled with bounded budgets
//!   until it converges.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ scenario ──► page object ──► workflow ──► locator ──► driver │
//! │                  │               │                      │    │
//! │                  └── selector tables      dialog gate ──┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The driver boundary ([`driver::StoreDriver`]) keeps the browser engine
//! external: the default build runs against the scripted
//! [`mock::MockStore`]; the `browser` feature adds a Chrome DevTools
//! Protocol driver.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod convergence;
pub mod dialog;
pub mod driver;
pub mod extract;
pub mod fixture;
pub mod locator;
pub mod mock;
pub mod pages;
pub mod result;
pub mod scenario;
pub mod selector;
pub mod workflow;

pub use convergence::{converge, ConvergenceCheck, Converged};
pub use dialog::{
    ActionPhase, ArmedDialog, DialogIntent, DialogKind, DialogOutcome, DialogResolution,
    PendingAction,
};
pub use driver::{DriverConfig, ElementQuery, StoreDriver};
pub use extract::Money;
pub use locator::{FallbackLocator, ResolveOptions, ResolvedElement, Resolution};
pub use result::{ComprarError, ComprarResult};
pub use scenario::ScenarioRecord;
pub use selector::Selector;
pub use workflow::{
    dialog_gated_click, drain_pending, DrainBudget, DrainReport, GatedActionOptions,
};

#[cfg(feature = "browser")]
pub use driver::CdpDriver;

/// Commonly used types for scenario code
pub mod prelude {
    pub use crate::convergence::{converge, ConvergenceCheck};
    pub use crate::dialog::{DialogIntent, DialogOutcome};
    pub use crate::driver::{DriverConfig, StoreDriver};
    pub use crate::extract::Money;
    pub use crate::fixture::{ensure_clean_state, TestUsers};
    pub use crate::locator::{FallbackLocator, ResolveOptions, Resolution};
    pub use crate::pages::{
        AdminPage, CartPage, LoginPage, OrderPage, OrderTab, PageObject, ProductsPage, SelectorRev,
    };
    pub use crate::result::{ComprarError, ComprarResult};
    pub use crate::scenario::ScenarioRecord;
    pub use crate::selector::Selector;
    pub use crate::workflow::{
        dialog_gated_click, drain_pending, DrainBudget, DrainReport, GatedActionOptions,
    };
}
