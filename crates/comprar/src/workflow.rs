//! Dialog-gated actions and convergent removal loops.
//!
//! The storefront confirms destructive actions (order cancellation, cart
//! clearing, checkout) through native dialogs, and applies the mutation
//! asynchronously after the dialog resolves. The two workflows here cover
//! that shape:
//!
//! - [`dialog_gated_click`] performs one confirmed action: arm the
//!   one-shot dialog interception, click, await the gate with a bounded
//!   timeout, settle.
//! - [`drain_pending`] repeats a dialog-gated action until the target
//!   list is empty or an iteration budget runs out, re-reading the live
//!   count every iteration.

use std::time::Duration;

use crate::convergence::{converge, ConvergenceCheck};
use crate::dialog::{ActionPhase, DialogIntent, DialogOutcome, DialogResolution, PendingAction};
use crate::driver::StoreDriver;
use crate::locator::{FallbackLocator, ResolveOptions};
use crate::result::ComprarResult;

/// Default settle bound after a gated action (1 second)
pub const DEFAULT_SETTLE_MS: u64 = 1_000;

/// Default iteration budget for removal loops
pub const DEFAULT_MAX_ITERATIONS: usize = 20;

/// Options for a single dialog-gated action
#[derive(Debug, Clone)]
pub struct GatedActionOptions {
    /// Bound on waiting for the dialog to arrive
    pub dialog_timeout: Duration,
    /// Bound on the post-resolution settle wait
    pub settle: Duration,
    /// Locator options for resolving the trigger
    pub resolve: ResolveOptions,
}

impl Default for GatedActionOptions {
    fn default() -> Self {
        Self {
            dialog_timeout: Duration::from_millis(crate::dialog::DEFAULT_DIALOG_TIMEOUT_MS),
            settle: Duration::from_millis(DEFAULT_SETTLE_MS),
            resolve: ResolveOptions::default(),
        }
    }
}

impl GatedActionOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dialog timeout
    #[must_use]
    pub const fn with_dialog_timeout(mut self, timeout: Duration) -> Self {
        self.dialog_timeout = timeout;
        self
    }

    /// Set the settle bound
    #[must_use]
    pub const fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Set the locator options
    #[must_use]
    pub fn with_resolve(mut self, resolve: ResolveOptions) -> Self {
        self.resolve = resolve;
        self
    }
}

/// Perform one dialog-gated action against the first match of `trigger`.
///
/// The interception is armed strictly before the click: arming after the
/// trigger is a race in which a fast dialog fires with no one listening
/// and the action hangs until its timeout. Ordering here is a contract,
/// not a detail.
///
/// # Errors
///
/// - [`crate::result::ComprarError::ElementNotFound`] when the trigger
///   cannot be resolved.
/// - [`crate::result::ComprarError::DialogTimeout`] when no dialog
///   arrives within the bound. This is always a failure, distinct from
///   the dialog arriving and being dismissed.
pub async fn dialog_gated_click<D: StoreDriver + ?Sized>(
    driver: &D,
    trigger: &FallbackLocator,
    intent: DialogIntent,
    opts: &GatedActionOptions,
) -> ComprarResult<DialogResolution> {
    let mut pending = PendingAction::new(trigger.name(), intent.clone());

    let element = trigger.require(driver, &opts.resolve).await?;

    // Arm before the click. See module docs for the race this prevents.
    let gate = driver.arm_dialog(intent)?;

    driver.click(&element.selector, 0).await?;
    pending.advance(ActionPhase::Triggered);
    pending.advance(ActionPhase::DialogPending);
    tracing::debug!(action = %pending.action, "awaiting dialog");

    let resolution = match gate.resolved(opts.dialog_timeout).await {
        Ok(resolution) => resolution,
        Err(err) => {
            pending.advance(ActionPhase::TimedOut);
            tracing::warn!(action = %pending.action, "dialog never arrived");
            return Err(err);
        }
    };

    pending.advance(match resolution.outcome {
        DialogOutcome::Accepted => ActionPhase::Accepted,
        DialogOutcome::Dismissed => ActionPhase::Dismissed,
    });
    tracing::debug!(
        action = %pending.action,
        outcome = ?resolution.outcome,
        dialog = %resolution.kind,
        "dialog resolved"
    );

    driver.wait_for_network_idle(opts.settle).await?;
    Ok(resolution)
}

/// Budget for a removal loop
#[derive(Debug, Clone)]
pub struct DrainBudget {
    /// Maximum dialog-gated actions before giving up
    pub max_iterations: usize,
    /// Bound on each step's count-decrease convergence
    pub per_step_timeout: Duration,
    /// Poll interval inside each step
    pub poll_interval: Duration,
}

impl Default for DrainBudget {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            per_step_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl DrainBudget {
    /// Create a budget with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iteration cap
    #[must_use]
    pub const fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the per-step convergence bound
    #[must_use]
    pub const fn with_per_step_timeout(mut self, timeout: Duration) -> Self {
        self.per_step_timeout = timeout;
        self
    }
}

/// Result of a removal loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    /// Items removed
    pub removed: usize,
    /// True when the iteration budget ran out with items remaining.
    /// Callers must treat this as an incomplete state, never success.
    pub exhausted: bool,
}

/// Remove items one dialog-gated accept at a time until none remain.
///
/// The live count is re-read from the render tree at the top of every
/// iteration; after each removal the list re-renders and indices shift,
/// so a cached count or index would go stale. Each step must observe the
/// count strictly decrease within `budget.per_step_timeout`; the optional
/// `success_signal` (an inline confirmation banner) is observed and
/// logged but is not the authoritative postcondition.
///
/// On an already-empty list this returns `removed=0, exhausted=false`
/// without performing any action.
///
/// # Errors
///
/// Propagates [`crate::result::ComprarError::DialogTimeout`] from any
/// step, and [`crate::result::ComprarError::ConvergenceExhausted`] when a
/// step's removal is never observed.
pub async fn drain_pending<D: StoreDriver + ?Sized>(
    driver: &D,
    target: &FallbackLocator,
    success_signal: Option<&FallbackLocator>,
    budget: &DrainBudget,
    gated: &GatedActionOptions,
) -> ComprarResult<DrainReport> {
    let mut removed = 0;

    for iteration in 0..budget.max_iterations {
        let before = target.live_count(driver).await?;
        if before == 0 {
            tracing::info!(list = %target.name(), removed, "drained");
            return Ok(DrainReport {
                removed,
                exhausted: false,
            });
        }
        tracing::debug!(list = %target.name(), iteration, remaining = before, "draining");

        dialog_gated_click(driver, target, DialogIntent::Accept, gated).await?;

        let check = ConvergenceCheck::new(format!(
            "{} count below {before}",
            target.name()
        ))
        .with_timeout(budget.per_step_timeout)
        .with_poll_interval(budget.poll_interval);
        converge(&check, || async move {
            Ok(target.live_count(driver).await? < before)
        })
        .await?;

        if let Some(signal) = success_signal {
            match signal.resolve(driver, &gated.resolve).await? {
                crate::locator::Resolution::Found(_) => {
                    tracing::debug!(signal = %signal.name(), "confirmation visible");
                }
                crate::locator::Resolution::NotFound => {
                    tracing::warn!(signal = %signal.name(), "confirmation not observed");
                }
            }
        }

        removed += 1;
    }

    let remaining = target.live_count(driver).await?;
    let exhausted = remaining > 0;
    if exhausted {
        tracing::warn!(
            list = %target.name(),
            removed,
            remaining,
            "iteration budget exhausted"
        );
    }
    Ok(DrainReport { removed, exhausted })
}
