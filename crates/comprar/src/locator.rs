//! Resilient element resolution over ordered selector candidates.
//!
//! Markup drifts between storefront versions: a remove button is
//! sometimes a role=button named "Remove", sometimes `.remove-btn`,
//! sometimes an id substring. A [`FallbackLocator`] names the logical
//! concept once and carries an ordered candidate list; resolution walks
//! the list and short-circuits on the first candidate with a visible
//! match. Declare stable strategies (role+name, test id) before brittle
//! ones (class-name substrings) so the most reliable wins when several
//! would match.

use std::time::Duration;
use tokio::time::Instant;

use crate::driver::StoreDriver;
use crate::result::{ComprarError, ComprarResult};
use crate::selector::Selector;

/// Default per-candidate visibility budget (2 seconds)
pub const DEFAULT_VISIBILITY_TIMEOUT_MS: u64 = 2_000;

/// Default visibility polling interval (50ms)
pub const DEFAULT_VISIBILITY_POLL_MS: u64 = 50;

/// Options for a resolution pass
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Visibility budget granted to each candidate
    pub visibility_timeout: Duration,
    /// Interval between visibility probes
    pub poll_interval: Duration,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            visibility_timeout: Duration::from_millis(DEFAULT_VISIBILITY_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_VISIBILITY_POLL_MS),
        }
    }
}

impl ResolveOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-candidate visibility budget
    #[must_use]
    pub const fn with_visibility_timeout(mut self, timeout: Duration) -> Self {
        self.visibility_timeout = timeout;
        self
    }

    /// Set the polling interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// A live element reference from a resolution pass.
///
/// Scoped to a single action: the page may re-render at any time, so a
/// resolved element is used immediately and re-resolved before the next
/// action rather than cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedElement {
    /// The winning selector
    pub selector: Selector,
    /// Position of the winning candidate in declared order
    pub candidate_index: usize,
    /// Total matches for the winning selector
    pub count: usize,
}

/// Outcome of a resolution pass.
///
/// `NotFound` is not fatal by itself: an empty removal list legitimately
/// resolves to nothing, while a missing page heading is an error. The
/// caller decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A candidate matched a visible element
    Found(ResolvedElement),
    /// Every candidate failed within its budget
    NotFound,
}

impl Resolution {
    /// The resolved element, if any
    #[must_use]
    pub fn found(self) -> Option<ResolvedElement> {
        match self {
            Self::Found(el) => Some(el),
            Self::NotFound => None,
        }
    }
}

/// A logical UI concept with an ordered chain of selector candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackLocator {
    name: String,
    candidates: Vec<Selector>,
}

impl FallbackLocator {
    /// Create a locator with its highest-priority candidate
    #[must_use]
    pub fn new(name: impl Into<String>, first: Selector) -> Self {
        Self {
            name: name.into(),
            candidates: vec![first],
        }
    }

    /// Append a lower-priority fallback candidate
    #[must_use]
    pub fn or(mut self, fallback: Selector) -> Self {
        self.candidates.push(fallback);
        self
    }

    /// Logical name of this element
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Candidates in declared priority order
    #[must_use]
    pub fn candidates(&self) -> &[Selector] {
        &self.candidates
    }

    /// Resolve against the current render tree.
    ///
    /// Candidates are tried strictly in declared order. Each gets a
    /// bounded visibility wait; the first with a visible match wins and
    /// later candidates are not evaluated. All candidates failing yields
    /// `NotFound` within the sum of the per-candidate budgets.
    ///
    /// # Errors
    ///
    /// Driver errors propagate; absence itself is `Ok(NotFound)`.
    pub async fn resolve<D: StoreDriver + ?Sized>(
        &self,
        driver: &D,
        opts: &ResolveOptions,
    ) -> ComprarResult<Resolution> {
        for (candidate_index, candidate) in self.candidates.iter().enumerate() {
            let deadline = Instant::now() + opts.visibility_timeout;
            loop {
                let query = driver.query(candidate).await?;
                if query.count > 0 && query.visible {
                    tracing::trace!(
                        element = %self.name,
                        candidate = %candidate,
                        candidate_index,
                        count = query.count,
                        "resolved"
                    );
                    return Ok(Resolution::Found(ResolvedElement {
                        selector: candidate.clone(),
                        candidate_index,
                        count: query.count,
                    }));
                }
                if Instant::now() >= deadline {
                    break;
                }
                tokio::time::sleep(opts.poll_interval).await;
            }
        }
        tracing::trace!(element = %self.name, "not found");
        Ok(Resolution::NotFound)
    }

    /// Resolve, treating absence as an error.
    ///
    /// # Errors
    ///
    /// [`ComprarError::ElementNotFound`] when no candidate matches.
    pub async fn require<D: StoreDriver + ?Sized>(
        &self,
        driver: &D,
        opts: &ResolveOptions,
    ) -> ComprarResult<ResolvedElement> {
        match self.resolve(driver, opts).await? {
            Resolution::Found(el) => Ok(el),
            Resolution::NotFound => Err(ComprarError::ElementNotFound {
                name: self.name.clone(),
                candidates: self.candidates.len(),
                waited_ms: (opts.visibility_timeout.as_millis() as u64)
                    * self.candidates.len() as u64,
            }),
        }
    }

    /// Current live match count without waiting.
    ///
    /// Reads the first candidate with any matches; zero when none match.
    /// Removal loops call this every iteration instead of decrementing a
    /// cached value, because the list re-renders after each mutation.
    ///
    /// # Errors
    ///
    /// Driver errors propagate.
    pub async fn live_count<D: StoreDriver + ?Sized>(&self, driver: &D) -> ComprarResult<usize> {
        for candidate in &self.candidates {
            let query = driver.query(candidate).await?;
            if query.count > 0 {
                return Ok(query.count);
            }
        }
        Ok(0)
    }
}
