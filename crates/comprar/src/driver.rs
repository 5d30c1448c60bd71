//! Abstract storefront driver over the underlying browser engine.
//!
//! The locator, workflow, and page-object layers speak [`StoreDriver`]
//! and never the browser protocol directly. The default build ships only
//! the in-memory [`crate::mock::MockStore`]; compiling with the `browser`
//! feature adds [`CdpDriver`], a Chrome DevTools Protocol implementation
//! via chromiumoxide.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::dialog::{ArmedDialog, DialogIntent};
use crate::result::ComprarResult;
use crate::selector::Selector;

/// Result of querying the current render tree for a selector.
///
/// Mirrors the engine's find primitive: match count, visibility of the
/// first match, and its text content. Never cached across navigations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementQuery {
    /// Number of elements currently matching
    pub count: usize,
    /// Whether the first match is currently visible
    pub visible: bool,
    /// Text content of the first match
    pub text: Option<String>,
}

impl ElementQuery {
    /// A query with no matches
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether at least one element matched
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.count > 0
    }
}

/// Driver configuration
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Timeout for navigation
    pub navigation_timeout: Duration,
    /// Settle bound for network/DOM quiescence waits
    pub settle_timeout: Duration,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            chromium_path: None,
            navigation_timeout: Duration::from_secs(30),
            settle_timeout: Duration::from_secs(5),
            sandbox: true,
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Set navigation timeout
    #[must_use]
    pub const fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Set the settle bound
    #[must_use]
    pub const fn with_settle_timeout(mut self, timeout: Duration) -> Self {
        self.settle_timeout = timeout;
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Abstract driver over the browser engine.
///
/// One scenario owns one driver; no shared mutable state crosses
/// concurrent scenario flows.
#[async_trait]
pub trait StoreDriver: Send + Sync {
    /// Navigate to a URL
    async fn goto(&self, url: &str) -> ComprarResult<()>;

    /// Current page URL
    async fn current_url(&self) -> ComprarResult<String>;

    /// Wait, bounded, for network/DOM quiescence
    async fn wait_for_network_idle(&self, timeout: Duration) -> ComprarResult<()>;

    /// Query the current render tree for a selector
    async fn query(&self, selector: &Selector) -> ComprarResult<ElementQuery>;

    /// Click the nth match of a selector
    async fn click(&self, selector: &Selector, index: usize) -> ComprarResult<()>;

    /// Fill the nth match of a selector with text
    async fn fill(&self, selector: &Selector, index: usize, text: &str) -> ComprarResult<()>;

    /// Text content of the nth match, if it exists
    async fn text_of(&self, selector: &Selector, index: usize) -> ComprarResult<Option<String>>;

    /// Arm a one-shot interception for the next native dialog.
    ///
    /// Registration is synchronous and must happen before the click that
    /// can raise the dialog; arming after the trigger can drop the event.
    fn arm_dialog(&self, intent: DialogIntent) -> ComprarResult<ArmedDialog>;
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(
    clippy::wildcard_imports,
    clippy::significant_drop_tightening,
    clippy::missing_errors_doc
)]
mod cdp {
    use super::*;
    use crate::dialog::{DialogKind, DialogOutcome, DialogResolution};
    use crate::result::ComprarError;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::page::{
        DialogType as CdpDialogType, EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
    };
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::sync::{Arc, Mutex};
    use tokio::sync::oneshot;

    type ArmedSlot = Arc<Mutex<Option<(DialogIntent, oneshot::Sender<DialogResolution>)>>>;

    /// Storefront driver speaking the Chrome DevTools Protocol
    #[derive(Debug)]
    pub struct CdpDriver {
        config: DriverConfig,
        browser: Arc<tokio::sync::Mutex<CdpBrowser>>,
        page: Arc<tokio::sync::Mutex<CdpPage>>,
        armed: ArmedSlot,
        #[allow(dead_code)]
        event_loop: tokio::task::JoinHandle<()>,
        #[allow(dead_code)]
        dialog_pump: tokio::task::JoinHandle<()>,
    }

    impl CdpDriver {
        /// Launch a browser and open a blank page
        pub async fn launch(config: DriverConfig) -> ComprarResult<Self> {
            let mut builder = CdpConfig::builder();

            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder.build().map_err(|e| ComprarError::BrowserLaunch {
                message: e.to_string(),
            })?;

            let (browser, mut handler) =
                CdpBrowser::launch(cdp_config)
                    .await
                    .map_err(|e| ComprarError::BrowserLaunch {
                        message: e.to_string(),
                    })?;

            let event_loop = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| ComprarError::Page {
                    message: e.to_string(),
                })?;

            let armed: ArmedSlot = Arc::new(Mutex::new(None));
            let dialog_pump = Self::spawn_dialog_pump(page.clone(), Arc::clone(&armed)).await?;

            Ok(Self {
                config,
                browser: Arc::new(tokio::sync::Mutex::new(browser)),
                page: Arc::new(tokio::sync::Mutex::new(page)),
                armed,
                event_loop,
                dialog_pump,
            })
        }

        /// Get the driver configuration
        #[must_use]
        pub const fn config(&self) -> &DriverConfig {
            &self.config
        }

        /// Close the browser
        pub async fn close(&self) -> ComprarResult<()> {
            let mut browser = self.browser.lock().await;
            browser
                .close()
                .await
                .map_err(|e| ComprarError::BrowserLaunch {
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn spawn_dialog_pump(
            page: CdpPage,
            armed: ArmedSlot,
        ) -> ComprarResult<tokio::task::JoinHandle<()>> {
            let mut events = page
                .event_listener::<EventJavascriptDialogOpening>()
                .await
                .map_err(|e| ComprarError::Page {
                    message: e.to_string(),
                })?;

            Ok(tokio::spawn(async move {
                while let Some(event) = events.next().await {
                    let slot = armed.lock().map(|mut s| s.take()).unwrap_or(None);
                    let kind = match event.r#type {
                        CdpDialogType::Alert => DialogKind::Alert,
                        CdpDialogType::Confirm => DialogKind::Confirm,
                        CdpDialogType::Prompt => DialogKind::Prompt,
                        CdpDialogType::Beforeunload => DialogKind::BeforeUnload,
                    };

                    let Some((intent, tx)) = slot else {
                        // Nothing armed: dismiss so the page does not hang,
                        // and surface the ordering bug in the log.
                        tracing::warn!(kind = %kind, message = %event.message, "unarmed dialog dismissed");
                        let params = HandleJavaScriptDialogParams::builder()
                            .accept(false)
                            .build();
                        if let Ok(params) = params {
                            let _ = page.execute(params).await;
                        }
                        continue;
                    };

                    let mut builder =
                        HandleJavaScriptDialogParams::builder().accept(intent.is_accept());
                    if let Some(input) = intent.input() {
                        builder = builder.prompt_text(input);
                    }
                    let Ok(params) = builder.build() else {
                        continue;
                    };
                    if page.execute(params).await.is_err() {
                        continue;
                    }

                    let outcome = if intent.is_accept() {
                        DialogOutcome::Accepted
                    } else {
                        DialogOutcome::Dismissed
                    };
                    let _ = tx.send(DialogResolution {
                        kind,
                        message: event.message.clone(),
                        outcome,
                        input: intent.input().map(str::to_string),
                    });
                }
            }))
        }

        async fn eval<T: serde::de::DeserializeOwned>(&self, expr: &str) -> ComprarResult<T> {
            let page = self.page.lock().await;
            let result = page.evaluate(expr).await.map_err(|e| ComprarError::Page {
                message: e.to_string(),
            })?;
            result.into_value().map_err(|e| ComprarError::Page {
                message: e.to_string(),
            })
        }

        fn nth_expr(selector: &Selector, index: usize) -> String {
            format!("({})[{index}]", selector.to_query_all())
        }
    }

    #[async_trait]
    impl StoreDriver for CdpDriver {
        async fn goto(&self, url: &str) -> ComprarResult<()> {
            let page = self.page.lock().await;
            page.goto(url).await.map_err(|e| ComprarError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
            Ok(())
        }

        async fn current_url(&self) -> ComprarResult<String> {
            let page = self.page.lock().await;
            let url = page.url().await.map_err(|e| ComprarError::Page {
                message: e.to_string(),
            })?;
            Ok(url.unwrap_or_default())
        }

        async fn wait_for_network_idle(&self, timeout: Duration) -> ComprarResult<()> {
            // Approximation of `networkidle`: document complete, then a
            // short quiet period, all bounded by `timeout`.
            let deadline = tokio::time::Instant::now() + timeout;
            loop {
                let ready: String = self.eval("document.readyState").await?;
                if ready == "complete" {
                    break;
                }
                if tokio::time::Instant::now() >= deadline {
                    return Err(ComprarError::Timeout {
                        ms: timeout.as_millis() as u64,
                    });
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            let quiet = Duration::from_millis(500).min(timeout);
            tokio::time::sleep(quiet).await;
            Ok(())
        }

        async fn query(&self, selector: &Selector) -> ComprarResult<ElementQuery> {
            let expr = format!(
                "(() => {{ const all = {all}; const el = all[0]; \
                 return {{ count: all.length, \
                 visible: !!el && el.getClientRects().length > 0, \
                 text: el ? el.textContent : null }}; }})()",
                all = selector.to_query_all()
            );
            self.eval(&expr).await
        }

        async fn click(&self, selector: &Selector, index: usize) -> ComprarResult<()> {
            let expr = format!(
                "(() => {{ const el = {el}; if (!el) return false; \
                 el.scrollIntoView({{block: 'center'}}); el.click(); return true; }})()",
                el = Self::nth_expr(selector, index)
            );
            let clicked: bool = self.eval(&expr).await?;
            if clicked {
                Ok(())
            } else {
                Err(ComprarError::StaleReference {
                    name: selector.to_string(),
                    index,
                    count: 0,
                })
            }
        }

        async fn fill(&self, selector: &Selector, index: usize, text: &str) -> ComprarResult<()> {
            let expr = format!(
                "(() => {{ const el = {el}; if (!el) return false; \
                 el.value = {text:?}; \
                 el.dispatchEvent(new Event('input', {{bubbles: true}})); \
                 el.dispatchEvent(new Event('change', {{bubbles: true}})); return true; }})()",
                el = Self::nth_expr(selector, index)
            );
            let filled: bool = self.eval(&expr).await?;
            if filled {
                Ok(())
            } else {
                Err(ComprarError::StaleReference {
                    name: selector.to_string(),
                    index,
                    count: 0,
                })
            }
        }

        async fn text_of(&self, selector: &Selector, index: usize) -> ComprarResult<Option<String>> {
            let expr = format!(
                "(() => {{ const el = {el}; return el ? el.textContent : null; }})()",
                el = Self::nth_expr(selector, index)
            );
            self.eval(&expr).await
        }

        fn arm_dialog(&self, intent: DialogIntent) -> ComprarResult<ArmedDialog> {
            let (tx, gate) = ArmedDialog::channel("dialog");
            if let Ok(mut slot) = self.armed.lock() {
                *slot = Some((intent, tx));
            }
            Ok(gate)
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::CdpDriver;

#[cfg(test)]
mod tests {
    use super::*;

    mod element_query_tests {
        use super::*;

        #[test]
        fn test_none_has_no_matches() {
            let query = ElementQuery::none();
            assert_eq!(query.count, 0);
            assert!(!query.visible);
            assert!(!query.is_present());
        }

        #[test]
        fn test_present_with_matches() {
            let query = ElementQuery {
                count: 2,
                visible: true,
                text: Some("Cancel Order".to_string()),
            };
            assert!(query.is_present());
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_config_default() {
            let config = DriverConfig::default();
            assert!(config.headless);
            assert_eq!(config.viewport_width, 1280);
            assert_eq!(config.viewport_height, 800);
            assert!(config.sandbox);
        }

        #[test]
        fn test_config_builder() {
            let config = DriverConfig::new()
                .with_headless(false)
                .with_viewport(800, 600)
                .with_chromium_path("/usr/bin/chromium")
                .with_settle_timeout(Duration::from_secs(2))
                .with_no_sandbox();

            assert!(!config.headless);
            assert_eq!(config.viewport_width, 800);
            assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
            assert_eq!(config.settle_timeout, Duration::from_secs(2));
            assert!(!config.sandbox);
        }
    }
}
