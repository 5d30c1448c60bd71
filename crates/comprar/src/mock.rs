//! Scripted in-memory storefront driver.
//!
//! `MockStore` implements [`StoreDriver`] against a stub element table
//! instead of a browser: each selector maps to a count/visibility/text
//! triple, and clicks can apply mutations or raise a native dialog whose
//! accept and dismiss branches carry their own mutations. Dialog arming
//! is one-shot, exactly like the real driver: a dialog raised while
//! nothing is armed is recorded as missed and applies neither branch,
//! which is how the arm-before-click ordering requirement gets exercised
//! in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::oneshot;

use crate::dialog::{
    ArmedDialog, DialogIntent, DialogKind, DialogOutcome, DialogResolution,
};
use crate::driver::{ElementQuery, StoreDriver};
use crate::result::{ComprarError, ComprarResult};
use crate::selector::Selector;

/// A stubbed element: how many match, whether the first is visible, and
/// what it reads as
#[derive(Debug, Clone)]
pub struct StubElement {
    /// Match count
    pub count: usize,
    /// Visibility of the first match
    pub visible: bool,
    /// Text content of the first match
    pub text: Option<String>,
}

impl StubElement {
    fn visible_with_count(count: usize) -> Self {
        Self {
            count,
            visible: count > 0,
            text: None,
        }
    }
}

/// State change applied by a click or a dialog branch
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Set the match count of a stub
    SetCount(Selector, usize),
    /// Decrement the match count of a stub (saturating)
    Decrement(Selector),
    /// Make a stub visible (count raised to at least one)
    Show(Selector),
    /// Hide a stub
    Hide(Selector),
    /// Replace a stub's text
    SetText(Selector, String),
    /// Simulate a client-side navigation
    Navigate(String),
    /// Show `target` once `watch` has no matches left
    ShowWhenDepleted {
        /// Stub whose count is observed
        watch: Selector,
        /// Stub revealed at zero
        target: Selector,
    },
}

/// Effect attached to clicking a stubbed element
#[derive(Debug, Clone)]
pub enum ClickEffect {
    /// Apply mutations directly (no dialog involved)
    Mutate(Vec<Mutation>),
    /// Raise a native dialog; the armed intent picks the branch
    Dialog {
        /// Kind of dialog raised
        kind: DialogKind,
        /// Dialog message
        message: String,
        /// Mutations applied when accepted
        on_accept: Vec<Mutation>,
        /// Mutations applied when dismissed
        on_dismiss: Vec<Mutation>,
    },
}

/// One dialog observed by the mock, handled or missed
#[derive(Debug, Clone)]
pub struct DialogRecord {
    /// Kind of dialog
    pub kind: DialogKind,
    /// Message displayed
    pub message: String,
    /// How it was resolved; `None` when it fired with nothing armed
    pub outcome: Option<DialogOutcome>,
    /// Prompt input passed through on accept
    pub input: Option<String>,
}

impl DialogRecord {
    /// Whether the dialog fired while nothing was armed
    #[must_use]
    pub fn was_missed(&self) -> bool {
        self.outcome.is_none()
    }
}

#[derive(Default)]
struct MockState {
    url: String,
    elements: HashMap<Selector, StubElement>,
    click_effects: HashMap<Selector, ClickEffect>,
    armed: Option<(DialogIntent, oneshot::Sender<DialogResolution>)>,
    dialogs: Vec<DialogRecord>,
    history: Vec<String>,
}

impl MockState {
    fn apply(&mut self, mutations: &[Mutation]) {
        for mutation in mutations {
            match mutation {
                Mutation::SetCount(sel, count) => {
                    let stub = self
                        .elements
                        .entry(sel.clone())
                        .or_insert_with(|| StubElement::visible_with_count(0));
                    stub.count = *count;
                    stub.visible = *count > 0;
                }
                Mutation::Decrement(sel) => {
                    if let Some(stub) = self.elements.get_mut(sel) {
                        stub.count = stub.count.saturating_sub(1);
                        if stub.count == 0 {
                            stub.visible = false;
                        }
                    }
                }
                Mutation::Show(sel) => {
                    let stub = self
                        .elements
                        .entry(sel.clone())
                        .or_insert_with(|| StubElement::visible_with_count(1));
                    stub.count = stub.count.max(1);
                    stub.visible = true;
                }
                Mutation::Hide(sel) => {
                    if let Some(stub) = self.elements.get_mut(sel) {
                        stub.visible = false;
                    }
                }
                Mutation::SetText(sel, text) => {
                    let stub = self
                        .elements
                        .entry(sel.clone())
                        .or_insert_with(|| StubElement::visible_with_count(1));
                    stub.text = Some(text.clone());
                }
                Mutation::Navigate(url) => {
                    self.url = url.clone();
                    self.history.push(format!("navigate:{url}"));
                }
                Mutation::ShowWhenDepleted { watch, target } => {
                    let depleted = self.elements.get(watch).map_or(true, |s| s.count == 0);
                    if depleted {
                        let stub = self
                            .elements
                            .entry(target.clone())
                            .or_insert_with(|| StubElement::visible_with_count(1));
                        stub.count = stub.count.max(1);
                        stub.visible = true;
                    }
                }
            }
        }
    }
}

/// Scripted storefront driver for tests
#[derive(Clone, Default)]
pub struct MockStore {
    inner: Arc<Mutex<MockState>>,
}

impl MockStore {
    /// Start building a mock store
    #[must_use]
    pub fn builder() -> MockStoreBuilder {
        MockStoreBuilder {
            state: MockState::default(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Set the match count of a stub at runtime
    pub fn set_count(&self, selector: &Selector, count: usize) {
        self.lock()
            .apply(&[Mutation::SetCount(selector.clone(), count)]);
    }

    /// Replace a stub's text at runtime
    pub fn set_text(&self, selector: &Selector, text: impl Into<String>) {
        self.lock()
            .apply(&[Mutation::SetText(selector.clone(), text.into())]);
    }

    /// All dialogs the mock observed
    #[must_use]
    pub fn dialog_log(&self) -> Vec<DialogRecord> {
        self.lock().dialogs.clone()
    }

    /// Dialogs that fired while nothing was armed
    #[must_use]
    pub fn missed_dialogs(&self) -> usize {
        self.lock().dialogs.iter().filter(|d| d.was_missed()).count()
    }

    /// Call history for verification
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Whether a method call with this prefix was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().history.iter().any(|c| c.starts_with(prefix))
    }
}

impl std::fmt::Debug for MockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("MockStore")
            .field("url", &state.url)
            .field("elements", &state.elements.len())
            .field("dialogs", &state.dialogs.len())
            .finish()
    }
}

/// Builder for [`MockStore`]
pub struct MockStoreBuilder {
    state: MockState,
}

impl MockStoreBuilder {
    /// Set the starting URL
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.state.url = url.into();
        self
    }

    /// Stub a visible element with a match count
    #[must_use]
    pub fn element(mut self, selector: Selector, count: usize) -> Self {
        self.state
            .elements
            .insert(selector, StubElement::visible_with_count(count));
        self
    }

    /// Stub an element that matches but is not visible
    #[must_use]
    pub fn hidden_element(mut self, selector: Selector, count: usize) -> Self {
        self.state.elements.insert(
            selector,
            StubElement {
                count,
                visible: false,
                text: None,
            },
        );
        self
    }

    /// Stub a visible element with text content
    #[must_use]
    pub fn element_with_text(
        mut self,
        selector: Selector,
        count: usize,
        text: impl Into<String>,
    ) -> Self {
        self.state.elements.insert(
            selector,
            StubElement {
                count,
                visible: count > 0,
                text: Some(text.into()),
            },
        );
        self
    }

    /// Attach a click effect to a selector
    #[must_use]
    pub fn on_click(mut self, selector: Selector, effect: ClickEffect) -> Self {
        self.state.click_effects.insert(selector, effect);
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> MockStore {
        MockStore {
            inner: Arc::new(Mutex::new(self.state)),
        }
    }
}

impl std::fmt::Debug for MockStoreBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStoreBuilder")
            .field("elements", &self.state.elements.len())
            .finish()
    }
}

#[async_trait]
impl StoreDriver for MockStore {
    async fn goto(&self, url: &str) -> ComprarResult<()> {
        let mut state = self.lock();
        state.url = url.to_string();
        state.history.push(format!("goto:{url}"));
        Ok(())
    }

    async fn current_url(&self) -> ComprarResult<String> {
        Ok(self.lock().url.clone())
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> ComprarResult<()> {
        // The mock renders synchronously; it is always settled.
        Ok(())
    }

    async fn query(&self, selector: &Selector) -> ComprarResult<ElementQuery> {
        let state = self.lock();
        Ok(state.elements.get(selector).map_or_else(ElementQuery::none, |stub| {
            ElementQuery {
                count: stub.count,
                visible: stub.count > 0 && stub.visible,
                text: stub.text.clone(),
            }
        }))
    }

    async fn click(&self, selector: &Selector, index: usize) -> ComprarResult<()> {
        let mut state = self.lock();
        state.history.push(format!("click:{selector}:{index}"));

        let count = state.elements.get(selector).map_or(0, |s| s.count);
        if index >= count {
            return Err(ComprarError::StaleReference {
                name: selector.to_string(),
                index,
                count,
            });
        }

        let Some(effect) = state.click_effects.get(selector).cloned() else {
            return Ok(());
        };

        match effect {
            ClickEffect::Mutate(mutations) => state.apply(&mutations),
            ClickEffect::Dialog {
                kind,
                message,
                on_accept,
                on_dismiss,
            } => {
                let armed = state.armed.take();
                match armed {
                    Some((intent, tx)) => {
                        let accepted = intent.is_accept();
                        let input = intent.input().map(str::to_string);
                        if accepted {
                            state.apply(&on_accept);
                        } else {
                            state.apply(&on_dismiss);
                        }
                        let outcome = if accepted {
                            DialogOutcome::Accepted
                        } else {
                            DialogOutcome::Dismissed
                        };
                        state.dialogs.push(DialogRecord {
                            kind,
                            message: message.clone(),
                            outcome: Some(outcome),
                            input: input.clone(),
                        });
                        let _ = tx.send(DialogResolution {
                            kind,
                            message,
                            outcome,
                            input,
                        });
                    }
                    None => {
                        // Missed: the registration came too late (or never).
                        // Neither branch runs and the gate never resolves.
                        state.dialogs.push(DialogRecord {
                            kind,
                            message,
                            outcome: None,
                            input: None,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    async fn fill(&self, selector: &Selector, index: usize, text: &str) -> ComprarResult<()> {
        let mut state = self.lock();
        state.history.push(format!("fill:{selector}:{index}:{text}"));
        let count = state.elements.get(selector).map_or(0, |s| s.count);
        if index >= count {
            return Err(ComprarError::StaleReference {
                name: selector.to_string(),
                index,
                count,
            });
        }
        if let Some(stub) = state.elements.get_mut(selector) {
            stub.text = Some(text.to_string());
        }
        Ok(())
    }

    async fn text_of(&self, selector: &Selector, index: usize) -> ComprarResult<Option<String>> {
        let state = self.lock();
        Ok(state
            .elements
            .get(selector)
            .filter(|stub| index < stub.count)
            .and_then(|stub| stub.text.clone()))
    }

    fn arm_dialog(&self, intent: DialogIntent) -> ComprarResult<ArmedDialog> {
        let (tx, gate) = ArmedDialog::channel("dialog");
        let mut state = self.lock();
        state.history.push("arm_dialog".to_string());
        state.armed = Some((intent, tx));
        Ok(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cancel_button() -> Selector {
        Selector::css_with_text("button", "Cancel Order")
    }

    fn banner() -> Selector {
        Selector::css_with_text(".alert", "Order cancelled")
    }

    #[tokio::test]
    async fn test_query_unstubbed_selector_is_empty() {
        let store = MockStore::builder().build();
        let query = store.query(&Selector::css("h1")).await.unwrap();
        assert_eq!(query, ElementQuery::none());
    }

    #[tokio::test]
    async fn test_query_reads_stub() {
        let store = MockStore::builder()
            .element_with_text(Selector::css("#cart-total"), 1, "$24.99")
            .build();
        let query = store.query(&Selector::css("#cart-total")).await.unwrap();
        assert_eq!(query.count, 1);
        assert!(query.visible);
        assert_eq!(query.text.as_deref(), Some("$24.99"));
    }

    #[tokio::test]
    async fn test_click_out_of_range_is_stale() {
        let store = MockStore::builder().element(cancel_button(), 1).build();
        let result = store.click(&cancel_button(), 3).await;
        assert!(matches!(result, Err(ComprarError::StaleReference { count: 1, index: 3, .. })));
    }

    #[tokio::test]
    async fn test_armed_dialog_accept_applies_accept_branch() {
        let store = MockStore::builder()
            .element(cancel_button(), 2)
            .on_click(
                cancel_button(),
                ClickEffect::Dialog {
                    kind: DialogKind::Confirm,
                    message: "Cancel this order?".to_string(),
                    on_accept: vec![Mutation::Decrement(cancel_button()), Mutation::Show(banner())],
                    on_dismiss: vec![],
                },
            )
            .build();

        let gate = store.arm_dialog(DialogIntent::Accept).unwrap();
        store.click(&cancel_button(), 0).await.unwrap();
        let resolution = gate.resolved(Duration::from_millis(100)).await.unwrap();

        assert_eq!(resolution.outcome, DialogOutcome::Accepted);
        assert_eq!(store.query(&cancel_button()).await.unwrap().count, 1);
        assert!(store.query(&banner()).await.unwrap().visible);
    }

    #[tokio::test]
    async fn test_armed_dialog_dismiss_keeps_state() {
        let store = MockStore::builder()
            .element(cancel_button(), 2)
            .on_click(
                cancel_button(),
                ClickEffect::Dialog {
                    kind: DialogKind::Confirm,
                    message: "Cancel this order?".to_string(),
                    on_accept: vec![Mutation::Decrement(cancel_button())],
                    on_dismiss: vec![],
                },
            )
            .build();

        let gate = store.arm_dialog(DialogIntent::Dismiss).unwrap();
        store.click(&cancel_button(), 0).await.unwrap();
        let resolution = gate.resolved(Duration::from_millis(100)).await.unwrap();

        assert_eq!(resolution.outcome, DialogOutcome::Dismissed);
        assert_eq!(store.query(&cancel_button()).await.unwrap().count, 2);
    }

    #[tokio::test]
    async fn test_unarmed_dialog_is_missed_and_applies_nothing() {
        let store = MockStore::builder()
            .element(cancel_button(), 2)
            .on_click(
                cancel_button(),
                ClickEffect::Dialog {
                    kind: DialogKind::Confirm,
                    message: "Cancel this order?".to_string(),
                    on_accept: vec![Mutation::Decrement(cancel_button())],
                    on_dismiss: vec![],
                },
            )
            .build();

        // Click without arming: registration-after-trigger race.
        store.click(&cancel_button(), 0).await.unwrap();

        assert_eq!(store.missed_dialogs(), 1);
        assert_eq!(store.query(&cancel_button()).await.unwrap().count, 2);
    }

    #[tokio::test]
    async fn test_prompt_input_recorded() {
        let checkout = Selector::css_with_text("button", "Proceed to Checkout");
        let store = MockStore::builder()
            .element(checkout.clone(), 1)
            .on_click(
                checkout.clone(),
                ClickEffect::Dialog {
                    kind: DialogKind::Prompt,
                    message: "Enter shipping address".to_string(),
                    on_accept: vec![Mutation::Navigate("/web/orders".to_string())],
                    on_dismiss: vec![],
                },
            )
            .build();

        let gate = store
            .arm_dialog(DialogIntent::AcceptWith("221B Baker Street".to_string()))
            .unwrap();
        store.click(&checkout, 0).await.unwrap();
        let resolution = gate.resolved(Duration::from_millis(100)).await.unwrap();

        assert_eq!(resolution.input.as_deref(), Some("221B Baker Street"));
        assert_eq!(store.current_url().await.unwrap(), "/web/orders");

        let log = store.dialog_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].input.as_deref(), Some("221B Baker Street"));
    }

    #[tokio::test]
    async fn test_show_when_depleted_reveals_empty_state() {
        let empty_label = Selector::text("No orders found");
        let store = MockStore::builder()
            .element(cancel_button(), 1)
            .on_click(
                cancel_button(),
                ClickEffect::Dialog {
                    kind: DialogKind::Confirm,
                    message: "Cancel this order?".to_string(),
                    on_accept: vec![
                        Mutation::Decrement(cancel_button()),
                        Mutation::ShowWhenDepleted {
                            watch: cancel_button(),
                            target: empty_label.clone(),
                        },
                    ],
                    on_dismiss: vec![],
                },
            )
            .build();

        let gate = store.arm_dialog(DialogIntent::Accept).unwrap();
        store.click(&cancel_button(), 0).await.unwrap();
        gate.resolved(Duration::from_millis(100)).await.unwrap();

        assert!(store.query(&empty_label).await.unwrap().visible);
    }

    #[tokio::test]
    async fn test_history_records_interactions() {
        let store = MockStore::builder()
            .element(Selector::css("#email"), 1)
            .build();
        store.goto("http://127.0.0.1:5000/web/login").await.unwrap();
        store
            .fill(&Selector::css("#email"), 0, "user@store.test")
            .await
            .unwrap();

        assert!(store.was_called("goto:http://127.0.0.1:5000/web/login"));
        assert!(store.was_called("fill:css=#email"));
    }
}
