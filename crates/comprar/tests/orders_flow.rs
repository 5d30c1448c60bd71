//! Order-cancellation scenarios against the seeded mock storefront.

use std::time::Duration;

use comprar::fixture::seed;
use comprar::mock::MockStore;
use comprar::pages::OrderPage;
use comprar::prelude::*;

fn fast_resolve() -> ResolveOptions {
    ResolveOptions::new()
        .with_visibility_timeout(Duration::from_millis(200))
        .with_poll_interval(Duration::from_millis(10))
}

fn fast_gated() -> GatedActionOptions {
    GatedActionOptions::new()
        .with_dialog_timeout(Duration::from_millis(500))
        .with_settle(Duration::from_millis(10))
        .with_resolve(fast_resolve())
}

fn fast_budget() -> DrainBudget {
    DrainBudget::new().with_per_step_timeout(Duration::from_millis(500))
}

fn orders_page(store: &MockStore) -> OrderPage<'_, MockStore> {
    OrderPage::new(store, "http://127.0.0.1:5000")
        .with_resolve_options(fast_resolve())
        .with_gated_options(fast_gated())
}

#[tokio::test]
async fn cancelling_three_pending_orders_empties_the_tab() {
    let store = seed::orders_with_pending(3);
    let orders = orders_page(&store);
    orders.navigate().await.unwrap();
    assert!(orders.is_loaded().await.unwrap());
    orders.select_tab(OrderTab::Pending).await.unwrap();

    let report = orders.cancel_all_pending(&fast_budget()).await.unwrap();

    assert_eq!(report, DrainReport { removed: 3, exhausted: false });
    assert_eq!(orders.pending_count().await.unwrap(), 0);
    assert!(orders.no_orders_visible().await.unwrap());
    // Every dialog was confirm-type, handled, none missed.
    let log = store.dialog_log();
    assert_eq!(log.len(), 3);
    assert_eq!(store.missed_dialogs(), 0);
}

#[tokio::test]
async fn cancel_all_is_idempotent_once_empty() {
    let store = seed::orders_with_pending(2);
    let orders = orders_page(&store);
    orders.navigate().await.unwrap();

    let first = orders.cancel_all_pending(&fast_budget()).await.unwrap();
    assert_eq!(first, DrainReport { removed: 2, exhausted: false });

    let second = orders.cancel_all_pending(&fast_budget()).await.unwrap();
    assert_eq!(second, DrainReport { removed: 0, exhausted: false });
    // The second pass never touched a dialog.
    assert_eq!(store.dialog_log().len(), 2);
}

#[tokio::test]
async fn iteration_budget_below_pending_count_reports_exhausted() {
    let store = seed::orders_with_pending(5);
    let orders = orders_page(&store);
    orders.navigate().await.unwrap();

    let budget = fast_budget().with_max_iterations(3);
    let report = orders.cancel_all_pending(&budget).await.unwrap();

    assert_eq!(report, DrainReport { removed: 3, exhausted: true });
    assert_eq!(orders.pending_count().await.unwrap(), 2);
    assert!(!orders.no_orders_visible().await.unwrap());
}

#[tokio::test]
async fn dismissing_the_confirmation_keeps_the_order_pending() {
    let store = seed::orders_with_pending(1);
    let orders = orders_page(&store);
    orders.navigate().await.unwrap();

    let resolution = orders.cancel_first(DialogIntent::Dismiss).await.unwrap();

    assert_eq!(resolution.outcome, DialogOutcome::Dismissed);
    assert_eq!(orders.pending_count().await.unwrap(), 1);
    let order = orders.order(0).await.unwrap();
    assert_eq!(order.status.as_deref(), Some("pending"));
    assert!(!orders.cancelled_banner_visible().await.unwrap());
}

#[tokio::test]
async fn accepting_the_confirmation_shows_the_inline_banner() {
    let store = seed::orders_with_pending(1);
    let orders = orders_page(&store);
    orders.navigate().await.unwrap();

    let resolution = orders.cancel_first(DialogIntent::Accept).await.unwrap();

    assert_eq!(resolution.outcome, DialogOutcome::Accepted);
    assert!(orders.cancelled_banner_visible().await.unwrap());
    assert!(orders.no_orders_visible().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn silent_cancel_button_yields_dialog_timeout_not_success() {
    // A storefront regression: the cancel button stops raising its
    // confirmation. The workflow must fail with DialogTimeout, never
    // report Accepted or Dismissed.
    let store = MockStore::builder()
        .element(Selector::css_with_text("button", "Cancel Order"), 1)
        .build();
    let orders = OrderPage::new(&store, "http://127.0.0.1:5000")
        .with_resolve_options(fast_resolve())
        .with_gated_options(
            GatedActionOptions::new()
                .with_dialog_timeout(Duration::from_secs(5))
                .with_resolve(fast_resolve()),
        );

    let result = orders.cancel_first(DialogIntent::Accept).await;

    match result {
        Err(ComprarError::DialogTimeout { ms, .. }) => assert_eq!(ms, 5_000),
        other => panic!("expected DialogTimeout, got {other:?}"),
    }
}

#[tokio::test]
async fn order_summary_round_trip() {
    let store = seed::orders_with_pending(2);
    let orders = orders_page(&store);
    orders.navigate().await.unwrap();

    assert_eq!(orders.order_count().await.unwrap(), 2);
    let order = orders.order(0).await.unwrap();
    assert_eq!(order.order_id, Some(17));
    assert_eq!(order.total, Some(Money::from_parts(24, 99)));
    assert_eq!(order.items, Some(2));
    assert_eq!(order.date.as_deref(), Some("2025-06-14"));
}

#[tokio::test]
async fn all_five_status_tabs_render() {
    let store = seed::orders_with_pending(1);
    let orders = orders_page(&store);
    orders.navigate().await.unwrap();

    let tabs = orders.visible_tabs().await.unwrap();
    assert_eq!(tabs.len(), 5);
    for tab in [
        OrderTab::All,
        OrderTab::Pending,
        OrderTab::Processing,
        OrderTab::Shipped,
        OrderTab::Delivered,
    ] {
        assert!(tabs.contains(&tab), "missing tab {tab:?}");
    }
}
