// tests/order_panel_tests.rs
mod common;
use common::*;
use serial_test::serial;
use shopdesk::error::ErrorKind;
use shopdesk::panels::{ListPhase, NavigationIntent, OrderPanel};
use shopdesk::status::CustomerStatus;
use shopdesk::OrderRepository;
use std::sync::Arc;
use std::time::Duration;

fn panel_over(backend: &Arc<FakeBackend>, intent: Option<NavigationIntent>) -> OrderPanel {
  let repo: Arc<dyn OrderRepository> = backend.clone();
  OrderPanel::new(repo, 10, intent)
}

#[tokio::test]
#[serial]
async fn test_approved_order_reads_as_delivered_and_reviewable() {
  setup_tracing();
  let backend = Arc::new(FakeBackend::with_orders(vec![order("o-1", "approved")]));
  let panel = panel_over(&backend, None);

  panel.mount().await.unwrap();

  let rows = panel.rows();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].badge.status, Some(CustomerStatus::Delivered));
  assert_eq!(rows[0].badge.label, "Delivered");
  assert!(!rows[0].cancel_visible);
  assert!(rows[0].review_visible);
  assert_eq!(panel.snapshot().phase, ListPhase::Loaded);
}

#[tokio::test]
#[serial]
async fn test_declined_order_shows_cancelled_with_reason() {
  setup_tracing();
  let mut declined = order("o-1", "declined");
  declined.cancellation_reason = Some("Out of stock".to_string());
  let backend = Arc::new(FakeBackend::with_orders(vec![declined]));
  let panel = panel_over(&backend, None);

  panel.mount().await.unwrap();

  let row = &panel.rows()[0];
  assert_eq!(row.badge.status, Some(CustomerStatus::Cancelled));
  assert_eq!(row.cancellation_reason.as_deref(), Some("Out of stock"));
  assert!(!row.cancel_visible);
  assert!(!row.review_visible);
}

#[tokio::test]
#[serial]
async fn test_confirmed_cancel_calls_api_once_and_refetches_page_one() {
  setup_tracing();
  let backend = Arc::new(FakeBackend::with_orders(vec![order("o-1", "pending"), order("o-2", "shipped")]));
  let panel = panel_over(&backend, None);
  panel.mount().await.unwrap();
  assert!(panel.rows()[0].cancel_visible);

  panel.request_cancel("o-1").unwrap();
  assert_eq!(panel.snapshot().confirm_cancel.as_deref(), Some("o-1"));
  assert_eq!(backend.count("cancel_order"), 0, "opening the dialog must not call the API");

  panel.confirm_cancel().await.unwrap();

  assert_eq!(backend.count("cancel_order(o-1)"), 1);
  assert_eq!(backend.calls().last().map(String::as_str), Some("list_orders(1,10)"));
  assert_eq!(backend.count("list_orders"), 2);
  let state = panel.snapshot();
  assert!(state.confirm_cancel.is_none());
  assert!(state.cancelling.is_none());
  assert_eq!(panel.rows()[0].badge.status, Some(CustomerStatus::Cancelled));
}

#[tokio::test]
#[serial]
async fn test_dismissing_the_dialog_makes_no_call() {
  setup_tracing();
  let backend = Arc::new(FakeBackend::with_orders(vec![order("o-1", "pending")]));
  let panel = panel_over(&backend, None);
  panel.mount().await.unwrap();

  panel.request_cancel("o-1").unwrap();
  panel.dismiss_cancel();

  assert!(panel.snapshot().confirm_cancel.is_none());
  assert_eq!(backend.count("cancel_order"), 0);
}

#[tokio::test]
#[serial]
async fn test_cancel_request_on_ineligible_order_sets_banner_without_dialog() {
  setup_tracing();
  let backend = Arc::new(FakeBackend::with_orders(vec![order("o-1", "shipped")]));
  let panel = panel_over(&backend, None);
  panel.mount().await.unwrap();

  let err = panel.request_cancel("o-1").unwrap_err();

  assert_eq!(err.kind(), ErrorKind::ValidationError);
  let state = panel.snapshot();
  assert!(state.confirm_cancel.is_none());
  let banner = state.banner.expect("banner should be set");
  assert!(banner.message.contains("can no longer be cancelled"));
}

#[tokio::test]
#[serial]
async fn test_backend_rejection_closes_dialog_and_surfaces_message() {
  setup_tracing();
  let backend = Arc::new(FakeBackend::with_orders(vec![order("o-1", "pending")]));
  backend.fail("cancel_order", 400, "Order is already being packed");
  let panel = panel_over(&backend, None);
  panel.mount().await.unwrap();
  panel.request_cancel("o-1").unwrap();

  let err = panel.confirm_cancel().await.unwrap_err();

  assert_eq!(err.kind(), ErrorKind::ApiError);
  let state = panel.snapshot();
  assert!(state.confirm_cancel.is_none(), "dialog closes on failure too");
  assert!(state.cancelling.is_none());
  assert_eq!(state.banner.unwrap().message, "Order is already being packed");
  assert_eq!(backend.count("list_orders"), 1, "no refetch after a failed cancel");
}

#[tokio::test]
#[serial]
async fn test_confirm_without_open_dialog_is_rejected() {
  setup_tracing();
  let backend = Arc::new(FakeBackend::with_orders(vec![order("o-1", "pending")]));
  let panel = panel_over(&backend, None);
  panel.mount().await.unwrap();

  let err = panel.confirm_cancel().await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::ValidationError);
  assert_eq!(backend.count("cancel_order"), 0);
}

#[tokio::test]
#[serial]
async fn test_cancelling_from_detail_closes_the_modal() {
  setup_tracing();
  let backend = Arc::new(FakeBackend::with_orders(vec![order("o-1", "pending")]));
  let panel = panel_over(&backend, None);
  panel.mount().await.unwrap();

  panel.open_detail("o-1").unwrap();
  assert_eq!(panel.detail_row().unwrap().order_id, "o-1");
  panel.request_cancel("o-1").unwrap();
  panel.confirm_cancel().await.unwrap();

  assert!(panel.snapshot().detail.is_none());
}

#[tokio::test]
#[serial]
async fn test_disabled_pagination_controls_are_no_ops() {
  setup_tracing();
  let orders = (1..=25).map(|i| order(&format!("o-{}", i), "pending")).collect();
  let backend = Arc::new(FakeBackend::with_orders(orders));
  let panel = panel_over(&backend, None);
  panel.mount().await.unwrap();

  assert!(!panel.can_go_previous());
  assert!(!panel.previous_page().await.unwrap());
  assert!(!panel.go_to_page(4).await.unwrap());
  assert_eq!(backend.count("list_orders"), 1);

  assert!(panel.next_page().await.unwrap());
  assert!(panel.next_page().await.unwrap());
  assert_eq!(panel.snapshot().pagination.page, 3);
  assert!(!panel.can_go_next());
  assert!(!panel.next_page().await.unwrap());
  assert_eq!(panel.rows().len(), 5);
  assert_eq!(backend.count("list_orders"), 3);
}

#[tokio::test]
#[serial]
async fn test_stale_page_response_is_discarded() {
  setup_tracing();
  let orders = (1..=30).map(|i| order(&format!("o-{}", i), "pending")).collect();
  let backend = Arc::new(FakeBackend::with_orders(orders));
  let panel = panel_over(&backend, None);
  panel.mount().await.unwrap();

  backend.delay_next("list_orders", Duration::from_millis(60));
  let (slow, fast) = tokio::join!(panel.go_to_page(2), panel.go_to_page(3));
  slow.unwrap();
  fast.unwrap();

  let state = panel.snapshot();
  assert_eq!(state.pagination.page, 3);
  assert_eq!(state.orders[0].id, "o-21");
  assert_eq!(state.phase, ListPhase::Loaded);
}

#[tokio::test]
#[serial]
async fn test_list_failure_sets_banner() {
  setup_tracing();
  let backend = Arc::new(FakeBackend::default());
  backend.fail("list_orders", 500, "Database unavailable");
  let panel = panel_over(&backend, None);

  assert!(panel.mount().await.is_err());

  let state = panel.snapshot();
  assert_eq!(state.phase, ListPhase::Failed);
  let banner = state.banner.unwrap();
  assert_eq!(banner.kind, ErrorKind::ApiError);
  assert_eq!(banner.message, "Database unavailable");

  backend.clear_failure("list_orders");
  panel.reload().await.unwrap();
  assert!(panel.snapshot().banner.is_none());
}

#[tokio::test]
#[serial]
async fn test_review_intent_opens_delivered_order_once() {
  setup_tracing();
  let backend = Arc::new(FakeBackend::with_orders(vec![order("o-1", "pending"), order("o-2", "delivered")]));
  let panel = panel_over(&backend, Some(NavigationIntent::review_order("o-2")));

  panel.mount().await.unwrap();
  assert_eq!(panel.snapshot().review_target.map(|o| o.id).as_deref(), Some("o-2"));

  panel.close_review();
  panel.reload().await.unwrap();
  assert!(panel.snapshot().review_target.is_none(), "intent is consumed by the first fetch");
}

#[tokio::test]
#[serial]
async fn test_review_intent_for_undelivered_order_is_ignored() {
  setup_tracing();
  let backend = Arc::new(FakeBackend::with_orders(vec![order("o-1", "processing")]));
  let panel = panel_over(&backend, Some(NavigationIntent::review_order("o-1")));

  panel.mount().await.unwrap();
  assert!(panel.snapshot().review_target.is_none());
}

#[tokio::test]
#[serial]
async fn test_review_from_detail_requires_delivered_order() {
  setup_tracing();
  let backend = Arc::new(FakeBackend::with_orders(vec![order("o-1", "pending"), order("o-2", "approved")]));
  let panel = panel_over(&backend, None);
  panel.mount().await.unwrap();

  panel.open_detail("o-1").unwrap();
  assert!(panel.open_review_from_detail().is_err());
  assert!(panel.snapshot().review_target.is_none());

  panel.open_detail("o-2").unwrap();
  panel.open_review_from_detail().unwrap();
  let state = panel.snapshot();
  assert!(state.detail.is_none());
  assert_eq!(state.review_target.unwrap().id, "o-2");
}

#[tokio::test]
#[serial]
async fn test_submitted_review_refetches_current_page() {
  setup_tracing();
  let orders = (1..=25).map(|i| order(&format!("o-{}", i), "approved")).collect();
  let backend = Arc::new(FakeBackend::with_orders(orders));
  let panel = panel_over(&backend, None);
  panel.mount().await.unwrap();
  assert!(panel.go_to_page(2).await.unwrap());

  panel.open_detail("o-11").unwrap();
  panel.open_review_from_detail().unwrap();
  let before = backend.count("list_orders(2,10)");

  panel.mark_review_submitted().await.unwrap();

  assert_eq!(backend.count("list_orders(2,10)"), before + 1);
  assert_eq!(backend.calls().last().unwrap(), "list_orders(2,10)");
  let state = panel.snapshot();
  assert_eq!(state.pagination.page, 2);
  assert_eq!(state.orders[0].id, "o-11");
}
