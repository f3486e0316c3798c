// shopdesk/src/panels/order_panel.rs

//! The customer's order list: paging, the cancel confirmation flow, the
//! detail modal and the review deep link.

use super::navigation::NavigationIntent;
use super::notice::Banner;
use super::sequence::{RequestSequencer, RequestTicket};
use super::ListPhase;
use crate::api::OrderRepository;
use crate::error::{ShopdeskError, ShopdeskResult};
use crate::flow::{ContextData, Flow, FlowControl, FlowOutcome, SkipCondition};
use crate::models::{Order, OrdersPage, Pagination};
use crate::status::{self, CustomerStatus, StatusBadge};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct OrderPanelState {
  pub phase: ListPhase,
  pub orders: Vec<Order>,
  pub pagination: Pagination,
  pub page_size: u32,
  pub banner: Option<Banner>,
  /// Target of the single confirmation dialog, if open.
  pub confirm_cancel: Option<String>,
  /// Order whose cancellation request is outstanding.
  pub cancelling: Option<String>,
  pub detail: Option<Order>,
  pub review_target: Option<Order>,
  pub(crate) intent: Option<NavigationIntent>,
  pub(crate) sequencer: RequestSequencer,
}

impl OrderPanelState {
  fn new(page_size: u32, intent: Option<NavigationIntent>) -> Self {
    Self {
      phase: ListPhase::Loading,
      orders: Vec::new(),
      pagination: Pagination::default(),
      page_size,
      banner: None,
      confirm_cancel: None,
      cancelling: None,
      detail: None,
      review_target: None,
      intent,
      sequencer: RequestSequencer::default(),
    }
  }

  fn find_order(&self, order_id: &str) -> Option<&Order> {
    self
      .orders
      .iter()
      .find(|o| o.id == order_id)
      .or_else(|| self.detail.as_ref().filter(|o| o.id == order_id))
  }

  fn reject(&mut self, err: &ShopdeskError) {
    self.banner = Some(Banner::from(err));
  }
}

/// One rendered line of the order list (also used for the detail modal).
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRow {
  pub order_id: String,
  pub number: String,
  pub badge: StatusBadge,
  /// Only filled for cancelled orders that carry a reason.
  pub cancellation_reason: Option<String>,
  pub total_price: f64,
  pub item_count: usize,
  pub created_at: Option<DateTime<Utc>>,
  pub cancel_visible: bool,
  pub review_visible: bool,
  pub cancelling: bool,
}

impl OrderRow {
  fn project(order: &Order, cancelling: Option<&str>) -> Self {
    let badge = status::badge(order.status.as_deref());
    let mapped = order.customer_status();
    Self {
      order_id: order.id.clone(),
      number: order.display_number().to_string(),
      badge,
      cancellation_reason: order
        .cancellation_reason
        .clone()
        .filter(|reason| mapped == CustomerStatus::Cancelled && !reason.is_empty()),
      total_price: order.total_price,
      item_count: order.order_items.len(),
      created_at: order.created_at,
      cancel_visible: status::can_cancel(order.status.as_deref()),
      review_visible: mapped == CustomerStatus::Delivered,
      cancelling: cancelling == Some(order.id.as_str()),
    }
  }
}

// --- Flow contexts ---

pub struct FetchOrdersCtx {
  pub panel: ContextData<OrderPanelState>,
  pub repo: Arc<dyn OrderRepository>,
  pub page: u32,
  pub ticket: Option<RequestTicket>,
  pub fetched: Option<OrdersPage>,
}

pub struct CancelOrderCtx {
  pub panel: ContextData<OrderPanelState>,
  pub repo: Arc<dyn OrderRepository>,
  pub fetch_flow: Arc<Flow<FetchOrdersCtx, ShopdeskError>>,
  pub order_id: Option<String>,
}

// --- Fetch flow handlers ---

async fn issue_ticket(ctx: ContextData<FetchOrdersCtx>) -> ShopdeskResult<FlowControl> {
  let mut guard = ctx.write();
  let ticket = guard.panel.update(|panel| {
    panel.phase = ListPhase::Loading;
    panel.sequencer.issue()
  });
  guard.ticket = Some(ticket);
  Ok(FlowControl::Continue)
}

async fn fetch_page(ctx: ContextData<FetchOrdersCtx>) -> ShopdeskResult<FlowControl> {
  let (repo, page, page_size) = {
    let guard = ctx.read();
    let page_size = guard.panel.read().page_size;
    (guard.repo.clone(), guard.page, page_size)
  };
  let fetched = repo.list_orders(page, page_size).await?;
  ctx.write().fetched = Some(fetched);
  Ok(FlowControl::Continue)
}

async fn apply_page(ctx: ContextData<FetchOrdersCtx>) -> ShopdeskResult<FlowControl> {
  let mut guard = ctx.write();
  let (Some(ticket), Some(fetched)) = (guard.ticket, guard.fetched.take()) else {
    return Err(ShopdeskError::Internal("order page applied before it was fetched".to_string()));
  };
  let applied = guard.panel.update(|panel| {
    if !panel.sequencer.is_current(ticket) {
      return false;
    }
    panel.orders = fetched.orders;
    panel.pagination = fetched.pagination;
    panel.phase = ListPhase::Loaded;
    panel.banner = None;
    true
  });
  if !applied {
    debug!(page = guard.page, "Discarding superseded order page.");
    return Ok(FlowControl::Stop);
  }
  Ok(FlowControl::Continue)
}

/// Consumes the navigation intent after the first applied page.
async fn resolve_intent(ctx: ContextData<FetchOrdersCtx>) -> ShopdeskResult<FlowControl> {
  let guard = ctx.read();
  guard.panel.update(|panel| {
    let Some(NavigationIntent::ReviewOrder { order_id }) = panel.intent.take() else {
      return;
    };
    match panel.orders.iter().find(|o| o.id == order_id) {
      Some(order) if order.customer_status() == CustomerStatus::Delivered => {
        info!(order_id = %order_id, "Opening review flow from navigation intent.");
        panel.review_target = Some(order.clone());
      }
      Some(_) => warn!(order_id = %order_id, "Review intent ignored: order is not delivered."),
      None => warn!(order_id = %order_id, "Review intent ignored: order not on this page."),
    }
  });
  Ok(FlowControl::Continue)
}

fn build_fetch_flow() -> Flow<FetchOrdersCtx, ShopdeskError> {
  let no_intent: SkipCondition<FetchOrdersCtx> = Arc::new(|ctx| ctx.read().panel.read().intent.is_none());
  let mut flow = Flow::new(
    "fetch_orders",
    &[
      ("issue_ticket", false, None),
      ("fetch_page", false, None),
      ("apply_page", false, None),             // Stops the flow when a newer fetch was issued
      ("resolve_intent", true, Some(no_intent)), // Only runs while a deep link is pending
    ],
  );
  // Step 1: Mark the list loading and take a ticket from the sequencer
  flow.on("issue_ticket", issue_ticket);
  // Step 2: Call the backend; no panel lock is held across the await
  flow.on("fetch_page", fetch_page);
  // Step 3: Apply the page if the ticket is still current
  flow.on("apply_page", apply_page);
  // Step 4: Consume the deep-link intent against the page just applied
  flow.on("resolve_intent", resolve_intent);
  flow
}

/// Runs the fetch flow and records a failure on the banner, unless a newer
/// request has superseded this one in the meantime.
async fn load_orders(
  flow: &Flow<FetchOrdersCtx, ShopdeskError>,
  panel: &ContextData<OrderPanelState>,
  repo: &Arc<dyn OrderRepository>,
  page: u32,
) -> ShopdeskResult<FlowOutcome> {
  let ctx = ContextData::new(FetchOrdersCtx {
    panel: panel.clone(),
    repo: repo.clone(),
    page,
    ticket: None,
    fetched: None,
  });
  let result = flow.run(ctx.clone()).await;
  if let Err(err) = &result {
    let ticket = ctx.read().ticket;
    panel.update(|state| {
      if ticket.map_or(true, |t| state.sequencer.is_current(t)) {
        state.phase = ListPhase::Failed;
        state.reject(err);
      }
    });
  }
  result
}

// --- Cancel flow handlers ---

async fn claim_target(ctx: ContextData<CancelOrderCtx>) -> ShopdeskResult<FlowControl> {
  let mut guard = ctx.write();
  let claimed = guard.panel.update(|panel| {
    if let Some(in_flight) = &panel.cancelling {
      return Err(ShopdeskError::validation(format!(
        "Order {} is already being cancelled",
        in_flight
      )));
    }
    let order_id = panel
      .confirm_cancel
      .clone()
      .ok_or_else(|| ShopdeskError::validation("No cancellation is awaiting confirmation"))?;
    panel.cancelling = Some(order_id.clone());
    Ok(order_id)
  })?;
  guard.order_id = Some(claimed);
  Ok(FlowControl::Continue)
}

async fn call_cancel_api(ctx: ContextData<CancelOrderCtx>) -> ShopdeskResult<FlowControl> {
  let (repo, order_id) = {
    let guard = ctx.read();
    (guard.repo.clone(), guard.order_id.clone())
  };
  let order_id = order_id.ok_or_else(|| ShopdeskError::Internal("cancel target was not claimed".to_string()))?;
  repo.cancel_order(&order_id).await?;
  info!(order_id = %order_id, "Order cancelled.");
  Ok(FlowControl::Continue)
}

async fn refetch_current_page(ctx: ContextData<CancelOrderCtx>) -> ShopdeskResult<FlowControl> {
  let (flow, panel, repo) = {
    let guard = ctx.read();
    (guard.fetch_flow.clone(), guard.panel.clone(), guard.repo.clone())
  };
  let page = panel.read().pagination.page;
  // A failed refetch is already on the banner; the cancellation itself stands.
  if let Err(err) = load_orders(&flow, &panel, &repo, page).await {
    warn!(error = %err, "Refetch after cancellation failed.");
  }
  Ok(FlowControl::Continue)
}

async fn close_cancelled_detail(ctx: ContextData<CancelOrderCtx>) -> ShopdeskResult<FlowControl> {
  let guard = ctx.read();
  let order_id = guard.order_id.clone();
  guard.panel.update(|panel| {
    if panel.detail.as_ref().map(|o| &o.id) == order_id.as_ref() {
      panel.detail = None;
    }
  });
  Ok(FlowControl::Continue)
}

fn build_cancel_flow() -> Flow<CancelOrderCtx, ShopdeskError> {
  let mut flow = Flow::new(
    "cancel_order",
    &[
      ("call_cancel_api", false, None),
      ("refetch_current_page", false, None),
      ("close_cancelled_detail", false, None),
    ],
  );
  // Step 1: Claim the confirmed order, then ask the backend to cancel it.
  // The guard refuses a second cancel while one is in flight.
  flow.guard("call_cancel_api", claim_target);
  flow.on("call_cancel_api", call_cancel_api);
  // Step 2: Reload the page the customer is looking at
  flow.on("refetch_current_page", refetch_current_page);
  // Step 3: A detail modal showing the cancelled order is stale now
  flow.on("close_cancelled_detail", close_cancelled_detail);
  // The dialog closes whatever happened; failures are reported on the banner.
  flow.always(|ctx| {
    let guard = ctx.read();
    let claimed = guard.order_id.clone();
    guard.panel.update(|panel| {
      panel.confirm_cancel = None;
      if claimed.is_some() && panel.cancelling == claimed {
        panel.cancelling = None;
      }
    });
  });
  flow
}

// --- Panel ---

#[derive(Clone)]
pub struct OrderPanel {
  state: ContextData<OrderPanelState>,
  repo: Arc<dyn OrderRepository>,
  fetch_flow: Arc<Flow<FetchOrdersCtx, ShopdeskError>>,
  cancel_flow: Arc<Flow<CancelOrderCtx, ShopdeskError>>,
}

impl OrderPanel {
  pub fn new(repo: Arc<dyn OrderRepository>, page_size: u32, intent: Option<NavigationIntent>) -> Self {
    Self {
      state: ContextData::new(OrderPanelState::new(page_size.max(1), intent)),
      repo,
      fetch_flow: Arc::new(build_fetch_flow()),
      cancel_flow: Arc::new(build_cancel_flow()),
    }
  }

  /// Shared handle to the live state, for renderers.
  pub fn state(&self) -> ContextData<OrderPanelState> {
    self.state.clone()
  }

  pub fn snapshot(&self) -> OrderPanelState {
    self.state.snapshot()
  }

  pub async fn mount(&self) -> ShopdeskResult<()> {
    self.load(1).await
  }

  pub async fn reload(&self) -> ShopdeskResult<()> {
    let page = self.state.read().pagination.page;
    self.load(page).await
  }

  /// Loads `page` directly. Returns `false` without fetching when the page is out of range.
  pub async fn go_to_page(&self, page: u32) -> ShopdeskResult<bool> {
    let last_page = self.state.read().pagination.last_page();
    if page == 0 || page > last_page {
      debug!(page, last_page, "Page outside the known range; ignoring.");
      return Ok(false);
    }
    self.load(page).await?;
    Ok(true)
  }

  pub async fn next_page(&self) -> ShopdeskResult<bool> {
    let pagination = self.state.read().pagination;
    if !pagination.has_next() {
      return Ok(false);
    }
    self.go_to_page(pagination.page + 1).await
  }

  pub async fn previous_page(&self) -> ShopdeskResult<bool> {
    let pagination = self.state.read().pagination;
    if !pagination.has_previous() {
      return Ok(false);
    }
    self.go_to_page(pagination.page - 1).await
  }

  #[instrument(name = "OrderPanel::load", skip(self))]
  async fn load(&self, page: u32) -> ShopdeskResult<()> {
    load_orders(&self.fetch_flow, &self.state, &self.repo, page).await.map(|_| ())
  }

  /// Opens the confirmation dialog, or puts the reason on the banner when
  /// the order cannot be cancelled.
  pub fn request_cancel(&self, order_id: &str) -> ShopdeskResult<()> {
    self.state.update(|panel| {
      let result = match panel.find_order(order_id) {
        None => Err(ShopdeskError::validation(format!("Order {} is not on this page", order_id))),
        Some(order) if !order.can_cancel() => Err(ShopdeskError::validation(format!(
          "Order {} can no longer be cancelled ({})",
          order.display_number(),
          status::status_label(order.status.as_deref())
        ))),
        Some(_) if panel.cancelling.is_some() => Err(ShopdeskError::validation(
          "Another cancellation is still in progress",
        )),
        Some(_) => Ok(()),
      };
      match result {
        Ok(()) => {
          panel.confirm_cancel = Some(order_id.to_string());
          Ok(())
        }
        Err(err) => {
          warn!(order_id, error = %err, "Cancel request rejected.");
          panel.reject(&err);
          Err(err)
        }
      }
    })
  }

  pub fn dismiss_cancel(&self) {
    self.state.write().confirm_cancel = None;
  }

  /// Confirms the open cancellation. The dialog is closed afterwards in
  /// every case; failures land on the banner.
  #[instrument(name = "OrderPanel::confirm_cancel", skip(self))]
  pub async fn confirm_cancel(&self) -> ShopdeskResult<()> {
    let ctx = ContextData::new(CancelOrderCtx {
      panel: self.state.clone(),
      repo: self.repo.clone(),
      fetch_flow: self.fetch_flow.clone(),
      order_id: None,
    });
    match self.cancel_flow.run(ctx).await {
      Ok(_) => Ok(()),
      Err(err) => {
        self.state.write().reject(&err);
        Err(err)
      }
    }
  }

  pub fn open_detail(&self, order_id: &str) -> ShopdeskResult<()> {
    let mut panel = self.state.write();
    let order = panel
      .orders
      .iter()
      .find(|o| o.id == order_id)
      .cloned()
      .ok_or_else(|| ShopdeskError::validation(format!("Order {} is not on this page", order_id)))?;
    panel.detail = Some(order);
    Ok(())
  }

  pub fn close_detail(&self) {
    self.state.write().detail = None;
  }

  /// Switches from the detail modal to the review flow; delivered orders only.
  pub fn open_review_from_detail(&self) -> ShopdeskResult<()> {
    let mut panel = self.state.write();
    let order = panel
      .detail
      .clone()
      .ok_or_else(|| ShopdeskError::validation("No order is open"))?;
    if order.customer_status() != CustomerStatus::Delivered {
      return Err(ShopdeskError::validation("Only delivered orders can be reviewed"));
    }
    panel.detail = None;
    panel.review_target = Some(order);
    Ok(())
  }

  pub fn close_review(&self) {
    self.state.write().review_target = None;
  }

  /// Called by the review panel after a submission; the backend owns the
  /// "already reviewed" fact, so the page is fetched again.
  pub async fn mark_review_submitted(&self) -> ShopdeskResult<()> {
    self.reload().await
  }

  pub fn rows(&self) -> Vec<OrderRow> {
    let panel = self.state.read();
    let cancelling = panel.cancelling.as_deref();
    panel.orders.iter().map(|o| OrderRow::project(o, cancelling)).collect()
  }

  pub fn detail_row(&self) -> Option<OrderRow> {
    let panel = self.state.read();
    let cancelling = panel.cancelling.as_deref();
    panel.detail.as_ref().map(|o| OrderRow::project(o, cancelling))
  }

  pub fn can_go_previous(&self) -> bool {
    self.state.read().pagination.has_previous()
  }

  pub fn can_go_next(&self) -> bool {
    self.state.read().pagination.has_next()
  }
}
