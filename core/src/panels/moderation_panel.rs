// shopdesk/src/panels/moderation_panel.rs

//! Admin review console: filtered list, per-review moderation actions with
//! the abuse and delete dialogs, and the analytics summary.

use super::notice::{Banner, Toast, ToastQueue};
use super::sequence::{RequestSequencer, RequestTicket};
use super::ListPhase;
use crate::api::ReviewModerationRepository;
use crate::error::{ShopdeskError, ShopdeskResult};
use crate::flow::{ContextData, Flow, FlowControl, FlowOutcome};
use crate::models::{Pagination, Review, ReviewAnalytics, ReviewsPage};
use crate::moderation::{available_actions, AbuseReason, ModerationAction, ModerationFilter, ModerationStatus};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_HIDE_REASON: &str = "Hidden by admin";

/// Analytics load on their own and never block or fail the list.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsSlot {
  Loading,
  Loaded(ReviewAnalytics),
  Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbuseDialog {
  pub review_id: String,
  pub reason: Option<AbuseReason>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationCommand {
  Approve,
  Hide { reason: String },
  MarkAbusive(AbuseReason),
  Delete,
}

impl ModerationCommand {
  fn success_message(&self) -> &'static str {
    match self {
      ModerationCommand::Approve => "Review approved",
      ModerationCommand::Hide { .. } => "Review hidden",
      ModerationCommand::MarkAbusive(_) => "Review reported as abusive",
      ModerationCommand::Delete => "Review deleted",
    }
  }
}

#[derive(Debug, Clone)]
pub struct ModerationPanelState {
  pub phase: ListPhase,
  pub reviews: Vec<Review>,
  pub pagination: Pagination,
  pub page_size: u32,
  pub filter: ModerationFilter,
  pub banner: Option<Banner>,
  pub analytics: AnalyticsSlot,
  /// Reviews with an action in flight.
  pub acting_on: HashSet<String>,
  pub abuse_dialog: Option<AbuseDialog>,
  pub delete_confirm: Option<String>,
  pub toasts: ToastQueue,
  pub(crate) sequencer: RequestSequencer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModerationRow {
  pub review_id: String,
  pub product_name: String,
  pub reviewer: String,
  pub rating: u8,
  pub comment: Option<String>,
  pub status: ModerationStatus,
  pub abuse_reason: Option<String>,
  pub hide_reason: Option<String>,
  pub actions: Vec<ModerationAction>,
  pub busy: bool,
}

impl ModerationRow {
  fn project(review: &Review, busy: bool) -> Self {
    Self {
      review_id: review.id.clone(),
      product_name: review.product.name().unwrap_or(review.product.id()).to_string(),
      reviewer: review
        .user
        .as_ref()
        .map(|u| u.display_name().to_string())
        .unwrap_or_else(|| "Anonymous".to_string()),
      rating: review.rating,
      comment: review.comment.clone(),
      status: review.moderation_status(),
      abuse_reason: review.abuse_reason.clone(),
      hide_reason: review.hide_reason.clone(),
      actions: available_actions(review),
      busy,
    }
  }
}

// --- List loading ---

pub struct FetchReviewsCtx {
  pub panel: ContextData<ModerationPanelState>,
  pub repo: Arc<dyn ReviewModerationRepository>,
  pub page: u32,
  pub ticket: Option<RequestTicket>,
  pub fetched: Option<ReviewsPage>,
}

async fn issue_ticket(ctx: ContextData<FetchReviewsCtx>) -> ShopdeskResult<FlowControl> {
  let mut guard = ctx.write();
  let ticket = guard.panel.update(|panel| {
    panel.phase = ListPhase::Loading;
    panel.sequencer.issue()
  });
  guard.ticket = Some(ticket);
  Ok(FlowControl::Continue)
}

async fn fetch_reviews(ctx: ContextData<FetchReviewsCtx>) -> ShopdeskResult<FlowControl> {
  let (repo, page, page_size, filter) = {
    let guard = ctx.read();
    let panel = guard.panel.read();
    (guard.repo.clone(), guard.page, panel.page_size, panel.filter)
  };
  let fetched = repo.list_reviews(page, page_size, filter).await?;
  ctx.write().fetched = Some(fetched);
  Ok(FlowControl::Continue)
}

async fn apply_reviews(ctx: ContextData<FetchReviewsCtx>) -> ShopdeskResult<FlowControl> {
  let mut guard = ctx.write();
  let (Some(ticket), Some(fetched)) = (guard.ticket, guard.fetched.take()) else {
    return Err(ShopdeskError::Internal("review page applied before it was fetched".to_string()));
  };
  let applied = guard.panel.update(|panel| {
    if !panel.sequencer.is_current(ticket) {
      return false;
    }
    panel.reviews = fetched.reviews;
    panel.pagination = fetched.pagination;
    panel.phase = ListPhase::Loaded;
    panel.banner = None;
    true
  });
  if !applied {
    debug!(page = guard.page, "Discarding superseded review page.");
    return Ok(FlowControl::Stop);
  }
  Ok(FlowControl::Continue)
}

fn build_fetch_flow() -> Flow<FetchReviewsCtx, ShopdeskError> {
  let mut flow = Flow::new(
    "fetch_reviews",
    &[
      ("issue_ticket", false, None),
      ("fetch_reviews", false, None),
      ("apply_reviews", false, None),
    ],
  );
  flow.on("issue_ticket", issue_ticket);
  flow.on("fetch_reviews", fetch_reviews); // Reads the filter at call time
  flow.on("apply_reviews", apply_reviews); // Stale pages stop here
  flow
}

async fn load_reviews(
  flow: &Flow<FetchReviewsCtx, ShopdeskError>,
  panel: &ContextData<ModerationPanelState>,
  repo: &Arc<dyn ReviewModerationRepository>,
  page: u32,
) -> ShopdeskResult<FlowOutcome> {
  let ctx = ContextData::new(FetchReviewsCtx {
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
        state.banner = Some(Banner::from(err));
      }
    });
  }
  result
}

/// Refreshes the analytics slot. Failures only mark the slot unavailable.
async fn load_analytics(panel: &ContextData<ModerationPanelState>, repo: &Arc<dyn ReviewModerationRepository>) {
  panel.write().analytics = AnalyticsSlot::Loading;
  let slot = match repo.analytics().await {
    Ok(analytics) => AnalyticsSlot::Loaded(analytics),
    Err(err) => {
      warn!(error = %err, "Review analytics unavailable.");
      AnalyticsSlot::Unavailable
    }
  };
  panel.write().analytics = slot;
}

// --- Moderation actions ---

pub struct ModerateCtx {
  pub panel: ContextData<ModerationPanelState>,
  pub repo: Arc<dyn ReviewModerationRepository>,
  pub fetch_flow: Arc<Flow<FetchReviewsCtx, ShopdeskError>>,
  pub review_id: String,
  pub command: ModerationCommand,
  pub claimed: bool,
}

async fn claim_review(ctx: ContextData<ModerateCtx>) -> ShopdeskResult<FlowControl> {
  let mut guard = ctx.write();
  let review_id = guard.review_id.clone();
  let command = guard.command.clone();
  guard.panel.update(|panel| {
    let review = panel
      .reviews
      .iter()
      .find(|r| r.id == review_id)
      .ok_or_else(|| ShopdeskError::validation("Review is not on this page"))?;
    let allowed = match command {
      ModerationCommand::Approve => available_actions(review).contains(&ModerationAction::Approve),
      ModerationCommand::Hide { .. } => available_actions(review).contains(&ModerationAction::Hide),
      ModerationCommand::MarkAbusive(_) | ModerationCommand::Delete => true,
    };
    if !allowed {
      return Err(ShopdeskError::validation("That action is not available for this review"));
    }
    if !panel.acting_on.insert(review_id.clone()) {
      return Err(ShopdeskError::validation("Another action on this review is still running"));
    }
    Ok(())
  })?;
  guard.claimed = true;
  Ok(FlowControl::Continue)
}

async fn apply_command(ctx: ContextData<ModerateCtx>) -> ShopdeskResult<FlowControl> {
  let (repo, review_id, command) = {
    let guard = ctx.read();
    (guard.repo.clone(), guard.review_id.clone(), guard.command.clone())
  };
  match &command {
    ModerationCommand::Approve => repo.approve_review(&review_id).await?,
    ModerationCommand::Hide { reason } => repo.hide_review(&review_id, reason).await?,
    ModerationCommand::MarkAbusive(reason) => repo.mark_abusive(&review_id, *reason).await?,
    ModerationCommand::Delete => repo.delete_review(&review_id).await?,
  }
  info!(review_id = %review_id, command = ?command, "Moderation action applied.");
  let panel = ctx.read().panel.clone();
  panel.write().toasts.success(command.success_message());
  Ok(FlowControl::Continue)
}

async fn refresh_list(ctx: ContextData<ModerateCtx>) -> ShopdeskResult<FlowControl> {
  let (flow, panel, repo) = {
    let guard = ctx.read();
    (guard.fetch_flow.clone(), guard.panel.clone(), guard.repo.clone())
  };
  let page = panel.read().pagination.page;
  if let Err(err) = load_reviews(&flow, &panel, &repo, page).await {
    warn!(error = %err, "Refetch after moderation failed.");
  }
  Ok(FlowControl::Continue)
}

async fn refresh_analytics(ctx: ContextData<ModerateCtx>) -> ShopdeskResult<FlowControl> {
  let (panel, repo) = {
    let guard = ctx.read();
    (guard.panel.clone(), guard.repo.clone())
  };
  load_analytics(&panel, &repo).await;
  Ok(FlowControl::Continue)
}

fn build_moderate_flow() -> Flow<ModerateCtx, ShopdeskError> {
  let mut flow = Flow::new(
    "moderate_review",
    &[
      ("apply_command", false, None),
      ("refresh_list", false, None),
      ("refresh_analytics", false, None),
    ],
  );
  // Step 1: The guard re-checks the action against the review's current
  // status and refuses a review that already has an action in flight.
  flow.guard("apply_command", claim_review);
  flow.on("apply_command", apply_command);
  // Step 2: Reload the list with the active filter and page
  flow.on("refresh_list", refresh_list);
  // Step 3: Counts changed too; a failure only marks the slot unavailable
  flow.on("refresh_analytics", refresh_analytics);
  // Free the review and close whichever dialog drove this command.
  flow.always(|ctx| {
    let guard = ctx.read();
    let mut panel = guard.panel.write();
    if guard.claimed {
      panel.acting_on.remove(&guard.review_id);
    }
    match guard.command {
      ModerationCommand::MarkAbusive(_) => {
        if panel.abuse_dialog.as_ref().map(|d| &d.review_id) == Some(&guard.review_id) {
          panel.abuse_dialog = None;
        }
      }
      ModerationCommand::Delete => {
        if panel.delete_confirm.as_ref() == Some(&guard.review_id) {
          panel.delete_confirm = None;
        }
      }
      _ => {}
    }
  });
  flow
}

pub struct ModerationPanel {
  state: ContextData<ModerationPanelState>,
  repo: Arc<dyn ReviewModerationRepository>,
  fetch_flow: Arc<Flow<FetchReviewsCtx, ShopdeskError>>,
  moderate_flow: Flow<ModerateCtx, ShopdeskError>,
}

impl ModerationPanel {
  pub fn new(repo: Arc<dyn ReviewModerationRepository>, page_size: u32, toast_ttl: Duration) -> Self {
    let state = ModerationPanelState {
      phase: ListPhase::Loading,
      reviews: Vec::new(),
      pagination: Pagination::default(),
      page_size: page_size.max(1),
      filter: ModerationFilter::All,
      banner: None,
      analytics: AnalyticsSlot::Loading,
      acting_on: HashSet::new(),
      abuse_dialog: None,
      delete_confirm: None,
      toasts: ToastQueue::new(toast_ttl),
      sequencer: RequestSequencer::default(),
    };
    Self {
      state: ContextData::new(state),
      repo,
      fetch_flow: Arc::new(build_fetch_flow()),
      moderate_flow: build_moderate_flow(),
    }
  }

  pub fn state(&self) -> ContextData<ModerationPanelState> {
    self.state.clone()
  }

  pub fn snapshot(&self) -> ModerationPanelState {
    self.state.snapshot()
  }

  /// Loads the first page and the analytics. Only a list failure is returned.
  pub async fn mount(&self) -> ShopdeskResult<()> {
    let listed = self.load(1).await;
    self.reload_analytics().await;
    listed
  }

  pub async fn reload(&self) -> ShopdeskResult<()> {
    let page = self.state.read().pagination.page;
    self.load(page).await
  }

  pub async fn reload_analytics(&self) {
    load_analytics(&self.state, &self.repo).await;
  }

  /// Switches the server-side filter and goes back to page 1.
  pub async fn set_filter(&self, filter: ModerationFilter) -> ShopdeskResult<()> {
    self.state.update(|panel| {
      panel.filter = filter;
      panel.pagination.page = 1;
    });
    info!(filter = filter.as_str(), "Review filter changed.");
    self.load(1).await
  }

  pub async fn go_to_page(&self, page: u32) -> ShopdeskResult<bool> {
    let last_page = self.state.read().pagination.last_page();
    if page == 0 || page > last_page {
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

  #[instrument(name = "ModerationPanel::load", skip(self))]
  async fn load(&self, page: u32) -> ShopdeskResult<()> {
    load_reviews(&self.fetch_flow, &self.state, &self.repo, page).await.map(|_| ())
  }

  pub fn actions_for(&self, review_id: &str) -> Vec<ModerationAction> {
    self
      .state
      .read()
      .reviews
      .iter()
      .find(|r| r.id == review_id)
      .map(available_actions)
      .unwrap_or_default()
  }

  pub fn is_acting_on(&self, review_id: &str) -> bool {
    self.state.read().acting_on.contains(review_id)
  }

  pub fn rows(&self) -> Vec<ModerationRow> {
    let panel = self.state.read();
    panel
      .reviews
      .iter()
      .map(|r| ModerationRow::project(r, panel.acting_on.contains(&r.id)))
      .collect()
  }

  pub async fn approve(&self, review_id: &str) -> ShopdeskResult<()> {
    self.moderate(review_id, ModerationCommand::Approve).await
  }

  /// Hides a review. A blank reason falls back to `DEFAULT_HIDE_REASON`.
  pub async fn hide(&self, review_id: &str, reason: &str) -> ShopdeskResult<()> {
    let reason = match reason.trim() {
      "" => DEFAULT_HIDE_REASON.to_string(),
      given => given.to_string(),
    };
    self.moderate(review_id, ModerationCommand::Hide { reason }).await
  }

  pub fn open_abuse_dialog(&self, review_id: &str) -> ShopdeskResult<()> {
    self.state.update(|panel| {
      if !panel.reviews.iter().any(|r| r.id == review_id) {
        return Err(ShopdeskError::validation("Review is not on this page"));
      }
      panel.abuse_dialog = Some(AbuseDialog {
        review_id: review_id.to_string(),
        reason: None,
      });
      Ok(())
    })
  }

  pub fn select_abuse_reason(&self, reason: AbuseReason) -> ShopdeskResult<()> {
    let mut panel = self.state.write();
    let dialog = panel
      .abuse_dialog
      .as_mut()
      .ok_or_else(|| ShopdeskError::validation("No abuse report is open"))?;
    dialog.reason = Some(reason);
    Ok(())
  }

  pub fn cancel_abuse_dialog(&self) {
    self.state.write().abuse_dialog = None;
  }

  pub async fn confirm_abuse(&self) -> ShopdeskResult<()> {
    let dialog = self.state.read().abuse_dialog.clone();
    let Some(dialog) = dialog else {
      return self.reject(ShopdeskError::validation("No abuse report is open"));
    };
    let Some(reason) = dialog.reason else {
      return self.reject(ShopdeskError::validation("Please select a reason for reporting"));
    };
    self.moderate(&dialog.review_id, ModerationCommand::MarkAbusive(reason)).await
  }

  pub fn request_delete(&self, review_id: &str) -> ShopdeskResult<()> {
    self.state.update(|panel| {
      if !panel.reviews.iter().any(|r| r.id == review_id) {
        return Err(ShopdeskError::validation("Review is not on this page"));
      }
      panel.delete_confirm = Some(review_id.to_string());
      Ok(())
    })
  }

  pub fn cancel_delete(&self) {
    self.state.write().delete_confirm = None;
  }

  pub async fn confirm_delete(&self) -> ShopdeskResult<()> {
    let target = self.state.read().delete_confirm.clone();
    match target {
      Some(review_id) => self.moderate(&review_id, ModerationCommand::Delete).await,
      None => self.reject(ShopdeskError::validation("No deletion is awaiting confirmation")),
    }
  }

  #[instrument(name = "ModerationPanel::moderate", skip(self, command))]
  async fn moderate(&self, review_id: &str, command: ModerationCommand) -> ShopdeskResult<()> {
    let ctx = ContextData::new(ModerateCtx {
      panel: self.state.clone(),
      repo: self.repo.clone(),
      fetch_flow: self.fetch_flow.clone(),
      review_id: review_id.to_string(),
      command,
      claimed: false,
    });
    match self.moderate_flow.run(ctx).await {
      Ok(_) => Ok(()),
      Err(err) => self.reject(err),
    }
  }

  fn reject(&self, err: ShopdeskError) -> ShopdeskResult<()> {
    warn!(error = %err, "Moderation action rejected.");
    self.state.write().toasts.error(err.user_message());
    Err(err)
  }

  pub fn visible_toasts(&self, now: Instant) -> Vec<Toast> {
    self.state.read().toasts.visible(now).into_iter().cloned().collect()
  }

  pub fn prune_toasts(&self, now: Instant) {
    self.state.write().toasts.prune(now);
  }
}
