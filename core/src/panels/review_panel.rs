// shopdesk/src/panels/review_panel.rs

//! Post-delivery review drafting for one order: one draft per product,
//! one submission in flight, a receipt after each success.

use super::notice::{Toast, ToastQueue};
use crate::api::ReviewRepository;
use crate::error::{ShopdeskError, ShopdeskResult};
use crate::flow::{ContextData, Flow, FlowControl, SkipCondition};
use crate::models::{NewReview, Order, OrderItem, ProductRef, Review};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

pub const SELECT_RATING_MESSAGE: &str = "Please select a rating";
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewDraft {
  /// 0 means "not chosen yet".
  pub rating: u8,
  pub comment: String,
}

/// What the shopper sees after a review went through.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
  pub review_id: String,
  pub product_id: String,
  pub product_name: String,
  pub product_image: Option<String>,
  pub rating: u8,
  pub comment: String,
  pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewEmptyState {
  /// The order has items and every one of them is reviewed.
  AllReviewed,
  /// The order has no line items at all.
  NothingToReview,
}

pub type ReviewSubmittedListener = Arc<dyn Fn(&SubmissionReceipt) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ReviewPanelState {
  pub order: Order,
  pub reviewed: HashSet<String>,
  pub expanded: HashSet<String>,
  pub drafts: HashMap<String, ReviewDraft>,
  /// Product whose review is being submitted.
  pub submitting: Option<String>,
  pub receipt: Option<SubmissionReceipt>,
  pub toasts: ToastQueue,
}

impl ReviewPanelState {
  fn pending_item(&self, product_id: &str) -> Option<&OrderItem> {
    self
      .order
      .order_items
      .iter()
      .find(|item| item.product_id() == product_id && !self.reviewed.contains(product_id))
  }
}

fn product_image(item: &OrderItem) -> Option<String> {
  item.image.clone().or_else(|| match &item.product {
    ProductRef::Populated(summary) => summary.image.clone(),
    ProductRef::Id(_) => None,
  })
}

pub struct SubmitReviewCtx {
  pub panel: ContextData<ReviewPanelState>,
  pub repo: Arc<dyn ReviewRepository>,
  pub listener: Option<ReviewSubmittedListener>,
  pub product_id: String,
  pub request: Option<NewReview>,
  pub claimed: bool,
  pub created: Option<Review>,
  pub receipt: Option<SubmissionReceipt>,
}

async fn validate_draft(ctx: ContextData<SubmitReviewCtx>) -> ShopdeskResult<FlowControl> {
  let mut guard = ctx.write();
  let product_id = guard.product_id.clone();
  let request = {
    let panel = guard.panel.read();
    let item = panel
      .pending_item(&product_id)
      .ok_or_else(|| ShopdeskError::validation("This product has already been reviewed"))?;
    let draft = panel.drafts.get(&product_id).cloned().unwrap_or_default();
    if draft.rating < 1 {
      return Err(ShopdeskError::validation(SELECT_RATING_MESSAGE));
    }
    NewReview {
      product: product_id.clone(),
      order: panel.order.id.clone(),
      item_id: item.id.clone(),
      rating: draft.rating,
      comment: draft.comment.trim().to_string(),
    }
  };
  guard.request = Some(request);
  Ok(FlowControl::Continue)
}

async fn claim_in_flight(ctx: ContextData<SubmitReviewCtx>) -> ShopdeskResult<FlowControl> {
  let mut guard = ctx.write();
  let product_id = guard.product_id.clone();
  guard.panel.update(|panel| {
    if panel.submitting.is_some() {
      return Err(ShopdeskError::validation("A review is already being submitted"));
    }
    panel.submitting = Some(product_id);
    Ok(())
  })?;
  guard.claimed = true;
  Ok(FlowControl::Continue)
}

async fn create_review(ctx: ContextData<SubmitReviewCtx>) -> ShopdeskResult<FlowControl> {
  let (repo, request) = {
    let guard = ctx.read();
    (guard.repo.clone(), guard.request.clone())
  };
  let request = request.ok_or_else(|| ShopdeskError::Internal("review request was not validated".to_string()))?;
  let created = repo.create_review(request).await?;
  ctx.write().created = Some(created);
  Ok(FlowControl::Continue)
}

async fn record_submission(ctx: ContextData<SubmitReviewCtx>) -> ShopdeskResult<FlowControl> {
  let mut guard = ctx.write();
  let (Some(request), Some(created)) = (guard.request.clone(), guard.created.take()) else {
    return Err(ShopdeskError::Internal("no created review to record".to_string()));
  };
  let receipt = guard.panel.update(|panel| {
    let item = panel
      .order
      .order_items
      .iter()
      .find(|item| item.product_id() == request.product);
    let receipt = SubmissionReceipt {
      review_id: created.id.clone(),
      product_id: request.product.clone(),
      product_name: item.map(|i| i.display_name().to_string()).unwrap_or_default(),
      product_image: item.and_then(product_image),
      rating: created.rating,
      comment: created.comment.clone().unwrap_or(request.comment.clone()),
      submitted_at: created.created_at.unwrap_or_else(Utc::now),
    };
    panel.drafts.remove(&request.product);
    panel.expanded.remove(&request.product);
    panel.reviewed.insert(request.product.clone());
    panel.receipt = Some(receipt.clone());
    panel.toasts.success("Review submitted. Thank you!");
    receipt
  });
  info!(product_id = %receipt.product_id, review_id = %receipt.review_id, "Review recorded.");
  guard.receipt = Some(receipt);
  Ok(FlowControl::Continue)
}

async fn notify_parent(ctx: ContextData<SubmitReviewCtx>) -> ShopdeskResult<FlowControl> {
  let guard = ctx.read();
  if let (Some(listener), Some(receipt)) = (&guard.listener, &guard.receipt) {
    listener(receipt);
  }
  Ok(FlowControl::Continue)
}

fn build_submit_flow() -> Flow<SubmitReviewCtx, ShopdeskError> {
  let no_listener: SkipCondition<SubmitReviewCtx> = Arc::new(|ctx| ctx.read().listener.is_none());
  let mut flow = Flow::new(
    "submit_review",
    &[
      ("create_review", false, None),
      ("record_submission", false, None),
      ("notify_parent", true, Some(no_listener)),
    ],
  );
  // Step 1: Guards run in registration order. A missing rating fails before
  // the in-flight marker is taken, so the draft stays editable.
  flow.guard("create_review", validate_draft);
  flow.guard("create_review", claim_in_flight);
  flow.on("create_review", create_review);
  // Step 2: Receipt, reviewed set and the success toast
  flow.on("record_submission", record_submission);
  // Step 3: Tell the embedding page (skipped when nobody listens)
  flow.on("notify_parent", notify_parent);
  // Release the marker only if this run took it.
  flow.always(|ctx| {
    let guard = ctx.read();
    if guard.claimed {
      guard.panel.write().submitting = None;
    }
  });
  flow
}

pub struct ReviewPanel {
  state: ContextData<ReviewPanelState>,
  repo: Arc<dyn ReviewRepository>,
  listener: Option<ReviewSubmittedListener>,
  submit_flow: Flow<SubmitReviewCtx, ShopdeskError>,
}

impl ReviewPanel {
  pub fn new(
    order: Order,
    already_reviewed: impl IntoIterator<Item = String>,
    repo: Arc<dyn ReviewRepository>,
    toast_ttl: Duration,
  ) -> Self {
    let state = ReviewPanelState {
      order,
      reviewed: already_reviewed.into_iter().collect(),
      expanded: HashSet::new(),
      drafts: HashMap::new(),
      submitting: None,
      receipt: None,
      toasts: ToastQueue::new(toast_ttl),
    };
    Self {
      state: ContextData::new(state),
      repo,
      listener: None,
      submit_flow: build_submit_flow(),
    }
  }

  /// Registers the callback invoked after every successful submission.
  pub fn on_submitted(mut self, listener: impl Fn(&SubmissionReceipt) + Send + Sync + 'static) -> Self {
    self.listener = Some(Arc::new(listener));
    self
  }

  pub fn state(&self) -> ContextData<ReviewPanelState> {
    self.state.clone()
  }

  pub fn snapshot(&self) -> ReviewPanelState {
    self.state.snapshot()
  }

  pub fn pending_items(&self) -> Vec<OrderItem> {
    let panel = self.state.read();
    panel
      .order
      .order_items
      .iter()
      .filter(|item| !panel.reviewed.contains(item.product_id()))
      .cloned()
      .collect()
  }

  pub fn empty_state(&self) -> Option<ReviewEmptyState> {
    let panel = self.state.read();
    let items = &panel.order.order_items;
    if items.is_empty() {
      Some(ReviewEmptyState::NothingToReview)
    } else if items.iter().all(|item| panel.reviewed.contains(item.product_id())) {
      Some(ReviewEmptyState::AllReviewed)
    } else {
      None
    }
  }

  pub fn expand(&self, product_id: &str) -> ShopdeskResult<()> {
    self.state.update(|panel| {
      if panel.pending_item(product_id).is_none() {
        return Err(ShopdeskError::validation("This product has nothing left to review"));
      }
      panel.expanded.insert(product_id.to_string());
      panel.drafts.entry(product_id.to_string()).or_default();
      Ok(())
    })
  }

  /// Folds the item away; its draft is kept.
  pub fn collapse(&self, product_id: &str) {
    self.state.write().expanded.remove(product_id);
  }

  pub fn draft(&self, product_id: &str) -> Option<ReviewDraft> {
    self.state.read().drafts.get(product_id).cloned()
  }

  pub fn set_rating(&self, product_id: &str, rating: u8) -> ShopdeskResult<()> {
    if rating > MAX_RATING {
      return Err(ShopdeskError::validation(format!("Rating must be between 1 and {}", MAX_RATING)));
    }
    self.edit_draft(product_id, |draft| draft.rating = rating)
  }

  pub fn set_comment(&self, product_id: &str, comment: impl Into<String>) -> ShopdeskResult<()> {
    let comment = comment.into();
    self.edit_draft(product_id, move |draft| draft.comment = comment)
  }

  fn edit_draft(&self, product_id: &str, edit: impl FnOnce(&mut ReviewDraft)) -> ShopdeskResult<()> {
    self.state.update(|panel| {
      if panel.pending_item(product_id).is_none() {
        return Err(ShopdeskError::validation("This product has nothing left to review"));
      }
      edit(panel.drafts.entry(product_id.to_string()).or_default());
      Ok(())
    })
  }

  /// Submits the draft for `product_id`. Failures raise an error toast and
  /// keep the draft so the shopper can retry.
  #[instrument(name = "ReviewPanel::submit", skip(self))]
  pub async fn submit(&self, product_id: &str) -> ShopdeskResult<SubmissionReceipt> {
    let ctx = ContextData::new(SubmitReviewCtx {
      panel: self.state.clone(),
      repo: self.repo.clone(),
      listener: self.listener.clone(),
      product_id: product_id.to_string(),
      request: None,
      claimed: false,
      created: None,
      receipt: None,
    });
    let result = self.submit_flow.run(ctx.clone()).await;
    let receipt = ctx.write().receipt.take();
    match (result, receipt) {
      (Ok(_), Some(receipt)) => Ok(receipt),
      (Ok(_), None) => Err(ShopdeskError::Internal("submission finished without a receipt".to_string())),
      (Err(err), _) => {
        warn!(product_id, error = %err, "Review submission failed.");
        self.state.write().toasts.error(err.user_message());
        Err(err)
      }
    }
  }

  pub fn receipt(&self) -> Option<SubmissionReceipt> {
    self.state.read().receipt.clone()
  }

  pub fn dismiss_receipt(&self) {
    self.state.write().receipt = None;
  }

  pub fn is_submitting(&self) -> bool {
    self.state.read().submitting.is_some()
  }

  pub fn visible_toasts(&self, now: Instant) -> Vec<Toast> {
    self.state.read().toasts.visible(now).into_iter().cloned().collect()
  }

  pub fn prune_toasts(&self, now: Instant) {
    self.state.write().toasts.prune(now);
  }
}
