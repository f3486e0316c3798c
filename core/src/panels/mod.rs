// shopdesk/src/panels/mod.rs

//! Headless panel state machines. Each panel keeps its state in a
//! `ContextData` handle a renderer can clone, and runs every mutating
//! action through a `Flow`.

pub mod moderation_panel;
pub mod navigation;
pub mod notice;
pub mod order_panel;
pub mod review_panel;
pub mod sequence;

pub use moderation_panel::{
  AbuseDialog, AnalyticsSlot, ModerationCommand, ModerationPanel, ModerationPanelState, ModerationRow,
  DEFAULT_HIDE_REASON,
};
pub use navigation::NavigationIntent;
pub use notice::{Banner, Toast, ToastLevel, ToastQueue};
pub use order_panel::{OrderPanel, OrderPanelState, OrderRow};
pub use review_panel::{
  ReviewDraft, ReviewEmptyState, ReviewPanel, ReviewPanelState, ReviewSubmittedListener, SubmissionReceipt,
  SELECT_RATING_MESSAGE,
};
pub use sequence::{RequestSequencer, RequestTicket};

/// Where a paginated list is in its fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
  Loading,
  Loaded,
  Failed,
}
