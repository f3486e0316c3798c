// shopdesk/src/moderation.rs

//! Admin-side view of a review: the derived moderation status, the list
//! filter, abuse reasons and which actions a review currently offers.

use crate::models::Review;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModerationStatus {
  Abusive,
  Hidden,
  Pending,
  Approved,
}

impl ModerationStatus {
  /// Precedence: abusive, then hidden, then not-yet-approved.
  pub fn from_flags(is_abusive: bool, is_visible: bool, is_approved: bool) -> Self {
    if is_abusive {
      ModerationStatus::Abusive
    } else if !is_visible {
      ModerationStatus::Hidden
    } else if !is_approved {
      ModerationStatus::Pending
    } else {
      ModerationStatus::Approved
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      ModerationStatus::Abusive => "Abusive",
      ModerationStatus::Hidden => "Hidden",
      ModerationStatus::Pending => "Pending",
      ModerationStatus::Approved => "Approved",
    }
  }
}

impl fmt::Display for ModerationStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// Server-side filter of the admin review list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationFilter {
  #[default]
  All,
  Pending,
  Approved,
  Hidden,
  Abusive,
}

impl ModerationFilter {
  pub const ALL: [ModerationFilter; 5] = [
    ModerationFilter::All,
    ModerationFilter::Pending,
    ModerationFilter::Approved,
    ModerationFilter::Hidden,
    ModerationFilter::Abusive,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      ModerationFilter::All => "all",
      ModerationFilter::Pending => "pending",
      ModerationFilter::Approved => "approved",
      ModerationFilter::Hidden => "hidden",
      ModerationFilter::Abusive => "abusive",
    }
  }

  /// Value of the `status` query parameter; `All` sends none.
  pub fn query_value(self) -> Option<&'static str> {
    match self {
      ModerationFilter::All => None,
      other => Some(other.as_str()),
    }
  }
}

impl FromStr for ModerationFilter {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ModerationFilter::ALL
      .into_iter()
      .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| format!("unknown review filter '{}'", s))
  }
}

/// Reasons an admin can pick when reporting a review as abusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbuseReason {
  Offensive,
  Spam,
  Irrelevant,
  Misleading,
  Other,
}

impl AbuseReason {
  pub const ALL: [AbuseReason; 5] = [
    AbuseReason::Offensive,
    AbuseReason::Spam,
    AbuseReason::Irrelevant,
    AbuseReason::Misleading,
    AbuseReason::Other,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      AbuseReason::Offensive => "offensive",
      AbuseReason::Spam => "spam",
      AbuseReason::Irrelevant => "irrelevant",
      AbuseReason::Misleading => "misleading",
      AbuseReason::Other => "other",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      AbuseReason::Offensive => "Offensive language",
      AbuseReason::Spam => "Spam",
      AbuseReason::Irrelevant => "Irrelevant content",
      AbuseReason::Misleading => "Misleading information",
      AbuseReason::Other => "Other",
    }
  }
}

impl FromStr for AbuseReason {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    AbuseReason::ALL
      .into_iter()
      .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| format!("unknown abuse reason '{}'", s))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModerationAction {
  Approve,
  Hide,
  ReportAbusive,
  Delete,
}

/// Actions a review offers in its current state.
pub fn available_actions(review: &Review) -> Vec<ModerationAction> {
  let mut actions = Vec::with_capacity(4);
  if !review.is_approved {
    actions.push(ModerationAction::Approve);
  }
  if review.is_approved && review.is_visible {
    actions.push(ModerationAction::Hide);
  }
  actions.push(ModerationAction::ReportAbusive);
  actions.push(ModerationAction::Delete);
  actions
}
