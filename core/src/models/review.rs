// shopdesk/src/models/review.rs

use super::order_item::ProductRef;
use super::pagination::Pagination;
use crate::moderation::ModerationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who wrote a review: a populated user or just the user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReviewerRef {
  Populated {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    #[serde(default)]
    name: Option<String>,
  },
  Id(String),
}

impl ReviewerRef {
  pub fn display_name(&self) -> &str {
    match self {
      ReviewerRef::Populated { name: Some(name), .. } => name.as_str(),
      ReviewerRef::Populated { id, .. } | ReviewerRef::Id(id) => id.as_str(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
  #[serde(rename = "_id", alias = "id")]
  pub id: String,
  pub product: ProductRef,
  #[serde(default)]
  pub order: Option<String>,
  #[serde(default)]
  pub item_id: Option<String>,
  #[serde(default)]
  pub user: Option<ReviewerRef>,
  pub rating: u8,
  #[serde(default)]
  pub comment: Option<String>,
  #[serde(default)]
  pub is_approved: bool,
  #[serde(default = "visible_by_default")]
  pub is_visible: bool,
  #[serde(default)]
  pub is_abusive: bool,
  #[serde(default)]
  pub abuse_reason: Option<String>,
  #[serde(default)]
  pub hide_reason: Option<String>,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
}

fn visible_by_default() -> bool {
  true
}

impl Review {
  pub fn moderation_status(&self) -> ModerationStatus {
    ModerationStatus::from_flags(self.is_abusive, self.is_visible, self.is_approved)
  }
}

/// Body of `POST /reviews`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
  pub product: String,
  pub order: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub item_id: Option<String>,
  pub rating: u8,
  pub comment: String,
}

/// Body of `PUT /reviews/{id}`; absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewUpdate {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub rating: Option<u8>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewsPage {
  #[serde(default)]
  pub reviews: Vec<Review>,
  #[serde(default)]
  pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAnalytics {
  #[serde(default)]
  pub total_reviews: u64,
  #[serde(default)]
  pub approved_reviews: u64,
  #[serde(default)]
  pub pending_reviews: u64,
  #[serde(default)]
  pub avg_rating: f64,
}
