// shopdesk/src/api/reviews.rs

use super::client::{ApiClient, ReasonBody};
use crate::error::{ShopdeskError, ShopdeskResult};
use crate::models::{NewReview, Review, ReviewAnalytics, ReviewUpdate, ReviewsPage};
use crate::moderation::{AbuseReason, ModerationFilter};
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use tracing::{info, instrument};

/// Customer-side review endpoints.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
  async fn product_reviews(&self, product_id: &str) -> ShopdeskResult<Vec<Review>>;

  async fn my_reviews(&self) -> ShopdeskResult<Vec<Review>>;

  async fn create_review(&self, review: NewReview) -> ShopdeskResult<Review>;

  async fn update_review(&self, review_id: &str, update: ReviewUpdate) -> ShopdeskResult<Review>;

  async fn delete_review(&self, review_id: &str) -> ShopdeskResult<()>;
}

/// Admin-side review endpoints.
#[async_trait]
pub trait ReviewModerationRepository: Send + Sync {
  async fn list_reviews(&self, page: u32, limit: u32, filter: ModerationFilter) -> ShopdeskResult<ReviewsPage>;

  async fn approve_review(&self, review_id: &str) -> ShopdeskResult<()>;

  async fn hide_review(&self, review_id: &str, reason: &str) -> ShopdeskResult<()>;

  async fn mark_abusive(&self, review_id: &str, reason: AbuseReason) -> ShopdeskResult<()>;

  async fn delete_review(&self, review_id: &str) -> ShopdeskResult<()>;

  async fn analytics(&self) -> ShopdeskResult<ReviewAnalytics>;
}

#[derive(Deserialize)]
struct ReviewList {
  #[serde(default)]
  reviews: Vec<Review>,
}

/// Create/update answer either with the review itself or with `{review: ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReviewBody {
  Wrapped { review: Review },
  Bare(Review),
}

impl From<ReviewBody> for Review {
  fn from(body: ReviewBody) -> Self {
    match body {
      ReviewBody::Wrapped { review } | ReviewBody::Bare(review) => review,
    }
  }
}

fn ensure_rating(rating: u8) -> ShopdeskResult<()> {
  if (1..=5).contains(&rating) {
    Ok(())
  } else {
    Err(ShopdeskError::validation("Rating must be between 1 and 5"))
  }
}

#[derive(Clone, Debug)]
pub struct HttpReviewRepository {
  client: ApiClient,
}

impl HttpReviewRepository {
  pub fn new(client: ApiClient) -> Self {
    Self { client }
  }
}

#[async_trait]
impl ReviewRepository for HttpReviewRepository {
  #[instrument(name = "reviews::for_product", skip(self), err(Display))]
  async fn product_reviews(&self, product_id: &str) -> ShopdeskResult<Vec<Review>> {
    let list: ReviewList = self.client.get_json(&["reviews", product_id], &[]).await?;
    Ok(list.reviews)
  }

  #[instrument(name = "reviews::mine", skip(self), err(Display))]
  async fn my_reviews(&self) -> ShopdeskResult<Vec<Review>> {
    let list: ReviewList = self.client.get_json(&["reviews", "my", "reviews"], &[]).await?;
    Ok(list.reviews)
  }

  #[instrument(
    name = "reviews::create",
    skip(self, review),
    fields(product = %review.product, order = %review.order, rating = review.rating),
    err(Display)
  )]
  async fn create_review(&self, review: NewReview) -> ShopdeskResult<Review> {
    ensure_rating(review.rating)?;
    let body: ReviewBody = self.client.send_json(Method::POST, &["reviews"], Some(&review)).await?;
    let created = Review::from(body);
    info!(review_id = %created.id, "Review created.");
    Ok(created)
  }

  #[instrument(name = "reviews::update", skip(self, update), err(Display))]
  async fn update_review(&self, review_id: &str, update: ReviewUpdate) -> ShopdeskResult<Review> {
    if let Some(rating) = update.rating {
      ensure_rating(rating)?;
    }
    let body: ReviewBody = self
      .client
      .send_json(Method::PUT, &["reviews", review_id], Some(&update))
      .await?;
    Ok(body.into())
  }

  #[instrument(name = "reviews::delete_own", skip(self), err(Display))]
  async fn delete_review(&self, review_id: &str) -> ShopdeskResult<()> {
    self
      .client
      .send_ack::<()>(Method::DELETE, &["reviews", review_id], None)
      .await
  }
}

#[async_trait]
impl ReviewModerationRepository for HttpReviewRepository {
  #[instrument(name = "reviews::admin_list", skip(self), err(Display))]
  async fn list_reviews(&self, page: u32, limit: u32, filter: ModerationFilter) -> ShopdeskResult<ReviewsPage> {
    let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
    if let Some(status) = filter.query_value() {
      query.push(("status", status.to_string()));
    }
    let page_data: ReviewsPage = self.client.get_enveloped(&["reviews", "admin", "all"], &query).await?;
    info!(returned = page_data.reviews.len(), "Fetched admin review page.");
    Ok(page_data)
  }

  #[instrument(name = "reviews::approve", skip(self), err(Display))]
  async fn approve_review(&self, review_id: &str) -> ShopdeskResult<()> {
    self
      .client
      .send_ack::<()>(Method::PUT, &["reviews", "admin", "approve", review_id], None)
      .await
  }

  #[instrument(name = "reviews::hide", skip(self), err(Display))]
  async fn hide_review(&self, review_id: &str, reason: &str) -> ShopdeskResult<()> {
    self
      .client
      .send_ack(Method::PUT, &["reviews", "admin", "hide", review_id], Some(&ReasonBody { reason }))
      .await
  }

  #[instrument(name = "reviews::mark_abusive", skip(self), err(Display))]
  async fn mark_abusive(&self, review_id: &str, reason: AbuseReason) -> ShopdeskResult<()> {
    self
      .client
      .send_ack(
        Method::PUT,
        &["reviews", "admin", "abusive", review_id],
        Some(&ReasonBody { reason: reason.as_str() }),
      )
      .await
  }

  #[instrument(name = "reviews::admin_delete", skip(self), err(Display))]
  async fn delete_review(&self, review_id: &str) -> ShopdeskResult<()> {
    self
      .client
      .send_ack::<()>(Method::DELETE, &["reviews", "admin", review_id], None)
      .await
  }

  #[instrument(name = "reviews::analytics", skip(self), err(Display))]
  async fn analytics(&self) -> ShopdeskResult<ReviewAnalytics> {
    self.client.get_enveloped(&["reviews", "admin", "analytics"], &[]).await
  }
}
