// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different slice of these helpers

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use shopdesk::api::{OrderRepository, ReviewModerationRepository, ReviewRepository};
use shopdesk::models::{
  NewReview, Order, OrderItem, OrdersPage, Pagination, ProductRef, ProductSummary, Review, ReviewAnalytics,
  ReviewUpdate, ReviewsPage,
};
use shopdesk::moderation::{AbuseReason, ModerationFilter, ModerationStatus};
use shopdesk::{ShopdeskError, ShopdeskResult};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tracing::Level;

// --- Tracing ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Fixtures ---
pub fn order(id: &str, status: &str) -> Order {
  Order {
    id: id.to_string(),
    order_number: Some(format!("#{}", id.to_uppercase())),
    status: Some(status.to_string()),
    cancellation_reason: None,
    is_paid: true,
    payment_method: Some("card".to_string()),
    items_price: 40.0,
    shipping_price: 5.0,
    tax_price: 5.0,
    total_price: 50.0,
    created_at: None,
    shipping_address: None,
    order_items: vec![line_item("p-1", "Desk Lamp"), line_item("p-2", "Notebook")],
  }
}

pub fn line_item(product_id: &str, name: &str) -> OrderItem {
  OrderItem {
    id: Some(format!("item-{}", product_id)),
    product: ProductRef::Populated(ProductSummary {
      id: product_id.to_string(),
      name: Some(name.to_string()),
      image: Some(format!("/img/{}.png", product_id)),
    }),
    name: name.to_string(),
    image: None,
    price: 20.0,
    qty: 1,
  }
}

pub fn review(id: &str, is_approved: bool, is_visible: bool, is_abusive: bool) -> Review {
  Review {
    id: id.to_string(),
    product: ProductRef::Id(format!("prod-{}", id)),
    order: Some("o-1".to_string()),
    item_id: None,
    user: None,
    rating: 4,
    comment: Some("Solid".to_string()),
    is_approved,
    is_visible,
    is_abusive,
    abuse_reason: None,
    hide_reason: None,
    created_at: None,
  }
}

fn paginate<T: Clone>(items: &[T], page: u32, limit: u32) -> (Vec<T>, Pagination) {
  let limit = limit.max(1) as usize;
  let total = items.len();
  let pages = total.div_ceil(limit) as u32;
  let start = (page.saturating_sub(1) as usize) * limit;
  let slice = items.iter().skip(start).take(limit).cloned().collect();
  (
    slice,
    Pagination {
      page,
      pages,
      total: total as u64,
    },
  )
}

// --- Fake backend ---

/// In-memory stand-in for the shop API. Implements every repository trait,
/// records each call and can be told to fail or delay specific operations.
#[derive(Default)]
pub struct FakeBackend {
  pub orders: Mutex<Vec<Order>>,
  pub reviews: Mutex<Vec<Review>>,
  pub created: Mutex<Vec<NewReview>>,
  calls: Mutex<Vec<String>>,
  failures: Mutex<HashMap<&'static str, (u16, String)>>,
  delays: Mutex<HashMap<&'static str, VecDeque<Duration>>>,
  next_review_id: Mutex<u32>,
}

impl FakeBackend {
  pub fn with_orders(orders: Vec<Order>) -> Self {
    let backend = Self::default();
    *backend.orders.lock() = orders;
    backend
  }

  pub fn with_reviews(reviews: Vec<Review>) -> Self {
    let backend = Self::default();
    *backend.reviews.lock() = reviews;
    backend
  }

  /// Makes every call to `op` fail with an API error until cleared.
  pub fn fail(&self, op: &'static str, status: u16, message: &str) {
    self.failures.lock().insert(op, (status, message.to_string()));
  }

  pub fn clear_failure(&self, op: &'static str) {
    self.failures.lock().remove(op);
  }

  /// Queues a delay for the next call to `op`.
  pub fn delay_next(&self, op: &'static str, delay: Duration) {
    self.delays.lock().entry(op).or_default().push_back(delay);
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().clone()
  }

  pub fn count(&self, prefix: &str) -> usize {
    self.calls.lock().iter().filter(|c| c.starts_with(prefix)).count()
  }

  async fn enter(&self, op: &'static str, call: String) -> ShopdeskResult<()> {
    self.calls.lock().push(call);
    let delay = self.delays.lock().get_mut(op).and_then(VecDeque::pop_front);
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    let failure = self.failures.lock().get(op).cloned();
    match failure {
      Some((status, message)) => Err(ShopdeskError::api(status, message)),
      None => Ok(()),
    }
  }

  fn review_mut(&self, review_id: &str, edit: impl FnOnce(&mut Review)) -> ShopdeskResult<()> {
    let mut reviews = self.reviews.lock();
    let review = reviews
      .iter_mut()
      .find(|r| r.id == review_id)
      .ok_or_else(|| ShopdeskError::api(404, "Review not found"))?;
    edit(review);
    Ok(())
  }
}

#[async_trait]
impl OrderRepository for FakeBackend {
  async fn list_orders(&self, page: u32, page_size: u32) -> ShopdeskResult<OrdersPage> {
    self.enter("list_orders", format!("list_orders({},{})", page, page_size)).await?;
    let (orders, pagination) = paginate(self.orders.lock().as_slice(), page, page_size);
    Ok(OrdersPage { orders, pagination })
  }

  async fn cancel_order(&self, order_id: &str) -> ShopdeskResult<()> {
    self.enter("cancel_order", format!("cancel_order({})", order_id)).await?;
    let mut orders = self.orders.lock();
    let order = orders
      .iter_mut()
      .find(|o| o.id == order_id)
      .ok_or_else(|| ShopdeskError::api(404, "Order not found"))?;
    order.status = Some("cancelled".to_string());
    order.cancellation_reason = Some("Cancelled by customer".to_string());
    Ok(())
  }
}

#[async_trait]
impl ReviewRepository for FakeBackend {
  async fn product_reviews(&self, product_id: &str) -> ShopdeskResult<Vec<Review>> {
    self.enter("product_reviews", format!("product_reviews({})", product_id)).await?;
    let reviews = self.reviews.lock();
    Ok(reviews.iter().filter(|r| r.product.id() == product_id).cloned().collect())
  }

  async fn my_reviews(&self) -> ShopdeskResult<Vec<Review>> {
    self.enter("my_reviews", "my_reviews()".to_string()).await?;
    Ok(self.reviews.lock().clone())
  }

  async fn create_review(&self, review: NewReview) -> ShopdeskResult<Review> {
    self
      .enter("create_review", format!("create_review({},{})", review.product, review.rating))
      .await?;
    let id = {
      let mut next = self.next_review_id.lock();
      *next += 1;
      format!("rev-{}", *next)
    };
    let created = Review {
      id,
      product: ProductRef::Id(review.product.clone()),
      order: Some(review.order.clone()),
      item_id: review.item_id.clone(),
      user: None,
      rating: review.rating,
      comment: Some(review.comment.clone()),
      is_approved: false,
      is_visible: true,
      is_abusive: false,
      abuse_reason: None,
      hide_reason: None,
      created_at: None,
    };
    self.created.lock().push(review);
    self.reviews.lock().push(created.clone());
    Ok(created)
  }

  async fn update_review(&self, review_id: &str, update: ReviewUpdate) -> ShopdeskResult<Review> {
    self.enter("update_review", format!("update_review({})", review_id)).await?;
    self.review_mut(review_id, |r| {
      if let Some(rating) = update.rating {
        r.rating = rating;
      }
      if let Some(comment) = update.comment {
        r.comment = Some(comment);
      }
    })?;
    let reviews = self.reviews.lock();
    reviews
      .iter()
      .find(|r| r.id == review_id)
      .cloned()
      .ok_or_else(|| ShopdeskError::api(404, "Review not found"))
  }

  async fn delete_review(&self, review_id: &str) -> ShopdeskResult<()> {
    self.enter("delete_review", format!("delete_review({})", review_id)).await?;
    self.reviews.lock().retain(|r| r.id != review_id);
    Ok(())
  }
}

/// Server-side filtering as the backend applies it.
fn filter_matches(filter: ModerationFilter, status: ModerationStatus) -> bool {
  match filter {
    ModerationFilter::All => true,
    ModerationFilter::Pending => status == ModerationStatus::Pending,
    ModerationFilter::Approved => status == ModerationStatus::Approved,
    ModerationFilter::Hidden => status == ModerationStatus::Hidden,
    ModerationFilter::Abusive => status == ModerationStatus::Abusive,
  }
}

#[async_trait]
impl ReviewModerationRepository for FakeBackend {
  async fn list_reviews(&self, page: u32, limit: u32, filter: ModerationFilter) -> ShopdeskResult<ReviewsPage> {
    self
      .enter("list_reviews", format!("list_reviews({},{},{})", page, limit, filter.as_str()))
      .await?;
    let matching: Vec<Review> = self
      .reviews
      .lock()
      .iter()
      .filter(|r| filter_matches(filter, r.moderation_status()))
      .cloned()
      .collect();
    let (reviews, pagination) = paginate(&matching, page, limit);
    Ok(ReviewsPage { reviews, pagination })
  }

  async fn approve_review(&self, review_id: &str) -> ShopdeskResult<()> {
    self.enter("approve_review", format!("approve_review({})", review_id)).await?;
    self.review_mut(review_id, |r| r.is_approved = true)
  }

  async fn hide_review(&self, review_id: &str, reason: &str) -> ShopdeskResult<()> {
    self.enter("hide_review", format!("hide_review({},{})", review_id, reason)).await?;
    self.review_mut(review_id, |r| {
      r.is_visible = false;
      r.hide_reason = Some(reason.to_string());
    })
  }

  async fn mark_abusive(&self, review_id: &str, reason: AbuseReason) -> ShopdeskResult<()> {
    self
      .enter("mark_abusive", format!("mark_abusive({},{})", review_id, reason.as_str()))
      .await?;
    self.review_mut(review_id, |r| {
      r.is_abusive = true;
      r.abuse_reason = Some(reason.as_str().to_string());
    })
  }

  async fn delete_review(&self, review_id: &str) -> ShopdeskResult<()> {
    self.enter("admin_delete", format!("admin_delete({})", review_id)).await?;
    self.reviews.lock().retain(|r| r.id != review_id);
    Ok(())
  }

  async fn analytics(&self) -> ShopdeskResult<ReviewAnalytics> {
    self.enter("analytics", "analytics()".to_string()).await?;
    let reviews = self.reviews.lock();
    let total = reviews.len() as u64;
    let approved = reviews.iter().filter(|r| r.is_approved).count() as u64;
    let rating_sum: u64 = reviews.iter().map(|r| u64::from(r.rating)).sum();
    Ok(ReviewAnalytics {
      total_reviews: total,
      approved_reviews: approved,
      pending_reviews: total - approved,
      avg_rating: if total == 0 { 0.0 } else { rating_sum as f64 / total as f64 },
    })
  }
}
