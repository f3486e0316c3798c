// demos/storefront_console/src/render.rs

//! Plain-text rendering of panel view models.

use chrono::{DateTime, Utc};
use shopdesk::models::{Order, OrderItem, Pagination};
use shopdesk::panels::{
  AnalyticsSlot, Banner, ModerationRow, OrderRow, ReviewEmptyState, SubmissionReceipt, Toast, ToastLevel,
};

pub fn format_price(amount: f64) -> String {
  format!("${:.2}", amount)
}

pub fn format_date(at: Option<DateTime<Utc>>) -> String {
  at.map(|d| d.format("%b %d, %Y").to_string()).unwrap_or_else(|| "-".to_string())
}

fn stars(rating: u8) -> String {
  let filled = usize::from(rating.min(5));
  format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn pager(pagination: &Pagination) {
  println!(
    "Page {} of {} ({} total){}{}",
    pagination.page,
    pagination.last_page(),
    pagination.total,
    if pagination.has_previous() { "  [prev]" } else { "" },
    if pagination.has_next() { "  [next]" } else { "" },
  );
}

pub fn order_table(rows: &[OrderRow], pagination: &Pagination) {
  if rows.is_empty() {
    println!("No orders yet.");
    return;
  }
  for row in rows {
    let mut actions = Vec::new();
    if row.cancel_visible {
      actions.push(if row.cancelling { "cancelling..." } else { "cancel" });
    }
    if row.review_visible {
      actions.push("review");
    }
    println!(
      "{:<14} {} {:<10} {:>10}  {:<12} {} item(s)  {}",
      row.number,
      row.badge.icon,
      row.badge.label,
      format_price(row.total_price),
      format_date(row.created_at),
      row.item_count,
      actions.join(" | ")
    );
    if let Some(reason) = &row.cancellation_reason {
      println!("{:<14} reason: {}", "", reason);
    }
  }
  pager(pagination);
}

pub fn order_detail(order: &Order, row: &OrderRow) {
  println!("Order {}  {} {} ({})", row.number, row.badge.icon, row.badge.label, row.badge.color);
  println!("Placed {}  Paid: {}", format_date(row.created_at), if order.is_paid { "yes" } else { "no" });
  if let Some(reason) = &row.cancellation_reason {
    println!("Cancellation reason: {}", reason);
  }
  if let Some(address) = &order.shipping_address {
    println!("Ship to: {}", address.one_line());
  }
  for item in &order.order_items {
    println!(
      "  {} x{} @ {} = {}",
      item.display_name(),
      item.qty,
      format_price(item.price),
      format_price(item.line_total())
    );
  }
  println!(
    "Items {}  Shipping {}  Tax {}  Total {}",
    format_price(order.items_price),
    format_price(order.shipping_price),
    format_price(order.tax_price),
    format_price(order.total_price)
  );
}

pub fn banner(banner: Option<&Banner>) {
  if let Some(banner) = banner {
    eprintln!("! {}", banner.message);
  }
}

pub fn review_empty_state(state: ReviewEmptyState) {
  match state {
    ReviewEmptyState::AllReviewed => println!("Every product in this order has been reviewed. Thank you!"),
    ReviewEmptyState::NothingToReview => println!("This order has no products to review."),
  }
}

pub fn pending_items(items: &[OrderItem]) {
  for item in items {
    println!("  {}  {}", item.product_id(), item.display_name());
  }
}

pub fn receipt(receipt: &SubmissionReceipt) {
  println!("Review submitted for {}", receipt.product_name);
  println!("  {}  {}", stars(receipt.rating), receipt.comment);
  println!("  on {}", format_date(Some(receipt.submitted_at)));
}

pub fn toasts(toasts: &[Toast]) {
  for toast in toasts {
    match toast.level {
      ToastLevel::Success => println!("✓ {}", toast.message),
      ToastLevel::Error => eprintln!("✕ {}", toast.message),
    }
  }
}

pub fn moderation_table(rows: &[ModerationRow], pagination: &Pagination) {
  if rows.is_empty() {
    println!("No reviews match this filter.");
    return;
  }
  for row in rows {
    let actions: Vec<String> = row.actions.iter().map(|a| format!("{:?}", a)).collect();
    println!(
      "{:<26} {:<9} {} {:<20} by {:<16} {}",
      row.review_id,
      row.status.label(),
      stars(row.rating),
      row.product_name,
      row.reviewer,
      actions.join(", ")
    );
    if let Some(comment) = &row.comment {
      println!("{:<26} \"{}\"", "", comment);
    }
    if let Some(reason) = row.abuse_reason.as_ref().or(row.hide_reason.as_ref()) {
      println!("{:<26} reason: {}", "", reason);
    }
  }
  pager(pagination);
}

pub fn analytics(slot: &AnalyticsSlot) {
  match slot {
    AnalyticsSlot::Loading => println!("Analytics loading..."),
    AnalyticsSlot::Unavailable => println!("Analytics unavailable."),
    AnalyticsSlot::Loaded(stats) => println!(
      "Reviews: {} total, {} approved, {} pending, average {:.1}",
      stats.total_reviews, stats.approved_reviews, stats.pending_reviews, stats.avg_rating
    ),
  }
}
