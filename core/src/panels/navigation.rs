// shopdesk/src/panels/navigation.rs

/// What the previous screen asked the order panel to do once its orders
/// have loaded. Passed explicitly to `OrderPanel::new` and consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationIntent {
  /// Open the review flow for this order if it is delivered.
  ReviewOrder { order_id: String },
}

impl NavigationIntent {
  pub fn review_order(order_id: impl Into<String>) -> Self {
    NavigationIntent::ReviewOrder {
      order_id: order_id.into(),
    }
  }
}
