// shopdesk/src/models/order.rs

use super::order_item::OrderItem;
use super::pagination::Pagination;
use crate::status::{self, CustomerStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
  #[serde(default)]
  pub address: Option<String>,
  #[serde(default)]
  pub city: Option<String>,
  #[serde(default)]
  pub postal_code: Option<String>,
  #[serde(default)]
  pub country: Option<String>,
}

impl ShippingAddress {
  pub fn one_line(&self) -> String {
    [&self.address, &self.city, &self.postal_code, &self.country]
      .into_iter()
      .filter_map(|part| part.as_deref())
      .filter(|part| !part.is_empty())
      .collect::<Vec<_>>()
      .join(", ")
  }
}

/// An order as returned by `/orders/mine`.
///
/// `total_price` is taken from the backend as-is; the client never recomputes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  #[serde(rename = "_id", alias = "id")]
  pub id: String,
  #[serde(default)]
  pub order_number: Option<String>,
  /// Raw backend status, e.g. `approved` or `declined`.
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub cancellation_reason: Option<String>,
  #[serde(default)]
  pub is_paid: bool,
  #[serde(default)]
  pub payment_method: Option<String>,
  #[serde(default)]
  pub items_price: f64,
  #[serde(default)]
  pub shipping_price: f64,
  #[serde(default)]
  pub tax_price: f64,
  #[serde(default)]
  pub total_price: f64,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub shipping_address: Option<ShippingAddress>,
  #[serde(default)]
  pub order_items: Vec<OrderItem>,
}

impl Order {
  pub fn customer_status(&self) -> CustomerStatus {
    status::map_order_status(self.status.as_deref())
  }

  pub fn can_cancel(&self) -> bool {
    status::can_cancel(self.status.as_deref())
  }

  pub fn display_number(&self) -> &str {
    self.order_number.as_deref().unwrap_or(&self.id)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrdersPage {
  #[serde(default)]
  pub orders: Vec<Order>,
  #[serde(default)]
  pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::ProductRef;

  #[test]
  fn decodes_backend_order_with_populated_and_bare_products() {
    let body = r#"{
      "orders": [{
        "_id": "o-1",
        "orderNumber": "ORD-1001",
        "status": "Approved",
        "isPaid": true,
        "paymentMethod": "card",
        "itemsPrice": 40.0,
        "shippingPrice": 5.0,
        "taxPrice": 5.0,
        "totalPrice": 50.0,
        "createdAt": "2026-03-01T10:00:00Z",
        "shippingAddress": {"address": "1 Main St", "city": "Springfield", "postalCode": "12345", "country": "US"},
        "orderItems": [
          {"_id": "i-1", "product": {"_id": "p-1", "name": "Kettle"}, "name": "Kettle", "price": 20.0, "qty": 1},
          {"product": "p-2", "name": "Mug", "price": 10.0, "qty": 2}
        ]
      }],
      "pagination": {"page": 1, "pages": 3, "total": 21}
    }"#;

    let page: OrdersPage = serde_json::from_str(body).unwrap();
    let order = &page.orders[0];
    assert_eq!(order.display_number(), "ORD-1001");
    assert_eq!(order.customer_status(), CustomerStatus::Delivered);
    assert_eq!(order.order_items[0].product_id(), "p-1");
    assert_eq!(order.order_items[1].product, ProductRef::Id("p-2".into()));
    assert_eq!(order.order_items[1].line_total(), 20.0);
    assert_eq!(
      order.shipping_address.as_ref().unwrap().one_line(),
      "1 Main St, Springfield, 12345, US"
    );
    assert_eq!(page.pagination.pages, 3);
  }

  #[test]
  fn missing_status_reads_as_pending_and_cancellable() {
    let order: Order = serde_json::from_str(r#"{"_id": "o-2"}"#).unwrap();
    assert_eq!(order.customer_status(), CustomerStatus::Pending);
    assert!(order.can_cancel());
    assert_eq!(order.display_number(), "o-2");
  }
}
