// shopdesk/src/models/order_item.rs

use serde::{Deserialize, Serialize};

/// A product as the backend populates it inside orders and reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
  #[serde(rename = "_id", alias = "id")]
  pub id: String,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub image: Option<String>,
}

/// Either a bare product id or a populated product object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
  Populated(ProductSummary),
  Id(String),
}

impl ProductRef {
  pub fn id(&self) -> &str {
    match self {
      ProductRef::Populated(product) => &product.id,
      ProductRef::Id(id) => id,
    }
  }

  pub fn name(&self) -> Option<&str> {
    match self {
      ProductRef::Populated(product) => product.name.as_deref(),
      ProductRef::Id(_) => None,
    }
  }
}

/// One ordered line. `name` and `image` are snapshots taken at checkout
/// and may no longer match the live product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  #[serde(rename = "_id", alias = "id", default)]
  pub id: Option<String>,
  pub product: ProductRef,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub price: f64,
  #[serde(alias = "quantity", default)]
  pub qty: u32,
}

impl OrderItem {
  pub fn product_id(&self) -> &str {
    self.product.id()
  }

  /// Snapshot name, falling back to the populated product name.
  pub fn display_name(&self) -> &str {
    if !self.name.is_empty() {
      return &self.name;
    }
    self.product.name().unwrap_or("Unnamed product")
  }

  pub fn line_total(&self) -> f64 {
    self.price * f64::from(self.qty)
  }
}
