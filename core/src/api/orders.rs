// shopdesk/src/api/orders.rs

use super::client::ApiClient;
use crate::error::ShopdeskResult;
use crate::models::OrdersPage;
use async_trait::async_trait;
use reqwest::Method;
use tracing::{info, instrument};

/// Customer order endpoints. The backend decides whether a cancellation is
/// allowed; callers may pre-check with `status::can_cancel` but must surface
/// a rejection from here verbatim.
#[async_trait]
pub trait OrderRepository: Send + Sync {
  async fn list_orders(&self, page: u32, page_size: u32) -> ShopdeskResult<OrdersPage>;

  async fn cancel_order(&self, order_id: &str) -> ShopdeskResult<()>;
}

#[derive(Clone, Debug)]
pub struct HttpOrderRepository {
  client: ApiClient,
}

impl HttpOrderRepository {
  pub fn new(client: ApiClient) -> Self {
    Self { client }
  }
}

#[async_trait]
impl OrderRepository for HttpOrderRepository {
  #[instrument(name = "orders::list", skip(self), err(Display))]
  async fn list_orders(&self, page: u32, page_size: u32) -> ShopdeskResult<OrdersPage> {
    let page_data: OrdersPage = self
      .client
      .get_json(&["orders", "mine"], &[("page", page.to_string()), ("limit", page_size.to_string())])
      .await?;
    info!(
      returned = page_data.orders.len(),
      pages = page_data.pagination.pages,
      "Fetched order page."
    );
    Ok(page_data)
  }

  #[instrument(name = "orders::cancel", skip(self), err(Display))]
  async fn cancel_order(&self, order_id: &str) -> ShopdeskResult<()> {
    self
      .client
      .send_ack::<()>(Method::PUT, &["orders", order_id, "cancel"], None)
      .await?;
    info!("Cancellation accepted by the backend.");
    Ok(())
  }
}
