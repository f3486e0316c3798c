// demos/storefront_console/src/commands.rs

use crate::render;
use crate::{ModerateCommands, OrderCommands, ReviewCommands};
use anyhow::{bail, Context};
use shopdesk::moderation::ModerationFilter;
use shopdesk::panels::{ModerationPanel, NavigationIntent, OrderPanel, ReviewPanel};
use shopdesk::{
  ApiClient, ClientConfig, HttpOrderRepository, HttpReviewRepository, OrderRepository, ReviewModerationRepository,
  ReviewRepository,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Instant;

fn confirm(question: &str) -> anyhow::Result<bool> {
  print!("{} [y/N] ", question);
  io::stdout().flush()?;
  let mut answer = String::new();
  io::stdin().lock().read_line(&mut answer)?;
  Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Loads `page`, walking there from page 1 the way the pager does.
async fn order_panel_at(
  config: &ClientConfig,
  client: &ApiClient,
  page: u32,
  intent: Option<NavigationIntent>,
) -> anyhow::Result<OrderPanel> {
  let repo: Arc<dyn OrderRepository> = Arc::new(HttpOrderRepository::new(client.clone()));
  let panel = OrderPanel::new(repo, config.orders_page_size, intent);
  panel.mount().await?;
  if page > 1 && !panel.go_to_page(page).await? {
    bail!("Page {} does not exist", page);
  }
  Ok(panel)
}

pub async fn orders(config: &ClientConfig, client: ApiClient, action: OrderCommands) -> anyhow::Result<()> {
  match action {
    OrderCommands::List { page } => {
      let panel = order_panel_at(config, &client, page, None).await?;
      render::order_table(&panel.rows(), &panel.snapshot().pagination);
    }
    OrderCommands::Show { order_id, page } => {
      let panel = order_panel_at(config, &client, page, None).await?;
      panel.open_detail(&order_id)?;
      let state = panel.snapshot();
      if let (Some(order), Some(row)) = (state.detail.as_ref(), panel.detail_row()) {
        render::order_detail(order, &row);
      }
    }
    OrderCommands::Cancel { order_id, page, yes } => {
      let panel = order_panel_at(config, &client, page, None).await?;
      if panel.request_cancel(&order_id).is_err() {
        render::banner(panel.snapshot().banner.as_ref());
        return Ok(());
      }
      if !yes && !confirm(&format!("Cancel order {}?", order_id))? {
        panel.dismiss_cancel();
        println!("Kept order {}.", order_id);
        return Ok(());
      }
      match panel.confirm_cancel().await {
        Ok(()) => {
          println!("Order {} cancelled.", order_id);
          render::order_table(&panel.rows(), &panel.snapshot().pagination);
        }
        Err(_) => render::banner(panel.snapshot().banner.as_ref()),
      }
    }
  }
  Ok(())
}

async fn review_panel_for(
  config: &ClientConfig,
  client: &ApiClient,
  order_id: &str,
  page: u32,
) -> anyhow::Result<(OrderPanel, ReviewPanel)> {
  let orders = order_panel_at(config, client, 1, Some(NavigationIntent::review_order(order_id))).await?;
  if page > 1 && !orders.go_to_page(page).await? {
    bail!("Page {} does not exist", page);
  }
  let order = match orders.snapshot().review_target {
    Some(order) => order,
    None => {
      orders.open_detail(order_id).context("Order not found on that page")?;
      orders.open_review_from_detail()?;
      orders
        .snapshot()
        .review_target
        .context("Order cannot be reviewed")?
    }
  };

  let repo: Arc<dyn ReviewRepository> = Arc::new(HttpReviewRepository::new(client.clone()));
  let reviewed: Vec<String> = repo
    .my_reviews()
    .await?
    .into_iter()
    .filter(|r| r.order.as_deref() == Some(order_id))
    .map(|r| r.product.id().to_string())
    .collect();
  let panel = ReviewPanel::new(order, reviewed, repo, config.toast_ttl).on_submitted(|receipt| {
    tracing::info!(product_id = %receipt.product_id, "Parent notified of submitted review.");
  });
  Ok((orders, panel))
}

pub async fn review(config: &ClientConfig, client: ApiClient, action: ReviewCommands) -> anyhow::Result<()> {
  match action {
    ReviewCommands::Pending { order, page } => {
      let (_, panel) = review_panel_for(config, &client, &order, page).await?;
      match panel.empty_state() {
        Some(state) => render::review_empty_state(state),
        None => render::pending_items(&panel.pending_items()),
      }
    }
    ReviewCommands::Submit {
      order,
      product,
      rating,
      comment,
      page,
    } => {
      let (orders, panel) = review_panel_for(config, &client, &order, page).await?;
      panel.expand(&product)?;
      panel.set_rating(&product, rating)?;
      panel.set_comment(&product, comment)?;
      match panel.submit(&product).await {
        Ok(receipt) => {
          render::receipt(&receipt);
          orders.mark_review_submitted().await?;
        }
        Err(_) => render::toasts(&panel.visible_toasts(Instant::now())),
      }
    }
  }
  Ok(())
}

pub async fn moderate(
  config: &ClientConfig,
  client: ApiClient,
  filter: ModerationFilter,
  page: u32,
  action: ModerateCommands,
) -> anyhow::Result<()> {
  let repo: Arc<dyn ReviewModerationRepository> = Arc::new(HttpReviewRepository::new(client));
  let panel = ModerationPanel::new(repo, config.reviews_page_size, config.toast_ttl);
  panel.mount().await?;
  if filter != ModerationFilter::All {
    panel.set_filter(filter).await?;
  }
  if page > 1 && !panel.go_to_page(page).await? {
    bail!("Page {} does not exist", page);
  }

  let outcome = match action {
    ModerateCommands::List => {
      render::moderation_table(&panel.rows(), &panel.snapshot().pagination);
      return Ok(());
    }
    ModerateCommands::Analytics => {
      render::analytics(&panel.snapshot().analytics);
      return Ok(());
    }
    ModerateCommands::Approve { review_id } => panel.approve(&review_id).await,
    ModerateCommands::Hide { review_id, reason } => panel.hide(&review_id, &reason).await,
    ModerateCommands::Abusive { review_id, reason } => {
      panel.open_abuse_dialog(&review_id)?;
      panel.select_abuse_reason(reason)?;
      panel.confirm_abuse().await
    }
    ModerateCommands::Delete { review_id, yes } => {
      panel.request_delete(&review_id)?;
      if !yes && !confirm(&format!("Delete review {} permanently?", review_id))? {
        panel.cancel_delete();
        return Ok(());
      }
      panel.confirm_delete().await
    }
  };

  render::toasts(&panel.visible_toasts(Instant::now()));
  if outcome.is_ok() {
    render::moderation_table(&panel.rows(), &panel.snapshot().pagination);
    render::analytics(&panel.snapshot().analytics);
  }
  Ok(())
}
