// demos/storefront_console/src/main.rs

//! Terminal front end for the shopdesk panels.
//!
//! Usage:
//!   storefront orders list [--page N]
//!   storefront orders cancel <ORDER_ID> [--yes]
//!   storefront review submit --order <ID> --product <ID> --rating <1-5>
//!   storefront moderate list [--filter hidden]
//!   storefront moderate approve <REVIEW_ID>

mod commands;
mod render;

use clap::{Parser, Subcommand};
use shopdesk::moderation::{AbuseReason, ModerationFilter};
use shopdesk::{ApiClient, AuthContext, ClientConfig};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Order, review and moderation panels against a shop API")]
#[command(version)]
struct Cli {
  /// Overrides SHOPDESK_API_URL
  #[arg(long)]
  api_url: Option<String>,

  /// Overrides SHOPDESK_AUTH_TOKEN
  #[arg(long)]
  token: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// The customer's orders
  Orders {
    #[command(subcommand)]
    action: OrderCommands,
  },

  /// Review a delivered order
  Review {
    #[command(subcommand)]
    action: ReviewCommands,
  },

  /// Admin review moderation
  Moderate {
    /// Server-side status filter
    #[arg(short, long, default_value = "all")]
    filter: ModerationFilter,
    /// Page of the filtered list to act on
    #[arg(short, long, default_value = "1")]
    page: u32,
    #[command(subcommand)]
    action: ModerateCommands,
  },
}

#[derive(Subcommand)]
pub enum OrderCommands {
  /// List one page of orders
  List {
    #[arg(short, long, default_value = "1")]
    page: u32,
  },
  /// Show one order with its items
  Show {
    order_id: String,
    #[arg(short, long, default_value = "1")]
    page: u32,
  },
  /// Cancel a pending order
  Cancel {
    order_id: String,
    #[arg(short, long, default_value = "1")]
    page: u32,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
  },
}

#[derive(Subcommand)]
pub enum ReviewCommands {
  /// Products of an order that still need a review
  Pending {
    #[arg(short, long)]
    order: String,
    #[arg(short, long, default_value = "1")]
    page: u32,
  },
  /// Submit a review for one product of a delivered order
  Submit {
    #[arg(short, long)]
    order: String,
    #[arg(long)]
    product: String,
    #[arg(short, long)]
    rating: u8,
    #[arg(short, long, default_value = "")]
    comment: String,
    #[arg(short, long, default_value = "1")]
    page: u32,
  },
}

#[derive(Subcommand)]
pub enum ModerateCommands {
  /// List reviews with their moderation status
  List,
  /// Show review analytics
  Analytics,
  Approve {
    review_id: String,
  },
  Hide {
    review_id: String,
    #[arg(short, long, default_value = "")]
    reason: String,
  },
  /// Report a review as abusive
  Abusive {
    review_id: String,
    #[arg(short, long)]
    reason: AbuseReason,
  },
  Delete {
    review_id: String,
    #[arg(short, long)]
    yes: bool,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let mut config = match &cli.api_url {
    Some(url) => ClientConfig::new(url.trim_end_matches('/')),
    None => ClientConfig::from_env()?,
  };
  if let Some(token) = &cli.token {
    config = config.with_auth_token(token.clone());
  }

  let auth = match &config.auth_token {
    Some(token) => AuthContext::with_token(token.clone()),
    None => AuthContext::anonymous(),
  };
  let client = ApiClient::new(&config, auth)?;
  tracing::info!(api = %config.api_base_url, "Storefront console ready.");

  match cli.command {
    Commands::Orders { action } => commands::orders(&config, client, action).await,
    Commands::Review { action } => commands::review(&config, client, action).await,
    Commands::Moderate { filter, page, action } => commands::moderate(&config, client, filter, page, action).await,
  }
}
