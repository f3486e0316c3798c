// shopdesk/src/config.rs

use crate::error::{ShopdeskError, ShopdeskResult};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Base URL every API path is appended to, e.g. `https://shop.example/api`.
  pub api_base_url: String,
  pub auth_token: Option<String>,
  pub request_timeout: Duration,
  pub orders_page_size: u32,
  pub reviews_page_size: u32,
  /// How long a transient toast stays visible.
  pub toast_ttl: Duration,
}

impl ClientConfig {
  pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
  pub const DEFAULT_PAGE_SIZE: u32 = 10;
  pub const DEFAULT_TOAST_TTL_MS: u64 = 3000;

  pub fn new(api_base_url: impl Into<String>) -> Self {
    Self {
      api_base_url: api_base_url.into(),
      auth_token: None,
      request_timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
      orders_page_size: Self::DEFAULT_PAGE_SIZE,
      reviews_page_size: Self::DEFAULT_PAGE_SIZE,
      toast_ttl: Duration::from_millis(Self::DEFAULT_TOAST_TTL_MS),
    }
  }

  pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
    self.auth_token = Some(token.into());
    self
  }

  pub fn from_env() -> ShopdeskResult<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; `from_env` passes the process environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ShopdeskResult<Self> {
    let api_base_url = lookup("SHOPDESK_API_URL")
      .filter(|v| !v.trim().is_empty())
      .ok_or_else(|| ShopdeskError::Config("Missing environment variable 'SHOPDESK_API_URL'".to_string()))?;

    let parse_u64 = |name: &str, default: u64| -> ShopdeskResult<u64> {
      match lookup(name) {
        Some(raw) => raw
          .trim()
          .parse::<u64>()
          .map_err(|e| ShopdeskError::Config(format!("Invalid {}: {}", name, e))),
        None => Ok(default),
      }
    };
    let parse_page_size = |name: &str| -> ShopdeskResult<u32> {
      let size = parse_u64(name, u64::from(Self::DEFAULT_PAGE_SIZE))?;
      u32::try_from(size)
        .ok()
        .filter(|s| *s > 0)
        .ok_or_else(|| ShopdeskError::Config(format!("Invalid {}: must be between 1 and {}", name, u32::MAX)))
    };

    let config = Self {
      api_base_url: api_base_url.trim_end_matches('/').to_string(),
      auth_token: lookup("SHOPDESK_AUTH_TOKEN").filter(|t| !t.is_empty()),
      request_timeout: Duration::from_secs(parse_u64("SHOPDESK_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?),
      orders_page_size: parse_page_size("SHOPDESK_ORDERS_PAGE_SIZE")?,
      reviews_page_size: parse_page_size("SHOPDESK_REVIEWS_PAGE_SIZE")?,
      toast_ttl: Duration::from_millis(parse_u64("SHOPDESK_TOAST_TTL_MS", Self::DEFAULT_TOAST_TTL_MS)?),
    };

    tracing::info!(api_base_url = %config.api_base_url, "Client configuration loaded.");
    Ok(config)
  }
}
