// shopdesk/src/error.rs

use crate::flow::FlowError;
use thiserror::Error;

/// Fallback text when the backend rejects a call without a `message`.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection and try again.";

#[derive(Debug, Error)]
pub enum ShopdeskError {
  /// Transport-level failure: DNS, TLS, refused connection, timeout.
  #[error("Network failure: {0}")]
  Network(String),

  /// Non-2xx response, or an admin envelope with `success: false`.
  #[error("API error ({status}): {message}")]
  Api { status: u16, message: String },

  /// Client-side guard rejected the action before any call was made.
  #[error("Validation error: {0}")]
  Validation(String),

  #[error("Malformed response: {0}")]
  Decode(String),

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Flow error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal error: {0}")]
  Internal(String),
}

/// The taxonomy panels render errors by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NetworkFailure,
  ApiError,
  ValidationError,
  Internal,
}

impl ShopdeskError {
  pub fn validation(message: impl Into<String>) -> Self {
    ShopdeskError::Validation(message.into())
  }

  pub fn api(status: u16, message: impl Into<String>) -> Self {
    ShopdeskError::Api {
      status,
      message: message.into(),
    }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      ShopdeskError::Network(_) => ErrorKind::NetworkFailure,
      ShopdeskError::Api { .. } => ErrorKind::ApiError,
      ShopdeskError::Validation(_) => ErrorKind::ValidationError,
      ShopdeskError::Decode(_)
      | ShopdeskError::Config(_)
      | ShopdeskError::Workflow { .. }
      | ShopdeskError::Internal(_) => ErrorKind::Internal,
    }
  }

  /// Text for a banner or toast. Backend messages are passed through verbatim.
  pub fn user_message(&self) -> String {
    match self {
      ShopdeskError::Api { message, .. } => message.clone(),
      ShopdeskError::Validation(message) => message.clone(),
      ShopdeskError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
      _ => GENERIC_ERROR_MESSAGE.to_string(),
    }
  }
}

impl From<reqwest::Error> for ShopdeskError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      ShopdeskError::Decode(err.to_string())
    } else {
      ShopdeskError::Network(err.to_string())
    }
  }
}

impl From<serde_json::Error> for ShopdeskError {
  fn from(err: serde_json::Error) -> Self {
    ShopdeskError::Decode(err.to_string())
  }
}

impl From<anyhow::Error> for ShopdeskError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<ShopdeskError>() {
      Ok(inner) => inner,
      Err(other) => ShopdeskError::Internal(other.to_string()),
    }
  }
}

pub type ShopdeskResult<T, E = ShopdeskError> = std::result::Result<T, E>;
