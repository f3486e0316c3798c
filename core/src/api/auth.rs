// shopdesk/src/api/auth.rs

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Bearer credentials handed to the repository clients.
///
/// Whoever owns the session (login screen, CLI flag, embedding app) puts the
/// token here; clients read it per request, so a refreshed token is picked up
/// without rebuilding them.
#[derive(Clone, Default)]
pub struct AuthContext {
  token: Arc<RwLock<Option<String>>>,
}

impl AuthContext {
  pub fn anonymous() -> Self {
    Self::default()
  }

  pub fn with_token(token: impl Into<String>) -> Self {
    let ctx = Self::default();
    ctx.set_token(token);
    ctx
  }

  pub fn set_token(&self, token: impl Into<String>) {
    *self.token.write() = Some(token.into());
  }

  pub fn clear(&self) {
    *self.token.write() = None;
  }

  pub fn bearer_token(&self) -> Option<String> {
    self.token.read().clone()
  }

  pub fn is_authenticated(&self) -> bool {
    self.token.read().is_some()
  }
}

impl fmt::Debug for AuthContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AuthContext")
      .field("token", &self.token.read().as_ref().map(|_| "[REDACTED]"))
      .finish()
  }
}
