// shopdesk/src/panels/notice.rs

use crate::error::{ErrorKind, ShopdeskError};
use std::time::{Duration, Instant};

/// Page-level error shown above a list until the next successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
  pub kind: ErrorKind,
  pub message: String,
}

impl From<&ShopdeskError> for Banner {
  fn from(err: &ShopdeskError) -> Self {
    Banner {
      kind: err.kind(),
      message: err.user_message(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
  Success,
  Error,
}

/// Transient, action-level notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
  pub level: ToastLevel,
  pub message: String,
  pub raised_at: Instant,
  pub ttl: Duration,
}

impl Toast {
  pub fn is_visible_at(&self, now: Instant) -> bool {
    now.saturating_duration_since(self.raised_at) < self.ttl
  }
}

#[derive(Debug, Clone)]
pub struct ToastQueue {
  ttl: Duration,
  toasts: Vec<Toast>,
}

impl ToastQueue {
  pub fn new(ttl: Duration) -> Self {
    Self { ttl, toasts: Vec::new() }
  }

  pub fn success(&mut self, message: impl Into<String>) {
    self.push(ToastLevel::Success, message.into());
  }

  pub fn error(&mut self, message: impl Into<String>) {
    self.push(ToastLevel::Error, message.into());
  }

  fn push(&mut self, level: ToastLevel, message: String) {
    self.push_at(level, message, Instant::now());
  }

  /// Expired toasts are dropped on every push, so the queue only ever holds
  /// what raised within the last `ttl`.
  fn push_at(&mut self, level: ToastLevel, message: String, now: Instant) {
    self.prune(now);
    self.toasts.push(Toast {
      level,
      message,
      raised_at: now,
      ttl: self.ttl,
    });
  }

  pub fn visible(&self, now: Instant) -> Vec<&Toast> {
    self.toasts.iter().filter(|t| t.is_visible_at(now)).collect()
  }

  /// Drops toasts whose display time is over.
  pub fn prune(&mut self, now: Instant) {
    self.toasts.retain(|t| t.is_visible_at(now));
  }

  pub fn latest(&self) -> Option<&Toast> {
    self.toasts.last()
  }

  pub fn len(&self) -> usize {
    self.toasts.len()
  }

  pub fn is_empty(&self) -> bool {
    self.toasts.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn toasts_disappear_after_their_ttl() {
    let mut queue = ToastQueue::new(Duration::from_secs(3));
    queue.error("Please select a rating");
    let raised = queue.latest().unwrap().raised_at;

    assert_eq!(queue.visible(raised + Duration::from_millis(2999)).len(), 1);
    assert!(queue.visible(raised + Duration::from_secs(3)).is_empty());

    queue.prune(raised + Duration::from_secs(4));
    assert!(queue.is_empty());
  }

  #[test]
  fn pushing_drops_expired_toasts() {
    let mut queue = ToastQueue::new(Duration::from_secs(3));
    let start = Instant::now();
    for i in 0..50 {
      queue.push_at(ToastLevel::Success, format!("Review {} approved", i), start);
    }
    assert_eq!(queue.len(), 50);

    queue.push_at(ToastLevel::Error, "Review not found".to_string(), start + Duration::from_secs(5));
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.latest().unwrap().message, "Review not found");

    queue.push_at(ToastLevel::Success, "Review hidden".to_string(), start + Duration::from_secs(6));
    assert_eq!(queue.len(), 2);
  }
}
