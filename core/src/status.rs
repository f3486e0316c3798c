// shopdesk/src/status.rs

//! Maps raw backend order statuses onto the five statuses shoppers see.
//!
//! This module is the only place the rewrite table lives. Panels, rows and
//! detail views all ask it for labels, badges and cancel-eligibility so the
//! list and the detail modal can never disagree.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl CustomerStatus {
  pub const ALL: [CustomerStatus; 5] = [
    CustomerStatus::Pending,
    CustomerStatus::Processing,
    CustomerStatus::Shipped,
    CustomerStatus::Delivered,
    CustomerStatus::Cancelled,
  ];

  /// Canonical lowercase name; feeding it back to `map_order_status` yields `self`.
  pub fn as_str(self) -> &'static str {
    match self {
      CustomerStatus::Pending => "pending",
      CustomerStatus::Processing => "processing",
      CustomerStatus::Shipped => "shipped",
      CustomerStatus::Delivered => "delivered",
      CustomerStatus::Cancelled => "cancelled",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      CustomerStatus::Pending => "Pending",
      CustomerStatus::Processing => "Processing",
      CustomerStatus::Shipped => "Shipped",
      CustomerStatus::Delivered => "Delivered",
      CustomerStatus::Cancelled => "Cancelled",
    }
  }

  pub fn color(self) -> &'static str {
    match self {
      CustomerStatus::Pending => "yellow",
      CustomerStatus::Processing => "blue",
      CustomerStatus::Shipped => "purple",
      CustomerStatus::Delivered => "green",
      CustomerStatus::Cancelled => "red",
    }
  }

  pub fn icon(self) -> &'static str {
    match self {
      CustomerStatus::Pending => "⏳",
      CustomerStatus::Processing => "⚙",
      CustomerStatus::Shipped => "🚚",
      CustomerStatus::Delivered => "✓",
      CustomerStatus::Cancelled => "✕",
    }
  }
}

impl fmt::Display for CustomerStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// Everything a renderer needs to draw a status pill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
  pub status: Option<CustomerStatus>,
  pub label: &'static str,
  pub color: &'static str,
  pub icon: &'static str,
}

impl StatusBadge {
  /// Drawn when a renderer has no status at all to show.
  pub const FALLBACK: StatusBadge = StatusBadge {
    status: None,
    label: "Unknown",
    color: "gray",
    icon: "□",
  };
}

/// Maps a raw backend status. Case-insensitive; `approved` reads as delivered,
/// `declined` as cancelled, and anything absent or unknown as pending.
pub fn map_order_status(raw: Option<&str>) -> CustomerStatus {
  let normalized = match raw.map(str::trim) {
    Some(value) if !value.is_empty() => value.to_ascii_lowercase(),
    _ => return CustomerStatus::Pending,
  };

  match normalized.as_str() {
    "approved" | "delivered" => CustomerStatus::Delivered,
    "declined" | "cancelled" => CustomerStatus::Cancelled,
    "processing" => CustomerStatus::Processing,
    "shipped" => CustomerStatus::Shipped,
    _ => CustomerStatus::Pending,
  }
}

/// Whether the cancel action may be offered. Advisory only: the backend
/// remains the authority and may still reject the request.
pub fn can_cancel(raw: Option<&str>) -> bool {
  map_order_status(raw) == CustomerStatus::Pending
}

pub fn status_label(raw: Option<&str>) -> &'static str {
  map_order_status(raw).label()
}

pub fn status_color(raw: Option<&str>) -> &'static str {
  map_order_status(raw).color()
}

pub fn status_icon(raw: Option<&str>) -> &'static str {
  map_order_status(raw).icon()
}

pub fn badge(raw: Option<&str>) -> StatusBadge {
  let status = map_order_status(raw);
  StatusBadge {
    status: Some(status),
    label: status.label(),
    color: status.color(),
    icon: status.icon(),
  }
}
