// shopdesk/src/models/pagination.rs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
  #[serde(default = "first_page")]
  pub page: u32,
  #[serde(default)]
  pub pages: u32,
  #[serde(default)]
  pub total: u64,
}

fn first_page() -> u32 {
  1
}

impl Default for Pagination {
  fn default() -> Self {
    Self {
      page: 1,
      pages: 0,
      total: 0,
    }
  }
}

impl Pagination {
  /// Number of pages the controls treat as reachable; an empty result still has page 1.
  pub fn last_page(&self) -> u32 {
    self.pages.max(1)
  }

  pub fn has_previous(&self) -> bool {
    self.page > 1
  }

  pub fn has_next(&self) -> bool {
    self.page < self.last_page()
  }
}
