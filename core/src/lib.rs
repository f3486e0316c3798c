// src/lib.rs

//! Shopdesk: headless customer and admin panels for an e-commerce order and
//! review API.
//!
//! The crate provides:
//!  - A single status authority mapping raw backend order statuses to the
//!    five statuses shoppers see, with labels, colors, icons and cancel-eligibility.
//!  - Async repository traits for orders and reviews, with `reqwest` implementations.
//!  - Three panel state machines (orders, review submission, review moderation)
//!    whose state any renderer can read through a shared `ContextData` handle.
//!  - A small step-flow engine every mutating panel action runs through.

pub mod api;
pub mod config;
pub mod error;
pub mod flow;
pub mod models;
pub mod moderation;
pub mod panels;
pub mod status;

// --- Re-exports for the Public API ---

pub use crate::api::{
  AuthContext, ApiClient, HttpOrderRepository, HttpReviewRepository, OrderRepository, ReviewModerationRepository,
  ReviewRepository,
};
pub use crate::config::ClientConfig;
pub use crate::error::{ErrorKind, ShopdeskError, ShopdeskResult, GENERIC_ERROR_MESSAGE};
pub use crate::flow::{ContextData, Flow, FlowControl, FlowError, FlowOutcome};
pub use crate::moderation::{available_actions, AbuseReason, ModerationAction, ModerationFilter, ModerationStatus};
pub use crate::panels::{ModerationPanel, NavigationIntent, OrderPanel, ReviewPanel};
pub use crate::status::{can_cancel, map_order_status, CustomerStatus, StatusBadge};

/*
    Typical wiring:
    1. Load a `ClientConfig` (`from_env()` or `new(base_url)`).
    2. Build an `ApiClient` with an `AuthContext` holding the bearer token.
    3. Wrap it in `HttpOrderRepository` / `HttpReviewRepository` and hand
       `Arc<dyn ...>` handles to the panels.
    4. `mount()` a panel, render its `rows()` / `snapshot()`, and forward
       user events to its operations. Every mutation refetches from the API.
*/
