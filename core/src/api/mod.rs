// shopdesk/src/api/mod.rs

//! REST repository clients. Panels only see the traits, so tests and
//! embedders can swap the HTTP implementations for their own.

pub mod auth;
pub mod client;
pub mod orders;
pub mod reviews;

pub use auth::AuthContext;
pub use client::{api_error_from_body, ApiClient, Envelope};
pub use orders::{HttpOrderRepository, OrderRepository};
pub use reviews::{HttpReviewRepository, ReviewModerationRepository, ReviewRepository};
