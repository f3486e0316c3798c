// shopdesk/src/models/mod.rs

//! Wire types exchanged with the shop backend.

pub mod order;
pub mod order_item;
pub mod pagination;
pub mod review;

pub use order::{Order, OrdersPage, ShippingAddress};
pub use order_item::{OrderItem, ProductRef, ProductSummary};
pub use pagination::Pagination;
pub use review::{NewReview, Review, ReviewAnalytics, ReviewUpdate, ReviewerRef, ReviewsPage};
