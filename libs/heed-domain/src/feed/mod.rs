//! Feed domain module
//!
//! Paginated, recency-ordered reads of posts.

mod service;

pub use service::{FeedConfig, FeedQueryService};
