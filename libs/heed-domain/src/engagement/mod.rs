//! Engagement domain module
//!
//! Idempotent like / unlike of posts.

mod service;

pub use service::EngagementService;
