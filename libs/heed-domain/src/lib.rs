//! # Heed Domain Layer
//!
//! This crate contains the pure business logic and domain models for Heed
//! posts: multi-image listings published by authenticated users, browsed in a
//! paginated feed and liked by other users. It follows hexagonal architecture
//! principles:
//!
//! - **Entities**: Core domain models (Post, ImageVariant, Identity)
//! - **Ports**: Trait definitions for external dependencies (MediaTranscoder,
//!   ObjectStore, PostRepository, AuthGate)
//! - **Services**: Business logic orchestration (ingestion, feed, engagement)
//!
//! ## Architecture
//!
//! This layer has NO dependencies on infrastructure concerns (AWS, SQL, HTTP,
//! image codecs). All external dependencies are expressed as traits (ports)
//! that are implemented by adapter crates.
//!
//! ## Example
//!
//! ```rust,no_run
//! use heed_domain::ingestion::PostIngestionService;
//! use heed_domain::ports::{MediaTranscoder, ObjectStore, PostRepository};
//! use heed_domain::{Identity, PostSubmission, RawImage, Role};
//!
//! async fn example<T, S, R>(service: PostIngestionService<T, S, R>)
//! where
//!     T: MediaTranscoder + 'static,
//!     S: ObjectStore,
//!     R: PostRepository,
//! {
//!     let owner = Identity::new("u-1", "lampshop", Role::Business);
//!     let images = vec![RawImage::new(vec![0u8; 8])];
//!     let submission = PostSubmission::new("Lamp", "Brass lamp", images).with_price("25");
//!     let post = service.create_post(&owner, submission).await.unwrap();
//!     println!("Published post: {}", post.id());
//! }
//! ```

pub mod engagement;
pub mod feed;
pub mod identity;
pub mod ingestion;
pub mod ports;
pub mod post;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use identity::{Identity, Role, UserId};
pub use post::{
    ImageVariant, LikeState, Owner, Post, PostError, PostId, PostSubmission, Price, Pricing,
    RawImage, Result,
};
