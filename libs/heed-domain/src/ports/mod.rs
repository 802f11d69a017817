//! Ports (trait definitions) for external dependencies
//!
//! Following hexagonal architecture, the domain defines what it needs, and the
//! infrastructure provides implementations.
//!
//! ## Static Dispatch
//!
//! Async ports use native `impl Future` return types instead of `async_trait`
//! so services stay generic and monomorphized, without trait objects.

mod auth;
mod media;
mod repository;
mod storage;

#[cfg(test)]
pub use media::MockMediaTranscoder;
pub use auth::AuthGate;
pub use media::{MediaTranscoder, TranscodedImage, JPEG_CONTENT_TYPE};
pub use repository::PostRepository;
pub use storage::{ObjectKey, ObjectStore, Rendition};
