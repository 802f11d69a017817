//! Post domain module
//!
//! Entities, identifiers, validation and errors shared by the ingestion,
//! feed and engagement services.

mod draft;
mod entity;
mod error;
mod ids;
mod pricing;

pub use draft::{
    PostDraft, PostDraftBuilder, PostSubmission, RawImage, MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS,
};
pub use entity::{ImageVariant, LikeState, Owner, Post, PostRecord, MAX_IMAGES};
pub use error::{PostError, Result};
pub use ids::PostId;
pub use pricing::{Price, Pricing};
