//! Domain errors for post operations
//!
//! One taxonomy covers ingestion, feed reads and likes. Adapters convert
//! their infrastructure errors (AWS SDK, SQL, image codecs) into these
//! variants at the boundary.

use thiserror::Error;

/// Errors that can occur while creating, reading or liking posts
#[derive(Error, Debug)]
pub enum PostError {
    /// Malformed or out-of-policy input (image count, missing fields, price without business role)
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Role- or feature-gated action
    #[error("{0}")]
    Forbidden(String),

    /// Unknown post id
    #[error("Post {0} not found")]
    NotFound(String),

    /// Image bytes could not be decoded or re-encoded
    #[error("Image transcoding failed: {0}")]
    Transcode(String),

    /// Object storage failure, possibly after retries
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Post repository backend failure
    #[error("Repository operation failed: {0}")]
    Repository(String),
}

impl PostError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(id: impl ToString) -> Self {
        Self::NotFound(id.to_string())
    }

    pub fn transcode(msg: impl Into<String>) -> Self {
        Self::Transcode(msg.into())
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Whether the caller caused the failure
    ///
    /// Client errors are reported verbatim; everything else is a dependency
    /// fault that must be logged and reported generically.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Unauthorized(_) | Self::Forbidden(_) | Self::NotFound(_)
        )
    }
}

/// Result type alias for post operations
pub type Result<T> = std::result::Result<T, PostError>;
