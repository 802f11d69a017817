//! Media transcoding port

use bytes::Bytes;

use crate::post::PostError;

/// Content type of every transcoded rendition
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// The two delivery renditions of one photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodedImage {
    /// Original dimensions, re-encoded at high quality
    pub high: Bytes,
    /// Downscaled to a bounded width, re-encoded at low quality
    pub low: Bytes,
}

/// Port for turning raw uploaded bytes into delivery renditions
///
/// Implementations must be pure and deterministic: no I/O, no shared
/// mutable state, identical output for identical input and parameters.
/// Both renditions are JPEG ([`JPEG_CONTENT_TYPE`]).
///
/// The call is CPU-bound and synchronous; the ingestion service runs it on
/// the blocking thread pool.
#[cfg_attr(test, mockall::automock)]
pub trait MediaTranscoder: Send + Sync {
    /// Decode `data` and produce the high and low renditions
    ///
    /// # Errors
    ///
    /// Returns `PostError::Transcode` for unsupported or corrupt input
    fn transcode(&self, data: &[u8]) -> Result<TranscodedImage, PostError>;
}
