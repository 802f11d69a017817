//! Object storage port and key generation

use bytes::Bytes;
use std::fmt;
use std::future::Future;
use uuid::Uuid;

use crate::identity::UserId;
use crate::post::PostError;

const MAX_STEM_CHARS: usize = 40;
const MAX_OWNER_CHARS: usize = 64;

/// Which delivery resolution a blob holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rendition {
    High,
    Low,
}

impl Rendition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rendition::High => "high",
            Rendition::Low => "low",
        }
    }
}

/// Key of one blob in the object store
///
/// Keys follow `posts/{owner}/{uuid-v7}-{stem}-{rendition}.jpg`. The UUID is
/// fresh for every key, so two uploads never share a key even when the same
/// user submits the same file twice in parallel. The owner and stem parts
/// only make keys readable when browsing the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Generate a collision-resistant key for one rendition of one image
    ///
    /// `position` is the zero-based index of the image in the submission and
    /// names the blob when the client sent no usable file name.
    pub fn generate(
        owner: &UserId,
        file_name: Option<&str>,
        position: usize,
        rendition: Rendition,
    ) -> Self {
        let stem = file_name
            .map(file_stem)
            .map(|s| sanitize(s, MAX_STEM_CHARS))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("image{}", position + 1));
        let owner = sanitize(owner.as_str(), MAX_OWNER_CHARS);
        let owner = if owner.is_empty() {
            "anonymous".to_string()
        } else {
            owner
        };

        Self(format!(
            "posts/{}/{}-{}-{}.jpg",
            owner,
            Uuid::now_v7().simple(),
            stem,
            rendition.as_str()
        ))
    }

    /// Wrap an existing key
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn file_stem(file_name: &str) -> &str {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    }
}

/// Keep ASCII alphanumerics, `-` and `_`; anything else becomes `-`
fn sanitize(raw: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(raw.len().min(max_chars));
    for c in raw.chars() {
        if out.len() >= max_chars {
            break;
        }
        let c = if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            c.to_ascii_lowercase()
        } else {
            '-'
        };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('-').to_string()
}

/// Port for durable blob storage
///
/// This trait abstracts away the storage backend (S3, R2, MinIO, memory).
/// Implementations must:
/// - store the bytes under exactly the given key with the given content type
/// - return the public URL of the stored object
/// - convert any infrastructure error to `PostError::Upload`
///
/// No delete is required: blobs orphaned by a failed ingestion are left in place.
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key` and return its public URL
    ///
    /// # Errors
    ///
    /// Returns `PostError::Upload` if the storage operation fails
    fn put(
        &self,
        key: &ObjectKey,
        data: Bytes,
        content_type: &str,
    ) -> impl Future<Output = Result<String, PostError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique_for_identical_inputs() {
        let owner = UserId::new("u-1");
        let a = ObjectKey::generate(&owner, Some("chair.png"), 0, Rendition::High);
        let b = ObjectKey::generate(&owner, Some("chair.png"), 0, Rendition::High);

        assert_ne!(a, b);
    }

    #[test]
    fn test_key_layout() {
        let owner = UserId::new("u-1");
        let key = ObjectKey::generate(&owner, Some("My Chair.PNG"), 0, Rendition::Low);

        assert!(key.as_str().starts_with("posts/u-1/"));
        assert!(key.as_str().ends_with("-my-chair-low.jpg"), "{key}");
    }

    #[test]
    fn test_missing_file_name_uses_position() {
        let owner = UserId::new("u-1");
        let key = ObjectKey::generate(&owner, None, 2, Rendition::High);

        assert!(key.as_str().ends_with("-image3-high.jpg"), "{key}");
    }

    #[test]
    fn test_path_components_are_stripped() {
        let owner = UserId::new("../../etc");
        let key = ObjectKey::generate(&owner, Some("../secret/../../x.jpg"), 0, Rendition::High);

        assert!(!key.as_str().contains(".."), "{key}");
        assert!(key.as_str().starts_with("posts/etc/"), "{key}");
        assert!(key.as_str().ends_with("-x-high.jpg"), "{key}");
    }

    #[test]
    fn test_unusable_file_name_falls_back() {
        let owner = UserId::new("u-1");
        let key = ObjectKey::generate(&owner, Some("???.jpg"), 0, Rendition::High);

        assert!(key.as_str().ends_with("-image1-high.jpg"), "{key}");
    }

    #[test]
    fn test_stem_is_length_capped() {
        let owner = UserId::new("u-1");
        let long = format!("{}.jpg", "a".repeat(200));
        let key = ObjectKey::generate(&owner, Some(&long), 0, Rendition::High);

        let stem_len = key
            .as_str()
            .trim_end_matches("-high.jpg")
            .rsplit('-')
            .next()
            .map(str::len)
            .unwrap();
        assert_eq!(stem_len, MAX_STEM_CHARS);
    }
}
