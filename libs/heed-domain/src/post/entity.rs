//! Domain entities for posts
//!
//! A Post is created whole by the ingestion service and is immutable
//! afterwards, except for the set of users who liked it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::draft::PostDraft;
use super::ids::PostId;
use super::pricing::{Price, Pricing};
use super::{PostError, Result};
use crate::identity::{Identity, Role, UserId};

/// Maximum number of photos in a post
pub const MAX_IMAGES: usize = 4;

/// Two delivery resolutions of one submitted photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVariant {
    /// Public URL of the full-size, high quality rendition
    pub high: String,
    /// Public URL of the downscaled, low quality rendition
    pub low: String,
}

/// Snapshot of the creator, taken at creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl From<&Identity> for Owner {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            username: identity.username.clone(),
            role: identity.role,
        }
    }
}

/// A published post
///
/// Invariants held by every constructor:
/// - `1 <= images.len() <= MAX_IMAGES`, `images[0]` is the cover
/// - a price exists only when the owner is a business account
/// - `likes()` is always `liked_by.len()`, and `liked_by` has no duplicates
#[derive(Debug, Clone)]
pub struct Post {
    id: PostId,
    owner: Owner,
    title: String,
    description: String,
    pricing: Pricing,
    images: Vec<ImageVariant>,
    allow_comments: bool,
    allow_likes: bool,
    liked_by: BTreeSet<UserId>,
    created_at: DateTime<Utc>,
}

/// Flat representation of a stored post, used by repositories to rebuild entities
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub id: PostId,
    pub owner: Owner,
    pub title: String,
    pub description: String,
    pub price: Option<Price>,
    pub images: Vec<ImageVariant>,
    pub allow_comments: bool,
    pub allow_likes: bool,
    pub liked_by: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post from a validated draft and its uploaded images
    ///
    /// This is a pure domain constructor - it doesn't perform any I/O.
    pub fn create(draft: PostDraft, images: Vec<ImageVariant>) -> Result<Self> {
        check_image_count(images.len()).map_err(PostError::validation)?;

        let (owner, title, description, pricing, allow_comments, allow_likes) =
            draft.into_parts();

        Ok(Self {
            id: PostId::new(),
            owner,
            title,
            description,
            pricing,
            images,
            allow_comments,
            allow_likes,
            liked_by: BTreeSet::new(),
            created_at: Utc::now(),
        })
    }

    /// Rebuild a post from storage, re-checking its invariants
    pub fn from_record(record: PostRecord) -> Result<Self> {
        check_image_count(record.images.len()).map_err(|msg| {
            PostError::repository(format!("stored post {} is corrupt: {msg}", record.id))
        })?;
        let pricing = Pricing::from_stored(record.owner.role, record.price)?;

        Ok(Self {
            id: record.id,
            owner: record.owner,
            title: record.title,
            description: record.description,
            pricing,
            images: record.images,
            allow_comments: record.allow_comments,
            allow_likes: record.allow_likes,
            liked_by: record.liked_by.into_iter().collect(),
            created_at: record.created_at,
        })
    }

    pub fn id(&self) -> &PostId {
        &self.id
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn owner_id(&self) -> &UserId {
        &self.owner.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    pub fn price(&self) -> Option<Price> {
        self.pricing.price()
    }

    pub fn images(&self) -> &[ImageVariant] {
        &self.images
    }

    /// The first image, shown in feed listings
    pub fn cover(&self) -> &ImageVariant {
        &self.images[0]
    }

    pub fn allow_comments(&self) -> bool {
        self.allow_comments
    }

    pub fn allow_likes(&self) -> bool {
        self.allow_likes
    }

    pub fn liked_by(&self) -> impl Iterator<Item = &UserId> {
        self.liked_by.iter()
    }

    pub fn is_liked_by(&self, user: &UserId) -> bool {
        self.liked_by.contains(user)
    }

    /// Number of likes, derived from the membership set
    pub fn likes(&self) -> usize {
        self.liked_by.len()
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    /// Flip `user`'s membership in the liked-by set and return the new state
    ///
    /// Callers must hold exclusive access to the stored post for the duration
    /// of the call; repositories apply it under their own write guard.
    pub fn toggle_like(&mut self, user: &UserId) -> bool {
        if self.liked_by.remove(user) {
            false
        } else {
            self.liked_by.insert(user.clone());
            true
        }
    }

    /// Feed order: newest first, ties broken by id descending
    pub fn feed_cmp(&self, other: &Self) -> Ordering {
        other
            .created_at
            .cmp(&self.created_at)
            .then_with(|| other.id.cmp(&self.id))
    }

    /// Convert back to the flat stored form
    pub fn to_record(&self) -> PostRecord {
        PostRecord {
            id: self.id,
            owner: self.owner.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price(),
            images: self.images.clone(),
            allow_comments: self.allow_comments,
            allow_likes: self.allow_likes,
            liked_by: self.liked_by.iter().cloned().collect(),
            created_at: self.created_at,
        }
    }
}

/// Result of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub post_id: PostId,
    /// Whether the requester likes the post after the toggle
    pub liked: bool,
    pub likes: usize,
}

fn check_image_count(count: usize) -> std::result::Result<(), String> {
    if (1..=MAX_IMAGES).contains(&count) {
        Ok(())
    } else {
        Err(format!(
            "You can upload 1 to {MAX_IMAGES} images only (got {count})"
        ))
    }
}
