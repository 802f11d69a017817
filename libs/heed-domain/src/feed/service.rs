//! Feed query service
//!
//! Read-only access to posts in feed order. Pagination is offset based and
//! reads are not isolated from concurrent inserts: a post created while a
//! page is being read may or may not appear in it, and page boundaries can
//! shift between requests.

use tracing::{debug, instrument};

use crate::identity::UserId;
use crate::post::{Post, PostError, PostId, Result};
use crate::ports::PostRepository;

/// Configuration for feed reads
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Page size used when the caller does not ask for one (default: 20)
    pub default_page_size: usize,
    /// Requested page sizes above this are clamped (default: 100)
    pub max_page_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

pub struct FeedQueryService<R> {
    repository: R,
    config: FeedConfig,
}

impl<R> FeedQueryService<R>
where
    R: PostRepository,
{
    pub fn new(repository: R, config: FeedConfig) -> Self {
        Self { repository, config }
    }

    pub fn with_repository(repository: R) -> Self {
        Self::new(repository, FeedConfig::default())
    }

    /// One page of the feed, newest first
    ///
    /// `page` is 1-based. A page shorter than `page_size` is the last one.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Validation` if `page` or `page_size` is zero
    #[instrument(skip(self))]
    pub async fn list_feed(&self, page: usize, page_size: usize) -> Result<Vec<Post>> {
        if page == 0 {
            return Err(PostError::validation("page must be at least 1"));
        }
        if page_size == 0 {
            return Err(PostError::validation("limit must be at least 1"));
        }

        let limit = page_size.min(self.config.max_page_size);
        let offset = (page - 1).saturating_mul(limit);

        let posts = self.repository.list(offset, limit).await?;
        debug!(offset, limit, returned = posts.len(), "Feed page read");
        Ok(posts)
    }

    /// Every post of one owner, newest first
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Post>> {
        self.repository.list_by_owner(owner).await
    }

    /// # Errors
    ///
    /// Returns `PostError::NotFound` if no post has this id
    #[instrument(skip(self), fields(post_id = %id))]
    pub async fn get_by_id(&self, id: &PostId) -> Result<Post> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| PostError::not_found(id))
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }
}
