//! Like toggling
//!
//! The membership change itself is delegated to the repository's atomic
//! `toggle_like`; this service only enforces the preconditions. Both
//! preconditions are stable once a post exists (`allow_likes` is set once at
//! creation), so checking them before the atomic toggle cannot race.

use tracing::{info, instrument};

use crate::identity::Identity;
use crate::post::{LikeState, PostError, PostId, Result};
use crate::ports::PostRepository;

pub struct EngagementService<R> {
    repository: R,
}

impl<R> EngagementService<R>
where
    R: PostRepository,
{
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Like the post if the requester has not liked it yet, unlike it otherwise
    ///
    /// # Errors
    ///
    /// - `PostError::NotFound` if the post does not exist
    /// - `PostError::Forbidden` if the post has likes disabled; nothing changes
    #[instrument(skip(self, requester), fields(post_id = %post_id, user = %requester.id))]
    pub async fn toggle_like(&self, post_id: &PostId, requester: &Identity) -> Result<LikeState> {
        let post = self
            .repository
            .get(post_id)
            .await?
            .ok_or_else(|| PostError::not_found(post_id))?;

        if !post.allow_likes() {
            return Err(PostError::forbidden("Likes are disabled for this post"));
        }

        let state = self.repository.toggle_like(post_id, &requester.id).await?;
        info!(liked = state.liked, likes = state.likes, "Like toggled");
        Ok(state)
    }
}
