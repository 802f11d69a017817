//! Post repository port

use std::future::Future;

use crate::identity::UserId;
use crate::post::{LikeState, Post, PostError, PostId};

/// Port for durable post storage
///
/// All listing methods return posts in feed order: `created_at` descending,
/// ties broken by id descending. Reads are not isolated from concurrent
/// writes.
pub trait PostRepository: Send + Sync {
    /// Persist a newly created post
    ///
    /// # Errors
    ///
    /// Returns `PostError::Repository` if the post cannot be stored
    fn insert(&self, post: &Post) -> impl Future<Output = Result<(), PostError>> + Send;

    /// Fetch a post by id, `None` if it does not exist
    fn get(&self, id: &PostId) -> impl Future<Output = Result<Option<Post>, PostError>> + Send;

    /// Fetch one page of the feed
    ///
    /// # Arguments
    ///
    /// * `offset` - Number of posts to skip
    /// * `limit` - Maximum number of posts to return
    fn list(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Post>, PostError>> + Send;

    /// Fetch every post of one owner
    fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> impl Future<Output = Result<Vec<Post>, PostError>> + Send;

    /// Add `user` to the post's liked-by set if absent, remove it otherwise
    ///
    /// Must be applied as a single atomic conditional mutation against the
    /// stored set, never as read-set / modify / write-back: concurrent toggles
    /// by different users on the same post must all be reflected.
    ///
    /// # Errors
    ///
    /// Returns `PostError::NotFound` if the post does not exist
    fn toggle_like(
        &self,
        id: &PostId,
        user: &UserId,
    ) -> impl Future<Output = Result<LikeState, PostError>> + Send;
}
