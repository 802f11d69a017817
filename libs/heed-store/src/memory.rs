//! In-memory post repository

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use heed_domain::ports::PostRepository;
use heed_domain::{LikeState, Post, PostError, PostId, UserId};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Posts held in a sharded concurrent map
///
/// Like toggles run under the map's per-entry write guard, so concurrent
/// toggles on the same post are serialized and none is lost.
#[derive(Clone, Default)]
pub struct MemoryPostRepository {
    posts: Arc<DashMap<PostId, Post>>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    fn sorted<F>(&self, filter: F) -> Vec<Post>
    where
        F: Fn(&Post) -> bool,
    {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        posts.sort_by(Post::feed_cmp);
        posts
    }
}

impl PostRepository for MemoryPostRepository {
    fn insert(&self, post: &Post) -> impl Future<Output = Result<(), PostError>> + Send {
        let result = match self.posts.entry(*post.id()) {
            Entry::Occupied(_) => Err(PostError::repository(format!(
                "post {} already exists",
                post.id()
            ))),
            Entry::Vacant(slot) => {
                slot.insert(post.clone());
                debug!(post_id = %post.id(), "Post stored in memory");
                Ok(())
            }
        };
        async move { result }
    }

    fn get(&self, id: &PostId) -> impl Future<Output = Result<Option<Post>, PostError>> + Send {
        let post = self.posts.get(id).map(|entry| entry.value().clone());
        async move { Ok(post) }
    }

    fn list(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Post>, PostError>> + Send {
        let page = self
            .sorted(|_| true)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();
        async move { Ok(page) }
    }

    fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> impl Future<Output = Result<Vec<Post>, PostError>> + Send {
        let posts = self.sorted(|post| post.owner_id() == owner);
        async move { Ok(posts) }
    }

    fn toggle_like(
        &self,
        id: &PostId,
        user: &UserId,
    ) -> impl Future<Output = Result<LikeState, PostError>> + Send {
        let result = match self.posts.get_mut(id) {
            Some(mut post) => {
                let liked = post.toggle_like(user);
                Ok(LikeState {
                    post_id: *id,
                    liked,
                    likes: post.likes(),
                })
            }
            None => Err(PostError::not_found(id)),
        };
        async move { result }
    }
}
