//! In-memory port implementations for service tests

use bytes::Bytes;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::identity::{Identity, Role, UserId};
use crate::post::{LikeState, Post, PostError, PostId, RawImage};
use crate::ports::{MediaTranscoder, ObjectKey, ObjectStore, PostRepository, TranscodedImage};

pub fn general_user(id: &str) -> Identity {
    Identity::new(id, format!("user-{id}"), Role::General)
}

pub fn business_user(id: &str) -> Identity {
    Identity::new(id, format!("shop-{id}"), Role::Business)
}

pub fn raw_images(count: usize) -> Vec<RawImage> {
    (0..count)
        .map(|i| RawImage::new(vec![i as u8; 16]).with_file_name(format!("photo{i}.png")))
        .collect()
}

// In-memory post storage for testing
#[derive(Clone, Default)]
pub struct InMemoryPosts {
    posts: Arc<Mutex<HashMap<PostId, Post>>>,
}

impl InMemoryPosts {
    pub fn len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }
}

impl PostRepository for InMemoryPosts {
    fn insert(&self, post: &Post) -> impl Future<Output = Result<(), PostError>> + Send {
        let posts = self.posts.clone();
        let post = post.clone();

        async move {
            posts.lock().unwrap().insert(*post.id(), post);
            Ok(())
        }
    }

    fn get(&self, id: &PostId) -> impl Future<Output = Result<Option<Post>, PostError>> + Send {
        let posts = self.posts.clone();
        let id = *id;

        async move { Ok(posts.lock().unwrap().get(&id).cloned()) }
    }

    fn list(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Post>, PostError>> + Send {
        let posts = self.posts.clone();

        async move {
            let mut all: Vec<Post> = posts.lock().unwrap().values().cloned().collect();
            all.sort_by(Post::feed_cmp);
            Ok(all.into_iter().skip(offset).take(limit).collect())
        }
    }

    fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> impl Future<Output = Result<Vec<Post>, PostError>> + Send {
        let posts = self.posts.clone();
        let owner = owner.clone();

        async move {
            let mut mine: Vec<Post> = posts
                .lock()
                .unwrap()
                .values()
                .filter(|p| p.owner_id() == &owner)
                .cloned()
                .collect();
            mine.sort_by(Post::feed_cmp);
            Ok(mine)
        }
    }

    fn toggle_like(
        &self,
        id: &PostId,
        user: &UserId,
    ) -> impl Future<Output = Result<LikeState, PostError>> + Send {
        let posts = self.posts.clone();
        let id = *id;
        let user = user.clone();

        async move {
            let mut guard = posts.lock().unwrap();
            let post = guard.get_mut(&id).ok_or_else(|| PostError::not_found(id))?;
            let liked = post.toggle_like(&user);
            Ok(LikeState {
                post_id: id,
                liked,
                likes: post.likes(),
            })
        }
    }
}

/// How the fake object store answers
#[derive(Clone, Copy)]
pub enum StoreBehavior {
    Succeed,
    /// Fail this many calls, then succeed
    FailTimes(u32),
    AlwaysFail,
    /// Never answer within any reasonable timeout
    Stall,
}

#[derive(Clone)]
pub struct FakeObjectStore {
    behavior: StoreBehavior,
    failures_left: Arc<AtomicU32>,
    attempts: Arc<AtomicUsize>,
    stored: Arc<Mutex<Vec<String>>>,
}

impl FakeObjectStore {
    pub fn new(behavior: StoreBehavior) -> Self {
        let failures = match behavior {
            StoreBehavior::FailTimes(n) => n,
            _ => 0,
        };
        Self {
            behavior,
            failures_left: Arc::new(AtomicU32::new(failures)),
            attempts: Arc::new(AtomicUsize::new(0)),
            stored: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of put calls, including failed ones
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Keys that were stored successfully
    pub fn stored_keys(&self) -> Vec<String> {
        self.stored.lock().unwrap().clone()
    }
}

impl ObjectStore for FakeObjectStore {
    fn put(
        &self,
        key: &ObjectKey,
        _data: Bytes,
        _content_type: &str,
    ) -> impl Future<Output = Result<String, PostError>> + Send {
        let this = self.clone();
        let key = key.to_string();

        async move {
            this.attempts.fetch_add(1, Ordering::SeqCst);
            match this.behavior {
                StoreBehavior::AlwaysFail => {
                    return Err(PostError::upload(format!("connection reset storing {key}")))
                }
                StoreBehavior::Stall => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                }
                StoreBehavior::FailTimes(_) => {
                    let failed = this
                        .failures_left
                        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                        .is_ok();
                    if failed {
                        return Err(PostError::upload(format!("transient failure storing {key}")));
                    }
                }
                StoreBehavior::Succeed => {}
            }
            this.stored.lock().unwrap().push(key.clone());
            Ok(format!("https://cdn.test/{key}"))
        }
    }
}

/// Transcoder that tags the input instead of decoding it
pub struct TaggingTranscoder;

impl MediaTranscoder for TaggingTranscoder {
    fn transcode(&self, data: &[u8]) -> Result<TranscodedImage, PostError> {
        let mut high = b"high:".to_vec();
        high.extend_from_slice(data);
        let mut low = b"low:".to_vec();
        low.extend_from_slice(data);
        Ok(TranscodedImage {
            high: Bytes::from(high),
            low: Bytes::from(low),
        })
    }
}
