//! # Heed Store
//!
//! `PostRepository` implementations:
//!
//! - [`MemoryPostRepository`]: process-local, for development and tests
//! - [`PgPostRepository`]: PostgreSQL via `sqlx`, with the like toggle applied
//!   as one conditional statement
//!
//! [`PostStore`] picks one at startup.

mod memory;
mod postgres;

pub use memory::MemoryPostRepository;
pub use postgres::PgPostRepository;

use heed_domain::ports::PostRepository;
use heed_domain::{LikeState, Post, PostError, PostId, UserId};
use std::future::Future;

/// The post repository chosen at startup
#[derive(Clone)]
pub enum PostStore {
    Memory(MemoryPostRepository),
    Postgres(PgPostRepository),
}

impl PostStore {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Postgres(_) => "postgres",
        }
    }
}

impl From<MemoryPostRepository> for PostStore {
    fn from(repository: MemoryPostRepository) -> Self {
        Self::Memory(repository)
    }
}

impl From<PgPostRepository> for PostStore {
    fn from(repository: PgPostRepository) -> Self {
        Self::Postgres(repository)
    }
}

impl PostRepository for PostStore {
    fn insert(&self, post: &Post) -> impl Future<Output = Result<(), PostError>> + Send {
        async move {
            match self {
                Self::Memory(repo) => repo.insert(post).await,
                Self::Postgres(repo) => repo.insert(post).await,
            }
        }
    }

    fn get(&self, id: &PostId) -> impl Future<Output = Result<Option<Post>, PostError>> + Send {
        async move {
            match self {
                Self::Memory(repo) => repo.get(id).await,
                Self::Postgres(repo) => repo.get(id).await,
            }
        }
    }

    fn list(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Post>, PostError>> + Send {
        async move {
            match self {
                Self::Memory(repo) => repo.list(offset, limit).await,
                Self::Postgres(repo) => repo.list(offset, limit).await,
            }
        }
    }

    fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> impl Future<Output = Result<Vec<Post>, PostError>> + Send {
        async move {
            match self {
                Self::Memory(repo) => repo.list_by_owner(owner).await,
                Self::Postgres(repo) => repo.list_by_owner(owner).await,
            }
        }
    }

    fn toggle_like(
        &self,
        id: &PostId,
        user: &UserId,
    ) -> impl Future<Output = Result<LikeState, PostError>> + Send {
        async move {
            match self {
                Self::Memory(repo) => repo.toggle_like(id, user).await,
                Self::Postgres(repo) => repo.toggle_like(id, user).await,
            }
        }
    }
}
