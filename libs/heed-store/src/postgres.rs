//! PostgreSQL post repository
//!
//! Posts live in `posts`, with the owner snapshot flattened into columns and
//! the image list stored as JSONB. Likes are rows of `post_likes`, one per
//! (post, user), so the like count is always the size of the liked-by set.

use chrono::{DateTime, Utc};
use heed_domain::ports::PostRepository;
use heed_domain::post::PostRecord;
use heed_domain::{ImageVariant, LikeState, Owner, Post, PostError, PostId, Price, Role, UserId};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::FromRow;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

const SELECT_POSTS: &str = r#"
    SELECT p.id, p.owner_id, p.owner_username, p.owner_role, p.title, p.description,
           p.price, p.images, p.allow_comments, p.allow_likes, p.created_at,
           ARRAY(
               SELECT l.user_id FROM post_likes l
               WHERE l.post_id = p.id
               ORDER BY l.user_id
           ) AS liked_by
    FROM posts p
"#;

#[derive(Debug, FromRow)]
struct PostRow {
    id: Uuid,
    owner_id: String,
    owner_username: String,
    owner_role: String,
    title: String,
    description: String,
    price: Option<f64>,
    images: Json<Vec<ImageVariant>>,
    allow_comments: bool,
    allow_likes: bool,
    created_at: DateTime<Utc>,
    liked_by: Vec<String>,
}

impl TryFrom<PostRow> for Post {
    type Error = PostError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .owner_role
            .parse()
            .map_err(|e| PostError::repository(format!("post {}: {e}", row.id)))?;
        let price = row
            .price
            .map(Price::new)
            .transpose()
            .map_err(|e| PostError::repository(format!("post {}: {e}", row.id)))?;

        Post::from_record(PostRecord {
            id: PostId::from_uuid(row.id),
            owner: Owner {
                id: UserId::new(row.owner_id),
                username: row.owner_username,
                role,
            },
            title: row.title,
            description: row.description,
            price,
            images: row.images.0,
            allow_comments: row.allow_comments,
            allow_likes: row.allow_likes,
            liked_by: row.liked_by.into_iter().map(UserId::new).collect(),
            created_at: row.created_at,
        })
    }
}

/// Post repository backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, PostError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await
            .map_err(|e| db_error("connect", e))?;

        info!(max_connections, "Connected to PostgreSQL database");
        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<(), PostError> {
        info!("Running database migrations");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PostError::repository(format!("migration failed: {e}")))?;

        info!("Database migrations completed");
        Ok(())
    }
}

impl PostRepository for PgPostRepository {
    #[instrument(skip(self, post), fields(post_id = %post.id()))]
    fn insert(&self, post: &Post) -> impl Future<Output = Result<(), PostError>> + Send {
        let pool = self.pool.clone();
        let record = post.to_record();

        async move {
            let mut tx = pool.begin().await.map_err(|e| db_error("begin", e))?;

            sqlx::query(
                r#"
                INSERT INTO posts (
                    id, owner_id, owner_username, owner_role, title, description,
                    price, images, allow_comments, allow_likes, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(*record.id.as_uuid())
            .bind(record.owner.id.as_str())
            .bind(&record.owner.username)
            .bind(record.owner.role.as_str())
            .bind(&record.title)
            .bind(&record.description)
            .bind(record.price.map(|p| p.value()))
            .bind(Json(&record.images))
            .bind(record.allow_comments)
            .bind(record.allow_likes)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("insert post", e))?;

            if !record.liked_by.is_empty() {
                let likers: Vec<String> =
                    record.liked_by.iter().map(|u| u.as_str().to_string()).collect();
                sqlx::query(
                    "INSERT INTO post_likes (post_id, user_id) SELECT $1, UNNEST($2::text[])",
                )
                .bind(*record.id.as_uuid())
                .bind(&likers)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("insert likes", e))?;
            }

            tx.commit().await.map_err(|e| db_error("commit", e))?;
            debug!("Post stored");
            Ok(())
        }
    }

    fn get(&self, id: &PostId) -> impl Future<Output = Result<Option<Post>, PostError>> + Send {
        let pool = self.pool.clone();
        let id = *id.as_uuid();

        async move {
            let sql = format!("{SELECT_POSTS} WHERE p.id = $1");
            let row = sqlx::query_as::<_, PostRow>(&sql)
                .bind(id)
                .fetch_optional(&pool)
                .await
                .map_err(|e| db_error("get post", e))?;

            row.map(Post::try_from).transpose()
        }
    }

    fn list(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Post>, PostError>> + Send {
        let pool = self.pool.clone();

        async move {
            let sql =
                format!("{SELECT_POSTS} ORDER BY p.created_at DESC, p.id DESC LIMIT $1 OFFSET $2");
            let rows = sqlx::query_as::<_, PostRow>(&sql)
                .bind(to_i64(limit))
                .bind(to_i64(offset))
                .fetch_all(&pool)
                .await
                .map_err(|e| db_error("list posts", e))?;

            rows.into_iter().map(Post::try_from).collect()
        }
    }

    fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> impl Future<Output = Result<Vec<Post>, PostError>> + Send {
        let pool = self.pool.clone();
        let owner = owner.as_str().to_string();

        async move {
            let sql = format!(
                "{SELECT_POSTS} WHERE p.owner_id = $1 ORDER BY p.created_at DESC, p.id DESC"
            );
            let rows = sqlx::query_as::<_, PostRow>(&sql)
                .bind(owner)
                .fetch_all(&pool)
                .await
                .map_err(|e| db_error("list posts by owner", e))?;

            rows.into_iter().map(Post::try_from).collect()
        }
    }

    #[instrument(skip(self), fields(post_id = %id, user = %user))]
    fn toggle_like(
        &self,
        id: &PostId,
        user: &UserId,
    ) -> impl Future<Output = Result<LikeState, PostError>> + Send {
        let pool = self.pool.clone();
        let post_id = *id;
        let user = user.as_str().to_string();

        async move {
            let mut tx = pool.begin().await.map_err(|e| db_error("begin", e))?;

            // Toggles of one post queue on its row until the transaction ends
            let locked: Option<Uuid> =
                sqlx::query_scalar("SELECT id FROM posts WHERE id = $1 FOR UPDATE")
                    .bind(*post_id.as_uuid())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| db_error("lock post", e))?;
            if locked.is_none() {
                return Err(PostError::not_found(post_id));
            }

            let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
                .bind(*post_id.as_uuid())
                .bind(&user)
                .execute(&mut *tx)
                .await
                .map_err(|e| db_error("remove like", e))?
                .rows_affected();

            let liked = removed == 0;
            if liked {
                sqlx::query("INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2)")
                    .bind(*post_id.as_uuid())
                    .bind(&user)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| db_error("add like", e))?;
            }

            let likes: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM post_likes WHERE post_id = $1")
                    .bind(*post_id.as_uuid())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| db_error("count likes", e))?;

            tx.commit().await.map_err(|e| db_error("commit", e))?;

            debug!(liked, likes, "Like toggled in database");
            Ok(LikeState {
                post_id,
                liked,
                likes: usize::try_from(likes).unwrap_or_default(),
            })
        }
    }
}

fn db_error(operation: &str, err: sqlx::Error) -> PostError {
    error!(operation, error = %err, "Database operation failed");
    PostError::repository(format!("{operation}: {err}"))
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
