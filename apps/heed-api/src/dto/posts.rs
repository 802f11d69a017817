//! DTOs for post, feed and like endpoints

use chrono::{DateTime, Utc};
use heed_domain::{ImageVariant, LikeState, Post};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Multipart form for creating a post
///
/// Documentation only; the handler reads the form field by field.
#[allow(dead_code)]
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostForm {
    #[schema(example = "Lamp")]
    pub title: String,
    #[schema(example = "Brass lamp")]
    pub description: String,
    /// Business accounts only
    #[schema(example = "25")]
    pub price: Option<String>,
    /// Defaults to true
    pub allow_comments: Option<bool>,
    /// Defaults to true
    pub allow_likes: Option<bool>,
    /// One to four image files, the first one is the cover
    #[schema(value_type = Vec<String>, format = Binary)]
    pub images: Vec<Vec<u8>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OwnerResponse {
    #[schema(example = "64f1c2")]
    pub id: String,
    #[schema(example = "lampshop")]
    pub username: String,
    #[schema(example = "business")]
    pub role: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageResponse {
    /// Full-size rendition
    pub high: String,
    /// Downscaled rendition for feed listings
    pub low: String,
}

impl From<&ImageVariant> for ImageResponse {
    fn from(variant: &ImageVariant) -> Self {
        Self {
            high: variant.high.clone(),
            low: variant.low.clone(),
        }
    }
}

/// A published post
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    #[schema(example = "01912d68-783e-7a3c-9f6f-2f0d8c1c7b11")]
    pub id: String,
    pub owner: OwnerResponse,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 25.0)]
    pub price: Option<f64>,
    pub images: Vec<ImageResponse>,
    pub allow_comments: bool,
    pub allow_likes: bool,
    pub likes: usize,
    pub liked_by: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Post> for PostResponse {
    fn from(post: &Post) -> Self {
        let owner = post.owner();
        Self {
            id: post.id().to_string(),
            owner: OwnerResponse {
                id: owner.id.to_string(),
                username: owner.username.clone(),
                role: owner.role.to_string(),
            },
            title: post.title().to_string(),
            description: post.description().to_string(),
            price: post.price().map(|p| p.value()),
            images: post.images().iter().map(ImageResponse::from).collect(),
            allow_comments: post.allow_comments(),
            allow_likes: post.allow_likes(),
            likes: post.likes(),
            liked_by: post.liked_by().map(ToString::to_string).collect(),
            created_at: *post.created_at(),
        }
    }
}

/// Result of a like toggle
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub post_id: String,
    /// Whether the caller likes the post now
    pub liked: bool,
    pub likes: usize,
    #[schema(example = "Post liked")]
    pub message: String,
}

impl From<LikeState> for LikeResponse {
    fn from(state: LikeState) -> Self {
        let message = if state.liked {
            "Post liked"
        } else {
            "Post unliked"
        };
        Self {
            post_id: state.post_id.to_string(),
            liked: state.liked,
            likes: state.likes,
            message: message.to_string(),
        }
    }
}

/// Feed pagination
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedQuery {
    /// 1-based page number (default 1)
    pub page: Option<usize>,
    /// Page size (default 20, at most 100)
    pub limit: Option<usize>,
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error description
    #[schema(example = "You can upload 1 to 4 images only")]
    pub error: String,
}
