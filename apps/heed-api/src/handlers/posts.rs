//! Post creation and feed handlers

use axum::{
    extract::{multipart::MultipartError, rejection::QueryRejection, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use heed_domain::{PostError, PostId, PostSubmission, RawImage};
use tracing::{debug, info};

use crate::{
    auth::AuthUser,
    dto::posts::{CreatePostForm, ErrorResponse, FeedQuery, PostResponse},
    handlers::error::ApiError,
    AppState,
};

/// Publish a post with one to four images
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body(content = CreatePostForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid form, image count or price", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Image processing or storage failed", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let submission = read_submission(multipart).await?;
    info!(
        owner = %identity.id,
        images = submission.images.len(),
        "Received create post request"
    );

    let post = state.ingestion.create_post(&identity, submission).await?;
    Ok((StatusCode::CREATED, Json(PostResponse::from(&post))))
}

/// One page of the feed, newest first
#[utoipa::path(
    get,
    path = "/api/posts",
    params(FeedQuery),
    responses(
        (status = 200, description = "Feed page", body = [PostResponse]),
        (status = 400, description = "Invalid page or limit", body = ErrorResponse)
    ),
    tag = "posts"
)]
pub async fn list_feed(
    State(state): State<AppState>,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let Query(query) = query.map_err(|e| PostError::validation(e.body_text()))?;
    let page = query.page.unwrap_or(1);
    let limit = query
        .limit
        .unwrap_or(state.feed.config().default_page_size);

    let posts = state.feed.list_feed(page, limit).await?;
    Ok(Json(posts.iter().map(PostResponse::from).collect()))
}

/// Every post of the caller, newest first
#[utoipa::path(
    get,
    path = "/api/posts/mine",
    responses(
        (status = 200, description = "The caller's posts", body = [PostResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
pub async fn list_mine(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    let posts = state.feed.list_by_owner(&identity.id).await?;
    Ok(Json(posts.iter().map(PostResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "The post", body = PostResponse),
        (status = 400, description = "Malformed post id", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    tag = "posts"
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let post_id: PostId = id.parse()?;
    let post = state.feed.get_by_id(&post_id).await?;
    Ok(Json(PostResponse::from(&post)))
}

async fn read_submission(mut multipart: Multipart) -> Result<PostSubmission, PostError> {
    let mut submission = PostSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == "images" {
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await.map_err(form_error)?;
            let mut image = RawImage::new(data);
            if let Some(file_name) = file_name {
                image = image.with_file_name(file_name);
            }
            submission.images.push(image);
            continue;
        }

        let value = field.text().await.map_err(form_error)?;
        match name.as_str() {
            "title" => submission.title = value,
            "description" => submission.description = value,
            "price" => submission.price = Some(value),
            "allowComments" => submission.allow_comments = Some(parse_flag(&name, &value)?),
            "allowLikes" => submission.allow_likes = Some(parse_flag(&name, &value)?),
            _ => debug!(field = %name, "Ignoring unknown form field"),
        }
    }

    Ok(submission)
}

fn parse_flag(name: &str, value: &str) -> Result<bool, PostError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(PostError::validation(format!(
            "{name} must be true or false"
        ))),
    }
}

fn form_error(err: MultipartError) -> PostError {
    PostError::validation(format!("Invalid form data: {}", err.body_text()))
}
