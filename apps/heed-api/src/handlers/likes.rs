//! Like toggle handler

use axum::{
    extract::{Path, State},
    Json,
};
use heed_domain::PostId;

use crate::{
    auth::AuthUser,
    dto::posts::{ErrorResponse, LikeResponse},
    handlers::error::ApiError,
    AppState,
};

/// Like a post, or unlike it if the caller already likes it
#[utoipa::path(
    put,
    path = "/api/posts/{id}/like",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Like toggled", body = LikeResponse),
        (status = 400, description = "Malformed post id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Likes are disabled for this post", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "likes"
)]
pub async fn toggle_like(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<LikeResponse>, ApiError> {
    let post_id: PostId = id.parse()?;
    let like = state.engagement.toggle_like(&post_id, &identity).await?;
    Ok(Json(LikeResponse::from(like)))
}
