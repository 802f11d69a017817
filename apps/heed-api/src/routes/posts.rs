//! Post routes

use axum::{
    routing::{get, put},
    Router,
};

use crate::{
    handlers::{likes, media, posts},
    AppState,
};

/// Create post, feed and like routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(posts::list_feed).post(posts::create_post))
        .route("/api/posts/mine", get(posts::list_mine))
        .route("/api/posts/:id", get(posts::get_post))
        .route("/api/posts/:id/like", put(likes::toggle_like))
        .route("/media/*key", get(media::serve_media))
}
