//! API routes

pub mod posts;

#[cfg(test)]
mod tests;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    dto::posts::{
        CreatePostForm, ErrorResponse, ImageResponse, LikeResponse, OwnerResponse, PostResponse,
    },
    handlers, AppState,
};

/// Form parts other than the images themselves
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::posts::create_post,
        handlers::posts::list_feed,
        handlers::posts::list_mine,
        handlers::posts::get_post,
        handlers::likes::toggle_like,
        health_handler
    ),
    components(
        schemas(
            CreatePostForm,
            PostResponse,
            OwnerResponse,
            ImageResponse,
            LikeResponse,
            ErrorResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "posts", description = "Publishing and browsing posts"),
        (name = "likes", description = "Liking posts"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "Heed API",
        version = "0.1.0",
        description = "Image posts with dual-resolution renditions, a paginated feed and likes"
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let body_limit = state
        .ingestion
        .config()
        .max_image_bytes
        .saturating_mul(heed_domain::post::MAX_IMAGES)
        .saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(posts::routes())
        .route("/health", axum::routing::get(health_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    ),
    tag = "health"
)]
async fn health_handler() -> &'static str {
    "OK"
}
