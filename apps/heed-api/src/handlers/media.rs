//! Serves images kept by the in-memory object store
//!
//! With the S3 backend images are served by the bucket or its CDN and this
//! route always answers 404.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::AppState;

pub async fn serve_media(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    let object = state.media.as_ref().and_then(|store| store.get(&key));

    match object {
        Some(object) => (
            [(header::CONTENT_TYPE, object.content_type)],
            object.data,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
