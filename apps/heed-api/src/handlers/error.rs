//! Mapping of domain errors to HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use heed_domain::PostError;
use tracing::{error, warn};

use crate::dto::posts::ErrorResponse;

/// A failed request
///
/// Client faults carry their message to the caller. Server faults are logged
/// with full detail and answered with a generic message.
#[derive(Debug)]
pub struct ApiError(pub PostError);

impl From<PostError> for ApiError {
    fn from(err: PostError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PostError::Validation(_) => StatusCode::BAD_REQUEST,
            PostError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PostError::Forbidden(_) => StatusCode::FORBIDDEN,
            PostError::NotFound(_) => StatusCode::NOT_FOUND,
            PostError::Transcode(_) | PostError::Upload(_) | PostError::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.0.is_client_error() {
            warn!(status = status.as_u16(), error = %self.0, "Request rejected");
            self.0.to_string()
        } else {
            error!(error = %self.0, "Request failed");
            "Internal server error".to_string()
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
