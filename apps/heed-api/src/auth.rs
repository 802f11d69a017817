//! JWT authentication
//!
//! [`JwtAuthGate`] implements the `AuthGate` port for HS256 bearer tokens.
//! [`AuthUser`] is the axum extractor handlers use to require a caller.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use heed_domain::ports::AuthGate;
use heed_domain::{Identity, PostError, Role};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::debug;

use crate::handlers::error::ApiError;
use crate::AppState;

/// JWT claims
///
/// `_id` and `userType` are accepted as aliases of `sub` and `role`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(alias = "_id")]
    pub sub: String,
    #[serde(default)]
    pub username: String,
    #[serde(alias = "userType")]
    pub role: String,
    pub exp: u64,
}

pub struct JwtAuthGate {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthGate {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    fn decode_identity(&self, token: &str) -> Result<Identity, PostError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!(error = %e, "Token rejected");
            PostError::unauthorized(format!("Invalid token: {e}"))
        })?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() {
            return Err(PostError::unauthorized("Token has no subject"));
        }
        let role: Role = claims
            .role
            .parse()
            .map_err(|e| PostError::unauthorized(format!("Invalid token: {e}")))?;

        Ok(Identity::new(claims.sub, claims.username, role))
    }
}

impl AuthGate for JwtAuthGate {
    fn verify(&self, credential: &str) -> impl Future<Output = Result<Identity, PostError>> + Send {
        let result = self.decode_identity(credential);
        async move { result }
    }
}

/// The authenticated caller of a request
///
/// Rejects with 401 when the `Authorization: Bearer <token>` header is
/// missing, malformed or carries an invalid token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| PostError::unauthorized("Missing Authorization header"))?;
        let value = header
            .to_str()
            .map_err(|_| PostError::unauthorized("Invalid Authorization header"))?;
        let token = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| PostError::unauthorized("Authorization must use Bearer scheme"))?;

        let identity = state.auth.verify(token).await?;
        Ok(AuthUser(identity))
    }
}
