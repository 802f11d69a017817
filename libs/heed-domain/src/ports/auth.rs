//! Authentication port

use std::future::Future;

use crate::identity::Identity;
use crate::post::PostError;

/// Port for credential verification
///
/// Credential issuance and user administration live outside this system.
/// The gate only turns a presented credential into an [`Identity`].
pub trait AuthGate: Send + Sync {
    /// Verify `credential` and return the caller's identity
    ///
    /// # Errors
    ///
    /// Returns `PostError::Unauthorized` if the credential is missing,
    /// malformed, expired or otherwise invalid
    fn verify(&self, credential: &str) -> impl Future<Output = Result<Identity, PostError>> + Send;
}
