use std::sync::Arc;

use tracing::debug;

use super::TokenVerifier;
use crate::claims::IdentityClaims;
use crate::error::AuthError;

/// Orders the verifiers: the local symmetric check runs first because it
/// is cheap and covers the common case; the external provider is
/// consulted only when the local check rejects. One pass through each
/// verifier per request, no retries.
pub struct VerificationChain {
    primary: Arc<dyn TokenVerifier>,
    fallback: Arc<dyn TokenVerifier>,
}

impl VerificationChain {
    pub fn new(primary: Arc<dyn TokenVerifier>, fallback: Arc<dyn TokenVerifier>) -> Self {
        Self { primary, fallback }
    }

    /// Authenticate a credential against the chain.
    ///
    /// The terminal error is always the same opaque "Unauthorized" and
    /// never reveals which verifier rejected the credential.
    pub async fn authenticate(&self, credential: &str) -> Result<IdentityClaims, AuthError> {
        match self.primary.verify(credential).await {
            Ok(identity) => return Ok(identity),
            Err(err) => debug!("primary verifier rejected credential: {err}"),
        }

        match self.fallback.verify(credential).await {
            Ok(identity) => Ok(identity),
            Err(err) => {
                debug!("fallback verifier rejected credential: {err}");
                Err(AuthError::Unauthorized)
            }
        }
    }
}
