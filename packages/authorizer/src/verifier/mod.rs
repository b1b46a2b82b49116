//! Credential verification: the local symmetric path, the external
//! JWKS-backed path, and the chain that orders them.

mod chain;
mod external;
mod local;

pub use chain::VerificationChain;
pub use external::{CognitoKeySource, ExternalVerifier, Jwk, JwkSet, KeySource};
pub use local::{LocalVerifier, LEEWAY_SECONDS};

use async_trait::async_trait;

use crate::claims::IdentityClaims;
use crate::error::AuthError;

/// Seam between the chain and individual verifiers, so tests can
/// substitute stubs for either path.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<IdentityClaims, AuthError>;
}
