use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::TokenVerifier;
use crate::claims::{IdentityClaims, Provider};
use crate::error::AuthError;

/// Clock-skew tolerance for `exp`/`nbf`, applied identically on both
/// verification paths so the fallback order never changes an expiry
/// outcome.
pub const LEEWAY_SECONDS: u64 = 30;

/// Claims carried by locally issued tokens.
///
/// Every field except `email` and `scope` is required; a token missing
/// one fails deserialization and therefore verification.
#[derive(Debug, Serialize, Deserialize)]
struct LocalClaims {
    sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    exp: i64,
    iat: i64,
    nbf: i64,
    aud: String,
    iss: String,
}

/// Local verifier - issues and verifies HMAC-SHA256 tokens against the
/// process-configured secret. No network I/O; this is the fast path.
#[derive(Clone)]
pub struct LocalVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    audience: String,
    issuer: String,
}

impl LocalVerifier {
    pub fn new(secret: &str, audience: String, issuer: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            audience,
            issuer,
        }
    }

    /// Issue a token for downstream services (and tests).
    ///
    /// Token expires after 1 hour.
    pub fn issue(
        &self,
        subject: &str,
        email: Option<&str>,
        scopes: &[&str],
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = LocalClaims {
            sub: subject.to_string(),
            email: email.map(str::to_string),
            scope: if scopes.is_empty() {
                None
            } else {
                Some(scopes.join(" "))
            },
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            aud: self.audience.clone(),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Verification(e.to_string()))
    }

    /// Verify a credential against the process secret.
    ///
    /// Requires `exp`, `iat`, `nbf`, `aud`, `iss` and `sub`, and checks
    /// audience and issuer against the configured values.
    pub fn verify(&self, credential: &str) -> Result<IdentityClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = LEEWAY_SECONDS;
        validation.validate_nbf = true;
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "nbf", "aud", "iss", "sub"]);

        let data = decode::<LocalClaims>(credential, &self.decoding_key, &validation)
            .map_err(|e| AuthError::Verification(e.to_string()))?;
        let claims = data.claims;

        Ok(IdentityClaims {
            subject: claims.sub,
            email: claims.email,
            scope: claims
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            token_use: None,
            provider: Provider::Local,
        })
    }
}

#[async_trait]
impl TokenVerifier for LocalVerifier {
    async fn verify(&self, credential: &str) -> Result<IdentityClaims, AuthError> {
        LocalVerifier::verify(self, credential)
    }
}
