use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::debug;

use super::local::LEEWAY_SECONDS;
use super::TokenVerifier;
use crate::claims::{IdentityClaims, Provider};
use crate::error::AuthError;

/// One key from the provider's JWKS document.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kid: String,
    pub kty: String,
    pub n: String,
    pub e: String,
    #[serde(default)]
    pub alg: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

/// Where signing keys come from. Injected into the verifier so tests can
/// substitute a fake for the network fetch.
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, AuthError>;
}

/// Fetches the JWKS document from a Cognito-style issuer over HTTPS.
pub struct CognitoKeySource {
    client: reqwest::Client,
    url: String,
}

impl CognitoKeySource {
    pub fn new(region: &str, user_pool_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!(
                "https://cognito-idp.{region}.amazonaws.com/{user_pool_id}/.well-known/jwks.json"
            ),
        }
    }
}

#[async_trait]
impl KeySource for CognitoKeySource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        debug!("fetching signing keys from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AuthError::KeySource(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::KeySource(e.to_string()))?;

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeySource(e.to_string()))
    }
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    expires_at: DateTime<Utc>,
}

/// Process-wide signing-key cache with a TTL refresh lifecycle
/// independent of any single request.
///
/// Refresh is replace-on-expiry: the whole entry is swapped out under a
/// short write lock, never mutated in place, so concurrent readers only
/// ever observe a complete key set.
struct JwksCache {
    inner: RwLock<Option<CachedKeys>>,
    ttl: Duration,
}

impl JwksCache {
    fn new(ttl_seconds: i64) -> Self {
        Self {
            inner: RwLock::new(None),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    fn get(&self, kid: &str) -> Option<DecodingKey> {
        let guard = self.inner.read().ok()?;
        let cached = guard.as_ref()?;
        if cached.expires_at <= Utc::now() {
            return None;
        }
        cached.keys.get(kid).cloned()
    }

    fn replace(&self, keys: HashMap<String, DecodingKey>) {
        let entry = CachedKeys {
            keys,
            expires_at: Utc::now() + self.ttl,
        };
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(entry);
        }
    }
}

/// Claims on externally issued tokens. Access tokens carry `client_id`
/// and a space-separated `scope`; id tokens carry `aud` and `email`.
#[derive(Debug, Deserialize)]
struct ExternalClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_use: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    aud: Option<String>,
}

/// External verifier - validates RS256 tokens issued by the remote
/// identity provider against its published signing keys.
pub struct ExternalVerifier {
    source: Arc<dyn KeySource>,
    cache: JwksCache,
    issuer: String,
    client_id: String,
}

impl ExternalVerifier {
    pub fn new(
        source: Arc<dyn KeySource>,
        issuer: String,
        client_id: String,
        jwks_ttl_seconds: i64,
    ) -> Self {
        Self {
            source,
            cache: JwksCache::new(jwks_ttl_seconds),
            issuer,
            client_id,
        }
    }

    /// Wire up the verifier for a Cognito user pool.
    pub fn for_cognito(
        region: &str,
        user_pool_id: &str,
        client_id: String,
        jwks_ttl_seconds: i64,
    ) -> Self {
        let issuer = format!("https://cognito-idp.{region}.amazonaws.com/{user_pool_id}");
        Self::new(
            Arc::new(CognitoKeySource::new(region, user_pool_id)),
            issuer,
            client_id,
            jwks_ttl_seconds,
        )
    }

    /// Resolve the decoding key for a `kid`, refreshing the cache on a
    /// miss. An unknown `kid` after a fresh fetch is a verification
    /// failure, not a crash.
    async fn signing_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.cache.get(kid) {
            return Ok(key);
        }

        let set = self.source.fetch().await?;
        let mut keys = HashMap::new();
        for jwk in &set.keys {
            if jwk.kty != "RSA" {
                continue;
            }
            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    keys.insert(jwk.kid.clone(), key);
                }
                Err(err) => debug!("skipping unusable jwk {}: {err}", jwk.kid),
            }
        }
        self.cache.replace(keys);

        self.cache
            .get(kid)
            .ok_or_else(|| AuthError::Verification(format!("no signing key matches kid {kid}")))
    }

    pub async fn verify(&self, credential: &str) -> Result<IdentityClaims, AuthError> {
        let header = decode_header(credential).map_err(|e| AuthError::Verification(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::Verification("token header carries no kid".to_string()))?;
        let key = self.signing_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = LEEWAY_SECONDS;
        validation.set_issuer(&[&self.issuer]);
        // Access tokens carry client_id instead of aud; both are checked
        // against the configured client below.
        validation.validate_aud = false;

        let data = decode::<ExternalClaims>(credential, &key, &validation)
            .map_err(|e| AuthError::Verification(e.to_string()))?;
        let claims = data.claims;

        let audience = claims.client_id.as_deref().or(claims.aud.as_deref());
        if audience != Some(self.client_id.as_str()) {
            return Err(AuthError::Verification(
                "token was issued for a different client".to_string(),
            ));
        }

        Ok(IdentityClaims {
            subject: claims.sub,
            email: claims.email,
            scope: claims
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            token_use: claims.token_use,
            provider: Provider::External,
        })
    }
}

#[async_trait]
impl TokenVerifier for ExternalVerifier {
    async fn verify(&self, credential: &str) -> Result<IdentityClaims, AuthError> {
        ExternalVerifier::verify(self, credential).await
    }
}
