use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Gateway configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Symmetric secret for the local verifier
    pub local_secret: String,
    /// Expected `aud` on locally issued tokens
    pub token_audience: String,
    /// Expected `iss` on locally issued tokens
    pub token_issuer: String,
    /// External identity provider region (e.g. "us-east-1")
    pub external_region: String,
    /// External identity provider user pool id
    pub external_user_pool_id: String,
    /// App client id the external provider issued tokens for
    pub external_client_id: String,
    /// How long fetched signing keys stay valid
    pub jwks_ttl_seconds: i64,
    /// Scope token that grants GraphQL mutation access
    pub write_scope: String,
    /// Verbose diagnostics toggle
    pub debug_diagnostics: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            local_secret: env::var("LOCAL_JWT_SECRET")
                .context("LOCAL_JWT_SECRET must be set")?,
            token_audience: env::var("TOKEN_AUDIENCE")
                .context("TOKEN_AUDIENCE must be set")?,
            token_issuer: env::var("TOKEN_ISSUER")
                .context("TOKEN_ISSUER must be set")?,
            external_region: env::var("EXTERNAL_REGION")
                .context("EXTERNAL_REGION must be set")?,
            external_user_pool_id: env::var("EXTERNAL_USER_POOL_ID")
                .context("EXTERNAL_USER_POOL_ID must be set")?,
            external_client_id: env::var("EXTERNAL_CLIENT_ID")
                .context("EXTERNAL_CLIENT_ID must be set")?,
            jwks_ttl_seconds: parse_jwks_ttl(
                &env::var("JWKS_TTL_SECONDS").unwrap_or_else(|_| "3600".to_string()),
            )?,
            write_scope: env::var("WRITE_SCOPE")
                .unwrap_or_else(|_| "quests/write".to_string()),
            debug_diagnostics: env::var("AUTH_DEBUG")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}

/// A non-positive TTL would make every cache entry born expired and turn
/// each request into a key fetch, so it is rejected at startup.
fn parse_jwks_ttl(raw: &str) -> Result<i64> {
    let ttl: i64 = raw
        .parse()
        .context("JWKS_TTL_SECONDS must be a valid number")?;
    anyhow::ensure!(ttl > 0, "JWKS_TTL_SECONDS must be positive, got {ttl}");
    Ok(ttl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jwks_ttl_accepts_positive() {
        assert_eq!(parse_jwks_ttl("3600").unwrap(), 3600);
        assert_eq!(parse_jwks_ttl("1").unwrap(), 1);
    }

    #[test]
    fn test_parse_jwks_ttl_rejects_non_positive() {
        assert!(parse_jwks_ttl("0").is_err());
        assert!(parse_jwks_ttl("-5").is_err());
    }

    #[test]
    fn test_parse_jwks_ttl_rejects_garbage() {
        let err = parse_jwks_ttl("soon").unwrap_err();
        assert!(err.to_string().contains("JWKS_TTL_SECONDS"));
    }
}
