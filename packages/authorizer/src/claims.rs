//! Canonical identity claims and unverified credential peeking.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Serialize;
use serde_json::Value;

/// Which verifier produced the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Local,
    External,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Local => "local",
            Provider::External => "external",
        }
    }
}

/// Canonical identity record produced by a successful verification.
///
/// Never constructed from unverified data: the only constructors live in
/// the verifiers.
#[derive(Debug, Clone)]
pub struct IdentityClaims {
    pub subject: String,
    pub email: Option<String>,
    pub scope: Vec<String>,
    pub token_use: Option<String>,
    pub provider: Provider,
}

impl IdentityClaims {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.iter().any(|s| s == scope)
    }

    /// Flattened identity map surfaced to downstream services through the
    /// protocol response's context.
    pub fn context(&self) -> BTreeMap<String, String> {
        let mut ctx = BTreeMap::new();
        ctx.insert("provider".to_string(), self.provider.as_str().to_string());
        ctx.insert("sub".to_string(), self.subject.clone());
        if let Some(email) = &self.email {
            ctx.insert("email".to_string(), email.clone());
        }
        if !self.scope.is_empty() {
            ctx.insert("scope".to_string(), self.scope.join(" "));
        }
        ctx
    }
}

/// Safe summary of a credential for diagnostics: header metadata and
/// length only, never token material.
#[derive(Debug, Clone, Serialize)]
pub struct TokenHint {
    pub kid: Option<String>,
    pub alg: String,
    pub len: usize,
}

/// Decode a credential's header without verifying the signature.
///
/// Infallible: a malformed credential still yields a hint (with an
/// unknown algorithm) so diagnostics never lose the record.
pub fn token_hint(credential: &str) -> TokenHint {
    match jsonwebtoken::decode_header(credential) {
        Ok(header) => TokenHint {
            kid: header.kid,
            alg: format!("{:?}", header.alg),
            len: credential.len(),
        },
        Err(_) => TokenHint {
            kid: None,
            alg: "unknown".to_string(),
            len: credential.len(),
        },
    }
}

/// Decode a credential's claims body without verifying the signature.
/// Diagnostics only; verified identities come from the verifier chain.
pub fn peek_claims(credential: &str) -> Option<Value> {
    let body = credential.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(body).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn sample_token() -> String {
        let mut header = Header::default();
        header.kid = Some("key-1".to_string());
        encode(
            &header,
            &json!({ "sub": "user-1", "exp": 4102444800i64 }),
            &EncodingKey::from_secret(b"peek_secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_token_hint_from_valid_token() {
        let token = sample_token();
        let hint = token_hint(&token);
        assert_eq!(hint.kid.as_deref(), Some("key-1"));
        assert_eq!(hint.alg, "HS256");
        assert_eq!(hint.len, token.len());
    }

    #[test]
    fn test_token_hint_from_garbage() {
        let hint = token_hint("not-a-jwt");
        assert_eq!(hint.kid, None);
        assert_eq!(hint.alg, "unknown");
        assert_eq!(hint.len, 9);
    }

    #[test]
    fn test_peek_claims_without_verification() {
        let token = sample_token();
        let claims = peek_claims(&token).unwrap();
        assert_eq!(claims["sub"], "user-1");
    }

    #[test]
    fn test_peek_claims_garbage_is_none() {
        assert!(peek_claims("abc").is_none());
        assert!(peek_claims("a.!!!.c").is_none());
    }

    #[test]
    fn test_context_includes_identity_fields() {
        let identity = IdentityClaims {
            subject: "user-42".to_string(),
            email: Some("player@example.com".to_string()),
            scope: vec!["quests/read".to_string(), "quests/write".to_string()],
            token_use: None,
            provider: Provider::Local,
        };
        let ctx = identity.context();
        assert_eq!(ctx["provider"], "local");
        assert_eq!(ctx["sub"], "user-42");
        assert_eq!(ctx["email"], "player@example.com");
        assert_eq!(ctx["scope"], "quests/read quests/write");
        assert!(identity.has_scope("quests/write"));
        assert!(!identity.has_scope("guilds/write"));
    }

    #[test]
    fn test_context_omits_absent_fields() {
        let identity = IdentityClaims {
            subject: "user-42".to_string(),
            email: None,
            scope: vec![],
            token_use: None,
            provider: Provider::External,
        };
        let ctx = identity.context();
        assert_eq!(ctx["provider"], "external");
        assert!(!ctx.contains_key("email"));
        assert!(!ctx.contains_key("scope"));
    }
}
