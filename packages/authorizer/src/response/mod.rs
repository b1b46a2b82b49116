//! Per-protocol decision builders over a shared protocol-agnostic
//! `AuthorizationDecision`.

pub mod graphql;
pub mod http_api;
pub mod rest;

pub use graphql::{GraphqlAuthorizerResponse, RESOLVER_TTL_SECONDS};
pub use http_api::HttpApiAuthorizerResponse;
pub use rest::{allow_policy, PolicyDocument, PolicyStatement, RestAuthorizerResponse};

use std::collections::BTreeMap;

use crate::claims::IdentityClaims;

/// Protocol-agnostic outcome of the verification chain, consumed by the
/// per-protocol builders.
#[derive(Debug, Clone)]
pub struct AuthorizationDecision {
    pub allowed: bool,
    pub principal_id: Option<String>,
    pub context: BTreeMap<String, String>,
}

impl AuthorizationDecision {
    pub fn allow(identity: &IdentityClaims) -> Self {
        Self {
            allowed: true,
            principal_id: Some(identity.subject.clone()),
            context: identity.context(),
        }
    }

    /// Every deny looks the same regardless of what actually failed.
    pub fn deny() -> Self {
        let mut context = BTreeMap::new();
        context.insert("error".to_string(), "Unauthorized".to_string());
        Self {
            allowed: false,
            principal_id: None,
            context,
        }
    }

    fn holds_scope(&self, scope: &str) -> bool {
        self.context
            .get("scope")
            .is_some_and(|s| s.split_whitespace().any(|token| token == scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::Provider;

    #[test]
    fn test_allow_carries_identity_context() {
        let identity = IdentityClaims {
            subject: "user-1".to_string(),
            email: None,
            scope: vec!["quests/write".to_string()],
            token_use: None,
            provider: Provider::Local,
        };
        let decision = AuthorizationDecision::allow(&identity);
        assert!(decision.allowed);
        assert_eq!(decision.principal_id.as_deref(), Some("user-1"));
        assert!(decision.holds_scope("quests/write"));
        assert!(!decision.holds_scope("guilds/write"));
    }

    #[test]
    fn test_deny_is_uniform() {
        let decision = AuthorizationDecision::deny();
        assert!(!decision.allowed);
        assert_eq!(decision.principal_id, None);
        assert_eq!(decision.context["error"], "Unauthorized");
        assert!(!decision.holds_scope("quests/write"));
    }
}
