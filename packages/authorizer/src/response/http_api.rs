//! HTTP gateway simple responses. Never errors: deny is a normally
//! returned decision.

use std::collections::BTreeMap;

use serde::Serialize;

use super::AuthorizationDecision;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpApiAuthorizerResponse {
    pub is_authorized: bool,
    pub context: BTreeMap<String, String>,
}

pub fn build(decision: &AuthorizationDecision) -> HttpApiAuthorizerResponse {
    HttpApiAuthorizerResponse {
        is_authorized: decision.allowed,
        context: decision.context.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{IdentityClaims, Provider};

    #[test]
    fn test_allow_surfaces_identity_context() {
        let identity = IdentityClaims {
            subject: "user-1".to_string(),
            email: Some("player@example.com".to_string()),
            scope: vec![],
            token_use: None,
            provider: Provider::Local,
        };
        let response = build(&AuthorizationDecision::allow(&identity));
        assert!(response.is_authorized);
        assert_eq!(response.context["sub"], "user-1");
        assert_eq!(response.context["provider"], "local");
    }

    #[test]
    fn test_deny_returns_instead_of_erroring() {
        let response = build(&AuthorizationDecision::deny());
        assert!(!response.is_authorized);
        assert_eq!(response.context["error"], "Unauthorized");
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(build(&AuthorizationDecision::deny())).unwrap();
        assert_eq!(value["isAuthorized"], false);
        assert_eq!(value["context"]["error"], "Unauthorized");
    }
}
