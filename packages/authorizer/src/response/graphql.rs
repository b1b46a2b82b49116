//! GraphQL resolver-layer responses, including scope-based field denial.

use std::collections::BTreeMap;

use serde::Serialize;

use super::AuthorizationDecision;

/// Fixed resolver-decision cache TTL, independent of outcome.
pub const RESOLVER_TTL_SECONDS: u32 = 300;

const MUTATION_WILDCARD: &str = "Mutation.*";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlAuthorizerResponse {
    pub is_authorized: bool,
    pub resolver_context: BTreeMap<String, String>,
    pub denied_fields: Vec<String>,
    pub ttl_override: u32,
}

/// Build the GraphQL decision.
///
/// An authenticated caller without the write scope keeps read access but
/// loses every Mutation field. Field denial only applies to allowed
/// callers; a denied caller gets an empty list.
pub fn build(decision: &AuthorizationDecision, write_scope: &str) -> GraphqlAuthorizerResponse {
    let denied_fields = if decision.allowed && !decision.holds_scope(write_scope) {
        vec![MUTATION_WILDCARD.to_string()]
    } else {
        Vec::new()
    };

    GraphqlAuthorizerResponse {
        is_authorized: decision.allowed,
        resolver_context: decision.context.clone(),
        denied_fields,
        ttl_override: RESOLVER_TTL_SECONDS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{IdentityClaims, Provider};

    const WRITE_SCOPE: &str = "quests/write";

    fn identity(scopes: &[&str]) -> IdentityClaims {
        IdentityClaims {
            subject: "user-1".to_string(),
            email: None,
            scope: scopes.iter().map(|s| s.to_string()).collect(),
            token_use: None,
            provider: Provider::External,
        }
    }

    #[test]
    fn test_write_scope_keeps_mutations() {
        let decision = AuthorizationDecision::allow(&identity(&["quests/read", WRITE_SCOPE]));
        let response = build(&decision, WRITE_SCOPE);
        assert!(response.is_authorized);
        assert!(response.denied_fields.is_empty());
        assert_eq!(response.ttl_override, 300);
    }

    #[test]
    fn test_read_only_scope_denies_mutations() {
        let decision = AuthorizationDecision::allow(&identity(&["quests/read"]));
        let response = build(&decision, WRITE_SCOPE);
        assert!(response.is_authorized);
        assert_eq!(response.denied_fields, vec!["Mutation.*"]);
    }

    #[test]
    fn test_deny_has_no_denied_fields() {
        let response = build(&AuthorizationDecision::deny(), WRITE_SCOPE);
        assert!(!response.is_authorized);
        assert!(response.denied_fields.is_empty());
        assert_eq!(response.resolver_context["error"], "Unauthorized");
        assert_eq!(response.ttl_override, 300);
    }

    #[test]
    fn test_serialized_field_names() {
        let value =
            serde_json::to_value(build(&AuthorizationDecision::deny(), WRITE_SCOPE)).unwrap();
        assert_eq!(value["isAuthorized"], false);
        assert_eq!(value["resolverContext"]["error"], "Unauthorized");
        assert_eq!(value["deniedFields"], serde_json::json!([]));
        assert_eq!(value["ttlOverride"], 300);
    }
}
