//! Legacy REST gateway responses.
//!
//! Allow returns an IAM policy document. Deny is surfaced as an error by
//! contract: the hosting gateway maps a raised "Unauthorized" to its 401
//! path and would treat a returned document as a policy to evaluate.

use std::collections::BTreeMap;

use serde::Serialize;

use super::AuthorizationDecision;
use crate::error::AuthError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestAuthorizerResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
    pub context: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub effect: String,
    pub action: String,
    pub resource: String,
}

/// Allow policy covering every verb and path of the invoked API stage.
pub fn allow_policy(
    principal_id: &str,
    method_arn: &str,
    context: BTreeMap<String, String>,
) -> RestAuthorizerResponse {
    RestAuthorizerResponse {
        principal_id: principal_id.to_string(),
        policy_document: PolicyDocument {
            version: "2012-10-17".to_string(),
            statement: vec![PolicyStatement {
                effect: "Allow".to_string(),
                action: "execute-api:Invoke".to_string(),
                resource: wildcard_resource(method_arn),
            }],
        },
        context,
    }
}

/// Build the REST decision. Only this builder can fail: deny is an error.
pub fn build(
    decision: &AuthorizationDecision,
    method_arn: &str,
) -> Result<RestAuthorizerResponse, AuthError> {
    if !decision.allowed {
        return Err(AuthError::Unauthorized);
    }
    let principal = decision.principal_id.clone().unwrap_or_default();
    Ok(allow_policy(&principal, method_arn, decision.context.clone()))
}

// arn:aws:execute-api:<region>:<account>:<api-id>/<stage>/<verb>/<path>
fn wildcard_resource(method_arn: &str) -> String {
    let mut parts = method_arn.splitn(3, '/');
    match (parts.next(), parts.next()) {
        (Some(base), Some(stage)) if !base.is_empty() => format!("{base}/{stage}/*/*"),
        _ => method_arn.to_string(),
    }
}
