//! Inbound event classification and credential extraction.
//!
//! Callers never declare which front-end an invocation came from; the
//! variant is inferred from the fields present in the raw payload.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::AuthError;

/// Header the AppSync data plane sets on VPC-endpoint requests. Its mere
/// presence marks the event as GraphQL.
pub const APPSYNC_VPCE_HEADER: &str = "x-amzn-appsync-is-vpce-request";

/// The three protocol variants this gateway answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Rest,
    HttpApi,
    Graphql,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Rest => "rest",
            EventKind::HttpApi => "http-api",
            EventKind::Graphql => "graphql",
        }
    }
}

/// Classify a raw invocation payload.
///
/// Total: every shape maps to some variant, with unrecognizable input
/// falling back to HttpApi (the most restrictive response contract).
/// `methodArn` takes absolute precedence, so a Rest event carrying
/// GraphQL-looking fields is still Rest.
pub fn classify(raw: &Value) -> EventKind {
    if present(raw.get("methodArn")) {
        return EventKind::Rest;
    }

    let ctx = raw.get("requestContext").unwrap_or(&Value::Null);
    let has = |key: &str| present(ctx.get(key));
    if has("apiId")
        || has("resolverArn")
        || has("graphqlSchemaVersion")
        || (has("typeName") && has("fieldName"))
    {
        return EventKind::Graphql;
    }
    if header_get(&collect_headers(raw), APPSYNC_VPCE_HEADER).is_some() {
        return EventKind::Graphql;
    }

    EventKind::HttpApi
}

fn present(value: Option<&Value>) -> bool {
    value.is_some_and(|v| !v.is_null())
}

/// Case-insensitive header lookup. Header maps are not guaranteed to
/// preserve the caller's casing.
pub fn header_get<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

fn collect_headers(raw: &Value) -> HashMap<String, String> {
    raw.get("headers")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Legacy token-based REST gateway event.
#[derive(Debug, Default)]
pub struct RestEvent {
    pub authorization_token: Option<String>,
    pub method_arn: String,
}

/// Header-based HTTP gateway event.
#[derive(Debug, Default)]
pub struct HttpApiEvent {
    pub route_key: Option<String>,
    pub headers: HashMap<String, String>,
}

/// GraphQL resolver-layer event.
#[derive(Debug, Default)]
pub struct GraphqlEvent {
    pub request_context: GraphqlRequestContext,
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Default)]
pub struct GraphqlRequestContext {
    pub api_id: Option<String>,
    pub type_name: Option<String>,
    pub field_name: Option<String>,
    pub operation_name: Option<String>,
}

/// Inbound invocation payload, classified into one protocol variant.
#[derive(Debug)]
pub enum InboundEvent {
    Rest(RestEvent),
    HttpApi(HttpApiEvent),
    Graphql(GraphqlEvent),
}

impl InboundEvent {
    /// Classify and parse a raw payload. Lenient on field types: a field
    /// of the wrong shape reads as absent rather than failing, keeping
    /// classification total.
    pub fn from_value(raw: &Value) -> Self {
        match classify(raw) {
            EventKind::Rest => InboundEvent::Rest(RestEvent {
                authorization_token: str_field(raw, "authorizationToken"),
                method_arn: str_field(raw, "methodArn").unwrap_or_default(),
            }),
            EventKind::HttpApi => InboundEvent::HttpApi(HttpApiEvent {
                route_key: str_field(raw, "routeKey"),
                headers: collect_headers(raw),
            }),
            EventKind::Graphql => {
                let ctx = raw.get("requestContext").unwrap_or(&Value::Null);
                InboundEvent::Graphql(GraphqlEvent {
                    request_context: GraphqlRequestContext {
                        api_id: str_field(ctx, "apiId"),
                        type_name: str_field(ctx, "typeName"),
                        field_name: str_field(ctx, "fieldName"),
                        operation_name: str_field(ctx, "operationName"),
                    },
                    headers: collect_headers(raw),
                })
            }
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            InboundEvent::Rest(_) => EventKind::Rest,
            InboundEvent::HttpApi(_) => EventKind::HttpApi,
            InboundEvent::Graphql(_) => EventKind::Graphql,
        }
    }

    /// Extract the bearer credential for this variant.
    ///
    /// Rest reads the dedicated `authorizationToken` field; the other two
    /// read the `authorization` header case-insensitively. A `Bearer `
    /// prefix is stripped when present. Absence or emptiness is terminal
    /// for the request.
    pub fn credential(&self) -> Result<String, AuthError> {
        let raw = match self {
            InboundEvent::Rest(event) => event.authorization_token.as_deref(),
            InboundEvent::HttpApi(event) => header_get(&event.headers, "authorization"),
            InboundEvent::Graphql(event) => header_get(&event.headers, "authorization"),
        };
        let raw = raw.ok_or(AuthError::MissingCredential)?;
        let token = raw.strip_prefix("Bearer ").unwrap_or(raw);
        if token.is_empty() {
            return Err(AuthError::MissingCredential);
        }
        Ok(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_arn_classifies_rest() {
        let event = json!({
            "authorizationToken": "Bearer abc",
            "methodArn": "arn:aws:execute-api:us-east-1:123:api/prod/GET/guilds"
        });
        assert_eq!(classify(&event), EventKind::Rest);
    }

    #[test]
    fn test_method_arn_beats_graphql_fields() {
        // A Rest event must never be misclassified as GraphQL, whatever
        // else it carries.
        let event = json!({
            "methodArn": "arn:aws:execute-api:us-east-1:123:api/prod/GET/guilds",
            "requestContext": { "apiId": "abc123", "typeName": "Query", "fieldName": "guild" }
        });
        assert_eq!(classify(&event), EventKind::Rest);
    }

    #[test]
    fn test_graphql_markers_classify_graphql() {
        for ctx in [
            json!({ "apiId": "abc123" }),
            json!({ "resolverArn": "arn:aws:appsync:us-east-1:123:apis/x" }),
            json!({ "graphqlSchemaVersion": "1" }),
            json!({ "typeName": "Mutation", "fieldName": "createQuest" }),
        ] {
            let event = json!({ "requestContext": ctx });
            assert_eq!(classify(&event), EventKind::Graphql);
        }
    }

    #[test]
    fn test_type_name_alone_is_not_graphql() {
        let event = json!({ "requestContext": { "typeName": "Query" } });
        assert_eq!(classify(&event), EventKind::HttpApi);
    }

    #[test]
    fn test_vendor_header_classifies_graphql() {
        let event = json!({ "headers": { "X-Amzn-Appsync-Is-Vpce-Request": "true" } });
        assert_eq!(classify(&event), EventKind::Graphql);
    }

    #[test]
    fn test_everything_else_is_http_api() {
        assert_eq!(classify(&json!({})), EventKind::HttpApi);
        assert_eq!(classify(&json!({ "version": "2.0", "routeKey": "GET /quests" })), EventKind::HttpApi);
        assert_eq!(classify(&json!({ "methodArn": null })), EventKind::HttpApi);
        assert_eq!(classify(&json!({ "headers": "bogus" })), EventKind::HttpApi);
        assert_eq!(classify(&json!([1, 2, 3])), EventKind::HttpApi);
    }

    #[test]
    fn test_rest_credential_strips_bearer() {
        let event = InboundEvent::from_value(&json!({
            "authorizationToken": "Bearer tok-1",
            "methodArn": "arn:aws:execute-api:us-east-1:123:api/prod/GET/guilds"
        }));
        assert_eq!(event.credential().unwrap(), "tok-1");
    }

    #[test]
    fn test_rest_credential_raw_token() {
        let event = InboundEvent::from_value(&json!({
            "authorizationToken": "tok-2",
            "methodArn": "arn:aws:execute-api:us-east-1:123:api/prod/GET/guilds"
        }));
        assert_eq!(event.credential().unwrap(), "tok-2");
    }

    #[test]
    fn test_rest_missing_token_fails() {
        let event = InboundEvent::from_value(&json!({
            "methodArn": "arn:aws:execute-api:us-east-1:123:api/prod/GET/guilds",
            "headers": {}
        }));
        let err = event.credential().unwrap_err();
        assert!(err.to_string().contains("No token provided"));
    }

    #[test]
    fn test_http_api_header_lookup_is_case_insensitive() {
        let event = InboundEvent::from_value(&json!({
            "routeKey": "GET /quests",
            "headers": { "Authorization": "Bearer X" }
        }));
        assert_eq!(event.kind(), EventKind::HttpApi);
        assert_eq!(event.credential().unwrap(), "X");
    }

    #[test]
    fn test_empty_bearer_value_fails() {
        let event = InboundEvent::from_value(&json!({
            "headers": { "authorization": "Bearer " }
        }));
        let err = event.credential().unwrap_err();
        assert!(err.to_string().contains("No token provided"));
    }

    #[test]
    fn test_graphql_event_parses_request_context() {
        let event = InboundEvent::from_value(&json!({
            "requestContext": {
                "apiId": "abc123",
                "typeName": "Mutation",
                "fieldName": "createQuest",
                "operationName": "CreateQuest"
            },
            "headers": { "authorization": "Bearer tok-3" }
        }));
        match &event {
            InboundEvent::Graphql(gql) => {
                assert_eq!(gql.request_context.api_id.as_deref(), Some("abc123"));
                assert_eq!(gql.request_context.field_name.as_deref(), Some("createQuest"));
            }
            other => panic!("expected graphql event, got {other:?}"),
        }
        assert_eq!(event.credential().unwrap(), "tok-3");
    }
}
