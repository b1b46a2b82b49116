//! The pipeline entry point: classify, extract, authenticate, respond.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::diagnostics::DiagnosticsEmitter;
use crate::error::AuthError;
use crate::event::InboundEvent;
use crate::response::{self, AuthorizationDecision};
use crate::verifier::{ExternalVerifier, LocalVerifier, VerificationChain};

/// Unified authorization gateway.
///
/// Constructed once per process; every invocation runs the same strict
/// sequential pipeline. The only state shared across invocations is the
/// external verifier's signing-key cache.
pub struct Gateway {
    chain: VerificationChain,
    diagnostics: DiagnosticsEmitter,
    write_scope: String,
}

impl Gateway {
    pub fn new(config: &Config) -> Self {
        let local = LocalVerifier::new(
            &config.local_secret,
            config.token_audience.clone(),
            config.token_issuer.clone(),
        );
        let external = ExternalVerifier::for_cognito(
            &config.external_region,
            &config.external_user_pool_id,
            config.external_client_id.clone(),
            config.jwks_ttl_seconds,
        );
        Self::with_parts(
            VerificationChain::new(Arc::new(local), Arc::new(external)),
            DiagnosticsEmitter::new(config.debug_diagnostics),
            config.write_scope.clone(),
        )
    }

    /// Assemble a gateway from pre-built parts. Test seam.
    pub fn with_parts(
        chain: VerificationChain,
        diagnostics: DiagnosticsEmitter,
        write_scope: String,
    ) -> Self {
        Self {
            chain,
            diagnostics,
            write_scope,
        }
    }

    /// Authorize one inbound invocation, answering in the protocol-native
    /// shape for its variant.
    ///
    /// Only the Rest path can return an error: its hosting gateway
    /// expects deny to be raised. HttpApi and Graphql always get a
    /// normally returned decision, denied or not.
    pub async fn authorize(&self, raw: &Value) -> Result<Value, AuthError> {
        let event = InboundEvent::from_value(raw);
        self.diagnostics.emit("event.classified", &classified_fields(&event));

        let decision = match event.credential() {
            Ok(credential) => {
                self.diagnostics.emit_credential("credential.extracted", &credential);
                match self.chain.authenticate(&credential).await {
                    Ok(identity) => AuthorizationDecision::allow(&identity),
                    Err(err) => {
                        debug!("authentication failed: {err}");
                        AuthorizationDecision::deny()
                    }
                }
            }
            Err(err) => {
                debug!("credential extraction failed: {err}");
                AuthorizationDecision::deny()
            }
        };

        self.respond(&event, &decision)
    }

    fn respond(
        &self,
        event: &InboundEvent,
        decision: &AuthorizationDecision,
    ) -> Result<Value, AuthError> {
        let value = match event {
            InboundEvent::Rest(rest) => {
                let response = response::rest::build(decision, &rest.method_arn)?;
                serde_json::to_value(response)?
            }
            InboundEvent::HttpApi(_) => serde_json::to_value(response::http_api::build(decision))?,
            InboundEvent::Graphql(_) => {
                serde_json::to_value(response::graphql::build(decision, &self.write_scope))?
            }
        };
        Ok(value)
    }
}

fn classified_fields(event: &InboundEvent) -> Value {
    match event {
        InboundEvent::Rest(rest) => json!({
            "variant": event.kind().as_str(),
            "methodArn": rest.method_arn,
        }),
        InboundEvent::HttpApi(http) => json!({
            "variant": event.kind().as_str(),
            "routeKey": http.route_key,
        }),
        InboundEvent::Graphql(gql) => json!({
            "variant": event.kind().as_str(),
            "typeName": gql.request_context.type_name,
            "fieldName": gql.request_context.field_name,
            "operationName": gql.request_context.operation_name,
        }),
    }
}
