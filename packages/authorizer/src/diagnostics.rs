//! Togglable structured diagnostics.
//!
//! A no-op unless the debug toggle is on. Credentials are never logged
//! raw: they are reduced to a `TokenHint` (kid, algorithm, length) plus
//! non-sensitive peeked claims before anything reaches the log stream.

use serde_json::{json, Value};
use tracing::debug;

use crate::claims::{peek_claims, token_hint};

pub struct DiagnosticsEmitter {
    enabled: bool,
}

impl DiagnosticsEmitter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Render one single-line JSON record, or `None` when diagnostics are
    /// off. Split from `emit` so tests can assert on output without
    /// capturing the subscriber.
    pub fn render(&self, event_name: &str, fields: &Value) -> Option<String> {
        if !self.enabled {
            return None;
        }
        Some(json!({ "event": event_name, "fields": fields }).to_string())
    }

    /// Emit a record. No-op unless the debug toggle is on.
    pub fn emit(&self, event_name: &str, fields: &Value) {
        if let Some(line) = self.render(event_name, fields) {
            debug!(target: "authorizer::diagnostics", "{line}");
        }
    }

    /// Render a record about a credential: its hint plus the issuer and
    /// token_use peeked from the unverified claims body. The raw
    /// credential never reaches the output.
    pub fn render_credential(&self, event_name: &str, credential: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let peeked = peek_claims(credential).unwrap_or(Value::Null);
        self.render(
            event_name,
            &json!({
                "token_hint": token_hint(credential),
                "iss": peeked.get("iss"),
                "token_use": peeked.get("token_use"),
            }),
        )
    }

    /// Emit a record about a credential. No-op unless the debug toggle is
    /// on.
    pub fn emit_credential(&self, event_name: &str, credential: &str) {
        if let Some(line) = self.render_credential(event_name, credential) {
            debug!(target: "authorizer::diagnostics", "{line}");
        }
    }
}
