// Guildhall Gamification Platform - Authorization Gateway Core
//
// Single entry point invoked on every inbound request across the three
// API front-ends (legacy REST gateway, header-based HTTP gateway, GraphQL
// resolver layer). Classifies the invocation, authenticates the bearer
// credential through the local-then-external verifier chain, and answers
// in each protocol's native decision shape.

pub mod claims;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod gateway;
pub mod response;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use claims::{IdentityClaims, Provider, TokenHint};
pub use config::Config;
pub use error::AuthError;
pub use event::{EventKind, InboundEvent};
pub use gateway::Gateway;
pub use response::AuthorizationDecision;
