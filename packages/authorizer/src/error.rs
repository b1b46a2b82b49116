use thiserror::Error;

/// Errors produced by the authorization gateway.
///
/// `MissingCredential` and `Unauthorized` are both surfaced externally as
/// the same opaque "Unauthorized" outcome; the distinction exists only so
/// the pipeline can skip verification when no credential was presented.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No bearer credential in the event. Terminal: verification is never
    /// attempted without a credential.
    #[error("No token provided")]
    MissingCredential,

    /// A single verifier rejected the credential. Recoverable inside the
    /// chain, which falls through to the next verifier.
    #[error("Credential rejected: {0}")]
    Verification(String),

    /// Every verifier rejected the credential. Carries no detail about
    /// which step failed.
    #[error("Unauthorized")]
    Unauthorized,

    /// The external provider's signing keys could not be fetched or parsed.
    #[error("Key source unavailable: {0}")]
    KeySource(String),

    #[error("Response serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
