use thiserror::Error;

/// Closed set of ways claim generation or verification can fail.
///
/// Every failure short-circuits verification; no partial-success state is
/// ever returned. Callers branch on the variant, never on message text.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("nonce must not be empty")]
    NonceEmpty,

    #[error("malformed evidence, cannot extract digest history: {0}")]
    EvidenceMalformed(String),

    #[error("failed to decode attestation evidence: {0}")]
    EvidenceDecode(String),

    #[error("evidence signer does not chain to any trusted attestation key")]
    UntrustedSigner,

    #[error("evidence signature verification failed")]
    SignatureInvalid,

    #[error("evidence nonce does not match the nonce required by the verifier")]
    NonceMismatch,

    #[error("secure boot not enabled")]
    SecureBootDisabled,

    #[error("measurement register {register} failed appraisal policy (got {digest})")]
    PolicyViolation { register: u32, digest: String },

    #[error("digest history diverges from evidence quotes at index {index}")]
    HistoryMismatch { index: usize },

    #[error("no trusted attestation keys configured")]
    NoTrustedKeysConfigured,

    #[error("appraisal policy unavailable: {0}")]
    PolicyUnavailable(String),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
