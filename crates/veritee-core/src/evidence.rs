//! Attestation evidence decoding and signature verification.
//!
//! Raw evidence is a JSON envelope around an opaque machine-state body.
//! Both the TEE attestation-key signature and the platform security
//! module signature cover the exact body bytes, so the generator can
//! extract the digest history structurally while the verifier
//! re-validates the very same bytes cryptographically.

use std::collections::BTreeMap;
use std::fmt;

use ed25519_dalek::{Signature, Verifier as _, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::encoding;
use crate::error::{Result, VerifyError};
use crate::trust::TrustStore;

/// A single measurement digest, hex-encoded on the wire.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest(#[serde(with = "hex::serde")] Vec<u8>);

impl Digest {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", hex::encode(&self.0))
    }
}

/// Signed snapshot of the measurement state at one point in execution.
/// Sequence position is implicit in the order quotes appear in the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub digest: Digest,
}

/// Machine state recovered from authenticated evidence.
///
/// Constructed fresh per verification call and never cached; at this
/// point the signature chain and nonce are checked, but the state is
/// still unvalidated against any appraisal policy.
#[derive(Debug, Clone)]
pub struct DecodedMachineState {
    pub secure_boot: bool,
    pub registers: BTreeMap<u32, Digest>,
    pub quotes: Vec<Quote>,
}

/// Outer evidence structure as emitted by the attestation subsystem.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct EvidenceEnvelope {
    /// Machine-state body, kept as raw bytes so signatures stay valid.
    #[serde(with = "encoding::base64_bytes")]
    pub(crate) body: Vec<u8>,
    /// TEE attestation key (Ed25519, 32 bytes).
    #[serde(with = "hex::serde")]
    pub(crate) ak_public_key: Vec<u8>,
    /// Platform security module key (Ed25519, 32 bytes).
    #[serde(with = "hex::serde")]
    pub(crate) platform_public_key: Vec<u8>,
    /// AK signature over `body`.
    #[serde(with = "hex::serde")]
    pub(crate) ak_signature: Vec<u8>,
    /// Platform signature over `body`.
    #[serde(with = "hex::serde")]
    pub(crate) platform_signature: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct MachineStateBody {
    #[serde(with = "encoding::base64_bytes")]
    pub(crate) nonce: Vec<u8>,
    pub(crate) secure_boot: bool,
    pub(crate) registers: BTreeMap<u32, Digest>,
    pub(crate) quotes: Vec<Quote>,
}

/// Structurally extract the ordered digest history embedded in raw
/// evidence. No cryptography happens here; the same bytes are
/// re-validated later by [`decode_and_verify`].
pub fn extract_digest_history(raw_evidence: &[u8]) -> Result<Vec<Digest>> {
    let envelope: EvidenceEnvelope = serde_json::from_slice(raw_evidence)
        .map_err(|e| VerifyError::EvidenceMalformed(e.to_string()))?;

    let body: MachineStateBody = serde_json::from_slice(&envelope.body)
        .map_err(|e| VerifyError::EvidenceMalformed(e.to_string()))?;

    Ok(body.quotes.into_iter().map(|q| q.digest).collect())
}

/// Decode raw evidence, verify its signature chain against the trust
/// store, and check the embedded nonce against `nonce`.
///
/// The nonce check is the anti-replay gate: callers must require a fresh
/// nonce per verification attempt and reject evidence not bound to it.
pub fn decode_and_verify(
    raw_evidence: &[u8],
    nonce: &[u8],
    trust: &TrustStore,
) -> Result<DecodedMachineState> {
    let envelope: EvidenceEnvelope = serde_json::from_slice(raw_evidence)
        .map_err(|e| VerifyError::EvidenceDecode(e.to_string()))?;

    let ak = parse_key(&envelope.ak_public_key)?;
    let platform = parse_key(&envelope.platform_public_key)?;

    // Both links of the chain must be pinned before any cryptographic
    // check happens.
    if !trust.contains(ak.as_bytes()) || !trust.contains(platform.as_bytes()) {
        return Err(VerifyError::UntrustedSigner);
    }

    let ak_sig = parse_signature(&envelope.ak_signature)?;
    let platform_sig = parse_signature(&envelope.platform_signature)?;

    ak.verify(&envelope.body, &ak_sig)
        .map_err(|_| VerifyError::SignatureInvalid)?;
    platform
        .verify(&envelope.body, &platform_sig)
        .map_err(|_| VerifyError::SignatureInvalid)?;

    let body: MachineStateBody = serde_json::from_slice(&envelope.body)
        .map_err(|e| VerifyError::EvidenceDecode(e.to_string()))?;

    if body.nonce != nonce {
        return Err(VerifyError::NonceMismatch);
    }

    Ok(DecodedMachineState {
        secure_boot: body.secure_boot,
        registers: body.registers,
        quotes: body.quotes,
    })
}

fn parse_key(bytes: &[u8]) -> Result<VerifyingKey> {
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| VerifyError::EvidenceDecode("public key must be 32 bytes".to_string()))?;
    VerifyingKey::from_bytes(&arr)
        .map_err(|e| VerifyError::EvidenceDecode(format!("invalid public key: {e}")))
}

fn parse_signature(bytes: &[u8]) -> Result<Signature> {
    Signature::from_slice(bytes)
        .map_err(|_| VerifyError::EvidenceDecode("signature must be 64 bytes".to_string()))
}
