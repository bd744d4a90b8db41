//! Wire types for pending work-unit files.
//!
//! One JSON object per pending claim, produced by the supervised
//! computation program and consumed by the polling pipeline. Decoding is
//! schema-validated: unknown fields and missing fields are rejected at
//! ingestion, before anything reaches the verifier.

use serde::{Deserialize, Serialize};
use veritee_core::encoding;

/// A pending claim/context pair awaiting verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkUnit {
    pub claim: ClaimRecord,
    pub context: ContextRecord,
}

/// The claimant's description of the computation.
///
/// `input` and `result` are arbitrary JSON documents (e.g. an Ethereum
/// block and its execution result); the claim generator treats their
/// canonical serialization as opaque bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClaimRecord {
    pub computation: String,
    pub input: serde_json::Value,
    pub result: serde_json::Value,
    #[serde(with = "encoding::base64_or_text")]
    pub nonce: Vec<u8>,
}

/// The evidence side of a work unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextRecord {
    /// Raw serialized attestation evidence.
    #[serde(with = "encoding::base64_bytes")]
    pub report: Vec<u8>,
    #[serde(with = "encoding::base64_or_text")]
    pub nonce: Vec<u8>,
}

impl WorkUnit {
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Canonical byte payloads for the claim generator.
    pub fn input_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&self.claim.input).expect("JSON value serializes")
    }

    pub fn result_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(&self.claim.result).expect("JSON value serializes")
    }
}
