//! Claim generation: packaging a computation's inputs, outputs and
//! evidence into a verifiable claim/context pair.

use serde::{Deserialize, Serialize};

use crate::encoding;
use crate::error::{Result, VerifyError};
use crate::evidence::{self, Digest};

/// What was computed and with what outcome.
///
/// `digest_history` is bound to the execution trace recorded in the
/// evidence, never to the claimant's own assertion; the verifier
/// corroborates it against the evidence quotes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationClaim {
    pub computation: String,
    #[serde(with = "encoding::base64_bytes")]
    pub input: Vec<u8>,
    #[serde(with = "encoding::base64_bytes")]
    pub result: Vec<u8>,
    #[serde(with = "encoding::base64_bytes")]
    pub nonce: Vec<u8>,
    pub digest_history: Vec<Digest>,
}

/// Evidence needed to corroborate one claim. Built once per work unit,
/// consumed exactly once by verification, then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationContext {
    #[serde(with = "encoding::base64_bytes")]
    pub attestation: Vec<u8>,
}

/// Build a claim and its verification context.
///
/// The digest history is extracted structurally from `raw_evidence`; no
/// hashing of the claim fields happens here. Binding is established when
/// the verifier later re-validates the same evidence bytes.
pub fn generate(
    computation: impl Into<String>,
    input: Vec<u8>,
    result: Vec<u8>,
    raw_evidence: Vec<u8>,
    nonce: Vec<u8>,
) -> Result<(ComputationClaim, VerificationContext)> {
    if nonce.is_empty() {
        return Err(VerifyError::NonceEmpty);
    }

    let digest_history = evidence::extract_digest_history(&raw_evidence)?;

    let claim = ComputationClaim {
        computation: computation.into(),
        input,
        result,
        nonce,
        digest_history,
    };
    let context = VerificationContext {
        attestation: raw_evidence,
    };

    Ok((claim, context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::EvidenceBuilder;

    #[test]
    fn test_generate_binds_digest_history() {
        let builder = EvidenceBuilder::new(b"n1").with_events(&["boot", "exec", "commit"]);
        let raw = builder.build();

        let (claim, context) =
            generate("block_processing", b"in".to_vec(), b"out".to_vec(), raw.clone(), b"n1".to_vec())
                .unwrap();

        assert_eq!(claim.digest_history, builder.event_digests());
        assert_eq!(context.attestation, raw);
        assert_eq!(claim.computation, "block_processing");
    }

    #[test]
    fn test_generate_rejects_empty_nonce() {
        let raw = EvidenceBuilder::new(b"n1").build();

        let err = generate("c", vec![], vec![], raw, vec![]).unwrap_err();
        assert!(matches!(err, VerifyError::NonceEmpty));
    }

    #[test]
    fn test_generate_rejects_malformed_evidence() {
        let err = generate("c", vec![], vec![], b"junk".to_vec(), b"n1".to_vec()).unwrap_err();
        assert!(matches!(err, VerifyError::EvidenceMalformed(_)));
    }

    #[test]
    fn test_claim_serializes_bytes_as_base64() {
        let raw = EvidenceBuilder::new(b"n1").build();
        let (claim, _) =
            generate("c", vec![1, 2, 3], vec![4], raw, b"n1".to_vec()).unwrap();

        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(json["input"], "AQID");
        assert_eq!(json["result"], "BA==");
    }
}
