//! The verification state machine.

use crate::claim::{ComputationClaim, VerificationContext};
use crate::error::Result;
use crate::evidence;
use crate::history;
use crate::policy::AppraisalPolicy;
use crate::trust::TrustStore;

/// Verifies computation claims against a fixed trust root and policy.
///
/// Both are loaded once at startup and never mutated, so a single
/// verifier is safe to share across concurrent verification calls.
/// Verification itself is pure and synchronous: decode + signature +
/// nonce, then secure boot, then policy, then digest history, stopping
/// at the first failure. Retry policy, if any, belongs to the caller.
#[derive(Debug, Clone)]
pub struct Verifier {
    trust: TrustStore,
    policy: AppraisalPolicy,
}

impl Verifier {
    pub fn new(trust: TrustStore, policy: AppraisalPolicy) -> Self {
        Self { trust, policy }
    }

    pub fn verify(&self, claim: &ComputationClaim, context: &VerificationContext) -> Result<()> {
        tracing::debug!(computation = %claim.computation, "verifying claim");

        let state = evidence::decode_and_verify(&context.attestation, &claim.nonce, &self.trust)?;

        self.policy.evaluate(&state)?;

        history::verify_history(&state.quotes, &claim.digest_history)?;

        tracing::debug!(computation = %claim.computation, "claim verified");
        Ok(())
    }
}
